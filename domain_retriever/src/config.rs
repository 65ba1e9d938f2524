// src/config.rs
//
// Configuration is a single TOML file. It is parsed with figment and then
// checked up front so that a bad value stops the run before any request is
// made to Ensembl or UniProt.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use figment::providers::{Format, Toml};
use figment::value::Value;
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Genome assembly served by the Ensembl REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Assembly {
    GRCh37,
    GRCh38,
}

impl Assembly {
    pub fn ensembl_server(&self) -> &'static str {
        match self {
            Assembly::GRCh37 => "https://grch37.rest.ensembl.org",
            Assembly::GRCh38 => "https://rest.ensembl.org",
        }
    }
}

impl FromStr for Assembly {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "GRCh37" => Ok(Assembly::GRCh37),
            "GRCh38" => Ok(Assembly::GRCh38),
            other => Err(Error::UnsupportedAssembly(other.to_string())),
        }
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assembly::GRCh37 => write!(f, "GRCh37"),
            Assembly::GRCh38 => write!(f, "GRCh38"),
        }
    }
}

/// Layout of the output workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// All transcripts on one sheet, one row per domain.
    Basic,
    /// All transcripts on one sheet, one row per transcript.
    Compact,
    /// One sheet per transcript, one row per domain.
    Expanded,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "basic" => Ok(OutputFormat::Basic),
            "compact" => Ok(OutputFormat::Compact),
            "expanded" => Ok(OutputFormat::Expanded),
            other => Err(Error::UnsupportedOutputFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub file: PathBuf,
}

/// Which identifiers to resolve next to the always-present UniProt ID.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdsConfig {
    pub get_gene_name: bool,
    pub get_gene_id: bool,
    pub get_protein_id: bool,
    pub get_uniprot_url: bool,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub assembly: Assembly,
    pub output: OutputConfig,
    pub transcript_file: PathBuf,
    pub uniprot_features: Vec<String>,
    pub ids: IdsConfig,
    pub debug: bool,
}

// On-disk layout, section names as they appear in the TOML file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "Assembly")]
    assembly: AssemblySection,
    #[serde(rename = "Output")]
    output: OutputSection,
    #[serde(rename = "Transcript")]
    transcript: TranscriptSection,
    #[serde(rename = "Domains")]
    domains: DomainsSection,
    #[serde(rename = "IDs", default)]
    ids: IdsConfig,
    #[serde(rename = "Debug", default)]
    debug: DebugSection,
}

#[derive(Debug, Deserialize)]
struct AssemblySection {
    version: String,
}

#[derive(Debug, Deserialize)]
struct OutputSection {
    format: String,
    file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct TranscriptSection {
    file: PathBuf,
}

#[derive(Debug, Deserialize)]
struct DomainsSection {
    uniprot_features: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DebugSection {
    enable: bool,
}

impl Config {
    /// Load and validate the configuration file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        // figment treats a missing file as an empty source
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let raw: ConfigFile = Figment::from(Toml::file(path)).extract()?;
        Self::validate(raw, path)
    }

    fn validate(raw: ConfigFile, path: &Path) -> Result<Self> {
        let assembly = raw.assembly.version.parse::<Assembly>()?;
        let format = raw.output.format.parse::<OutputFormat>()?;

        if !raw.transcript.file.is_file() {
            return Err(Error::TranscriptFileNotFound {
                path: raw.transcript.file,
            });
        }

        let uniprot_features = feature_list(&raw.domains.uniprot_features).ok_or_else(|| {
            Error::FeaturesNotList {
                path: path.to_path_buf(),
            }
        })?;

        Ok(Config {
            assembly,
            output: OutputConfig {
                format,
                file: raw.output.file,
            },
            transcript_file: raw.transcript.file,
            uniprot_features,
            ids: raw.ids,
            debug: raw.debug.enable,
        })
    }

    /// Multi-line rendering used in debug mode.
    pub fn pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:#?}", self))
    }
}

fn feature_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(_, items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}
