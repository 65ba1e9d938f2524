// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot find configuration file {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    #[error("assembly version {0} not supported (expected GRCh37 or GRCh38)")]
    UnsupportedAssembly(String),

    #[error("output format {0} not supported (expected basic, compact or expanded)")]
    UnsupportedOutputFormat(String),

    #[error("cannot find input transcript file {}", path.display())]
    TranscriptFileNotFound { path: PathBuf },

    #[error("[Domains] uniprot_features in {} must contain a list of UniProt feature names", path.display())]
    FeaturesNotList { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to fetch data from {url}: status {status}: {body}")]
    Api {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UniProt ID mapping failed for {id}: {message}")]
    IdMapping { id: String, message: String },

    #[error("table error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("table too large for a worksheet: row {row}, column {col}")]
    SheetTooLarge { row: usize, col: usize },

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    pub fn id_mapping(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IdMapping {
            id: id.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_mapping_error_names_transcript() {
        let err = Error::id_mapping("ENST00000269305", "job failed");
        assert_eq!(
            err.to_string(),
            "UniProt ID mapping failed for ENST00000269305: job failed"
        );
    }

    #[test]
    fn messages_name_the_bad_value() {
        let err = Error::UnsupportedOutputFormat("wide".into());
        assert!(err.to_string().contains("wide"));

        let err = Error::TranscriptFileNotFound {
            path: PathBuf::from("/data/missing.txt"),
        };
        assert!(err.to_string().contains("/data/missing.txt"));
    }
}
