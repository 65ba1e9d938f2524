// src/ensembl.rs

use serde_json::Value;
use tracing::{debug, warn};

use crate::annotation::GenomeSource;
use crate::api_handler::APIHandler;
use crate::config::Assembly;
use crate::error::Result;
use crate::models::TranscriptLookup;

/// Ensembl REST lookups for one assembly.
pub struct EnsemblClient {
    api: APIHandler,
}

impl EnsemblClient {
    pub fn new(assembly: Assembly) -> Result<Self> {
        Self::with_base_url(assembly.ensembl_server())
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            api: APIHandler::new(base_url)?,
        })
    }

    fn lookup(&self, id: &str, expand: bool) -> Result<Value> {
        let endpoint = if expand {
            format!("/lookup/id/{}?expand=1", id)
        } else {
            format!("/lookup/id/{}", id)
        };
        self.api.get(&endpoint)
    }
}

impl GenomeSource for EnsemblClient {
    fn transcript_lookup(&self, transcript_id: &str) -> Result<TranscriptLookup> {
        // the expanded record carries both Parent and Translation
        let data = self.lookup(transcript_id, true)?;
        let lookup = TranscriptLookup {
            gene_id: parent_id(&data),
            protein_id: translation_id(&data),
        };
        if lookup.gene_id.is_empty() {
            warn!("No parent gene found for {}", transcript_id);
        }
        if lookup.protein_id.is_empty() {
            warn!("No translation found for {} (non-coding transcript?)", transcript_id);
        }
        debug!(
            "{} -> gene {}, protein {}",
            transcript_id, lookup.gene_id, lookup.protein_id
        );
        Ok(lookup)
    }

    fn gene_symbol(&self, gene_id: &str) -> Result<String> {
        let data = self.lookup(gene_id, false)?;
        let symbol = display_name(&data);
        debug!("{} -> symbol {}", gene_id, symbol);
        Ok(symbol)
    }
}

fn string_at(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn parent_id(lookup: &Value) -> String {
    string_at(lookup, "/Parent")
}

fn translation_id(lookup: &Value) -> String {
    string_at(lookup, "/Translation/id")
}

fn display_name(lookup: &Value) -> String {
    string_at(lookup, "/display_name")
}
