// src/transcripts.rs

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use tracing::error;

use crate::error::Result;

/// Ensembl transcript stable ID with an optional version suffix.
const TRANSCRIPT_PATTERN: &str = r"(ENST\d+)(?:\.\d+)?";

/// Read the transcript list, one ID per line. Lines without an Ensembl
/// transcript ID are skipped, version suffixes are dropped and repeated
/// IDs are kept once, at their first position.
pub fn load_transcripts(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| {
        error!(
            "Can not find input transcripts file {}. Please check configuration file, under [Transcript] file",
            path.display()
        );
        e
    })?;

    let re = Regex::new(TRANSCRIPT_PATTERN)?;
    let mut seen = HashSet::new();
    let mut transcripts = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        if let Some(caps) = re.captures(line.trim_end()) {
            let id = caps[1].to_string();
            if seen.insert(id.clone()) {
                transcripts.push(id);
            }
        }
    }

    Ok(transcripts)
}
