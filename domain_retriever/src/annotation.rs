// src/annotation.rs

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::models::{uniprot_url, ProteinFeature, TranscriptDomains, TranscriptIds, TranscriptLookup};

/// Genome-side identifier lookups (Ensembl).
pub trait GenomeSource {
    fn transcript_lookup(&self, transcript_id: &str) -> Result<TranscriptLookup>;
    fn gene_symbol(&self, gene_id: &str) -> Result<String>;
}

/// Protein-side lookups (UniProt).
pub trait ProteinSource {
    fn uniprot_id(&self, transcript_id: &str) -> Result<String>;
    fn features(&self, uniprot_id: &str, feature_types: &[String]) -> Result<Vec<ProteinFeature>>;
}

/// Resolve the configured identifiers for every transcript, in input order.
pub fn get_transcript_ids<G, P>(
    config: &Config,
    genome: &G,
    protein: &P,
    transcripts: &[String],
) -> Result<Vec<(String, TranscriptIds)>>
where
    G: GenomeSource + ?Sized,
    P: ProteinSource + ?Sized,
{
    let flags = &config.ids;
    let mut info = Vec::with_capacity(transcripts.len());

    for transcript in transcripts {
        let mut ids = TranscriptIds::default();

        if flags.get_gene_name || flags.get_gene_id || flags.get_protein_id {
            let lookup = genome.transcript_lookup(transcript)?;
            if flags.get_gene_name && !lookup.gene_id.is_empty() {
                ids.gene_name = genome.gene_symbol(&lookup.gene_id)?;
            }
            if flags.get_gene_id {
                ids.gene_id = lookup.gene_id;
            }
            if flags.get_protein_id {
                ids.protein_id = lookup.protein_id;
            }
        }

        ids.uniprot_id = protein.uniprot_id(transcript)?;
        if flags.get_uniprot_url {
            ids.uniprot_url = uniprot_url(&ids.uniprot_id);
        }

        debug!("{}: {:?}", transcript, ids);
        info.push((transcript.clone(), ids));
    }

    Ok(info)
}

/// Fetch the configured UniProt features for every transcript.
pub fn get_uniprot_domains<P>(
    config: &Config,
    protein: &P,
    transcript_ids: Vec<(String, TranscriptIds)>,
) -> Result<Vec<TranscriptDomains>>
where
    P: ProteinSource + ?Sized,
{
    let feature_types = &config.uniprot_features;

    transcript_ids
        .into_iter()
        .map(|(transcript_id, ids)| -> Result<TranscriptDomains> {
            let features = protein.features(&ids.uniprot_id, feature_types)?;
            if features.is_empty() {
                warn!(
                    "No {:?} UniProt features were found for {} (UniProt ID={})",
                    feature_types, transcript_id, ids.uniprot_id
                );
            }
            Ok(TranscriptDomains {
                transcript_id,
                ids,
                features,
            })
        })
        .collect()
}
