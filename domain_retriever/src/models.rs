// src/models.rs

/// Column labels of the output tables.
pub mod labels {
    pub const TRANSCRIPT_ID: &str = "Transcript_ID";
    pub const PROTEIN_ID: &str = "Protein_ID";
    pub const GENE_NAME: &str = "Gene_name";
    pub const GENE_ID: &str = "Gene_ID";
    pub const UNIPROT_ID: &str = "UniProt_ID";
    pub const UNIPROT_URL: &str = "UniProt_URL";
    pub const DOMAINS: &str = "Domains";

    pub const FEATURE: &str = "Feature";
    pub const DESCRIPTION: &str = "Description";
    pub const START: &str = "Start";
    pub const END: &str = "End";
}

/// UniProt entry page; `DUMMYID` is replaced by the accession.
const UNIPROT_URL_TEMPLATE: &str = "https://www.uniprot.org/uniprotkb/DUMMYID/entry";

/// Empty for an unmapped transcript.
pub fn uniprot_url(uniprot_id: &str) -> String {
    if uniprot_id.is_empty() {
        return String::new();
    }
    UNIPROT_URL_TEMPLATE.replace("DUMMYID", uniprot_id)
}

/// Parent gene and translation of a transcript, from one Ensembl lookup.
/// Either is empty when Ensembl has none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptLookup {
    pub gene_id: String,
    pub protein_id: String,
}

/// Identifiers resolved for one transcript. Identifiers that were not
/// requested are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptIds {
    pub protein_id: String,
    pub gene_id: String,
    pub gene_name: String,
    pub uniprot_id: String,
    pub uniprot_url: String,
}

/// A UniProt sequence feature (domain, region, motif, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinFeature {
    pub feature_type: String,
    pub description: String,
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl ProteinFeature {
    /// `Feature:Domain,Description:SH2,Start:10,End:100`
    pub fn compact(&self) -> String {
        format!(
            "{}:{},{}:{},{}:{},{}:{}",
            labels::FEATURE,
            self.feature_type,
            labels::DESCRIPTION,
            self.description,
            labels::START,
            position(self.start),
            labels::END,
            position(self.end)
        )
    }
}

fn position(p: Option<u64>) -> String {
    p.map(|v| v.to_string()).unwrap_or_else(|| "NaN".to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptDomains {
    pub transcript_id: String,
    pub ids: TranscriptIds,
    pub features: Vec<ProteinFeature>,
}

impl TranscriptDomains {
    /// All features of the transcript, `|`-separated.
    pub fn compact_domains(&self) -> String {
        self.features
            .iter()
            .map(ProteinFeature::compact)
            .collect::<Vec<_>>()
            .join("|")
    }
}
