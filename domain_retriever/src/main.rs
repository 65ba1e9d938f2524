// src/main.rs
//
// Retrieve UniProt protein domains for a list of Ensembl transcripts and
// write them to an xlsx workbook. Settings live in config/config.toml.

mod annotation;
mod api_handler;
mod config;
mod ensembl;
mod error;
mod excel;
mod models;
mod tables;
mod transcripts;
mod uniprot;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::annotation::{get_transcript_ids, get_uniprot_domains, GenomeSource, ProteinSource};
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::ensembl::EnsemblClient;
use crate::excel::write_sheets;
use crate::tables::generate_output_tables;
use crate::transcripts::load_transcripts;
use crate::uniprot::UniProtClient;

/// Padding added to every auto-sized column.
const EXTRA_WIDTH: usize = 2;

#[derive(Parser, Debug)]
#[command(name = "domain_retriever", version, about = "Fetch UniProt protein domains for Ensembl transcripts")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

/// Resolve IDs and domains for `transcripts`, then write the configured
/// workbook. Returns the number of sheets written.
fn build_workbook<G, P>(
    config: &Config,
    genome: &G,
    protein: &P,
    transcripts: &[String],
) -> anyhow::Result<usize>
where
    G: GenomeSource,
    P: ProteinSource,
{
    // IDs, then domains
    let transcript_ids = get_transcript_ids(config, genome, protein, transcripts)?;
    let transcript_domains = get_uniprot_domains(config, protein, transcript_ids)?;

    let sheets = generate_output_tables(config, &transcript_domains)?;
    for sheet in &sheets {
        debug!("Domains table for {}:\n{}", sheet.name, sheet.table);
    }

    write_sheets(&sheets, &config.output.file, EXTRA_WIDTH)
        .with_context(|| format!("failed to write {}", config.output.file.display()))?;
    Ok(sheets.len())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Configuration is checked before anything touches the network
    let config = Config::load_from(&cli.config)
        .with_context(|| format!("invalid configuration in {}", cli.config.display()))?;

    init_logging(config.debug || cli.verbose);
    info!("Starting domain retrieval ({})", config.assembly);
    debug!("Configuration:\n{}", config.pretty());

    // Load transcripts, versions removed
    let transcripts = load_transcripts(&config.transcript_file)?;
    info!("Loaded {} transcripts", transcripts.len());
    debug!("Transcripts: {:?}", transcripts);

    let ensembl = EnsemblClient::new(config.assembly)?;
    let uniprot = UniProtClient::new()?;

    let sheet_count = build_workbook(&config, &ensembl, &uniprot, &transcripts)?;
    info!(
        "{} generated with {} sheet(s)",
        config.output.file.display(),
        sheet_count
    );

    Ok(())
}
