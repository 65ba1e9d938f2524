// src/tables.rs

use std::collections::BTreeSet;

use polars::prelude::*;

use crate::config::{Config, IdsConfig, OutputFormat};
use crate::models::labels;
use crate::models::{TranscriptDomains, TranscriptIds};

/// A named table, written as one worksheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub table: DataFrame,
}

/// Build the output sheets for the configured format.
///
/// `basic` and `compact` give a single sheet called `Domains`; `expanded`
/// gives one sheet per transcript that has at least one feature, named
/// after the transcript and ordered by transcript ID.
pub fn generate_output_tables(config: &Config, domains: &[TranscriptDomains]) -> PolarsResult<Vec<Sheet>> {
    match config.output.format {
        OutputFormat::Basic => Ok(vec![Sheet {
            name: labels::DOMAINS.to_string(),
            table: basic_table(&config.ids, domains)?,
        }]),
        OutputFormat::Compact => Ok(vec![Sheet {
            name: labels::DOMAINS.to_string(),
            table: compact_table(&config.ids, domains)?,
        }]),
        OutputFormat::Expanded => expanded_tables(&config.ids, domains),
    }
}

/// Identifier columns in output order.
fn id_labels(flags: &IdsConfig) -> Vec<&'static str> {
    let mut cols = vec![labels::TRANSCRIPT_ID, labels::UNIPROT_ID];
    if flags.get_gene_id {
        cols.push(labels::GENE_ID);
    }
    if flags.get_gene_name {
        cols.push(labels::GENE_NAME);
    }
    if flags.get_protein_id {
        cols.push(labels::PROTEIN_ID);
    }
    if flags.get_uniprot_url {
        cols.push(labels::UNIPROT_URL);
    }
    cols
}

fn id_value<'a>(label: &str, transcript_id: &'a str, ids: &'a TranscriptIds) -> &'a str {
    match label {
        labels::TRANSCRIPT_ID => transcript_id,
        labels::UNIPROT_ID => &ids.uniprot_id,
        labels::GENE_ID => &ids.gene_id,
        labels::GENE_NAME => &ids.gene_name,
        labels::PROTEIN_ID => &ids.protein_id,
        labels::UNIPROT_URL => &ids.uniprot_url,
        _ => "",
    }
}

fn str_column(name: &str, values: Vec<String>) -> Column {
    Series::new(PlSmallStr::from(name), values).into()
}

fn position_column(name: &str, values: Vec<Option<i64>>) -> Column {
    Series::new(PlSmallStr::from(name), values).into()
}

/// One row per feature; transcripts without features add no rows.
fn basic_table(flags: &IdsConfig, domains: &[TranscriptDomains]) -> PolarsResult<DataFrame> {
    let id_cols = id_labels(flags);
    let rows: usize = domains.iter().map(|d| d.features.len()).sum();

    let mut id_values: Vec<Vec<String>> = vec![Vec::with_capacity(rows); id_cols.len()];
    let mut feature_type = Vec::with_capacity(rows);
    let mut description = Vec::with_capacity(rows);
    let mut start = Vec::with_capacity(rows);
    let mut end = Vec::with_capacity(rows);

    for td in domains {
        for feature in &td.features {
            for (label, values) in id_cols.iter().zip(id_values.iter_mut()) {
                values.push(id_value(label, &td.transcript_id, &td.ids).to_string());
            }
            feature_type.push(feature.feature_type.clone());
            description.push(feature.description.clone());
            start.push(feature.start.map(|v| v as i64));
            end.push(feature.end.map(|v| v as i64));
        }
    }

    let mut columns: Vec<Column> = id_cols
        .iter()
        .zip(id_values)
        .map(|(label, values)| str_column(label, values))
        .collect();
    columns.push(str_column(labels::FEATURE, feature_type));
    columns.push(str_column(labels::DESCRIPTION, description));
    columns.push(position_column(labels::START, start));
    columns.push(position_column(labels::END, end));

    DataFrame::new(columns)
}

/// One row per transcript, features folded into the `Domains` column.
fn compact_table(flags: &IdsConfig, domains: &[TranscriptDomains]) -> PolarsResult<DataFrame> {
    let id_cols = id_labels(flags);

    let mut columns: Vec<Column> = id_cols
        .iter()
        .map(|label| {
            let values = domains
                .iter()
                .map(|td| id_value(label, &td.transcript_id, &td.ids).to_string())
                .collect();
            str_column(label, values)
        })
        .collect();
    columns.push(str_column(
        labels::DOMAINS,
        domains.iter().map(TranscriptDomains::compact_domains).collect(),
    ));

    DataFrame::new(columns)
}

fn expanded_tables(flags: &IdsConfig, domains: &[TranscriptDomains]) -> PolarsResult<Vec<Sheet>> {
    let basic = basic_table(flags, domains)?;
    let transcript_col = basic.column(labels::TRANSCRIPT_ID)?.str()?;

    let transcripts: BTreeSet<String> = transcript_col
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    if transcripts.is_empty() {
        // a workbook needs at least one sheet
        return Ok(vec![Sheet {
            name: labels::DOMAINS.to_string(),
            table: basic,
        }]);
    }

    transcripts
        .into_iter()
        .map(|transcript| -> PolarsResult<Sheet> {
            let mask = transcript_col.equal(transcript.as_str());
            Ok(Sheet {
                table: basic.filter(&mask)?,
                name: transcript,
            })
        })
        .collect()
}
