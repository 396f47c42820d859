// * Report export
// * Renders the report table and the failure log as CSV, TSV or JSON.

use std::io::Write;

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use super::Report;
use crate::schema::ExtractionFailure;

/// Header of the downloadable report table
pub const REPORT_COLUMNS: [&str; 11] = [
    "URL",
    "Total Clicks",
    "Keyword Count",
    "Keyword",
    "Clicks",
    "Position",
    "In Title",
    "In Meta Description",
    "In H1",
    "In H2",
    "In Body",
];

/// Header of the failure log
pub const FAILURE_COLUMNS: [&str; 2] = ["URL", "Error Reason"];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Csv,
    #[value(alias = "tab")]
    Tsv,
    Json,
}

impl OutputFormat {
    fn delimiter(&self) -> u8 {
        match self {
            OutputFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

// * Flat row shape for JSON output, mirrors the table columns
#[derive(Serialize)]
struct TableRow<'a> {
    url: &'a str,
    total_clicks: u64,
    keyword_count: usize,
    keyword: &'a str,
    clicks: u64,
    position: Option<f64>,
    in_title: bool,
    in_meta_description: bool,
    in_h1: bool,
    in_h2: bool,
    in_body: bool,
}

fn flag(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

// * Two decimals at most, trailing zeros dropped: 8.0 -> "8", 8.25 -> "8.25"
pub fn format_position(position: Option<f64>) -> String {
    match position {
        Some(p) => {
            let s = format!("{:.2}", p);
            let trimmed = s.trim_end_matches('0').trim_end_matches('.');
            if trimmed.is_empty() {
                "0".to_string()
            } else {
                trimmed.to_string()
            }
        }
        None => String::new(),
    }
}

/// Writes the report table, one row per listed keyword
pub fn write_report<W: Write>(
    writer: W,
    report: &Report,
    format: OutputFormat,
) -> Result<(), ExportError> {
    if format == OutputFormat::Json {
        let rows: Vec<TableRow> = report
            .table_rows()
            .map(|(summary, entry)| TableRow {
                url: &summary.url,
                total_clicks: summary.total_clicks,
                keyword_count: summary.keyword_count,
                keyword: &entry.keyword,
                clicks: entry.clicks,
                position: entry.position,
                in_title: entry.in_title,
                in_meta_description: entry.in_meta,
                in_h1: entry.in_h1,
                in_h2: entry.in_h2,
                in_body: entry.in_body,
            })
            .collect();
        serde_json::to_writer_pretty(writer, &rows)?;
        return Ok(());
    }

    let mut out = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    out.write_record(REPORT_COLUMNS)?;
    for (summary, entry) in report.table_rows() {
        let record: [String; 11] = [
            summary.url.clone(),
            summary.total_clicks.to_string(),
            summary.keyword_count.to_string(),
            entry.keyword.clone(),
            entry.clicks.to_string(),
            format_position(entry.position),
            flag(entry.in_title).to_string(),
            flag(entry.in_meta).to_string(),
            flag(entry.in_h1).to_string(),
            flag(entry.in_h2).to_string(),
            flag(entry.in_body).to_string(),
        ];
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the failure log
pub fn write_failures<W: Write>(
    writer: W,
    failures: &[ExtractionFailure],
    format: OutputFormat,
) -> Result<(), ExportError> {
    if format == OutputFormat::Json {
        serde_json::to_writer_pretty(writer, failures)?;
        return Ok(());
    }

    let mut out = csv::WriterBuilder::new()
        .delimiter(format.delimiter())
        .from_writer(writer);

    out.write_record(FAILURE_COLUMNS)?;
    for failure in failures {
        out.write_record([failure.url.as_str(), failure.reason.as_str()])?;
    }
    out.flush()?;
    Ok(())
}
