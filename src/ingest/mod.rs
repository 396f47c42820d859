// * Ingestion of Search Console performance exports
// * Reads CSV/TSV/semicolon files into PerformanceRow values. Any fatal
// * problem surfaces here, before a single page is crawled.

pub mod columns;

pub use columns::{ColumnMap, Field, ALIASES};

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::engine::normalization::clean_url;
use crate::schema::PerformanceRow;

#[derive(Debug, Error)]
pub enum InputFormatError {
    #[error("missing required columns {missing:?}; available columns: {available:?}")]
    MissingColumns {
        missing: Vec<&'static str>,
        available: Vec<String>,
    },

    #[error("unsupported file format {0:?}: export the report as CSV")]
    UnsupportedFormat(String),

    #[error("input file is empty")]
    Empty,

    #[error("failed to parse input: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Row counts observed while reading an export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_kept: usize,
    /// Rows with an empty URL or keyword
    pub rows_blank: usize,
    /// Click cells that could not be parsed and were read as zero
    pub clicks_coerced: usize,
}

/// Parsed export plus its counts
#[derive(Debug, Clone, Default)]
pub struct IngestedData {
    pub rows: Vec<PerformanceRow>,
    pub summary: IngestSummary,
    pub has_position_column: bool,
}

/// Reads an export from disk, choosing the parser from the extension
pub fn read_performance_file(path: &Path) -> Result<IngestedData, InputFormatError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "ods") {
        return Err(InputFormatError::UnsupportedFormat(ext));
    }

    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    let data = read_performance_csv(&text)?;

    info!(
        path = %path.display(),
        rows = data.summary.rows_kept,
        "Performance export loaded"
    );
    Ok(data)
}

/// Parses delimited export text
pub fn read_performance_csv(text: &str) -> Result<IngestedData, InputFormatError> {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).ok_or(InputFormatError::Empty)?;
    let delimiter = sniff_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| columns::clean_header(h).to_string())
        .collect();

    let map = ColumnMap::resolve(&headers);
    let missing = map.missing_required();
    if !missing.is_empty() {
        return Err(InputFormatError::MissingColumns {
            missing: missing.iter().map(Field::name).collect(),
            available: headers,
        });
    }

    // * Required columns are present past this point
    let (Some(keyword_col), Some(url_col), Some(clicks_col)) = (map.keyword, map.url, map.clicks)
    else {
        return Err(InputFormatError::Empty);
    };

    let mut data = IngestedData {
        has_position_column: map.position.is_some(),
        ..Default::default()
    };

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        data.summary.rows_read += 1;

        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let url = clean_url(cell(Some(url_col)));
        let keyword = cell(Some(keyword_col)).trim().to_string();
        if url.is_empty() || keyword.is_empty() {
            data.summary.rows_blank += 1;
            continue;
        }

        let clicks_raw = cell(Some(clicks_col));
        let clicks = match parse_count(clicks_raw) {
            Some(c) => c,
            None => {
                if !clicks_raw.is_empty() {
                    warn!(line = line + 2, value = clicks_raw, "Unparsable clicks, reading as 0");
                    data.summary.clicks_coerced += 1;
                }
                0
            }
        };

        data.rows.push(PerformanceRow {
            url,
            keyword,
            clicks,
            impressions: parse_count(cell(map.impressions)),
            position: parse_position(cell(map.position)),
            ctr: parse_ctr(cell(map.ctr)),
        });
    }

    data.summary.rows_kept = data.rows.len();
    Ok(data)
}

// * Semicolon when present without commas, tab when present, comma otherwise
pub fn sniff_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') && !header_line.contains(',') {
        b';'
    } else if header_line.contains('\t') {
        b'\t'
    } else {
        b','
    }
}

// * Non-negative integer, tolerating "1,234" and "12.0"
fn parse_count(raw: &str) -> Option<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(n) = cleaned.parse::<u64>() {
        return Some(n);
    }
    match cleaned.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => Some(f.round() as u64),
        _ => None,
    }
}

fn parse_position(raw: &str) -> Option<f64> {
    let value = raw.trim().replace(',', ".").parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

// * "5.2%" -> 0.052, "0.052" -> 0.052
fn parse_ctr(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let (number, percent) = match raw.strip_suffix('%') {
        Some(n) => (n.trim(), true),
        None => (raw, false),
    };
    let value = number.replace(',', ".").parse::<f64>().ok()?;
    let value = if percent { value / 100.0 } else { value };
    (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("Query;Page;Clicks"), b';');
        assert_eq!(sniff_delimiter("Query\tPage\tClicks"), b'\t');
        assert_eq!(sniff_delimiter("Query,Page,Clicks"), b',');
        assert_eq!(sniff_delimiter("Query;Page,Clicks"), b',');
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("1,234"), Some(1234));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("n/a"), None);
        assert_eq!(parse_count("-3"), None);
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("8.3"), Some(8.3));
        assert_eq!(parse_position("8,3"), Some(8.3));
        assert_eq!(parse_position("0"), None);
        assert_eq!(parse_position(""), None);
    }

    #[test]
    fn test_parse_ctr() {
        assert!((parse_ctr("5.2%").unwrap() - 0.052).abs() < 1e-9);
        assert!((parse_ctr("0.25").unwrap() - 0.25).abs() < 1e-9);
        assert_eq!(parse_ctr("250%"), None);
        assert_eq!(parse_ctr(""), None);
    }
}
