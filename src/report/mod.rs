// * Report: per-keyword presence flags and per-URL summaries
// * Builds the final striking-distance table from filtered rows and
// * extracted pages, and renders it for download.

pub mod builder;
pub mod export;

pub use builder::{build, MissingExtractionError, ReportBuilder};
pub use export::{write_failures, write_report, ExportError, OutputFormat, REPORT_COLUMNS};

use serde::{Deserialize, Serialize};

/// One (url, keyword) pair joined with its page's fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikingDistanceEntry {
    pub url: String,
    pub keyword: String,
    pub clicks: u64,
    pub position: Option<f64>,
    pub in_title: bool,
    pub in_meta: bool,
    pub in_h1: bool,
    pub in_h2: bool,
    pub in_body: bool,
    /// The page could not be analyzed; every flag is false
    pub extraction_failed: bool,
}

impl StrikingDistanceEntry {
    /// True when the keyword was found in none of the five fields
    pub fn is_missing_everywhere(&self) -> bool {
        !(self.in_title || self.in_meta || self.in_h1 || self.in_h2 || self.in_body)
    }
}

/// Aggregate over every surviving entry of one URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSummary {
    pub url: String,
    /// Sum over all entries, not only the ones listed
    pub total_clicks: u64,
    pub keyword_count: usize,
    /// Up to top_n entries, clicks descending, keyword ascending on ties
    pub top_keywords: Vec<StrikingDistanceEntry>,
}

/// Output of one report-generation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Every filtered row, in input order
    pub entries: Vec<StrikingDistanceEntry>,
    /// Total clicks descending, then URL ascending
    pub summaries: Vec<UrlSummary>,
}

impl Report {
    /// Rows of the downloadable table: one per listed keyword
    pub fn table_rows(&self) -> impl Iterator<Item = (&UrlSummary, &StrikingDistanceEntry)> {
        self.summaries
            .iter()
            .flat_map(|summary| summary.top_keywords.iter().map(move |entry| (summary, entry)))
    }

    pub fn summary_for(&self, url: &str) -> Option<&UrlSummary> {
        self.summaries.iter().find(|s| s.url == url)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts report to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Converts report to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
