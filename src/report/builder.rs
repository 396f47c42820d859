// * Report Builder
// * Joins filtered rows with extracted pages through the matcher, then
// * groups by URL into ranked summaries.

use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::{Report, StrikingDistanceEntry, UrlSummary};
use crate::engine::matcher::{join_fields, PreparedKeyword};
use crate::engine::normalization::normalize_text;
use crate::schema::{ExtractedPage, PerformanceRow};

// ! Raised only when the orchestrator skipped a URL. This is a defect,
// ! not a user-facing condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("no extraction attempt recorded for {url}")]
pub struct MissingExtractionError {
    pub url: String,
}

// * Page fields normalized once, shared by every keyword of the URL
struct NormalizedPage {
    failed: bool,
    title: Option<String>,
    meta: Option<String>,
    h1: Option<String>,
    h2: Option<String>,
    body: String,
}

impl NormalizedPage {
    fn from_page(page: &ExtractedPage) -> Self {
        Self {
            failed: !page.is_success(),
            title: page.title.as_deref().map(normalize_text),
            meta: page.meta_description.as_deref().map(normalize_text),
            h1: join_fields(&page.h1).as_deref().map(normalize_text),
            h2: join_fields(&page.h2).as_deref().map(normalize_text),
            body: normalize_text(&page.body_text),
        }
    }

    fn entry_for(&self, row: &PerformanceRow) -> StrikingDistanceEntry {
        let mut entry = StrikingDistanceEntry {
            url: row.url.clone(),
            keyword: row.keyword.clone(),
            clicks: row.clicks,
            position: row.position,
            in_title: false,
            in_meta: false,
            in_h1: false,
            in_h2: false,
            in_body: false,
            extraction_failed: self.failed,
        };

        if self.failed {
            return entry;
        }

        let keyword = PreparedKeyword::new(&row.keyword);
        entry.in_title = keyword.found_in(self.title.as_deref());
        entry.in_meta = keyword.found_in(self.meta.as_deref());
        entry.in_h1 = keyword.found_in(self.h1.as_deref());
        entry.in_h2 = keyword.found_in(self.h2.as_deref());
        entry.in_body = keyword.found_in(Some(&self.body));
        entry
    }
}

/// Builds reports with a fixed top-N
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    top_n: usize,
}

impl ReportBuilder {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Computes presence flags for every row and aggregates per URL.
    ///
    /// Every row's URL must have an extraction attempt in `pages`.
    pub fn build(
        &self,
        rows: &[PerformanceRow],
        pages: &[ExtractedPage],
    ) -> Result<Report, MissingExtractionError> {
        let mut normalized: HashMap<&str, NormalizedPage> = HashMap::with_capacity(pages.len());
        for page in pages {
            normalized
                .entry(page.url.as_str())
                .or_insert_with(|| NormalizedPage::from_page(page));
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let page = normalized.get(row.url.as_str()).ok_or_else(|| MissingExtractionError {
                url: row.url.clone(),
            })?;
            entries.push(page.entry_for(row));
        }

        let summaries = self.summarize(&entries);

        debug!(
            entries = entries.len(),
            urls = summaries.len(),
            "Report built"
        );

        Ok(Report { entries, summaries })
    }

    fn summarize(&self, entries: &[StrikingDistanceEntry]) -> Vec<UrlSummary> {
        // * Group while remembering first-seen URL order
        let mut groups: Vec<(&str, Vec<&StrikingDistanceEntry>)> = Vec::new();
        let mut slots: HashMap<&str, usize> = HashMap::new();
        for entry in entries {
            let slot = *slots.entry(entry.url.as_str()).or_insert_with(|| {
                groups.push((entry.url.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(entry);
        }

        let mut summaries: Vec<UrlSummary> = groups
            .into_iter()
            .map(|(url, mut group)| {
                let total_clicks = group
                    .iter()
                    .fold(0u64, |total, e| total.saturating_add(e.clicks));
                let keyword_count = group.len();

                group.sort_by(|a, b| rank_entries(a, b));
                let top_keywords = group.into_iter().take(self.top_n).cloned().collect();

                UrlSummary {
                    url: url.to_string(),
                    total_clicks,
                    keyword_count,
                    top_keywords,
                }
            })
            .collect();

        summaries.sort_by(|a, b| {
            b.total_clicks
                .cmp(&a.total_clicks)
                .then_with(|| a.url.cmp(&b.url))
        });
        summaries
    }
}

// * Clicks descending, keyword ascending on ties
fn rank_entries(a: &StrikingDistanceEntry, b: &StrikingDistanceEntry) -> Ordering {
    b.clicks
        .cmp(&a.clicks)
        .then_with(|| a.keyword.cmp(&b.keyword))
}

/// Convenience wrapper around [`ReportBuilder::build`]
pub fn build(
    rows: &[PerformanceRow],
    pages: &[ExtractedPage],
    top_n: usize,
) -> Result<Report, MissingExtractionError> {
    ReportBuilder::new(top_n).build(rows, pages)
}
