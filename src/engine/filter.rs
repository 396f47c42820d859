// * Keyword Filter
// * Narrows raw Search Console rows to the striking-distance candidate set
// * before any crawl work is spent on them.
// *
// * A row is dropped when:
// * 1. Its URL carries a query string or fragment marker (?, =, #).
// * 2. Its URL exactly equals an excluded URL (no prefix matching).
// * 3. Its normalized keyword contains a normalized branded term.
// * 4. Its position falls outside the inclusive range, or is missing
// *    and missing positions are not retained.
// * 5. It has fewer clicks than the configured minimum.
// *
// * Surviving rows keep their relative order.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use super::normalization::{clean_url, normalize_text};
use crate::config::{DuplicatePolicy, FilterConfig};
use crate::schema::PerformanceRow;

// * Characters that mark a parameterized URL
const PARAMETER_MARKERS: [char; 3] = ['?', '=', '#'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Parameterized,
    Excluded,
    Branded,
    OutOfRange,
    MissingPosition,
    BelowMinClicks,
}

/// Per-reason counts of dropped rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    pub parameterized: usize,
    pub excluded: usize,
    pub branded: usize,
    pub out_of_range: usize,
    pub missing_position: usize,
    pub below_min_clicks: usize,
}

impl DropCounts {
    fn record(&mut self, reason: DropReason) {
        match reason {
            DropReason::Parameterized => self.parameterized += 1,
            DropReason::Excluded => self.excluded += 1,
            DropReason::Branded => self.branded += 1,
            DropReason::OutOfRange => self.out_of_range += 1,
            DropReason::MissingPosition => self.missing_position += 1,
            DropReason::BelowMinClicks => self.below_min_clicks += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.parameterized
            + self.excluded
            + self.branded
            + self.out_of_range
            + self.missing_position
            + self.below_min_clicks
    }
}

/// Result of running the filter over a row set
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub rows: Vec<PerformanceRow>,
    pub dropped: DropCounts,
    /// Rows folded into an earlier (url, keyword) duplicate
    pub merged_duplicates: usize,
}

/// Striking-distance filter built once from configuration
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    branded_terms: Vec<String>,
    excluded_urls: HashSet<String>,
    position_range: (f64, f64),
    retain_missing_position: bool,
    min_clicks: u64,
    duplicate_policy: DuplicatePolicy,
}

impl KeywordFilter {
    pub fn new(
        branded_terms: &[String],
        excluded_urls: &[String],
        position_range: (f64, f64),
    ) -> Self {
        let branded_terms = branded_terms
            .iter()
            .map(|t| normalize_text(t))
            // * An empty term would match every keyword
            .filter(|t| !t.is_empty())
            .collect();

        let excluded_urls = excluded_urls
            .iter()
            .map(|u| clean_url(u))
            .filter(|u| !u.is_empty())
            .collect();

        Self {
            branded_terms,
            excluded_urls,
            position_range,
            retain_missing_position: false,
            min_clicks: 0,
            duplicate_policy: DuplicatePolicy::Sum,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            &config.branded_terms,
            &config.excluded_urls,
            config.position_range(),
        )
        .retain_missing_position(config.retain_missing_position)
        .min_clicks(config.min_clicks)
        .duplicate_policy(config.duplicate_policy)
    }

    pub fn retain_missing_position(mut self, retain: bool) -> Self {
        self.retain_missing_position = retain;
        self
    }

    pub fn min_clicks(mut self, min_clicks: u64) -> Self {
        self.min_clicks = min_clicks;
        self
    }

    pub fn duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Returns why a row would be dropped, or None when it survives
    pub fn drop_reason(&self, row: &PerformanceRow) -> Option<DropReason> {
        if has_parameters(&row.url) {
            return Some(DropReason::Parameterized);
        }

        if self.excluded_urls.contains(clean_url(&row.url).as_str()) {
            return Some(DropReason::Excluded);
        }

        if self.is_branded(&row.keyword) {
            return Some(DropReason::Branded);
        }

        match row.position {
            Some(position) => {
                let (min, max) = self.position_range;
                if position < min || position > max {
                    return Some(DropReason::OutOfRange);
                }
            }
            None if !self.retain_missing_position => return Some(DropReason::MissingPosition),
            None => {}
        }

        if row.clicks < self.min_clicks {
            return Some(DropReason::BelowMinClicks);
        }

        None
    }

    pub fn is_branded(&self, keyword: &str) -> bool {
        if self.branded_terms.is_empty() {
            return false;
        }
        let keyword = normalize_text(keyword);
        self.branded_terms.iter().any(|term| keyword.contains(term.as_str()))
    }

    /// Merges duplicates, then drops every row that fails a rule
    pub fn apply(&self, rows: &[PerformanceRow]) -> FilterOutcome {
        let (merged, merged_duplicates) = merge_duplicates(rows, self.duplicate_policy);
        let mut outcome = FilterOutcome {
            merged_duplicates,
            ..Default::default()
        };

        for row in merged {
            match self.drop_reason(&row) {
                Some(reason) => outcome.dropped.record(reason),
                None => outcome.rows.push(row),
            }
        }

        debug!(
            kept = outcome.rows.len(),
            dropped = outcome.dropped.total(),
            merged = merged_duplicates,
            "Keyword filter applied"
        );

        outcome
    }
}

// * Plain filter over the input sequence: missing positions dropped,
// * no click threshold, duplicates left as they are.
pub fn filter(
    rows: &[PerformanceRow],
    branded_terms: &[String],
    excluded_urls: &[String],
    position_range: (f64, f64),
) -> Vec<PerformanceRow> {
    let filter = KeywordFilter::new(branded_terms, excluded_urls, position_range);
    rows.iter()
        .filter(|row| filter.drop_reason(row).is_none())
        .cloned()
        .collect()
}

pub fn has_parameters(url: &str) -> bool {
    url.contains(PARAMETER_MARKERS)
}

// * Collapses repeated (url, keyword) pairs, keeping first-occurrence order.
// * Sum: clicks and impressions add up, the last seen position wins and
// * CTR is recomputed when impressions are known.
// * KeepFirst: later occurrences are discarded.
pub fn merge_duplicates(
    rows: &[PerformanceRow],
    policy: DuplicatePolicy,
) -> (Vec<PerformanceRow>, usize) {
    let mut merged: Vec<PerformanceRow> = Vec::with_capacity(rows.len());
    let mut index: HashMap<(String, String), usize> = HashMap::with_capacity(rows.len());
    let mut duplicates = 0;

    for row in rows {
        let key = (row.url.clone(), row.keyword.clone());
        let Some(&slot) = index.get(&key) else {
            index.insert(key, merged.len());
            merged.push(row.clone());
            continue;
        };

        duplicates += 1;
        if policy == DuplicatePolicy::KeepFirst {
            continue;
        }

        let existing = &mut merged[slot];
        existing.clicks = existing.clicks.saturating_add(row.clicks);
        existing.impressions = match (existing.impressions, row.impressions) {
            (Some(a), Some(b)) => Some(a.saturating_add(b)),
            (a, b) => a.or(b),
        };
        if row.position.is_some() {
            existing.position = row.position;
        }
        existing.ctr = match existing.impressions {
            Some(impressions) if impressions > 0 => {
                Some(existing.clicks as f64 / impressions as f64)
            }
            _ => row.ctr.or(existing.ctr),
        };
    }

    (merged, duplicates)
}
