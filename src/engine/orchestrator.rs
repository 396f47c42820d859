// * Orchestrator
// * Drives one analysis run: filter, one extraction per distinct URL in
// * bounded batches, then the report. Individual URL failures never abort
// * the run; they end up in the failure log and as all-false entries.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use super::filter::{DropCounts, KeywordFilter};
use crate::config::{AnalysisConfig, ConfigurationError};
use crate::extractor::FieldExtractor;
use crate::ingest::InputFormatError;
use crate::ops::telemetry::{self, RunStats};
use crate::report::{MissingExtractionError, Report, ReportBuilder};
use crate::schema::{ExtractedPage, ExtractionFailure, PerformanceRow};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Input(#[from] InputFormatError),

    #[error("internal error: {0}")]
    MissingExtraction(#[from] MissingExtractionError),

    #[error("run cancelled after {completed} of {total} URLs")]
    Cancelled { completed: usize, total: usize },
}

/// Shared flag the caller sets to stop a run between batches
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Emitted once per resolved URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub completed: usize,
    pub total: usize,
    pub url: String,
    pub success: bool,
}

/// Counts describing one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisStats {
    pub input_rows: usize,
    pub merged_duplicates: usize,
    pub filtered_rows: usize,
    pub dropped: DropCounts,
    pub distinct_urls: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub report: Report,
    /// One entry per URL whose extraction failed, in processing order
    pub failures: Vec<ExtractionFailure>,
    pub stats: AnalysisStats,
}

pub struct Orchestrator {
    config: AnalysisConfig,
    extractor: Arc<dyn FieldExtractor>,
    cancel: CancellationFlag,
    progress: Option<UnboundedSender<ProgressEvent>>,
}

impl Orchestrator {
    pub fn new(config: AnalysisConfig, extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            config,
            extractor,
            cancel: CancellationFlag::new(),
            progress: None,
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    pub fn with_progress(mut self, sender: UnboundedSender<ProgressEvent>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn cancellation_flag(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the whole pipeline over raw export rows
    pub async fn run(&self, rows: &[PerformanceRow]) -> Result<AnalysisOutcome, AnalysisError> {
        self.config.validate()?;

        let filtered = KeywordFilter::from_config(&self.config.filter).apply(rows);
        record_drops(&filtered.dropped);

        let urls = distinct_urls(&filtered.rows);
        let mut stats = AnalysisStats {
            input_rows: rows.len(),
            merged_duplicates: filtered.merged_duplicates,
            filtered_rows: filtered.rows.len(),
            dropped: filtered.dropped,
            distinct_urls: urls.len(),
            ..Default::default()
        };

        info!(
            input_rows = stats.input_rows,
            kept = stats.filtered_rows,
            urls = stats.distinct_urls,
            "Striking-distance rows selected"
        );

        let pages = self.extract_all(&urls).await?;

        let failures: Vec<ExtractionFailure> = pages
            .iter()
            .filter(|page| !page.is_success())
            .map(|page| ExtractionFailure {
                url: page.url.clone(),
                reason: page.error.clone().unwrap_or_default(),
            })
            .collect();
        stats.failed = failures.len();
        stats.succeeded = pages.len() - failures.len();

        let report = ReportBuilder::new(self.config.report.top_n).build(&filtered.rows, &pages)?;
        telemetry::record_report_rows(report.entries.len());

        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            entries = report.entries.len(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            report,
            failures,
            stats,
        })
    }

    // * One attempt per URL, at most batch_size in flight. Cancellation is
    // * honoured only between batches.
    async fn extract_all(&self, urls: &[String]) -> Result<Vec<ExtractedPage>, AnalysisError> {
        let total = urls.len();
        let run_stats = RunStats::new();
        let mut pages = Vec::with_capacity(total);

        for batch in urls.chunks(self.config.orchestrator.batch_size) {
            if self.cancel.is_cancelled() {
                warn!(completed = pages.len(), total, "Run cancelled");
                return Err(AnalysisError::Cancelled {
                    completed: pages.len(),
                    total,
                });
            }

            let results = join_all(batch.iter().map(|url| self.extractor.extract(url))).await;

            for page in results {
                if page.is_success() {
                    run_stats.record_success();
                } else {
                    run_stats.record_failure();
                }
                pages.push(page);

                if let (Some(tx), Some(page)) = (&self.progress, pages.last()) {
                    // * A dropped receiver only means nobody is watching
                    let _ = tx.send(ProgressEvent {
                        completed: pages.len(),
                        total,
                        url: page.url.clone(),
                        success: page.is_success(),
                    });
                }
            }

            info!(
                completed = run_stats.completed(),
                total,
                success_rate = run_stats.success_rate(),
                "Batch finished"
            );
        }

        Ok(pages)
    }
}

// * Distinct URLs in first-seen order
pub fn distinct_urls(rows: &[PerformanceRow]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| seen.insert(row.url.as_str()))
        .map(|row| row.url.clone())
        .collect()
}

fn record_drops(dropped: &DropCounts) {
    telemetry::record_rows_filtered("parameterized", dropped.parameterized);
    telemetry::record_rows_filtered("excluded", dropped.excluded);
    telemetry::record_rows_filtered("branded", dropped.branded);
    telemetry::record_rows_filtered("out_of_range", dropped.out_of_range);
    telemetry::record_rows_filtered("missing_position", dropped.missing_position);
    telemetry::record_rows_filtered("below_min_clicks", dropped.below_min_clicks);
}
