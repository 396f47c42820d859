// * Telemetry: JSON logging and Prometheus run counters
// * Metrics are rendered once at the end of a run (textfile-collector
// * style); there is no metrics HTTP endpoint.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    // * Extraction attempts by outcome: success, failure, cache_hit
    pub static ref PAGES_EXTRACTED_TOTAL: CounterVec = register_counter_vec!(
        "sd_pages_extracted_total",
        "Total extraction attempts by outcome",
        &["outcome"]
    ).unwrap();

    // * Wall time of one extraction, per fetch backend
    pub static ref EXTRACTION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "sd_extraction_duration_seconds",
        "Extraction duration in seconds",
        &["backend"],
        vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    ).unwrap();

    // * Rows dropped before extraction, by reason
    pub static ref ROWS_FILTERED_TOTAL: CounterVec = register_counter_vec!(
        "sd_rows_filtered_total",
        "Input rows dropped by the keyword filter, by reason",
        &["reason"]
    ).unwrap();

    // * Keyword rows written to the report
    pub static ref REPORT_ROWS_TOTAL: IntCounter = register_int_counter!(
        "sd_report_rows_total",
        "Keyword entries produced by the report builder"
    ).unwrap();
}

/// Initializes the tracing subscriber with JSON formatting
///
/// Logs go to stderr so the report can be streamed to stdout.
///
/// # Example
/// ```ignore
/// use striking_distance::ops::telemetry;
///
/// telemetry::init_tracing();
/// tracing::info!(url = "https://example.com", "Extracting page");
/// ```
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initializes tracing with custom log level
pub fn init_tracing_with_level(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

/// Initializes tracing with pretty formatting (for terminals)
pub fn init_tracing_pretty(level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().pretty().with_writer(std::io::stderr))
        .init();
}

/// Returns the current metrics in the Prometheus text format
pub fn get_metrics_string() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Writes the current metrics to a file for a textfile collector
pub fn write_metrics_file(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, get_metrics_string())
}

pub fn record_extraction_success() {
    PAGES_EXTRACTED_TOTAL.with_label_values(&["success"]).inc();
}

pub fn record_extraction_failure() {
    PAGES_EXTRACTED_TOTAL.with_label_values(&["failure"]).inc();
}

pub fn record_cache_hit() {
    PAGES_EXTRACTED_TOTAL.with_label_values(&["cache_hit"]).inc();
}

pub fn record_extraction_duration(backend: &str, seconds: f64) {
    EXTRACTION_DURATION_SECONDS
        .with_label_values(&[backend])
        .observe(seconds);
}

pub fn record_rows_filtered(reason: &str, count: usize) {
    if count > 0 {
        ROWS_FILTERED_TOTAL
            .with_label_values(&[reason])
            .inc_by(count as f64);
    }
}

pub fn record_report_rows(count: usize) {
    REPORT_ROWS_TOTAL.inc_by(count as u64);
}

/// Per-run extraction counters
#[derive(Debug, Default)]
pub struct RunStats {
    success_count: AtomicU64,
    failure_count: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn successes(&self) -> u64 {
        self.success_count.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn completed(&self) -> u64 {
        self.successes() + self.failures()
    }

    /// Ratio of successful extractions; 1.0 before any attempt
    pub fn success_rate(&self) -> f64 {
        let success = self.successes() as f64;
        let total = self.completed() as f64;
        if total > 0.0 {
            success / total
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_string_contains_recorded_counters() {
        record_extraction_success();
        record_cache_hit();
        record_report_rows(3);

        let metrics = get_metrics_string();
        assert!(metrics.contains("sd_pages_extracted_total"));
        assert!(metrics.contains("sd_report_rows_total"));
    }

    #[test]
    fn test_zero_filtered_rows_not_recorded() {
        record_rows_filtered("test_zero_reason", 0);
        assert!(!get_metrics_string().contains("test_zero_reason"));
    }

    #[test]
    fn test_write_metrics_file() {
        record_extraction_failure();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.prom");

        write_metrics_file(&path).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("sd_pages_extracted_total"));
    }

    #[test]
    fn test_run_stats() {
        let stats = RunStats::new();

        stats.record_success();
        stats.record_success();
        stats.record_failure();

        assert_eq!(stats.completed(), 3);
        assert!((stats.success_rate() - 0.666666).abs() < 0.01);
    }

    #[test]
    fn test_run_stats_empty() {
        let stats = RunStats::new();
        assert!((stats.success_rate() - 1.0).abs() < f64::EPSILON);
    }
}
