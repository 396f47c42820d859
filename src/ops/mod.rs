// * Operations: structured logging and run metrics

pub mod telemetry;

// * Re-exports for convenient access
pub use telemetry::{
    get_metrics_string, init_tracing, init_tracing_pretty, init_tracing_with_level,
    record_cache_hit, record_extraction_duration, record_extraction_failure,
    record_extraction_success, record_report_rows, record_rows_filtered, write_metrics_file,
    RunStats,
};
