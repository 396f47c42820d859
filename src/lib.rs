// * Striking Distance
// * Cross-references Search Console keyword rows with the title, meta
// * description, headings and body of each landing page, and reports the
// * keywords ranking in positions 4-20 that the page does not mention.

pub mod config;
pub mod engine;
pub mod extractor;
pub mod ingest;
pub mod network;
pub mod ops;
pub mod refinery;
pub mod report;
pub mod schema;

pub use config::{AnalysisConfig, ConfigurationError};
pub use engine::matcher::contains;
pub use engine::normalization::normalize_text;
pub use engine::orchestrator::{
    AnalysisError, AnalysisOutcome, AnalysisStats, CancellationFlag, Orchestrator, ProgressEvent,
};
pub use extractor::{build_extractor, FieldExtractor, PageExtractor, PageSource};
pub use report::{Report, StrikingDistanceEntry, UrlSummary};
pub use schema::{ExtractedPage, ExtractionFailure, ExtractionStatus, PerformanceRow};
