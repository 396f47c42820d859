use thiserror::Error;

// * Unified error type for page fetching; surfaced to callers as the
// * failure reason of one URL, never as a run-level error.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Challenge page detected: {0}")]
    SoftBan(String),

    #[error("Empty response body")]
    EmptyResponse,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Browser error: {0}")]
    Browser(String),
}
