// * Configuration Constants
// * Central location for all default thresholds and limits

// * Inclusive striking-distance position range
pub const DEFAULT_MIN_POSITION: u32 = 4;
pub const DEFAULT_MAX_POSITION: u32 = 20;

// * Keywords shown per URL in the report
pub const DEFAULT_TOP_N: usize = 10;

// * Maximum number of extraction calls in flight at once
pub const DEFAULT_BATCH_SIZE: usize = 10;

// * Page load budget for one extraction call, in seconds
pub const DEFAULT_MAX_WAIT_SECONDS: u64 = 30;

// * Slack on top of the page load budget before an extraction call is abandoned
pub const EXTRACTION_GRACE_SECONDS: u64 = 5;

// * Upper bound on closing a browser tab
pub const BROWSER_CLOSE_TIMEOUT_SECS: u64 = 2;

// * Pause after navigation so late scripts can settle the DOM
pub const BROWSER_SETTLE_MS: u64 = 500;

// * Identifies the analyzer to target sites
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; StrikingDistanceBot/0.1; +https://github.com/striking-distance)";
