// * Analysis configuration
// * One immutable object handed to the orchestrator at call time.
// * Every section defaults sensibly so a partial TOML file is enough.

pub mod constants;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_MAX_POSITION, DEFAULT_MAX_WAIT_SECONDS, DEFAULT_MIN_POSITION,
    DEFAULT_TOP_N, DEFAULT_USER_AGENT,
};

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid position range: min_position {min} is greater than max_position {max}")]
    InvalidPositionRange { min: u32, max: u32 },

    #[error("top_n must be greater than zero")]
    NonPositiveTopN,

    #[error("max_wait_seconds must be greater than zero")]
    NonPositiveTimeout,

    #[error("batch_size must be greater than zero")]
    NonPositiveBatchSize,

    #[error("invalid site_root {0:?}: expected an absolute http(s) URL")]
    InvalidSiteRoot(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// What to do when the same (url, keyword) pair appears more than once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Sum clicks and impressions, keep the last seen position
    #[default]
    Sum,
    /// Keep the first occurrence, discard the rest
    KeepFirst,
}

/// Rules applied to raw Search Console rows before any crawl work
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Keywords containing any of these (after normalization) are dropped
    pub branded_terms: Vec<String>,
    /// URLs removed by exact string equality
    pub excluded_urls: Vec<String>,
    /// Inclusive lower bound of the striking-distance range
    pub min_position: u32,
    /// Inclusive upper bound of the striking-distance range
    pub max_position: u32,
    /// Keep rows that carry no position value
    pub retain_missing_position: bool,
    /// Rows with fewer clicks are dropped
    pub min_clicks: u64,
    pub duplicate_policy: DuplicatePolicy,
}

impl FilterConfig {
    /// Inclusive position bounds as floats for comparison with GSC averages
    pub fn position_range(&self) -> (f64, f64) {
        (self.min_position as f64, self.max_position as f64)
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            branded_terms: Vec::new(),
            excluded_urls: Vec::new(),
            min_position: DEFAULT_MIN_POSITION,
            max_position: DEFAULT_MAX_POSITION,
            retain_missing_position: false,
            min_clicks: 0,
            duplicate_policy: DuplicatePolicy::Sum,
        }
    }
}

/// Report shaping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Keywords listed per URL, ranked by clicks
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Which engine fetches page HTML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FetchBackend {
    /// Headless Chromium, renders JavaScript
    #[default]
    Browser,
    /// Plain HTTP GET, no rendering
    Http,
}

impl FetchBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchBackend::Browser => "browser",
            FetchBackend::Http => "http",
        }
    }
}

/// Settings for the field extractor adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Reuse earlier successful extractions of the same URL
    pub use_cache: bool,
    /// Run the browser without a window
    pub headless: bool,
    /// Budget for one page load
    pub max_wait_seconds: u64,
    pub backend: FetchBackend,
    /// Persist successful extractions across runs
    pub cache_dir: Option<PathBuf>,
    /// Base URL for resolving path-only URLs from the export
    pub site_root: Option<String>,
    /// Truncate body text to this many characters
    pub max_body_chars: Option<usize>,
    pub user_agent: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            headless: true,
            max_wait_seconds: DEFAULT_MAX_WAIT_SECONDS,
            backend: FetchBackend::Browser,
            cache_dir: None,
            site_root: None,
            max_body_chars: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Orchestrator scheduling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Maximum extraction calls in flight per batch
    pub batch_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Full configuration for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub filter: FilterConfig,
    pub report: ReportConfig,
    pub extraction: ExtractionConfig,
    pub orchestrator: OrchestratorConfig,
}

impl AnalysisConfig {
    /// Loads configuration from a TOML file and validates it
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text and validates it
    pub fn from_toml(content: &str) -> Result<Self, ConfigurationError> {
        let config: AnalysisConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would make a run meaningless
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.filter.min_position > self.filter.max_position {
            return Err(ConfigurationError::InvalidPositionRange {
                min: self.filter.min_position,
                max: self.filter.max_position,
            });
        }
        if self.report.top_n == 0 {
            return Err(ConfigurationError::NonPositiveTopN);
        }
        if self.extraction.max_wait_seconds == 0 {
            return Err(ConfigurationError::NonPositiveTimeout);
        }
        if self.orchestrator.batch_size == 0 {
            return Err(ConfigurationError::NonPositiveBatchSize);
        }
        if let Some(root) = &self.extraction.site_root {
            match url::Url::parse(root) {
                Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
                _ => return Err(ConfigurationError::InvalidSiteRoot(root.clone())),
            }
        }
        Ok(())
    }
}

/// Splits raw multi-line input into entries, one per line.
/// Lines are trimmed and blank lines ignored.
pub fn parse_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
