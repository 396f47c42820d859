// * Core records flowing through one analysis run
// * PerformanceRow is read-only input; ExtractedPage is created once per
// * distinct URL and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// One Search Console observation for a (landing page, query) pair
///
/// # Fields
/// - `url`: Landing page, cleaned (trimmed, no trailing slash)
/// - `keyword`: Search query as exported
/// - `clicks`: Clicks in the export window
/// - `impressions`: Optional, passed through
/// - `position`: Optional average ranking position (> 0)
/// - `ctr`: Optional click-through rate in [0, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRow {
    pub url: String,
    pub keyword: String,
    pub clicks: u64,
    pub impressions: Option<u64>,
    pub position: Option<f64>,
    pub ctr: Option<f64>,
}

impl PerformanceRow {
    /// Creates a row with the required fields and a position
    pub fn new(url: impl Into<String>, keyword: impl Into<String>, clicks: u64, position: f64) -> Self {
        Self {
            url: url.into(),
            keyword: keyword.into(),
            clicks,
            impressions: None,
            position: Some(position),
            ctr: None,
        }
    }

    /// Same row without a position value
    pub fn without_position(mut self) -> Self {
        self.position = None;
        self
    }

    pub fn with_impressions(mut self, impressions: u64) -> Self {
        self.impressions = Some(impressions);
        self
    }
}

/// Terminal outcome of one extraction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Success,
    Failure,
}

/// SEO-relevant fields isolated from one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub body_text: String,
    pub status: ExtractionStatus,
    pub error: Option<String>,
}

impl ExtractedPage {
    /// Successful extraction with no fields filled in yet
    pub fn success(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            meta_description: None,
            h1: Vec::new(),
            h2: Vec::new(),
            body_text: String::new(),
            status: ExtractionStatus::Success,
            error: None,
        }
    }

    /// Failed extraction; every field is empty
    pub fn failure(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Failure,
            error: Some(reason.into()),
            ..Self::success(url)
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_meta_description(mut self, description: impl Into<String>) -> Self {
        self.meta_description = Some(description.into());
        self
    }

    // * Fields that may be absent on the page
    pub fn with_optional_fields(
        mut self,
        title: Option<String>,
        meta_description: Option<String>,
    ) -> Self {
        self.title = title;
        self.meta_description = meta_description;
        self
    }

    pub fn with_h1(mut self, h1: Vec<String>) -> Self {
        self.h1 = h1;
        self
    }

    pub fn with_h2(mut self, h2: Vec<String>) -> Self {
        self.h2 = h2;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body_text = body.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }

    /// Converts to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// One entry of the failure log surfaced to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFailure {
    pub url: String,
    pub reason: String,
}
