// * The Refinery: HTML to SEO fields
// * One parse per page; metadata comes from the full document, body text
// * from the boilerplate-free <body>.

pub mod content_cleaner;
pub mod metadata;

// * Re-exports for convenient access
pub use content_cleaner::{extract_content, extract_text, CleanedContent, CleanerConfig, ContentCleaner};
pub use metadata::{collapse_whitespace, MetadataExtractor, SeoFields};

use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::schema::ExtractedPage;

/// Unified result from the refinery pipeline
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RefinedPage {
    pub fields: SeoFields,
    pub content: CleanedContent,
}

impl RefinedPage {
    /// Packs the refined fields into a successful extraction record
    pub fn into_page(self, url: impl Into<String>) -> ExtractedPage {
        ExtractedPage::success(url)
            .with_h1(self.fields.h1)
            .with_h2(self.fields.h2)
            .with_body(self.content.text)
            .with_optional_fields(self.fields.title, self.fields.meta_description)
    }

    /// Converts result to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// The refinery pipeline for one HTML document
///
/// # Example
/// ```ignore
/// use striking_distance::refinery::Refinery;
///
/// let refinery = Refinery::new();
/// let page = refinery.process(html).into_page("https://example.com/a");
/// println!("Title: {:?}", page.title);
/// ```
pub struct Refinery {
    cleaner: ContentCleaner,
}

impl Refinery {
    /// Creates a new refinery with default configuration
    pub fn new() -> Self {
        Self {
            cleaner: ContentCleaner::new(),
        }
    }

    /// Creates a new refinery with a custom cleaner configuration
    pub fn with_config(config: CleanerConfig) -> Self {
        Self {
            cleaner: ContentCleaner::with_config(config),
        }
    }

    /// Body text truncated to `max_chars` when set
    pub fn with_max_body_chars(max_chars: Option<usize>) -> Self {
        Self::with_config(CleanerConfig {
            max_chars,
            ..Default::default()
        })
    }

    pub fn process(&self, html: &str) -> RefinedPage {
        let document = Html::parse_document(html);
        RefinedPage {
            fields: MetadataExtractor::extract_from_document(&document),
            content: self.cleaner.clean_document(&document),
        }
    }
}

impl Default for Refinery {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to process HTML with default settings
pub fn process_html(html: &str) -> RefinedPage {
    Refinery::new().process(html)
}
