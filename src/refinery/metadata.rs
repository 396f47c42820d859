// * SEO field extraction: <title>, meta description, H1s and H2s
// * Headings come from the whole document, including site chrome, since
// * that is what search engines see.

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// * Precompiled selectors for field extraction
static SELECTOR_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").unwrap());
static SELECTOR_META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[name]").unwrap());
static SELECTOR_H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static SELECTOR_H2: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h2").unwrap());

/// On-page SEO fields of one document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeoFields {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    /// In document order, empty headings skipped
    pub h1: Vec<String>,
    pub h2: Vec<String>,
}

impl SeoFields {
    /// Checks if any field was found at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.meta_description.is_none()
            && self.h1.is_empty()
            && self.h2.is_empty()
    }
}

/// Extracts SEO fields from parsed HTML
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract(html: &str) -> SeoFields {
        Self::extract_from_document(&Html::parse_document(html))
    }

    pub fn extract_from_document(document: &Html) -> SeoFields {
        SeoFields {
            title: document
                .select(&SELECTOR_TITLE)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty()),
            meta_description: Self::meta_description(document),
            h1: Self::headings(document, &SELECTOR_H1),
            h2: Self::headings(document, &SELECTOR_H2),
        }
    }

    fn meta_description(document: &Html) -> Option<String> {
        document
            .select(&SELECTOR_META)
            .find(|meta| {
                meta.value()
                    .attr("name")
                    .is_some_and(|name| name.trim().eq_ignore_ascii_case("description"))
            })
            .and_then(|meta| meta.value().attr("content"))
            .map(collapse_whitespace)
            .filter(|content| !content.is_empty())
    }

    fn headings(document: &Html, selector: &Selector) -> Vec<String> {
        document
            .select(selector)
            .map(element_text)
            .filter(|t| !t.is_empty())
            .collect()
    }
}

// * Text of an element with whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
