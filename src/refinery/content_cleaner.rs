// * Boilerplate removal for body text
// * Walks the <body> tree and skips navigation, header, footer, sidebar,
// * ad and overlay subtrees before collecting visible text.

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static SELECTOR_BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

// * Tags whose whole subtree is boilerplate or invisible
const EXCLUDED_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "iframe", "svg", "form",
    "template",
];

// * Exact class names and ids marking boilerplate containers
const EXCLUDED_NAMES: &[&str] = &[
    "nav",
    "navigation",
    "menu",
    "sidebar",
    "footer",
    "header",
    "advertisement",
    "ad",
    "social",
    "share",
    "comment",
    "related-posts",
    "widget",
    "popup",
    "modal",
    "overlay",
];

// * Inline tags: their text joins the surrounding words without a break
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "s", "samp", "small", "span", "strong", "sub", "sup", "time", "u", "var", "label",
];

/// Configuration for content cleaning
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Tags dropped with their subtree
    pub excluded_tags: Vec<String>,
    /// Class names and ids dropped with their subtree
    pub excluded_names: Vec<String>,
    /// Skip elements marked hidden or aria-hidden
    pub skip_hidden: bool,
    /// Truncate the collected text to this many characters
    pub max_chars: Option<usize>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            excluded_tags: EXCLUDED_TAGS.iter().map(|s| s.to_string()).collect(),
            excluded_names: EXCLUDED_NAMES.iter().map(|s| s.to_string()).collect(),
            skip_hidden: true,
            max_chars: None,
        }
    }
}

/// Result of content extraction
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CleanedContent {
    /// Visible main text, whitespace collapsed
    pub text: String,
    pub word_count: usize,
    /// Number of subtrees dropped as boilerplate
    pub removed_blocks: usize,
    pub truncated: bool,
}

/// Extracts and cleans body text from HTML
pub struct ContentCleaner {
    config: CleanerConfig,
}

impl ContentCleaner {
    /// Creates a new cleaner with default configuration
    pub fn new() -> Self {
        Self {
            config: CleanerConfig::default(),
        }
    }

    /// Creates a new cleaner with custom configuration
    pub fn with_config(config: CleanerConfig) -> Self {
        Self { config }
    }

    pub fn clean(&self, html: &str) -> CleanedContent {
        self.clean_document(&Html::parse_document(html))
    }

    pub fn clean_document(&self, document: &Html) -> CleanedContent {
        let root = document
            .select(&SELECTOR_BODY)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut raw = String::new();
        let mut removed_blocks = 0;
        self.collect_text(root, &mut raw, &mut removed_blocks);

        let mut text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut truncated = false;
        if let Some(limit) = self.config.max_chars {
            if let Some((byte_idx, _)) = text.char_indices().nth(limit) {
                text.truncate(byte_idx);
                truncated = true;
            }
        }

        CleanedContent {
            word_count: text.split_whitespace().count(),
            text,
            removed_blocks,
            truncated,
        }
    }

    fn collect_text(&self, element: ElementRef<'_>, out: &mut String, removed: &mut usize) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                let value = child_element.value();
                if self.is_excluded(value) {
                    *removed += 1;
                    continue;
                }

                let inline = INLINE_TAGS.contains(&value.name());
                if !inline {
                    out.push(' ');
                }
                self.collect_text(child_element, out, removed);
                if !inline {
                    out.push(' ');
                }
            } else if let Some(text) = child.value().as_text() {
                out.push_str(text);
            }
        }
    }

    fn is_excluded(&self, element: &Element) -> bool {
        let name = element.name();
        if self.config.excluded_tags.iter().any(|t| t == name) {
            return true;
        }

        if self.config.skip_hidden
            && (element.attr("hidden").is_some()
                || element.attr("aria-hidden").is_some_and(|v| v.eq_ignore_ascii_case("true")))
        {
            return true;
        }

        if element
            .attr("role")
            .is_some_and(|role| matches!(role, "navigation" | "banner" | "contentinfo"))
        {
            return true;
        }

        let named = |candidate: &str| {
            self.config
                .excluded_names
                .iter()
                .any(|n| n.eq_ignore_ascii_case(candidate))
        };

        element.id().is_some_and(named) || element.classes().any(named)
    }

    /// Extracts just the text content (simplified API)
    pub fn extract_text(&self, html: &str) -> String {
        self.clean(html).text
    }
}

impl Default for ContentCleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Utility function for quick content extraction with defaults
pub fn extract_content(html: &str) -> CleanedContent {
    ContentCleaner::new().clean(html)
}

/// Utility function for quick text extraction
pub fn extract_text(html: &str) -> String {
    ContentCleaner::new().extract_text(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boilerplate_tags_removed() {
        let html = r#"
            <html>
            <body>
                <nav><a href="/">Home</a><a href="/about">About</a></nav>
                <header>Site banner</header>
                <article>
                    <h1>Main Article Title</h1>
                    <p>Find the best running shoes here.</p>
                </article>
                <aside>Sidebar links</aside>
                <footer>Copyright 2024 Example Site. All rights reserved.</footer>
                <script>var tracking = "running shoes";</script>
            </body>
            </html>
        "#;

        let result = extract_content(html);

        assert_eq!(result.text, "Main Article Title Find the best running shoes here.");
        assert!(!result.text.contains("Copyright"));
        assert!(!result.text.contains("tracking"));
        assert_eq!(result.removed_blocks, 5);
    }

    #[test]
    fn test_class_and_id_exclusion() {
        let html = r#"
            <html>
            <body>
                <div class="content">
                    <p>This is legitimate article content.</p>
                    <div class="widget newsletter">Subscribe to our newsletter!</div>
                    <div id="comment">Great post!</div>
                    <div class="advertising-banner">Kept: not an exact class match</div>
                </div>
            </body>
            </html>
        "#;

        let text = extract_text(html);

        assert!(text.contains("legitimate article content"));
        assert!(!text.contains("Subscribe"));
        assert!(!text.contains("Great post"));
        assert!(text.contains("Kept"));
    }

    #[test]
    fn test_inline_tags_do_not_split_words() {
        let html = "<html><body><p>run<b>ning</b> shoes</p><p>second</p></body></html>";
        assert_eq!(extract_text(html), "running shoes second");
    }

    #[test]
    fn test_hidden_and_role_exclusion() {
        let html = r#"
            <html><body>
                <div hidden>secret</div>
                <div aria-hidden="true">decor</div>
                <div role="navigation">menu links</div>
                <p>visible</p>
            </body></html>
        "#;
        assert_eq!(extract_text(html), "visible");
    }

    #[test]
    fn test_truncation_on_char_boundary() {
        let config = CleanerConfig {
            max_chars: Some(5),
            ..Default::default()
        };
        let cleaner = ContentCleaner::with_config(config);

        let result = cleaner.clean("<html><body><p>héllo wörld</p></body></html>");
        assert_eq!(result.text, "héllo");
        assert!(result.truncated);
        assert_eq!(result.word_count, 1);
    }

    #[test]
    fn test_empty_body() {
        let result = extract_content("<html><body></body></html>");
        assert!(result.text.is_empty());
        assert_eq!(result.word_count, 0);
    }
}
