// * Field Extractor Adapter
// * Given a URL from the export, produces an ExtractedPage. Every failure
// * (bad URL, network error, non-2xx, timeout, render failure) is turned
// * into a Failure page here and never escapes this boundary.

pub mod browser;
pub mod cache;

pub use browser::BrowserSource;
pub use cache::{cache_key, ExtractionCache};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::constants::EXTRACTION_GRACE_SECONDS;
use crate::config::{ExtractionConfig, FetchBackend};
use crate::engine::normalization::resolve_url;
use crate::network::{FetchError, HttpSource};
use crate::ops::telemetry;
use crate::refinery::Refinery;
use crate::schema::ExtractedPage;

/// Type alias for boxed async results
pub type AsyncResult<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for backends that turn an absolute URL into page HTML
pub trait PageSource: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> AsyncResult<'a, Result<String, FetchError>>;

    /// Label used in cache keys and metrics
    fn backend_name(&self) -> &'static str;

    /// Releases backend resources at the end of a run
    fn shutdown<'a>(&'a self) -> AsyncResult<'a, ()> {
        Box::pin(async {})
    }
}

/// Trait for the adapter the orchestrator drives, one call per distinct URL
pub trait FieldExtractor: Send + Sync {
    /// Never fails: problems come back as a Failure page
    fn extract<'a>(&'a self, url: &'a str) -> AsyncResult<'a, ExtractedPage>;

    fn shutdown<'a>(&'a self) -> AsyncResult<'a, ()> {
        Box::pin(async {})
    }
}

impl PageSource for HttpSource {
    fn fetch<'a>(&'a self, url: &'a str) -> AsyncResult<'a, Result<String, FetchError>> {
        Box::pin(HttpSource::fetch(self, url))
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}

/// Adapter combining a page source, the refinery and the cache
pub struct PageExtractor<S: PageSource> {
    source: S,
    refinery: Refinery,
    cache: Option<ExtractionCache>,
    site_root: Option<String>,
    max_wait_seconds: u64,
}

impl<S: PageSource> PageExtractor<S> {
    pub fn new(source: S, config: &ExtractionConfig) -> Self {
        Self {
            source,
            refinery: Refinery::with_max_body_chars(config.max_body_chars),
            cache: config.use_cache.then(|| ExtractionCache::from_config(config)),
            site_root: config.site_root.clone(),
            max_wait_seconds: config.max_wait_seconds,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> Option<&ExtractionCache> {
        self.cache.as_ref()
    }

    // * The returned page always carries `url` as given, so the report can
    // * join it back to the export rows.
    async fn extract_page(&self, url: &str) -> ExtractedPage {
        let Some(target) = resolve_url(url, self.site_root.as_deref()) else {
            telemetry::record_extraction_failure();
            warn!(url = url, "Cannot resolve URL to an absolute http(s) address");
            return ExtractedPage::failure(
                url,
                FetchError::InvalidUrl(format!("{} (set site_root for relative paths)", url))
                    .to_string(),
            );
        };

        if let Some(cache) = &self.cache {
            if let Some(mut page) = cache.get(&target).await {
                telemetry::record_cache_hit();
                debug!(url = url, "Extraction cache hit");
                page.url = url.to_string();
                return page;
            }
        }

        let started = Instant::now();
        // * The backend's own timeout normally fires first; this bounds the whole call
        let budget = Duration::from_secs(self.max_wait_seconds.saturating_add(EXTRACTION_GRACE_SECONDS));
        let fetched = match tokio::time::timeout(budget, self.source.fetch(&target)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.max_wait_seconds)),
        };
        telemetry::record_extraction_duration(
            self.source.backend_name(),
            started.elapsed().as_secs_f64(),
        );

        match fetched {
            Ok(html) => {
                let page = self.refinery.process(&html).into_page(url);
                if let Some(cache) = &self.cache {
                    cache.put(&target, &page).await;
                }
                telemetry::record_extraction_success();
                debug!(url = url, h1 = page.h1.len(), h2 = page.h2.len(), "Page extracted");
                page
            }
            Err(e) => {
                telemetry::record_extraction_failure();
                warn!(url = url, reason = %e, "Extraction failed");
                ExtractedPage::failure(url, e.to_string())
            }
        }
    }
}

impl<S: PageSource> FieldExtractor for PageExtractor<S> {
    fn extract<'a>(&'a self, url: &'a str) -> AsyncResult<'a, ExtractedPage> {
        Box::pin(self.extract_page(url))
    }

    fn shutdown<'a>(&'a self) -> AsyncResult<'a, ()> {
        self.source.shutdown()
    }
}

/// Builds the extractor for the configured backend
pub fn build_extractor(config: &ExtractionConfig) -> Result<Arc<dyn FieldExtractor>, FetchError> {
    let extractor: Arc<dyn FieldExtractor> = match config.backend {
        FetchBackend::Browser => {
            Arc::new(PageExtractor::new(BrowserSource::from_config(config), config))
        }
        FetchBackend::Http => {
            let source = HttpSource::new(&config.user_agent, config.max_wait_seconds)?;
            Arc::new(PageExtractor::new(source, config))
        }
    };
    Ok(extractor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // * In-process source serving fixed HTML per URL
    struct StubSource {
        pages: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PageSource for StubSource {
        fn fetch<'a>(&'a self, url: &'a str) -> AsyncResult<'a, Result<String, FetchError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = self.pages.get(url).cloned().ok_or(FetchError::Status(404));
            Box::pin(async move { result })
        }

        fn backend_name(&self) -> &'static str {
            "stub"
        }
    }

    fn config() -> ExtractionConfig {
        ExtractionConfig {
            backend: FetchBackend::Http,
            site_root: Some("https://example.com".to_string()),
            ..Default::default()
        }
    }

    const PAGE: &str = r#"<html><head><title>Running Shoes Guide</title></head>
        <body><h1>Our Shoes</h1><p>Find the best running shoes here</p></body></html>"#;

    #[tokio::test]
    async fn test_relative_url_resolved_and_kept() {
        let extractor = PageExtractor::new(StubSource::new(&[("https://example.com/a", PAGE)]), &config());

        let page = extractor.extract("/a").await;
        assert!(page.is_success());
        assert_eq!(page.url, "/a");
        assert_eq!(page.title.as_deref(), Some("Running Shoes Guide"));
        assert_eq!(page.h1, vec!["Our Shoes"]);
    }

    #[tokio::test]
    async fn test_relative_url_without_site_root_fails() {
        let config = ExtractionConfig {
            site_root: None,
            ..config()
        };
        let extractor = PageExtractor::new(StubSource::new(&[]), &config);

        let page = extractor.extract("/a").await;
        assert!(!page.is_success());
        assert!(page.error.unwrap().contains("site_root"));
        assert_eq!(extractor.source().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_becomes_failure_page() {
        let extractor = PageExtractor::new(StubSource::new(&[]), &config());

        let page = extractor.extract("https://example.com/missing").await;
        assert!(!page.is_success());
        assert_eq!(page.error.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_cache_prevents_second_fetch() {
        let extractor = PageExtractor::new(StubSource::new(&[("https://example.com/a", PAGE)]), &config());

        let first = extractor.extract("https://example.com/a").await;
        let second = extractor.extract("https://example.com/a").await;

        assert_eq!(first, second);
        assert_eq!(extractor.source().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_disabled_fetches_every_time() {
        let config = ExtractionConfig {
            use_cache: false,
            ..config()
        };
        let extractor = PageExtractor::new(StubSource::new(&[("https://example.com/a", PAGE)]), &config);

        extractor.extract("https://example.com/a").await;
        extractor.extract("https://example.com/a").await;

        assert!(extractor.cache().is_none());
        assert_eq!(extractor.source().calls.load(Ordering::SeqCst), 2);
    }
}
