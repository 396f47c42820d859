// * Extraction cache keyed by content-source fingerprint
// * Process-lifetime map in front of an optional directory of JSON files.
// * Only successful extractions are ever stored, so a failed URL is
// * fetched again on the next run.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};
use xxhash_rust::xxh64::xxh64;

use crate::config::{ExtractionConfig, FetchBackend};
use crate::schema::ExtractedPage;

// * Computes the cache key for a URL under the given crawl settings.
// * Rendering mode changes what the page looks like, so it is part of the key.
pub fn cache_key(url: &str, backend: FetchBackend, headless: bool) -> u64 {
    let canonical = format!("u:{};b:{};h:{}", url, backend.as_str(), headless);
    xxh64(canonical.as_bytes(), 0)
}

pub struct ExtractionCache {
    memory: RwLock<HashMap<u64, ExtractedPage>>,
    dir: Option<PathBuf>,
    backend: FetchBackend,
    headless: bool,
}

impl ExtractionCache {
    /// In-memory cache only
    pub fn in_memory(backend: FetchBackend, headless: bool) -> Self {
        Self {
            memory: RwLock::new(HashMap::new()),
            dir: None,
            backend,
            headless,
        }
    }

    /// Memory plus on-disk persistence under `dir`
    pub fn with_dir(backend: FetchBackend, headless: bool, dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            ..Self::in_memory(backend, headless)
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        match &config.cache_dir {
            Some(dir) => Self::with_dir(config.backend, config.headless, dir),
            None => Self::in_memory(config.backend, config.headless),
        }
    }

    pub fn key(&self, url: &str) -> u64 {
        cache_key(url, self.backend, self.headless)
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.memory.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a prior successful extraction, memory first, then disk
    pub async fn get(&self, url: &str) -> Option<ExtractedPage> {
        let key = self.key(url);

        if let Some(page) = self.recall(key) {
            return Some(page);
        }

        let path = self.entry_path(key)?;
        let bytes = tokio::fs::read(&path).await.ok()?;
        let page: ExtractedPage = match serde_json::from_slice(&bytes) {
            Ok(page) => page,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache entry");
                return None;
            }
        };

        if !page.is_success() {
            return None;
        }

        debug!(url = url, "Loaded extraction from disk cache");
        self.remember(key, page.clone());
        Some(page)
    }

    /// Stores a successful extraction; failures are ignored
    pub async fn put(&self, url: &str, page: &ExtractedPage) {
        if !page.is_success() {
            return;
        }

        let key = self.key(url);
        self.remember(key, page.clone());

        let Some(path) = self.entry_path(key) else {
            return;
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                warn!(dir = %parent.display(), error = %e, "Cache directory unavailable");
                return;
            }
        }

        match serde_json::to_vec(page) {
            Ok(bytes) => {
                if let Err(e) = tokio::fs::write(&path, bytes).await {
                    warn!(path = %path.display(), error = %e, "Failed to persist cache entry");
                }
            }
            Err(e) => warn!(url = url, error = %e, "Failed to encode cache entry"),
        }
    }

    // * Lock guards stay inside these sync helpers, never across an await
    fn recall(&self, key: u64) -> Option<ExtractedPage> {
        self.memory.read().ok()?.get(&key).cloned()
    }

    fn remember(&self, key: u64, page: ExtractedPage) {
        if let Ok(mut memory) = self.memory.write() {
            memory.insert(key, page);
        }
    }

    fn entry_path(&self, key: u64) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{:016x}.json", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_depends_on_settings() {
        let url = "https://example.com/a";
        let base = cache_key(url, FetchBackend::Browser, true);

        assert_eq!(base, cache_key(url, FetchBackend::Browser, true));
        assert_ne!(base, cache_key(url, FetchBackend::Browser, false));
        assert_ne!(base, cache_key(url, FetchBackend::Http, true));
        assert_ne!(base, cache_key("https://example.com/b", FetchBackend::Browser, true));
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = ExtractionCache::in_memory(FetchBackend::Http, true);
        let page = ExtractedPage::failure("https://example.com/a", "HTTP 500");

        cache.put("https://example.com/a", &page).await;
        assert!(cache.is_empty());
        assert!(cache.get("https://example.com/a").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let cache = ExtractionCache::in_memory(FetchBackend::Http, true);
        let page = ExtractedPage::success("https://example.com/a").with_title("Shoes");

        cache.put("https://example.com/a", &page).await;
        assert_eq!(cache.get("https://example.com/a").await, Some(page));
        assert_eq!(cache.len(), 1);
    }
}
