// * Headless browser page source
// * Uses ChromiumOxide for pages that need JavaScript to render their
// * headings and copy. The browser is launched on first use and shared by
// * every concurrent fetch of the run.

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{AsyncResult, PageSource};
use crate::config::constants::{BROWSER_CLOSE_TIMEOUT_SECS, BROWSER_SETTLE_MS};
use crate::config::ExtractionConfig;
use crate::network::{detect_soft_ban, FetchError};

struct BrowserState {
    browser: Browser,
    handler: JoinHandle<()>,
}

pub struct BrowserSource {
    headless: bool,
    timeout_secs: u64,
    user_agent: String,
    state: Mutex<Option<BrowserState>>,
}

impl BrowserSource {
    // * Creates a source; the browser is not launched until needed
    pub fn new(headless: bool, timeout_secs: u64, user_agent: impl Into<String>) -> Self {
        Self {
            headless,
            timeout_secs,
            user_agent: user_agent.into(),
            state: Mutex::new(None),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.headless, config.max_wait_seconds, config.user_agent.clone())
    }

    fn launch_config(&self) -> Result<BrowserConfig, FetchError> {
        let mut builder = BrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }

        builder
            .no_sandbox()
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(FetchError::Browser)
    }

    // * Opens a blank tab, launching the browser if not already running
    async fn open_page(&self) -> Result<Page, FetchError> {
        let mut guard = self.state.lock().await;

        if guard.is_none() {
            let (browser, mut handler) = Browser::launch(self.launch_config()?)
                .await
                .map_err(|e| FetchError::Browser(format!("launch failed: {}", e)))?;

            // * Drive the CDP connection in the background
            let handle = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            *guard = Some(BrowserState {
                browser,
                handler: handle,
            });
            info!(headless = self.headless, "Browser launched");
        }

        let state = guard
            .as_ref()
            .ok_or_else(|| FetchError::Browser("browser unavailable".to_string()))?;

        state
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    // * Navigates, checks the document status and reads the settled DOM
    async fn load(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        page.goto(url)
            .await
            .map_err(|e| FetchError::Browser(format!("navigation failed: {}", e)))?;

        let response = page
            .wait_for_navigation_response()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        let status = response
            .as_ref()
            .and_then(|request| request.response.as_ref())
            .map(|response| response.status);
        check_document_status(status)?;

        // * Let late scripts settle before reading the DOM
        tokio::time::sleep(Duration::from_millis(BROWSER_SETTLE_MS)).await;
        page.content()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))
    }

    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let tab = TabGuard::new(self.open_page().await?);

        let loaded = tokio::time::timeout(self.load_timeout(), self.load(&tab.page, url)).await;
        tab.close(url).await;

        let html = match loaded {
            Ok(result) => result?,
            Err(_) => return Err(FetchError::Timeout(self.timeout_secs)),
        };
        if html.trim().is_empty() {
            return Err(FetchError::EmptyResponse);
        }
        detect_soft_ban(&html)?;
        Ok(html)
    }

    // * Navigation, settle delay and DOM read share one deadline
    fn load_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    // * Closes the browser gracefully
    pub async fn close_browser(&self) {
        let Some(mut state) = self.state.lock().await.take() else {
            return;
        };

        if let Err(e) = state.browser.close().await {
            warn!(error = %e, "Browser close failed");
        }
        state.handler.abort();
        info!("Browser shutdown complete");
    }
}

// * Rejects a main-document response outside 2xx. A missing status (cached
// * or non-network documents) is accepted.
fn check_document_status(status: Option<i64>) -> Result<(), FetchError> {
    match status {
        Some(code) if !(200..300).contains(&code) => {
            Err(FetchError::Status(u16::try_from(code).unwrap_or(0)))
        }
        _ => Ok(()),
    }
}

// * Owns one tab. Closing is awaited on the normal path; if the render
// * future is dropped first, the close runs on a spawned task instead.
struct TabGuard {
    page: Page,
    closed: bool,
}

impl TabGuard {
    fn new(page: Page) -> Self {
        Self { page, closed: false }
    }

    async fn close(mut self, url: &str) {
        self.closed = true;
        let close_budget = Duration::from_secs(BROWSER_CLOSE_TIMEOUT_SECS);
        match tokio::time::timeout(close_budget, self.page.clone().close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(url = url, error = %e, "Page close failed"),
            Err(_) => debug!(url = url, "Page close timed out"),
        }
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let page = self.page.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}

impl PageSource for BrowserSource {
    fn fetch<'a>(&'a self, url: &'a str) -> AsyncResult<'a, Result<String, FetchError>> {
        Box::pin(self.render(url))
    }

    fn backend_name(&self) -> &'static str {
        "browser"
    }

    fn shutdown<'a>(&'a self) -> AsyncResult<'a, ()> {
        Box::pin(self.close_browser())
    }
}

impl Drop for BrowserSource {
    fn drop(&mut self) {
        // * Can't await in drop; stop the handler task at least
        if let Some(state) = self.state.get_mut().take() {
            state.handler.abort();
        }
    }
}
