use crate::network::errors::FetchError;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;

// * Challenge pages identify themselves in <title>
static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>([^<]*)</title>").unwrap());

static BAN_TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(Just a moment|Attention Required|Security Check|Access Denied|Captcha)")
        .unwrap()
});

const BAN_SIGNATURES: &[&str] = &["captcha-delivery", "cf-turnstile", "datadome", "challenge-platform"];

// * Plain HTTP page source: no JavaScript rendering.
pub struct HttpSource {
    inner: Client,
    timeout_secs: u64,
}

impl HttpSource {
    // * Builds the client with a cookie store and the configured identity.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            inner: client,
            timeout_secs,
        })
    }

    // * Fetches a URL and rejects error statuses and challenge pages.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

        let resp = self.inner.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Http(e)
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyResponse);
        }

        detect_soft_ban(&body)?;

        Ok(body)
    }
}

// * Title trigger first, then known challenge script markers
pub fn detect_soft_ban(body: &str) -> Result<(), FetchError> {
    if let Some(title) = TITLE_REGEX.captures(body).and_then(|c| c.get(1)) {
        if let Some(hit) = BAN_TITLE_REGEX.find(title.as_str()) {
            return Err(FetchError::SoftBan(format!("Title Trigger: {}", hit.as_str())));
        }
    }

    for sig in BAN_SIGNATURES {
        if body.contains(sig) {
            return Err(FetchError::SoftBan(format!("Body Trigger: {}", sig)));
        }
    }

    Ok(())
}
