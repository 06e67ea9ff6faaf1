//! Content fetching over HTTP.
//!
//! Every outbound page request goes through [`fetch_url`], which sends a fixed
//! browser-like header set and applies the configured timeout. The response
//! is returned as a [`RawDocument`] so callers can inspect the declared
//! content type before parsing.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{LektionError, Result};

/// User-Agent sent on direct page fetches.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
    /// Value of the `Accept` header.
    pub accept: String,
    /// Value of the `Accept-Language` header.
    pub accept_language: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 15,
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: "de-DE,de;q=0.9,en;q=0.8".to_string(),
        }
    }
}

impl FetchConfig {
    /// Returns a copy with a different timeout.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A fetched HTTP response body plus its declared content type.
///
/// Scoped to a single extraction attempt and discarded after parsing.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Final URL after redirects.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, empty when absent.
    pub content_type: String,
    /// Response body decoded as text.
    pub body: String,
}

impl RawDocument {
    /// Whether the server declared a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type.to_ascii_lowercase().contains("json")
    }
}

/// Prefixes `https://` when the input has no `http(s)://` scheme.
///
/// # Example
///
/// ```rust
/// use lektion_core::fetch::normalize_url;
///
/// assert_eq!(normalize_url(" example.com/a "), "https://example.com/a");
/// assert_eq!(normalize_url("http://example.com"), "http://example.com");
/// ```
pub fn normalize_url(input: &str) -> String {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| LektionError::InvalidUrl(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LektionError::InvalidUrl(format!(
            "unsupported scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }
    Ok(parsed)
}

/// Builds a client with the configured timeout.
pub(crate) fn build_client(timeout: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .map_err(LektionError::HttpError)
}

/// Fetches a page and returns the raw response.
///
/// Non-success statuses are returned as [`LektionError::HttpStatus`];
/// timeouts as [`LektionError::Timeout`].
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<RawDocument> {
    let parsed_url = parse_url(url)?;
    let client = build_client(config.timeout)?;

    tracing::debug!(url = %parsed_url, timeout = config.timeout, "fetching page");

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", &config.accept)
        .header("Accept-Language", &config.accept_language)
        .header("DNT", "1")
        .header("Cache-Control", "max-age=0")
        .send()
        .await
        .map_err(|e| LektionError::from_reqwest(e, config.timeout))?;

    let status = response.status();
    let final_url = response.url().to_string();
    if !status.is_success() {
        return Err(LektionError::HttpStatus { status: status.as_u16(), url: final_url });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = response
        .text()
        .await
        .map_err(|e| LektionError::from_reqwest(e, config.timeout))?;

    Ok(RawDocument { url: final_url, status: status.as_u16(), content_type, body })
}

/// Fetches raw bytes, used for feeds where the XML parser wants bytes.
pub async fn fetch_bytes(url: &str, config: &FetchConfig) -> Result<Vec<u8>> {
    let parsed_url = parse_url(url)?;
    let client = build_client(config.timeout)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .send()
        .await
        .map_err(|e| LektionError::from_reqwest(e, config.timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(LektionError::HttpStatus { status: status.as_u16(), url: response.url().to_string() });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| LektionError::from_reqwest(e, config.timeout))?;
    Ok(bytes.to_vec())
}
