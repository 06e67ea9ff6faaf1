//! Remote-render fallback through a reader proxy.
//!
//! The proxy loads the page in a real browser and answers with a
//! markdown-like rendering, which covers sites that only render with
//! JavaScript or refuse plain HTTP clients.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::article::{DEFAULT_TITLE, ExtractionResult};
use crate::fetch::build_client;
use crate::text::collapse_blank_lines;
use crate::{LektionError, Result};

/// Public reader proxy; the target URL is appended verbatim.
pub const DEFAULT_READER_URL: &str = "https://r.jina.ai/";

static BARE_LINK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://|www\.)").expect("valid bare link regex"));
static LINK_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link markup regex"));
static HEADING_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#{1,6}\s+").expect("valid heading regex"));
static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,2}([^*]+)\*{1,2}").expect("valid emphasis regex"));

/// Configuration for the reader proxy
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Proxy prefix the target URL is appended to
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Responses with fewer characters than this are a miss
    pub min_chars: usize,
    pub user_agent: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_READER_URL.to_string(), timeout: 20, min_chars: 200, user_agent: "Mozilla/5.0".to_string() }
    }
}

impl ReaderConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Asks the reader proxy for `url` and parses its answer.
///
/// Returns `Ok(None)` when the proxy answers with anything but 200 or with
/// less than [`ReaderConfig::min_chars`] characters. Transport failures are
/// errors.
pub async fn fetch_rendered(url: &str, config: &ReaderConfig) -> Result<Option<ExtractionResult>> {
    let client = build_client(config.timeout)?;
    let target = format!("{}{}", config.base_url, url);

    tracing::debug!(url = %target, "requesting reader proxy");
    let response = client
        .get(&target)
        .header(reqwest::header::ACCEPT, "text/plain")
        .header(reqwest::header::USER_AGENT, &config.user_agent)
        .timeout(Duration::from_secs(config.timeout))
        .send()
        .await
        .map_err(|e| LektionError::from_reqwest(e, config.timeout))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        tracing::debug!(status = status.as_u16(), "reader proxy declined");
        return Ok(None);
    }

    let text = response.text().await.map_err(|e| LektionError::from_reqwest(e, config.timeout))?;
    let text = text.trim();
    if text.chars().count() < config.min_chars {
        tracing::debug!(chars = text.chars().count(), "reader proxy answer too short");
        return Ok(None);
    }

    Ok(Some(parse_reader_markdown(text)))
}

/// Converts the proxy's markdown rendering to a title and plain text.
///
/// The first `# ` line becomes the title. Code fence lines, image lines and
/// bare link lines are dropped; link markup, heading markers and emphasis are
/// reduced to their text.
pub fn parse_reader_markdown(text: &str) -> ExtractionResult {
    let mut title: Option<String> = None;
    let mut lines = Vec::new();

    for line in text.lines().map(str::trim) {
        if title.is_none()
            && let Some(heading) = line.strip_prefix("# ")
        {
            title = Some(heading.trim().to_string());
            continue;
        }
        if line.is_empty() || line.starts_with("```") || line.starts_with("![") || BARE_LINK_LINE.is_match(line) {
            continue;
        }
        lines.push(line);
    }

    let content = lines.join("\n");
    let content = LINK_MARKUP.replace_all(&content, "$1");
    let content = HEADING_MARKER.replace_all(&content, "");
    let content = EMPHASIS.replace_all(&content, "$1");
    let content = collapse_blank_lines(&content).trim().to_string();

    ExtractionResult::new(title.unwrap_or_else(|| DEFAULT_TITLE.to_string()), content)
}
