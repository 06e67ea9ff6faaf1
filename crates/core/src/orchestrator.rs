//! URL extraction with fallback.
//!
//! [`Extractor`] is the entry point for turning a URL into article text. It
//! fetches the page and runs the [`DirectPipeline`]; when that fails or comes
//! back too short it asks the reader proxy. Only when both stages fail does
//! the caller see an error, and that error lists why each stage failed.
//!
//! # Example
//!
//! ```rust
//! use lektion_core::Extractor;
//!
//! let body = "<p>Die Stadt baut eine neue Brücke über den Fluss im Zentrum.</p>".repeat(6);
//! let html = format!("<html><body><h1>Brücke</h1><main>{}</main></body></html>", body);
//!
//! let result = Extractor::new().parse(&html).unwrap();
//! assert_eq!(result.title, "Brücke");
//! ```

use serde_json::Value;

use crate::article::{DEFAULT_TITLE, ExtractionResult};
use crate::fetch::{FetchConfig, fetch_url, normalize_url};
use crate::noise::NoiseConfig;
use crate::reader::{ReaderConfig, fetch_rendered};
use crate::selectors::SelectorList;
use crate::strategy::{DirectPipeline, Miss, Page};
use crate::text::prefix_chars;
use crate::{LektionError, Result};

/// Configuration for the URL extractor.
///
/// # Example
///
/// ```rust
/// use lektion_core::ExtractorConfig;
///
/// let config = ExtractorConfig::builder()
///     .min_content_chars(300)
///     .use_reader(false)
///     .build();
/// assert_eq!(config.min_content_chars, 300);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Settings for the direct page fetch.
    pub fetch: FetchConfig,
    /// Settings for the reader proxy fallback.
    pub reader: ReaderConfig,
    /// Tags and class/id rules stripped before selector matching.
    pub noise: NoiseConfig,
    /// Article-body selectors, tried in order.
    pub selectors: SelectorList,
    /// A stage's result must be longer than this to be accepted (default: 150).
    pub min_content_chars: usize,
    /// JSON responses are cut to this many characters (default: 6000).
    pub json_max_chars: usize,
    /// Each failure reason is cut to this many characters (default: 80).
    pub reason_chars: usize,
    /// Whether the reader proxy is tried after the direct stage (default: true).
    pub use_reader: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            reader: ReaderConfig::default(),
            noise: NoiseConfig::default(),
            selectors: SelectorList::default(),
            min_content_chars: 150,
            json_max_chars: 6000,
            reason_chars: 80,
            use_reader: true,
        }
    }
}

impl ExtractorConfig {
    /// Creates a new builder for ExtractorConfig.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }
}

/// Builder for ExtractorConfig.
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractorConfig::default() }
    }

    pub fn fetch(mut self, value: FetchConfig) -> Self {
        self.config.fetch = value;
        self
    }

    /// Sets the direct fetch timeout in seconds.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.fetch.timeout = seconds;
        self
    }

    pub fn reader(mut self, value: ReaderConfig) -> Self {
        self.config.reader = value;
        self
    }

    /// Points the fallback at a different reader proxy.
    pub fn reader_base_url(mut self, value: impl Into<String>) -> Self {
        self.config.reader.base_url = value.into();
        self
    }

    pub fn noise(mut self, value: NoiseConfig) -> Self {
        self.config.noise = value;
        self
    }

    pub fn selectors(mut self, value: SelectorList) -> Self {
        self.config.selectors = value;
        self
    }

    pub fn min_content_chars(mut self, value: usize) -> Self {
        self.config.min_content_chars = value;
        self
    }

    pub fn json_max_chars(mut self, value: usize) -> Self {
        self.config.json_max_chars = value;
        self
    }

    pub fn use_reader(mut self, value: bool) -> Self {
        self.config.use_reader = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}

impl Default for ExtractorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Why the direct stage produced nothing usable.
enum DirectFailure {
    Miss(Miss),
    Error(LektionError),
}

/// Extracts article text from URLs and HTML.
#[derive(Debug)]
pub struct Extractor {
    config: ExtractorConfig,
    pipeline: DirectPipeline,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Creates an extractor whose pipeline uses the configured selector list.
    pub fn with_config(config: ExtractorConfig) -> Self {
        let pipeline = DirectPipeline::with_selectors(config.selectors.clone());
        Self { config, pipeline }
    }

    /// Creates an extractor with a custom strategy pipeline.
    pub fn with_pipeline(config: ExtractorConfig, pipeline: DirectPipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs the direct strategies on an HTML string.
    ///
    /// No acceptance threshold is applied here; see [`Extractor::extract`].
    pub fn parse(&self, html: &str) -> std::result::Result<ExtractionResult, Miss> {
        let page = Page::new(html, &self.config.noise);
        self.pipeline.run(&page)
    }

    /// Extracts the article behind `input`.
    ///
    /// `https://` is prefixed when the input has no scheme. The direct stage
    /// runs first and the reader proxy second; a stage succeeds only when its
    /// content is longer than [`ExtractorConfig::min_content_chars`].
    ///
    /// # Errors
    ///
    /// Returns [`LektionError::ExtractionFailed`] with one reason per stage
    /// when every stage failed.
    pub async fn extract(&self, input: &str) -> Result<ExtractionResult> {
        let url = normalize_url(input);
        let mut reasons = Vec::new();

        match self.direct(&url).await {
            Ok(result) if self.accepts(&result) => return Ok(result),
            Ok(result) => {
                tracing::debug!(chars = result.content_chars(), "direct result below threshold");
                reasons.push("Direct scrape: insufficient content".to_string());
            }
            Err(DirectFailure::Miss(miss)) => reasons.push(self.reason("Direct scrape", miss.reason())),
            Err(DirectFailure::Error(e)) => reasons.push(self.reason("Direct scrape", &e.to_string())),
        }

        if self.config.use_reader {
            match fetch_rendered(&url, &self.config.reader).await {
                Ok(Some(result)) if self.accepts(&result) => {
                    tracing::info!(chars = result.content_chars(), "reader proxy succeeded");
                    return Ok(result);
                }
                Ok(_) => reasons.push("Reader proxy: insufficient content".to_string()),
                Err(e) => reasons.push(self.reason("Reader proxy", &e.to_string())),
            }
        }

        tracing::warn!(url = %url, reasons = reasons.len(), "all extraction stages failed");
        Err(LektionError::ExtractionFailed { details: reasons.join(" | ") })
    }

    /// Fetches the page and runs the direct strategies on it.
    async fn direct(&self, url: &str) -> std::result::Result<ExtractionResult, DirectFailure> {
        let raw = fetch_url(url, &self.config.fetch).await.map_err(DirectFailure::Error)?;

        if raw.is_json() {
            tracing::debug!(url = %raw.url, "JSON response, passing body through");
            return Ok(self.json_passthrough(&raw.body));
        }

        self.parse(&raw.body).map_err(DirectFailure::Miss)
    }

    /// Accepts a JSON body as content, re-serialized compactly when it parses.
    fn json_passthrough(&self, body: &str) -> ExtractionResult {
        let text = match serde_json::from_str::<Value>(body) {
            Ok(value) => value.to_string(),
            Err(_) => body.to_string(),
        };
        ExtractionResult::new(DEFAULT_TITLE, prefix_chars(&text, self.config.json_max_chars))
    }

    fn accepts(&self, result: &ExtractionResult) -> bool {
        !result.title.is_empty() && result.is_usable(self.config.min_content_chars)
    }

    fn reason(&self, stage: &str, detail: &str) -> String {
        format!("{}: {}", stage, prefix_chars(detail, self.config.reason_chars))
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = ExtractorConfig::builder().build();
        assert_eq!(config.min_content_chars, 150);
        assert_eq!(config.json_max_chars, 6000);
        assert_eq!(config.reason_chars, 80);
        assert!(config.use_reader);
        assert_eq!(config.fetch.timeout, 15);
        assert_eq!(config.reader.timeout, 20);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ExtractorConfig::builder()
            .timeout(5)
            .reader_base_url("http://localhost:1/")
            .selectors(SelectorList::new([".story"]))
            .build();
        assert_eq!(config.fetch.timeout, 5);
        assert_eq!(config.reader.base_url, "http://localhost:1/");
        assert_eq!(config.selectors.len(), 1);
    }

    #[test]
    fn test_reason_is_cut() {
        let extractor = Extractor::new();
        let reason = extractor.reason("Direct scrape", &"x".repeat(200));
        assert_eq!(reason.len(), "Direct scrape: ".len() + 80);
    }

    #[test]
    fn test_json_passthrough() {
        let extractor = Extractor::new();
        let result = extractor.json_passthrough(r#"{ "text":   "Hallo" }"#);
        assert_eq!(result.title, DEFAULT_TITLE);
        assert_eq!(result.content, r#"{"text":"Hallo"}"#);

        let long = format!(r#"{{"text":"{}"}}"#, "a".repeat(7000));
        assert_eq!(extractor.json_passthrough(&long).content_chars(), 6000);
    }

    #[test]
    fn test_custom_selectors_are_used() {
        let body = "<p>Ein Absatz in einem eigenen Container mit Text.</p>".repeat(6);
        let html = format!(r#"<html><body><div class="story">{}</div></body></html>"#, body);
        let config = ExtractorConfig::builder().selectors(SelectorList::new([".story"])).build();
        let result = Extractor::with_config(config).parse(&html).unwrap();
        assert!(result.content.starts_with("Ein Absatz"));
    }
}
