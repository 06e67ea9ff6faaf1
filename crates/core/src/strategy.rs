//! Direct-extraction strategies and the pipeline that runs them.
//!
//! Each strategy inspects a fetched [`Page`] and either produces an
//! [`ExtractionResult`] or reports a [`Miss`]. [`DirectPipeline`] tries its
//! strategies in order and stops at the first success, so adding a strategy
//! means implementing [`ContentStrategy`] and inserting it into the list.
//!
//! # Example
//!
//! ```rust
//! use lektion_core::strategy::{DirectPipeline, Page};
//! use lektion_core::noise::NoiseConfig;
//!
//! let body = "<p>Ein Satz über das Wetter in Berlin, der lang genug ist.</p>".repeat(8);
//! let html = format!("<html><body><h1>Wetter</h1><article>{}</article></body></html>", body);
//! let noise = NoiseConfig::default();
//! let page = Page::new(&html, &noise);
//!
//! let result = DirectPipeline::default().run(&page).unwrap();
//! assert_eq!(result.title, "Wetter");
//! ```

use std::cell::OnceCell;
use std::fmt;

use crate::article::{DEFAULT_TITLE, ExtractionResult};
use crate::jsonld;
use crate::largest_block::{BlockConfig, find_largest_block};
use crate::noise::{NoiseConfig, strip_noise_document};
use crate::normalize::{NormalizeConfig, normalize};
use crate::parse::Document;
use crate::selectors::SelectorList;
use crate::text::{MAX_CONTENT_CHARS, truncate_with_marker};

/// Why a strategy produced nothing.
///
/// A miss is an expected outcome, not an error: the pipeline simply moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Miss {
    reason: String,
}

impl Miss {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// A fetched HTML page, shared by every strategy of one pipeline run.
///
/// The raw document is parsed up front; the noise-stripped document is built
/// on first use, so a page answered by structured data never pays for it.
pub struct Page<'a> {
    html: &'a str,
    noise: &'a NoiseConfig,
    raw: Document,
    stripped: OnceCell<Document>,
}

impl<'a> Page<'a> {
    pub fn new(html: &'a str, noise: &'a NoiseConfig) -> Self {
        Self { html, noise, raw: Document::parse(html), stripped: OnceCell::new() }
    }

    /// The page as served, including scripts.
    pub fn raw(&self) -> &Document {
        &self.raw
    }

    /// The page after noise stripping.
    pub fn stripped(&self) -> &Document {
        self.stripped.get_or_init(|| strip_noise_document(self.html, self.noise))
    }

    /// Resolves the page title.
    ///
    /// Order: first `<h1>` of the stripped page, `og:title`, `<title>`, then
    /// [`DEFAULT_TITLE`].
    pub fn title(&self) -> String {
        self.stripped()
            .first_heading()
            .or_else(|| self.raw.meta_property("og:title"))
            .or_else(|| self.raw.title())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }
}

/// One way of pulling article text out of a page.
pub trait ContentStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Tries to extract the article.
    fn attempt(&self, page: &Page<'_>) -> Result<ExtractionResult, Miss>;
}

/// Reads the article from JSON-LD metadata.
#[derive(Debug, Clone)]
pub struct StructuredDataStrategy {
    pub min_body_chars: usize,
    pub max_chars: usize,
}

impl Default for StructuredDataStrategy {
    fn default() -> Self {
        Self { min_body_chars: 200, max_chars: MAX_CONTENT_CHARS }
    }
}

impl ContentStrategy for StructuredDataStrategy {
    fn name(&self) -> &'static str {
        "structured-data"
    }

    fn attempt(&self, page: &Page<'_>) -> Result<ExtractionResult, Miss> {
        let article = jsonld::find_article(page.raw(), self.min_body_chars)
            .ok_or_else(|| Miss::new("no JSON-LD article"))?;

        let title = article.headline.unwrap_or_else(|| page.title());
        Ok(ExtractionResult::new(title, truncate_with_marker(&article.body, self.max_chars)))
    }
}

/// Finds the article container with a known CSS selector.
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    pub selectors: SelectorList,
    pub min_chars: usize,
    pub normalize: NormalizeConfig,
}

impl Default for SelectorStrategy {
    fn default() -> Self {
        Self { selectors: SelectorList::default(), min_chars: 200, normalize: NormalizeConfig::default() }
    }
}

impl ContentStrategy for SelectorStrategy {
    fn name(&self) -> &'static str {
        "selector"
    }

    fn attempt(&self, page: &Page<'_>) -> Result<ExtractionResult, Miss> {
        let doc = page.stripped();
        let (element, selector) = self
            .selectors
            .find_content(doc, self.min_chars)
            .ok_or_else(|| Miss::new("no known content container"))?;

        tracing::debug!(selector, "content container matched");
        let content = normalize(&element, &self.normalize)
            .ok_or_else(|| Miss::new(format!("container {} has no paragraphs", selector)))?;
        Ok(ExtractionResult::new(page.title(), content))
    }
}

/// Picks the container with the most paragraph text.
#[derive(Debug, Clone, Default)]
pub struct LargestBlockStrategy {
    pub block: BlockConfig,
    pub normalize: NormalizeConfig,
}

impl ContentStrategy for LargestBlockStrategy {
    fn name(&self) -> &'static str {
        "largest-block"
    }

    fn attempt(&self, page: &Page<'_>) -> Result<ExtractionResult, Miss> {
        let candidate = find_largest_block(page.stripped(), &self.block)?;
        let content =
            normalize(&candidate.element, &self.normalize).ok_or_else(|| Miss::new("largest block has no paragraphs"))?;
        Ok(ExtractionResult::new(page.title(), content))
    }
}

/// Ordered list of strategies tried against one page.
pub struct DirectPipeline {
    strategies: Vec<Box<dyn ContentStrategy>>,
}

impl Default for DirectPipeline {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StructuredDataStrategy::default()),
            Box::new(SelectorStrategy::default()),
            Box::new(LargestBlockStrategy::default()),
        ])
    }
}

impl fmt::Debug for DirectPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.strategies.iter().map(|s| s.name())).finish()
    }
}

impl DirectPipeline {
    pub fn new(strategies: Vec<Box<dyn ContentStrategy>>) -> Self {
        Self { strategies }
    }

    /// The standard pipeline with a custom selector list.
    pub fn with_selectors(selectors: SelectorList) -> Self {
        Self::new(vec![
            Box::new(StructuredDataStrategy::default()),
            Box::new(SelectorStrategy { selectors, ..Default::default() }),
            Box::new(LargestBlockStrategy::default()),
        ])
    }

    /// Returns the pipeline with `strategy` tried before all others.
    pub fn prepend(mut self, strategy: Box<dyn ContentStrategy>) -> Self {
        self.strategies.insert(0, strategy);
        self
    }

    /// Names of the strategies, in the order they are tried.
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Runs the strategies in order and returns the first success.
    ///
    /// When every strategy misses, the returned [`Miss`] carries the last
    /// strategy's reason.
    pub fn run(&self, page: &Page<'_>) -> Result<ExtractionResult, Miss> {
        let mut last = Miss::new("no strategies configured");
        for strategy in &self.strategies {
            match strategy.attempt(page) {
                Ok(result) => {
                    tracing::info!(strategy = strategy.name(), chars = result.content_chars(), "direct extraction succeeded");
                    return Ok(result);
                }
                Err(miss) => {
                    tracing::debug!(strategy = strategy.name(), reason = %miss, "strategy missed");
                    last = miss;
                }
            }
        }
        Err(last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sentences(n: usize) -> String {
        (0..n)
            .map(|i| format!("<p>Dies ist der Satz Nummer {} in einem langen Artikel.</p>", i))
            .collect()
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl ContentStrategy for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn attempt(&self, _page: &Page<'_>) -> Result<ExtractionResult, Miss> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Miss::new("counted"))
        }
    }

    #[test]
    fn test_title_chain() {
        let noise = NoiseConfig::default();

        let html = r#"<html><head><title>Seite</title><meta property="og:title" content="OG"></head><body><h1>Kopf</h1></body></html>"#;
        assert_eq!(Page::new(html, &noise).title(), "Kopf");

        let html = r#"<html><head><title>Seite</title><meta property="og:title" content="OG"></head><body></body></html>"#;
        assert_eq!(Page::new(html, &noise).title(), "OG");

        let html = r#"<html><head><title>Seite</title></head><body></body></html>"#;
        assert_eq!(Page::new(html, &noise).title(), "Seite");

        assert_eq!(Page::new("<p>nichts</p>", &noise).title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_h1_inside_header_is_not_title() {
        let noise = NoiseConfig::default();
        let html = r#"<html><head><title>Seite</title></head><body><header><h1>Logo</h1></header></body></html>"#;
        assert_eq!(Page::new(html, &noise).title(), "Seite");
    }

    #[test]
    fn test_structured_data_truncates_and_falls_back_to_page_title() {
        let body = "x".repeat(9000);
        let block = serde_json::json!({ "@type": "Article", "articleBody": body }).to_string();
        let html = format!(
            r#"<html><head><title>Seitentitel</title><script type="application/ld+json">{}</script></head></html>"#,
            block
        );
        let noise = NoiseConfig::default();
        let result = StructuredDataStrategy::default().attempt(&Page::new(&html, &noise)).unwrap();

        assert_eq!(result.title, "Seitentitel");
        assert!(result.content.ends_with("[Truncated...]"));
    }

    #[test]
    fn test_structured_data_short_circuits_pipeline() {
        let block = serde_json::json!({
            "@type": "NewsArticle",
            "headline": "Aus JSON-LD",
            "articleBody": "Strukturierter Text. ".repeat(20),
        })
        .to_string();
        let html = format!(
            r#"<html><head><script type="application/ld+json">{}</script></head><body><article>{}</article></body></html>"#,
            block,
            sentences(10)
        );

        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = DirectPipeline::new(vec![
            Box::new(StructuredDataStrategy::default()),
            Box::new(Counting { calls: calls.clone() }),
        ]);
        let noise = NoiseConfig::default();
        let result = pipeline.run(&Page::new(&html, &noise)).unwrap();

        assert_eq!(result.title, "Aus JSON-LD");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_selector_strategy() {
        let html = format!(
            r#"<html><body><h1>Titel</h1><div class="sidebar">{}</div><div class="article-content">{}</div></body></html>"#,
            sentences(10),
            sentences(6)
        );
        let noise = NoiseConfig::default();
        let result = SelectorStrategy::default().attempt(&Page::new(&html, &noise)).unwrap();

        assert_eq!(result.title, "Titel");
        assert_eq!(result.content.split("\n\n").count(), 6);
    }

    #[test]
    fn test_selector_miss_falls_through_to_largest_block() {
        let html = format!(r#"<html><body><div class="wrapper"><div class="text">{}</div></div></body></html>"#, sentences(6));
        let noise = NoiseConfig::default();
        let page = Page::new(&html, &noise);

        assert!(SelectorStrategy::default().attempt(&page).is_err());
        let result = DirectPipeline::default().run(&page).unwrap();
        assert!(result.content.starts_with("Dies ist der Satz Nummer 0"));
    }

    #[test]
    fn test_all_miss_reports_last_reason() {
        let noise = NoiseConfig::default();
        let page = Page::new("<html><body><p>kurz</p></body></html>", &noise);
        let miss = DirectPipeline::default().run(&page).unwrap_err();
        assert_eq!(miss.reason(), "no container holds paragraph text");
    }

    #[test]
    fn test_pipeline_names() {
        assert_eq!(DirectPipeline::default().names(), vec!["structured-data", "selector", "largest-block"]);
    }

    #[test]
    fn test_prepend_runs_first() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = DirectPipeline::default().prepend(Box::new(Counting { calls: calls.clone() }));
        assert_eq!(pipeline.names(), vec!["counting", "structured-data", "selector", "largest-block"]);

        let html = format!("<html><body><article>{}</article></body></html>", sentences(6));
        let noise = NoiseConfig::default();
        assert!(pipeline.run(&Page::new(&html, &noise)).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
