//! Site-specific strategies.
//!
//! Generic strategies look for one article container. Some sites split the
//! article over several blocks, so a strategy here knows the site's markup
//! and stitches the blocks together itself.

use std::sync::LazyLock;

use scraper::Selector;

use crate::article::ExtractionResult;
use crate::parse::Element;
use crate::strategy::{ContentStrategy, Miss, Page};
use crate::text::collapse_whitespace;

static INTRO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.article-header-description").expect("valid selector"));
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.article-details-text").expect("valid selector"));
static WORD_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h3.teaser-word-title").expect("valid selector"));
static WORD_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.teaser-word-description").expect("valid selector"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1, h2").expect("valid selector"));

/// Message used when a page yields less text than [`NachrichtenleichtStrategy::min_chars`].
pub const TOO_SHORT_MESSAGE: &str = "Article content too short, please try again.";

/// Reads articles from nachrichtenleicht.de, the source of the random feed.
///
/// The article is the intro line, every body block and the "Wörter-Buch"
/// glossary rendered as `word: definition` lines, joined by single spaces.
/// Blocks of 20 characters or fewer are captions and are skipped.
#[derive(Debug, Clone)]
pub struct NachrichtenleichtStrategy {
    /// Blocks must be longer than this to count (default: 20).
    pub min_block_chars: usize,
    /// Joined content below this misses (default: 200).
    pub min_chars: usize,
}

impl Default for NachrichtenleichtStrategy {
    fn default() -> Self {
        Self { min_block_chars: 20, min_chars: 200 }
    }
}

impl NachrichtenleichtStrategy {
    fn block(&self, element: &Element<'_>) -> Option<String> {
        let text = element.spaced_text();
        (text.chars().count() > self.min_block_chars).then_some(text)
    }

    /// Glossary entries, pairing titles and descriptions in document order.
    fn glossary(&self, page: &Page<'_>) -> Vec<String> {
        let words = page.raw().select_parsed(&WORD_TITLE);
        let definitions = page.raw().select_parsed(&WORD_DESCRIPTION);
        words
            .iter()
            .zip(definitions.iter())
            .map(|(word, definition)| (word.spaced_text(), definition.spaced_text()))
            .filter(|(word, definition)| !word.is_empty() && !definition.is_empty())
            .map(|(word, definition)| format!("{}: {}", word, definition))
            .collect()
    }
}

impl ContentStrategy for NachrichtenleichtStrategy {
    fn name(&self) -> &'static str {
        "nachrichtenleicht"
    }

    fn attempt(&self, page: &Page<'_>) -> Result<ExtractionResult, Miss> {
        let doc = page.raw();
        let mut lines: Vec<String> = Vec::new();

        if let Some(intro) = doc.select_first(&INTRO) {
            lines.extend(self.block(&intro));
        }
        lines.extend(doc.select_parsed(&BODY).iter().filter_map(|div| self.block(div)));
        let body_blocks = lines.len();
        lines.extend(self.glossary(page));

        let content = collapse_whitespace(&lines.join(" "));
        if content.chars().count() < self.min_chars {
            return Err(Miss::new(TOO_SHORT_MESSAGE));
        }

        tracing::debug!(blocks = body_blocks, glossary = lines.len() - body_blocks, "site blocks joined");
        let title = doc
            .select_first(&HEADING)
            .map(|h| h.spaced_text())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| page.title());
        Ok(ExtractionResult::new(title, content))
    }
}
