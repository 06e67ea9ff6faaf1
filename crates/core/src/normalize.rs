//! Paragraph normalization.
//!
//! Turns a chosen container into plain text: one fragment per paragraph,
//! heading or list item, with short fragments dropped and repeats removed.

use std::collections::HashSet;

use crate::parse::{Element, parse_selector};
use crate::text::{MAX_CONTENT_CHARS, collapse_whitespace, prefix_chars, truncate_with_marker};

/// Block-level tags that become fragments.
const FRAGMENT_TAGS: &str = "p, h1, h2, h3, li";

/// Configuration for paragraph normalization
#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    /// Fragments at or under this many characters are dropped
    pub min_fragment_chars: usize,
    /// Fragments sharing this many leading characters count as duplicates
    pub dedup_key_chars: usize,
    /// Output ceiling before the truncation marker is appended
    pub max_chars: usize,
    /// Separator placed between fragments
    pub separator: String,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self { min_fragment_chars: 25, dedup_key_chars: 60, max_chars: MAX_CONTENT_CHARS, separator: "\n\n".to_string() }
    }
}

/// Ordered, deduplicated text fragments of one container.
#[derive(Debug, Clone, Default)]
pub struct ParagraphSet {
    fragments: Vec<String>,
    seen: HashSet<String>,
    key_chars: usize,
}

impl ParagraphSet {
    /// Creates an empty set that dedups on the first `key_chars` characters.
    pub fn new(key_chars: usize) -> Self {
        Self { fragments: Vec::new(), seen: HashSet::new(), key_chars }
    }

    /// Adds a fragment unless one with the same key is already present.
    ///
    /// Returns whether the fragment was kept.
    pub fn push(&mut self, fragment: String) -> bool {
        let key = prefix_chars(&fragment, self.key_chars).to_string();
        if !self.seen.insert(key) {
            return false;
        }
        self.fragments.push(fragment);
        true
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Joins the fragments with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.fragments.join(separator)
    }
}

/// Collects the qualifying fragments of `container`, in document order.
pub fn collect_paragraphs(container: &Element<'_>, config: &NormalizeConfig) -> ParagraphSet {
    let mut set = ParagraphSet::new(config.dedup_key_chars);
    let Ok(selector) = parse_selector(FRAGMENT_TAGS) else {
        return set;
    };

    for element in container.select_parsed(&selector) {
        let text = collapse_whitespace(&element.spaced_text());
        if text.chars().count() > config.min_fragment_chars {
            set.push(text);
        }
    }
    set
}

/// Normalizes a container to plain text.
///
/// Returns `None` when no fragment survives, which callers treat as a miss.
pub fn normalize(container: &Element<'_>, config: &NormalizeConfig) -> Option<String> {
    let set = collect_paragraphs(container, config);
    if set.is_empty() {
        return None;
    }
    Some(truncate_with_marker(&set.join(&config.separator), config.max_chars))
}
