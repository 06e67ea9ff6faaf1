//! Extraction output type.
//!
//! [`ExtractionResult`] is what every extractor hands to the lesson
//! generator: a title and a body of plain text. It is created once per
//! request, consumed once, and never persisted.

use serde::Serialize;

/// Title used when a source carries no usable title.
pub const DEFAULT_TITLE: &str = "Article";

/// A title and plain-text body recovered from a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Article title, or [`DEFAULT_TITLE`].
    pub title: String,
    /// Plain-text body, paragraphs separated by blank lines.
    pub content: String,
}

impl ExtractionResult {
    /// Creates a result, substituting [`DEFAULT_TITLE`] for a blank title.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.trim().is_empty() { DEFAULT_TITLE.to_string() } else { title.trim().to_string() };
        Self { title, content: content.into() }
    }

    /// Length of the content in characters.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Whether the content is longer than `threshold` characters.
    pub fn is_usable(&self, threshold: usize) -> bool {
        self.content_chars() > threshold
    }

    /// Number of whitespace-separated words in the content.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_gets_placeholder() {
        let result = ExtractionResult::new("   ", "Inhalt");
        assert_eq!(result.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_title_is_trimmed() {
        let result = ExtractionResult::new("  Nachrichten  ", "Inhalt");
        assert_eq!(result.title, "Nachrichten");
    }

    #[test]
    fn test_is_usable_counts_chars() {
        let result = ExtractionResult::new("T", "ü".repeat(151));
        assert!(result.is_usable(150));
        assert!(!ExtractionResult::new("T", "ü".repeat(150)).is_usable(150));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(ExtractionResult::new("T", "Ein  kleiner\nTest").word_count(), 3);
    }
}
