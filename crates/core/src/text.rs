//! Small text utilities shared by the extractors.
//!
//! All limits in this crate are expressed in characters, not bytes, so every
//! cut goes through [`prefix_chars`] and can never split a UTF-8 sequence.

use std::sync::LazyLock;

use regex::Regex;

/// Marker appended when content is cut to the size ceiling.
pub const TRUNCATION_MARKER: &str = "\n\n[Truncated...]";

/// Default content ceiling, in characters.
pub const MAX_CONTENT_CHARS: usize = 8000;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline regex"));

/// Returns the first `max` characters of `s` as a borrowed slice.
pub fn prefix_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Cuts `s` to `max` characters and appends [`TRUNCATION_MARKER`] when a cut happened.
///
/// Content at or under the ceiling is returned unchanged.
pub fn truncate_with_marker(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = prefix_chars(s, max).to_string();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").trim().to_string()
}

/// Collapses three or more consecutive newlines to exactly two.
pub fn collapse_blank_lines(s: &str) -> String {
    NEWLINE_RUN.replace_all(s, "\n\n").to_string()
}

/// Iterates the data lines of a line-based list file.
///
/// Yields `(line_number, trimmed_line)` and skips blank lines and comments.
/// A comment is a line that is just `#` or starts with `# `, so CSS id
/// selectors such as `#content` remain data.
pub(crate) fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && *line != "#" && !line.starts_with("# "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_lines_skips_comments() {
        let lines: Vec<_> = data_lines("# header\n\n  article  \n#\n#main\n").collect();
        assert_eq!(lines, vec![(3, "article"), (5, "#main")]);
    }

    #[test]
    fn test_prefix_chars_multibyte() {
        assert_eq!(prefix_chars("Grüße aus Köln", 4), "Grüß");
        assert_eq!(prefix_chars("kurz", 10), "kurz");
    }

    #[test]
    fn test_truncate_with_marker_long() {
        let long = "ä".repeat(MAX_CONTENT_CHARS + 10);
        let out = truncate_with_marker(&long, MAX_CONTENT_CHARS);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), MAX_CONTENT_CHARS + TRUNCATION_MARKER.chars().count());
    }

    #[test]
    fn test_truncate_with_marker_is_noop_under_limit() {
        let text = "Ein kurzer Text.";
        assert_eq!(truncate_with_marker(text, MAX_CONTENT_CHARS), text);
        let exact = "x".repeat(MAX_CONTENT_CHARS);
        assert_eq!(truncate_with_marker(&exact, MAX_CONTENT_CHARS), exact);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb\n\nc"), "a\n\nb\n\nc");
    }
}
