//! Ordered CSS selectors for known article-body containers.
//!
//! Order matters: specific selectors come before generic ones so a wrapper
//! holding the article plus page noise is only picked when nothing more
//! precise matched.

use std::path::Path;

use scraper::Selector;

use crate::parse::{Document, Element, parse_selector};
use crate::text::data_lines;
use crate::{LektionError, Result};

/// Built-in selector list in the line format accepted by [`SelectorList::parse_string`].
pub const DEFAULT_SELECTORS: &str = r#"
# generic semantic
article
[role="main"]
main
# common CMS class names
.article-body
.article-content
.article__body
.article__content
.article__text
.article-text
.post-content
.post-body
.entry-content
.story-body
.story-content
.content-body
.page-content
.text-content
.main-content
# public broadcaster templates (Deutschlandfunk, ARD)
.b-content-main
.articleText
.article-long-text
[class*="ArticleBody"]
[class*="article-body"]
[class*="articleBody"]
[class*="ArticleText"]
[class*="content__text"]
[class*="contentText"]
# generic ids
#article-body
#content
#main-content
#main
# data attributes
[data-module="articleBody"]
[data-component="article-body"]
"#;

/// A compiled selector together with its source text.
#[derive(Debug, Clone)]
pub struct ContentSelector {
    source: String,
    selector: Selector,
}

impl ContentSelector {
    /// The selector as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// An ordered list of article-body selectors.
#[derive(Debug, Clone)]
pub struct SelectorList {
    selectors: Vec<ContentSelector>,
}

impl Default for SelectorList {
    fn default() -> Self {
        Self::parse_string(DEFAULT_SELECTORS)
    }
}

impl SelectorList {
    /// Builds a list from selector strings, keeping their order.
    ///
    /// Invalid selectors are logged and skipped.
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selectors = selectors
            .into_iter()
            .filter_map(|source| {
                let source = source.as_ref().trim();
                match parse_selector(source) {
                    Ok(selector) => Some(ContentSelector { source: source.to_string(), selector }),
                    Err(e) => {
                        tracing::warn!(selector = source, error = %e, "skipping invalid content selector");
                        None
                    }
                }
            })
            .collect();
        Self { selectors }
    }

    /// Parses one selector per line; blank lines and `# ` comments are
    /// ignored, while `#id` lines are selectors.
    pub fn parse_string(content: &str) -> Self {
        Self::new(data_lines(content).map(|(_, line)| line))
    }

    /// Reads a selector list file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            LektionError::ConfigError(format!("Cannot open selector file {}: {}", path.as_ref().display(), e))
        })?;
        let list = Self::parse_string(&content);
        if list.is_empty() {
            return Err(LektionError::ConfigError(format!(
                "selector file {} contains no valid selectors",
                path.as_ref().display()
            )));
        }
        Ok(list)
    }

    /// Number of usable selectors.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Iterates the selectors in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &ContentSelector> {
        self.selectors.iter()
    }

    /// Returns the first element, trying selectors in order, whose stripped
    /// text is longer than `min_chars`, along with the selector that found it.
    ///
    /// Only the first match of each selector is considered.
    pub fn find_content<'a>(&'a self, doc: &'a Document, min_chars: usize) -> Option<(Element<'a>, &'a str)> {
        self.selectors.iter().find_map(|cs| {
            doc.select_first(&cs.selector)
                .filter(|el| el.stripped_len() > min_chars)
                .map(|el| (el, cs.as_str()))
        })
    }
}
