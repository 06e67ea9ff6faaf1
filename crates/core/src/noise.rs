//! Noise stripping: removes non-content subtrees before extraction.
//!
//! Stripping works on the tree html5ever builds, so implied end tags are
//! resolved exactly as they are for extraction: an unclosed `<p class="share">`
//! ends where the parser ends it and never swallows the content after it.
//! Noise nodes are detached from a freshly parsed tree that belongs to the
//! caller. Running it twice yields the same output as running it once.

use std::collections::HashSet;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use scraper::Html;

use crate::parse::Document;
use crate::text::data_lines;
use crate::{LektionError, Result};

/// Tags removed wholesale, together with their content.
pub const DEFAULT_NOISE_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "form", "iframe", "noscript", "svg", "canvas",
];

/// Default class/id rules in the line format accepted by [`NoiseConfig::parse_rules`].
///
/// `teaser` is kept separate so glossary blocks such as `teaser-word-text`
/// survive while ordinary teaser widgets are removed.
pub const DEFAULT_NOISE_RULES: &str = r"
# navigation and page chrome
nav|menu|footer|header|sidebar
# consent and overlays
cookie|popup|banner
# engagement widgets
social|share|related|comment|ad-|widget
teaser unless text
";

/// Elements never removed by class/id rules, whatever their attributes say.
const PROTECTED_TAGS: &[&str] = &["html", "body"];

/// A case-insensitive class/id pattern with an optional exclusion.
///
/// The rule fires when `pattern` matches and `unless` does not match the
/// part of the token that follows the `pattern` match.
#[derive(Debug, Clone)]
pub struct NoiseRule {
    pattern: Regex,
    unless: Option<Regex>,
}

impl NoiseRule {
    /// Compiles a rule. Both patterns are matched case-insensitively.
    pub fn new(pattern: &str, unless: Option<&str>) -> Result<Self> {
        let compile = |p: &str| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| LektionError::ConfigError(format!("invalid noise pattern '{}': {}", p, e)))
        };
        Ok(Self { pattern: compile(pattern)?, unless: unless.map(compile).transpose()? })
    }

    /// Whether this rule matches a single class token or id.
    pub fn matches(&self, token: &str) -> bool {
        self.pattern.find_iter(token).any(|m| match &self.unless {
            Some(unless) => !unless.is_match(&token[m.end()..]),
            None => true,
        })
    }
}

/// Configuration for the noise stripper.
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// Lowercase tag names removed with their content.
    pub tags: HashSet<String>,
    /// Class/id rules.
    pub rules: Vec<NoiseRule>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            tags: DEFAULT_NOISE_TAGS.iter().map(|t| t.to_string()).collect(),
            rules: Self::parse_rules(DEFAULT_NOISE_RULES).expect("default noise rules are valid"),
        }
    }
}

impl NoiseConfig {
    /// Parses class/id rules, one per line.
    ///
    /// Each line is a regex, optionally followed by `unless <regex>`. Blank
    /// lines and `# ` comments are ignored.
    pub fn parse_rules(content: &str) -> Result<Vec<NoiseRule>> {
        data_lines(content)
            .map(|(line_number, line)| {
                let (pattern, unless) = match line.split_once(" unless ") {
                    Some((p, u)) => (p.trim(), Some(u.trim())),
                    None => (line, None),
                };
                NoiseRule::new(pattern, unless)
                    .map_err(|e| LektionError::ConfigError(format!("line {}: {}", line_number, e)))
            })
            .collect()
    }

    /// Replaces the default class/id rules with the ones in `path`.
    ///
    /// The tag denylist is kept.
    pub fn with_rules_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            LektionError::ConfigError(format!("Cannot open noise rule file {}: {}", path.as_ref().display(), e))
        })?;
        let rules = Self::parse_rules(&content)?;
        if rules.is_empty() {
            return Err(LektionError::ConfigError(format!(
                "noise rule file {} contains no rules",
                path.as_ref().display()
            )));
        }
        Ok(Self { rules, ..Self::default() })
    }

    /// Whether an element is noise, by tag or by class/id.
    fn is_noise(&self, el: &scraper::node::Element) -> bool {
        let tag = el.name();
        if self.tags.contains(tag) {
            return true;
        }
        !PROTECTED_TAGS.contains(&tag) && self.matches_attributes(el.id(), el.attr("class"))
    }

    /// Whether an element with these attributes is noise by class/id.
    fn matches_attributes(&self, id: Option<&str>, class: Option<&str>) -> bool {
        if let Some(id) = id
            && self.rules.iter().any(|r| r.matches(id))
        {
            return true;
        }

        class.is_some_and(|class| {
            class
                .split_whitespace()
                .any(|token| self.rules.iter().any(|r| r.matches(token)))
        })
    }
}

/// Parses `html` and returns the document with every noise subtree detached.
pub fn strip_noise_document(html: &str, config: &NoiseConfig) -> Document {
    let mut tree = Html::parse_document(html);

    let noise: Vec<_> = tree
        .tree
        .root()
        .descendants()
        .filter(|node| node.value().as_element().is_some_and(|el| config.is_noise(el)))
        .map(|node| node.id())
        .collect();

    tracing::trace!(removed = noise.len(), "noise subtrees detached");
    for id in noise {
        if let Some(mut node) = tree.tree.get_mut(id) {
            node.detach();
        }
    }

    Document::from_html(tree)
}

/// Removes noise elements from HTML and returns the filtered HTML.
pub fn strip_noise(html: &str, config: &NoiseConfig) -> String {
    strip_noise_document(html, config).to_html()
}
