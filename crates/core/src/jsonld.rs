//! JSON-LD structured data.
//!
//! Many news sites render `<script type="application/ld+json">` on the
//! server even when the visible article is hydrated by JavaScript, which
//! makes it the cheapest and most reliable source of an article body.

use serde_json::Value;

use crate::parse::{Document, parse_selector};

/// Schema.org types accepted as article-bearing.
pub const ARTICLE_TYPES: &[&str] = &["Article", "NewsArticle", "WebPage", "BlogPosting"];

const LD_JSON_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

/// Headline and body taken from a JSON-LD object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredArticle {
    /// `headline`, falling back to `name`; `None` when both are blank.
    pub headline: Option<String>,
    /// `articleBody`, falling back to `description`.
    pub body: String,
}

/// Scans every JSON-LD block and returns the first qualifying article.
///
/// A block qualifies when its `@type` is one of [`ARTICLE_TYPES`] and its
/// `articleBody` (or, failing that, `description`) is longer than
/// `min_body_chars`. Blocks that fail to parse are skipped.
pub fn find_article(doc: &Document, min_body_chars: usize) -> Option<StructuredArticle> {
    let selector = parse_selector(LD_JSON_SELECTOR).ok()?;

    for (index, script) in doc.select_parsed(&selector).iter().enumerate() {
        let raw = script.text();
        let value = match serde_json::from_str::<Value>(raw.trim()) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(block = index, error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        if let Some(article) = candidates(value)
            .iter()
            .filter(|item| has_article_type(item))
            .find_map(|item| article_from(item, min_body_chars))
        {
            return Some(article);
        }
    }

    None
}

/// Flattens a JSON-LD payload into a list of candidate objects.
///
/// Handles a single object, an object carrying an `@graph` array, and a
/// top-level array (whose members may themselves carry `@graph`).
fn candidates(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(candidates).collect(),
        Value::Object(mut obj) => match obj.remove("@graph") {
            Some(Value::Array(graph)) => graph.into_iter().filter(Value::is_object).collect(),
            Some(other) if other.is_object() => vec![other],
            _ => vec![Value::Object(obj)],
        },
        _ => Vec::new(),
    }
}

fn has_article_type(item: &Value) -> bool {
    match item.get("@type") {
        Some(Value::String(t)) => ARTICLE_TYPES.contains(&t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| ARTICLE_TYPES.contains(&t)),
        _ => false,
    }
}

fn non_blank_str<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

fn article_from(item: &Value, min_body_chars: usize) -> Option<StructuredArticle> {
    let body = ["articleBody", "description"]
        .iter()
        .filter_map(|key| non_blank_str(item, key))
        .find(|body| body.chars().count() > min_body_chars)?;

    let headline = non_blank_str(item, "headline")
        .or_else(|| non_blank_str(item, "name"))
        .map(str::to_string);

    Some(StructuredArticle { headline, body: body.to_string() })
}
