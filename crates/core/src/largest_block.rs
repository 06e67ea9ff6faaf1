//! Largest paragraph-cluster fallback.
//!
//! When no known selector matches, every container is scored by how much
//! paragraph text it holds and the richest one is taken as the article.

use scraper::Selector;

use crate::parse::{Document, Element, parse_selector};
use crate::strategy::Miss;

/// Tags that are considered potential content containers
const CONTAINER_TAGS: &str = "div, section, main, article";

/// Configuration for largest-block scoring
#[derive(Debug, Clone)]
pub struct BlockConfig {
    /// Paragraphs at or under this many characters do not count
    pub min_paragraph_chars: usize,
    /// The winning container must hold more than this many characters
    pub min_block_chars: usize,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self { min_paragraph_chars: 20, min_block_chars: 150 }
    }
}

/// A container with its relevance score.
#[derive(Debug, Clone)]
pub struct ContentCandidate<'a> {
    /// The container element
    pub element: Element<'a>,
    /// Character count of its qualifying paragraphs joined with single spaces
    pub score: usize,
}

/// Scores one container: qualifying `<p>` descendants joined with a space.
fn score_container(element: &Element<'_>, paragraph: &Selector, config: &BlockConfig) -> usize {
    let lengths: Vec<usize> = element
        .select_parsed(paragraph)
        .iter()
        .map(Element::stripped_len)
        .filter(|len| *len > config.min_paragraph_chars)
        .collect();

    if lengths.is_empty() { 0 } else { lengths.iter().sum::<usize>() + lengths.len() - 1 }
}

/// Picks the container with the highest paragraph score.
///
/// Containers are visited in document order and only a strictly higher score
/// replaces the current best, so the earliest container wins a tie.
pub fn find_largest_block<'a>(doc: &'a Document, config: &BlockConfig) -> Result<ContentCandidate<'a>, Miss> {
    let (containers, paragraph) = match (parse_selector(CONTAINER_TAGS), parse_selector("p")) {
        (Ok(c), Ok(p)) => (c, p),
        _ => return Err(Miss::new("container selectors failed to compile")),
    };

    let mut best: Option<ContentCandidate<'a>> = None;
    for element in doc.select_parsed(&containers) {
        let score = score_container(&element, &paragraph, config);
        if score > best.as_ref().map_or(0, |b| b.score) {
            best = Some(ContentCandidate { element, score });
        }
    }

    let best = best.ok_or_else(|| Miss::new("no container holds paragraph text"))?;

    let total = best.element.stripped_len();
    if total < config.min_block_chars {
        return Err(Miss::new(format!(
            "largest block has {} characters (need {})",
            total, config.min_block_chars
        )));
    }

    tracing::debug!(tag = %best.element.tag_name(), score = best.score, "largest block selected");
    Ok(best)
}
