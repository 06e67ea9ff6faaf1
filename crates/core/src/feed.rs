//! Random article selection from an RSS feed.

use rand::Rng;
use rand::seq::SliceRandom;
use rss::Channel;

use crate::fetch::{FetchConfig, fetch_bytes};
use crate::{LektionError, Result};

/// Easy-German news feed used by the `random` mode.
pub const DEFAULT_FEED_URL: &str = "https://www.nachrichtenleicht.de/nachrichtenleicht-nachrichten-100.rss";

/// Configuration for the feed picker
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Picked articles with less text than this are rejected (default: 200)
    pub min_article_chars: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { url: DEFAULT_FEED_URL.to_string(), timeout: 10, min_article_chars: 200 }
    }
}

/// Whether a feed link points at a single article page.
///
/// Overview pages end in `-100.html` and audio items mention `podcast`.
pub fn is_article_link(link: &str) -> bool {
    link.ends_with(".html") && !link.contains("-100.html") && !link.contains("podcast")
}

/// Collects the article links of a channel, in feed order.
pub fn article_links(channel: &Channel) -> Vec<String> {
    channel
        .items()
        .iter()
        .filter_map(|item| item.link())
        .map(str::trim)
        .filter(|link| is_article_link(link))
        .map(str::to_string)
        .collect()
}

/// Picks one article link uniformly at random.
pub fn pick_article_link<R: Rng + ?Sized>(channel: &Channel, rng: &mut R) -> Result<String> {
    article_links(channel)
        .choose(rng)
        .cloned()
        .ok_or_else(|| LektionError::Feed("Could not find any valid article links.".to_string()))
}

/// Parses RSS bytes into a channel.
pub fn parse_channel(bytes: &[u8]) -> Result<Channel> {
    Channel::read_from(bytes).map_err(|e| LektionError::Feed(format!("Could not read feed: {}", e)))
}

/// Downloads the feed and returns a random article URL.
pub async fn random_article_url(config: &FeedConfig) -> Result<String> {
    let fetch = FetchConfig::default().with_timeout(config.timeout);
    let bytes = fetch_bytes(&config.url, &fetch).await?;
    let channel = parse_channel(&bytes)?;

    let link = pick_article_link(&channel, &mut rand::thread_rng())?;
    tracing::info!(link = %link, items = channel.items().len(), "picked random feed article");
    Ok(link)
}
