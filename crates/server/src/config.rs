//! Server configuration.
//!
//! Everything is read from environment variables with production defaults,
//! so the binary runs without any configuration. [`ServerConfig::from_lookup`]
//! takes the variable source as a function so tests never touch the process
//! environment.

use std::env;

use lektion_core::{LektionError, NoiseConfig, Result, SelectorList, ServiceConfig};

pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_LLM_BASE_URL: &str = "LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "LLM_MODEL";
pub const ENV_LLM_TIMEOUT_SECS: &str = "LLM_TIMEOUT_SECS";
pub const ENV_READER_BASE_URL: &str = "READER_BASE_URL";
pub const ENV_FEED_URL: &str = "FEED_URL";
pub const ENV_SELECTORS_FILE: &str = "LEKTION_SELECTORS_FILE";
pub const ENV_NOISE_FILE: &str = "LEKTION_NOISE_FILE";
pub const ENV_MAX_BODY_BYTES: &str = "MAX_BODY_BYTES";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
/// Base64 inflates by a third, so this admits PDFs of roughly 15 MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Runtime configuration of the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP bind address (host:port).
    pub bind_addr: String,
    /// Largest accepted request body in bytes.
    pub max_body_bytes: usize,
    /// Settings handed to the lesson service.
    pub service: ServiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            service: ServiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(addr) = get(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(limit) = get(ENV_MAX_BODY_BYTES) {
            config.max_body_bytes = limit.parse().map_err(|_| {
                LektionError::ConfigError(format!("{} must be a number of bytes, got '{}'", ENV_MAX_BODY_BYTES, limit))
            })?;
        }
        if let Some(base) = get(ENV_LLM_BASE_URL) {
            config.service.lesson.base_url = base;
        }
        if let Some(model) = get(ENV_LLM_MODEL) {
            config.service.lesson.model = model;
        }
        if let Some(timeout) = get(ENV_LLM_TIMEOUT_SECS) {
            config.service.lesson.timeout = timeout.parse().map_err(|_| {
                LektionError::ConfigError(format!("{} must be a number of seconds, got '{}'", ENV_LLM_TIMEOUT_SECS, timeout))
            })?;
        }
        if let Some(reader) = get(ENV_READER_BASE_URL) {
            config.service.extractor.reader.base_url = reader;
        }
        if let Some(feed) = get(ENV_FEED_URL) {
            config.service.feed.url = feed;
        }
        if let Some(path) = get(ENV_SELECTORS_FILE) {
            config.service.extractor.selectors = SelectorList::parse_file(&path)?;
        }
        if let Some(path) = get(ENV_NOISE_FILE) {
            config.service.extractor.noise = NoiseConfig::with_rules_file(&path)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.max_body_bytes, 20 * 1024 * 1024);
        assert_eq!(config.service.lesson.model, "llama-3.3-70b-versatile");
        assert_eq!(config.service.extractor.reader.base_url, "https://r.jina.ai/");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            (ENV_BIND_ADDR, "0.0.0.0:3000"),
            (ENV_MAX_BODY_BYTES, "1048576"),
            (ENV_LLM_BASE_URL, "http://localhost:11434/v1"),
            (ENV_LLM_MODEL, "llama3"),
            (ENV_LLM_TIMEOUT_SECS, "120"),
            (ENV_FEED_URL, "https://feed.example/rss"),
            (ENV_READER_BASE_URL, "  "),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.max_body_bytes, 1_048_576);
        assert_eq!(config.service.lesson.base_url, "http://localhost:11434/v1");
        assert_eq!(config.service.lesson.model, "llama3");
        assert_eq!(config.service.lesson.timeout, 120);
        assert_eq!(config.service.feed.url, "https://feed.example/rss");
        assert_eq!(config.service.extractor.reader.base_url, "https://r.jina.ai/");
    }

    #[test]
    fn test_invalid_timeout() {
        let result = ServerConfig::from_lookup(lookup(&[(ENV_LLM_TIMEOUT_SECS, "soon")]));
        assert!(matches!(result, Err(LektionError::ConfigError(_))));

        let result = ServerConfig::from_lookup(lookup(&[(ENV_MAX_BODY_BYTES, "20MB")]));
        assert!(matches!(result, Err(LektionError::ConfigError(_))));
    }

    #[test]
    fn test_missing_list_files() {
        let result = ServerConfig::from_lookup(lookup(&[(ENV_SELECTORS_FILE, "/nonexistent/selectors.txt")]));
        assert!(matches!(result, Err(LektionError::ConfigError(_))));

        let result = ServerConfig::from_lookup(lookup(&[(ENV_NOISE_FILE, "/nonexistent/noise.txt")]));
        assert!(matches!(result, Err(LektionError::ConfigError(_))));
    }
}
