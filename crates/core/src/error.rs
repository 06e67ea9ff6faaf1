//! Error types for Lektion operations.
//!
//! This module defines the main error type [`LektionError`] which represents
//! every failure that can reach a caller: request validation, exhausted
//! extraction strategies, PDF decoding and upstream LLM failures.
//!
//! Per-strategy misses inside the extraction pipeline are *not* errors; they
//! are reported with [`crate::strategy::Miss`] and only become a
//! [`LektionError::ExtractionFailed`] once every strategy is exhausted.
//!
//! # Example
//!
//! ```rust
//! use lektion_core::{LektionError, Result};
//!
//! fn require_key(key: &str) -> Result<&str> {
//!     if key.trim().is_empty() {
//!         return Err(LektionError::Validation("API key is required".to_string()));
//!     }
//!     Ok(key.trim())
//! }
//! # assert!(require_key(" ").is_err());
//! ```

use thiserror::Error;

/// Main error type for extraction and lesson generation.
///
/// The `Display` output of each variant is the human-readable diagnostic the
/// HTTP handler returns in its `error` field, so messages are written for end
/// users rather than developers.
#[derive(Error, Debug)]
pub enum LektionError {
    /// HTTP transport errors from reqwest (DNS, connection, TLS, body read).
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The remote server answered with a non-success status.
    #[error("{status} error for {url}")]
    HttpStatus { status: u16, url: String },

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A required request field is missing or malformed.
    ///
    /// This is the only variant that maps to a client error (HTTP 400).
    #[error("{0}")]
    Validation(String),

    /// Every extraction strategy failed.
    ///
    /// `details` holds the per-stage failure reasons joined with ` | `.
    #[error(
        "Could not extract readable content from this URL.\nThe site may require JavaScript or block scrapers.\nTry copying the article text and using PDF upload instead.\nDetails: {details}"
    )]
    ExtractionFailed { details: String },

    /// Extracted text was too short to build a lesson from.
    #[error("Not enough text found. Try a different source.")]
    InsufficientContent,

    /// The random feed article was too short to be worth a lesson.
    #[error("Article content too short, please try again.")]
    ArticleTooShort,

    /// The LLM provider rejected the credential (HTTP 401).
    #[error("invalid_api_key: Your API key is invalid or expired.")]
    UpstreamAuth,

    /// The LLM provider is rate limiting us (HTTP 429).
    #[error("rate_limit: Too many requests. Please wait and try again.")]
    UpstreamRateLimit,

    /// Any other non-200 answer from the LLM provider.
    ///
    /// `body` is already cut to a short prefix of the response body.
    #[error("llm_error_{status}: {body}")]
    UpstreamProvider { status: u16, body: String },

    /// The LLM answered, but not with a JSON object we can pass through.
    #[error("Malformed response from language model: {0}")]
    MalformedUpstreamResponse(String),

    /// An optional capability was compiled out.
    #[error("{0}")]
    UnsupportedFeature(String),

    /// The PDF payload could not be opened.
    #[error("Could not read PDF: {0}")]
    InvalidPdf(String),

    /// The PDF opened but no page carried selectable text.
    #[error("No selectable text found in PDF. It may be a scanned image.")]
    UnreadablePdf,

    /// The PDF payload was not valid base64.
    #[error("Invalid base64 PDF data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// RSS feed errors, already phrased for the end user.
    #[error("{0}")]
    Feed(String),

    /// Invalid configuration, e.g. a noise rule that is not a valid regex.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LektionError {
    /// Whether the error was caused by the caller's input.
    ///
    /// The request handler answers these with 400 and everything else with 500.
    pub fn is_client_error(&self) -> bool {
        matches!(self, LektionError::Validation(_))
    }

    /// Converts a reqwest error, folding timeouts into [`LektionError::Timeout`].
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: u64) -> Self {
        if err.is_timeout() { LektionError::Timeout { timeout } } else { LektionError::HttpError(err) }
    }
}

/// Result type alias for LektionError.
pub type Result<T> = std::result::Result<T, LektionError>;
