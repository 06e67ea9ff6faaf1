//! Request dispatch: source in, lesson out.
//!
//! [`LessonService`] ties the extractors to the lesson client. It is shared
//! read-only between requests and holds no per-request state.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::article::ExtractionResult;
use crate::feed::{FeedConfig, random_article_url};
use crate::lesson::{LessonClient, LessonConfig, LessonPayload};
use crate::orchestrator::{Extractor, ExtractorConfig};
use crate::pdf::{PdfConfig, extract_pdf_text, title_from_filename};
use crate::sites::NachrichtenleichtStrategy;
use crate::strategy::DirectPipeline;
use crate::{LektionError, Result};

/// Filename assumed when a PDF upload carries none.
pub const DEFAULT_PDF_FILENAME: &str = "document.pdf";

/// Where the lesson text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LessonSource {
    /// A base64-encoded PDF upload.
    Pdf { data: String, filename: String },
    /// A web article.
    Url { url: String },
    /// A random article from the configured feed.
    Random,
}

/// A generated lesson, stamped with its origin.
///
/// The payload keys are flattened next to `source_url` and `generated_at`
/// when serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub source_url: String,
    /// RFC 3339 timestamp.
    pub generated_at: String,
    #[serde(flatten)]
    pub payload: LessonPayload,
}

/// Text gathered for a lesson, before the model sees it.
#[derive(Debug, Clone)]
pub struct SourceText {
    pub source_url: String,
    pub extraction: ExtractionResult,
}

/// Settings for every collaborator of the service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub extractor: ExtractorConfig,
    pub pdf: PdfConfig,
    pub feed: FeedConfig,
    pub lesson: LessonConfig,
    /// Trimmed content must have at least this many characters (default: 100)
    pub min_lesson_chars: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorConfig::default(),
            pdf: PdfConfig::default(),
            feed: FeedConfig::default(),
            lesson: LessonConfig::default(),
            min_lesson_chars: 100,
        }
    }
}

/// Turns a [`LessonSource`] into a [`Lesson`].
#[derive(Debug)]
pub struct LessonService {
    extractor: Extractor,
    /// Same settings as `extractor`, with the feed site's strategy tried first.
    feed_extractor: Extractor,
    lesson: LessonClient,
    pdf: PdfConfig,
    feed: FeedConfig,
    min_lesson_chars: usize,
}

impl LessonService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let feed_pipeline = DirectPipeline::with_selectors(config.extractor.selectors.clone())
            .prepend(Box::new(NachrichtenleichtStrategy::default()));
        Ok(Self {
            feed_extractor: Extractor::with_pipeline(config.extractor.clone(), feed_pipeline),
            extractor: Extractor::with_config(config.extractor),
            lesson: LessonClient::new(config.lesson)?,
            pdf: config.pdf,
            feed: config.feed,
            min_lesson_chars: config.min_lesson_chars,
        })
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Collects the text for `source` without calling the model.
    pub async fn gather(&self, source: &LessonSource) -> Result<SourceText> {
        match source {
            LessonSource::Pdf { data, filename } => {
                let (data, config) = (data.clone(), self.pdf.clone());
                let content = tokio::task::spawn_blocking(move || extract_pdf_text(&data, &config))
                    .await
                    .map_err(|e| LektionError::InvalidPdf(format!("PDF worker stopped: {}", e)))??;
                Ok(SourceText {
                    source_url: format!("PDF: {}", filename),
                    extraction: ExtractionResult::new(title_from_filename(filename), content),
                })
            }
            LessonSource::Url { url } => {
                let extraction = self.extractor.extract(url).await?;
                Ok(SourceText { source_url: url.clone(), extraction })
            }
            LessonSource::Random => {
                let url = random_article_url(&self.feed).await?;
                let extraction = self.feed_extractor.extract(&url).await?;
                if extraction.content.trim().chars().count() < self.feed.min_article_chars {
                    return Err(LektionError::ArticleTooShort);
                }
                Ok(SourceText { source_url: url, extraction })
            }
        }
    }

    /// Builds a lesson from `source`.
    ///
    /// # Errors
    ///
    /// Fails with [`LektionError::InsufficientContent`] when the gathered
    /// text has fewer than 100 characters once trimmed, and otherwise
    /// propagates extraction and model errors unchanged.
    pub async fn generate(&self, api_key: &str, source: &LessonSource) -> Result<Lesson> {
        let text = self.gather(source).await?;
        self.compose(api_key, text).await
    }

    /// Builds a lesson from text that was already gathered.
    pub async fn compose(&self, api_key: &str, text: SourceText) -> Result<Lesson> {
        let SourceText { source_url, extraction } = text;

        if extraction.content.trim().chars().count() < self.min_lesson_chars {
            return Err(LektionError::InsufficientContent);
        }

        let payload = self.lesson.generate(api_key, &extraction.title, &extraction.content).await?;
        Ok(Lesson { source_url, generated_at: now_rfc3339(), payload })
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}
