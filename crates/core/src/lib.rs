//! Article and PDF text extraction for LLM-generated language lessons.
//!
//! The crate is organised around one flow: gather text from a source
//! (web page, PDF upload or random feed article), then hand it to a
//! chat-completion model that returns a structured lesson.
//!
//! - [`Extractor`] turns a URL into an [`ExtractionResult`], trying the
//!   direct strategies first and a reader proxy second.
//! - [`pdf::extract_pdf_text`] does the same for base64 PDF uploads.
//! - [`LessonService`] dispatches a [`LessonSource`] and calls the model.

pub mod article;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod jsonld;
pub mod largest_block;
pub mod lesson;
pub mod noise;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod pdf;
pub mod reader;
pub mod selectors;
pub mod service;
pub mod sites;
pub mod strategy;
pub mod text;

pub use article::{DEFAULT_TITLE, ExtractionResult};
pub use error::{LektionError, Result};
pub use feed::{FeedConfig, random_article_url};
pub use fetch::{FetchConfig, RawDocument, fetch_url, normalize_url};
pub use lesson::{LessonClient, LessonConfig, LessonPayload, PROMPT_VERSION};
pub use noise::{NoiseConfig, strip_noise, strip_noise_document};
pub use normalize::NormalizeConfig;
pub use orchestrator::{Extractor, ExtractorConfig, ExtractorConfigBuilder};
pub use parse::Document;
pub use pdf::PdfConfig;
pub use reader::ReaderConfig;
pub use selectors::SelectorList;
pub use service::{Lesson, LessonService, LessonSource, ServiceConfig, SourceText};
pub use sites::NachrichtenleichtStrategy;
pub use strategy::{ContentStrategy, DirectPipeline, Miss, Page};
