//! PDF text extraction.
//!
//! Uploaded PDFs arrive base64-encoded. Pages are extracted one by one so
//! that near-empty pages (covers, image-only pages) can be dropped before
//! the text is assembled.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::text::{MAX_CONTENT_CHARS, collapse_blank_lines, truncate_with_marker};
use crate::{LektionError, Result};

/// Configuration for PDF extraction
#[derive(Debug, Clone)]
pub struct PdfConfig {
    /// Pages at or under this many characters are dropped
    pub min_page_chars: usize,
    /// Output ceiling before the truncation marker is appended
    pub max_chars: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_page_chars: 50, max_chars: MAX_CONTENT_CHARS }
    }
}

/// Decodes a base64 PDF payload.
///
/// Whitespace and a leading `data:...;base64,` prefix are tolerated.
pub fn decode_pdf_data(data: &str) -> Result<Vec<u8>> {
    let payload = match data.trim().split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => data,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

/// Joins per-page text into one body.
///
/// Each page has runs of three or more newlines collapsed and is trimmed;
/// pages at or under `min_page_chars` are dropped. Fails with
/// [`LektionError::UnreadablePdf`] when no page survives.
pub fn assemble_pages<I, S>(pages: I, config: &PdfConfig) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let kept: Vec<String> = pages
        .into_iter()
        .map(|page| collapse_blank_lines(page.as_ref()).trim().to_string())
        .filter(|page| page.chars().count() > config.min_page_chars)
        .collect();

    if kept.is_empty() {
        return Err(LektionError::UnreadablePdf);
    }

    Ok(truncate_with_marker(&kept.join("\n\n"), config.max_chars))
}

/// Derives a lesson title from an upload's filename.
///
/// # Example
///
/// ```rust
/// use lektion_core::pdf::title_from_filename;
///
/// assert_eq!(title_from_filename("mein_kurzer-text.pdf"), "mein kurzer text");
/// ```
pub fn title_from_filename(filename: &str) -> String {
    filename.replace(".pdf", "").replace(['_', '-'], " ")
}

/// Extracts the text of a base64-encoded PDF.
#[cfg(feature = "pdf")]
pub fn extract_pdf_text(data: &str, config: &PdfConfig) -> Result<String> {
    let bytes = decode_pdf_data(data)?;
    let pages = extract_pages(&bytes)?;
    tracing::debug!(pages = pages.len(), "PDF pages extracted");
    assemble_pages(pages, config)
}

/// Extracts the text of a base64-encoded PDF.
#[cfg(not(feature = "pdf"))]
pub fn extract_pdf_text(_data: &str, _config: &PdfConfig) -> Result<String> {
    Err(LektionError::UnsupportedFeature(
        "PDF support unavailable: built without the `pdf` feature.".to_string(),
    ))
}

/// Runs the PDF library on raw bytes.
///
/// The library panics on some malformed files; a panic is reported as
/// [`LektionError::InvalidPdf`] instead of unwinding into the caller.
#[cfg(feature = "pdf")]
fn extract_pages(bytes: &[u8]) -> Result<Vec<String>> {
    use std::panic::{self, AssertUnwindSafe};

    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem_by_pages(bytes))) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(LektionError::InvalidPdf(e.to_string())),
        Err(_) => Err(LektionError::InvalidPdf("the PDF parser aborted on this file".to_string())),
    }
}

/// Builds small text PDFs, one text line per page, in the base-14 Courier font.
#[cfg(all(test, feature = "pdf"))]
pub(crate) mod sample {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 10.into()]),
                    Operation::new("Td", vec![40.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }
}
