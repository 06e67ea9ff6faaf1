//! HTTP handlers for the lesson API.
//!
//! Every response body uses the same envelope: `{"success": true, "data": ...}`
//! on success and `{"success": false, "error": "..."}` on failure.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lektion_core::service::DEFAULT_PDF_FILENAME;
use lektion_core::{Lesson, LektionError, LessonSource};
use serde::Deserialize;
use serde_json::json;

use crate::AppState;

/// Body of `POST /api/process`.
///
/// Every field is optional at the parsing level so that missing or `null`
/// fields produce the API's own validation messages.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProcessRequest {
    pub api_key: Option<String>,
    pub mode: Option<String>,
    pub url: Option<String>,
    pub pdf_data: Option<String>,
    pub filename: Option<String>,
}

impl ProcessRequest {
    /// Validates the request and returns the trimmed API key and the source.
    ///
    /// The API key is checked before the mode, so a request without a key is
    /// rejected the same way whatever else it contains.
    pub fn into_source(self) -> Result<(String, LessonSource), LektionError> {
        let api_key = self.api_key.as_deref().unwrap_or_default().trim().to_string();
        if api_key.is_empty() {
            return Err(LektionError::Validation("API key is required".to_string()));
        }

        let source = match self.mode.as_deref().unwrap_or_default() {
            "pdf" => {
                let data = self.pdf_data.filter(|data| !data.is_empty());
                let Some(data) = data else {
                    return Err(LektionError::Validation("No PDF data provided".to_string()));
                };
                LessonSource::Pdf { data, filename: self.filename.unwrap_or_else(|| DEFAULT_PDF_FILENAME.to_string()) }
            }
            "url" => {
                let url = self.url.as_deref().unwrap_or_default().trim();
                if url.is_empty() {
                    return Err(LektionError::Validation("No URL provided".to_string()));
                }
                LessonSource::Url { url: url.to_string() }
            }
            "random" => LessonSource::Random,
            other => return Err(LektionError::Validation(format!("Unknown mode: {}", other))),
        };

        Ok((api_key, source))
    }
}

/// A failed request, rendered as the error envelope.
#[derive(Debug)]
pub struct ApiError(LektionError);

impl From<LektionError> for ApiError {
    fn from(err: LektionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() { StatusCode::BAD_REQUEST } else { StatusCode::INTERNAL_SERVER_ERROR };
        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed");
        }
        (status, Json(json!({ "success": false, "error": self.0.to_string() }))).into_response()
    }
}

/// `POST /api/process` and `POST /`.
pub async fn process(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let body = body.map_err(|rejection| body_error(&rejection, state.max_body_bytes))?;
    let request: ProcessRequest = serde_json::from_slice(&body)
        .map_err(|e| LektionError::Validation(format!("Invalid JSON body: {}", e)))?;
    let (api_key, source) = request.into_source()?;

    let lesson: Lesson = state.service.generate(&api_key, &source).await?;
    tracing::info!(source_url = %lesson.source_url, "lesson generated");

    Ok(Json(json!({ "success": true, "data": lesson })))
}

/// Maps a body read failure onto a validation error so it keeps the envelope.
fn body_error(rejection: &BytesRejection, limit: usize) -> LektionError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        LektionError::Validation(format!("Request body too large (limit {} bytes)", limit))
    } else {
        LektionError::Validation(format!("Could not read request body: {}", rejection.body_text()))
    }
}

/// CORS preflight. The CORS layer adds the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// `GET /health`.
pub async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: serde_json::Value) -> ProcessRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_missing_key_wins_over_mode() {
        for mode in ["pdf", "url", "random", "bogus", ""] {
            let err = request(json!({ "mode": mode })).into_source().unwrap_err();
            assert_eq!(err.to_string(), "API key is required");
        }
        let err = request(json!({ "api_key": "   ", "mode": "url", "url": "x" })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "API key is required");
    }

    #[test]
    fn test_null_fields_are_treated_as_missing() {
        let err = request(json!({ "api_key": null, "mode": "url", "url": "x" })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "API key is required");

        let err = request(json!({ "api_key": "k", "mode": "pdf", "pdf_data": null })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "No PDF data provided");

        let err = request(json!({ "api_key": "k", "mode": "url", "url": null })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "No URL provided");

        let err = request(json!({ "api_key": "k", "mode": null })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "Unknown mode: ");

        let (_, source) = request(json!({ "api_key": "k", "mode": "pdf", "pdf_data": "JVBERi0=", "filename": null }))
            .into_source()
            .unwrap();
        assert_eq!(source, LessonSource::Pdf { data: "JVBERi0=".into(), filename: "document.pdf".into() });
    }

    #[test]
    fn test_mode_validation() {
        let err = request(json!({ "api_key": "k", "mode": "pdf" })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "No PDF data provided");

        let err = request(json!({ "api_key": "k", "mode": "url", "url": "  " })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "No URL provided");

        let err = request(json!({ "api_key": "k", "mode": "video" })).into_source().unwrap_err();
        assert_eq!(err.to_string(), "Unknown mode: video");
    }

    #[test]
    fn test_sources() {
        let (key, source) = request(json!({ "api_key": " k ", "mode": "url", "url": " tagesschau.de " }))
            .into_source()
            .unwrap();
        assert_eq!(key, "k");
        assert_eq!(source, LessonSource::Url { url: "tagesschau.de".into() });

        let (_, source) = request(json!({ "api_key": "k", "mode": "pdf", "pdf_data": "JVBERi0=" }))
            .into_source()
            .unwrap();
        assert_eq!(source, LessonSource::Pdf { data: "JVBERi0=".into(), filename: "document.pdf".into() });

        let (_, source) = request(json!({ "api_key": "k", "mode": "random" })).into_source().unwrap();
        assert_eq!(source, LessonSource::Random);
    }
}
