//! HTTP front-end for lesson generation.
//!
//! Exposes `POST /api/process` (also mounted at `POST /`) and `GET /health`.

pub mod config;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Method, header};
use axum::routing::{get, post};
use lektion_core::{LessonService, Result};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<LessonService>,
    /// Request body limit enforced by [`app`].
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        Ok(Self {
            service: Arc::new(LessonService::new(config.service.clone())?),
            max_body_bytes: config.max_body_bytes,
        })
    }
}

fn cors() -> CorsLayer {
    const ALLOWED_HEADERS: [HeaderName; 1] = [header::CONTENT_TYPE];
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS)
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    let limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/", post(routes::process).options(routes::preflight))
        .route("/api/process", post(routes::process).options(routes::preflight))
        .route("/health", get(routes::health))
        .layer(limit)
        .layer(CompressionLayer::new())
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
