//! libras-api library interface
//!
//! HTTP backend for a children's Libras learning app: content and image
//! generation through external providers, roadmaps, chat and lesson
//! introductions, persisted in SQLite behind bearer-token auth.

pub mod api;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::auth_middleware::{AuthLayer, AuthSettings};
use crate::services::chat_client::TextModel;
use crate::services::image_fetcher::BoundedImageFetcher;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Text model used for all generation endpoints
    pub text_model: Arc<dyn TextModel>,
    /// Bounded-concurrency image generation fan-out; the semaphore is
    /// per-instance, so this one instance caps the whole process
    pub image_fetcher: Arc<BoundedImageFetcher>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        text_model: Arc<dyn TextModel>,
        image_fetcher: Arc<BoundedImageFetcher>,
    ) -> Self {
        Self {
            db,
            text_model,
            image_fetcher,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
///
/// The auth layer wraps every route; allow-listed paths pass through
/// inside the middleware itself.
pub fn build_router(state: AppState, auth: Arc<AuthSettings>) -> Router {
    Router::new()
        .merge(api::user_routes())
        .merge(api::content_routes())
        .merge(api::roadmap_routes())
        .merge(api::chat_routes())
        .merge(api::introduction_routes())
        .merge(api::health_routes())
        .layer(AuthLayer::new(auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
