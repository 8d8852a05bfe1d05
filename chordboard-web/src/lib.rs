//! chordboard-web library - read-only song explorer
//!
//! Serves the chord database as a small HTML site: decade index, song detail
//! with generated tablature and lyrics, search, and autocomplete suggestions.

use std::path::PathBuf;

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db;
pub mod tab;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
    /// Dataset checkout for lyric files, when available
    pub dataset_root: Option<PathBuf>,
}

impl AppState {
    pub fn new(db: SqlitePool, dataset_root: Option<PathBuf>) -> Self {
        Self { db, dataset_root }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/", get(api::pages::decade_index))
        .route("/decade/:decade", get(api::pages::decade_view))
        .route("/song/:id", get(api::pages::song_detail))
        .route("/search", get(api::search::search_page))
        .route("/api/suggestions", get(api::search::suggestions))
        .merge(api::health::health_routes())
        .with_state(state)
}
