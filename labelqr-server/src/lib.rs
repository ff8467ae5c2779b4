//! labelqr-server library - HTTP surface over the LabelQR core
//!
//! Ingests spreadsheet rows into stored label entries, lists and clears the
//! entry history, decodes scanned payloads, and edits the sender settings.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use labelqr_common::config::TomlConfig;
use labelqr_common::SqliteEntryStore;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Entry store over the SQLite pool
    pub store: SqliteEntryStore,
    /// Current configuration; the sender is snapshotted per request
    pub config: Arc<RwLock<TomlConfig>>,
    /// Where settings changes are written back
    pub config_path: PathBuf,
}

impl AppState {
    pub fn new(store: SqliteEntryStore, config: TomlConfig, config_path: PathBuf) -> Self {
        Self {
            store,
            config: Arc::new(RwLock::new(config)),
            config_path,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/ingest", post(api::ingest_rows))
        .route(
            "/api/entries",
            get(api::list_entries).delete(api::clear_entries),
        )
        .route("/api/entries/:reference_id", get(api::get_entry))
        .route("/api/scan", post(api::scan_payload))
        .route(
            "/api/settings/sender",
            get(api::get_sender_settings).put(api::update_sender_settings),
        );

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
