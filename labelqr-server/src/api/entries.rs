//! Entry history: list, point lookup, clear-all
//!
//! There is no per-entry delete.

use axum::{
    extract::{Path, State},
    Json,
};
use labelqr_common::{Entry, EntryStore};
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EntryListResponse {
    pub total: usize,
    /// Most recent first
    pub entries: Vec<Entry>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub cleared: bool,
}

/// GET /api/entries
pub async fn list_entries(State(state): State<AppState>) -> Json<EntryListResponse> {
    let entries = state.store.get_all().await;
    Json(EntryListResponse {
        total: entries.len(),
        entries,
    })
}

/// GET /api/entries/:reference_id
pub async fn get_entry(
    State(state): State<AppState>,
    Path(reference_id): Path<String>,
) -> ApiResult<Json<Entry>> {
    state
        .store
        .get(&reference_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No entry with reference id {}", reference_id)))
}

/// DELETE /api/entries
pub async fn clear_entries(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    if !state.store.clear_all().await {
        return Err(ApiError::Persistence("Failed to clear entries".to_string()));
    }

    info!("Entry history cleared");
    Ok(Json(ClearResponse { cleared: true }))
}
