//! Sender settings endpoints
//!
//! Changes take effect for the next ingest and are written back to the
//! `[sender]` table of the TOML config file; the rest of the file is left
//! as it is on disk.

use axum::{extract::State, Json};
use labelqr_common::config::write_sender_to_toml;
use labelqr_common::SenderInfo;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SenderSettingsResponse {
    pub sender: SenderInfo,
    pub configured: bool,
    pub missing: Vec<&'static str>,
}

impl From<SenderInfo> for SenderSettingsResponse {
    fn from(sender: SenderInfo) -> Self {
        let missing = sender.missing_fields();
        Self {
            configured: missing.is_empty(),
            missing,
            sender,
        }
    }
}

/// GET /api/settings/sender
pub async fn get_sender_settings(State(state): State<AppState>) -> Json<SenderSettingsResponse> {
    let sender = state.config.read().await.sender.clone();
    Json(sender.into())
}

/// PUT /api/settings/sender
///
/// All five fields are required. Values are trimmed before saving.
pub async fn update_sender_settings(
    State(state): State<AppState>,
    Json(sender): Json<SenderInfo>,
) -> ApiResult<Json<SenderSettingsResponse>> {
    let sender = SenderInfo::new(
        sender.name.trim(),
        sender.address.trim(),
        sender.city.trim(),
        sender.state.trim(),
        sender.zip.trim(),
    );

    let missing = sender.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "All fields are required, missing: {}",
            missing.join(", ")
        )));
    }

    // Held across the write so concurrent updates reach the file in order
    let mut config = state.config.write().await;

    let path = state.config_path.clone();
    let to_write = sender.clone();
    tokio::task::spawn_blocking(move || write_sender_to_toml(&to_write, &path))
        .await
        .map_err(|e| ApiError::Internal(format!("Config write task failed: {}", e)))??;

    config.sender = sender.clone();

    info!("Sender settings updated");
    Ok(Json(sender.into()))
}
