//! Scan endpoint: payload text from a front-end QR detector to display text

use axum::Json;
use labelqr_common::codec::{DecodedArtist, DecodedSender};
use labelqr_common::scan::scan;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub qr_data: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    /// False when no known tag was found in the payload
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<DecodedSender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<DecodedArtist>,
    pub formatted_result: String,
}

/// POST /api/scan
pub async fn scan_payload(Json(request): Json<ScanRequest>) -> ApiResult<Json<ScanResponse>> {
    let payload = request
        .qr_data
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("No QR data received".to_string()))?;

    let result = scan(&payload);
    info!("Scan result:\n{}", result.formatted);

    Ok(Json(ScanResponse {
        success: result.is_recognized(),
        sender: result.decoded.sender().cloned(),
        artist: result.decoded.artist().cloned(),
        formatted_result: result.formatted,
    }))
}
