//! Row ingestion endpoint
//!
//! Accepts rows that a spreadsheet reader already turned into JSON objects
//! (column header to cell). Numeric and boolean cells are taken as their
//! text form; `null` is an empty cell.

use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, Json};
use labelqr_common::{ingest, Entry, RawRow};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub rows: Vec<HashMap<String, Value>>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub count: usize,
    /// In request row order
    pub entries: Vec<Entry>,
}

/// POST /api/ingest
pub async fn ingest_rows(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> ApiResult<(StatusCode, Json<IngestResponse>)> {
    let rows = request
        .rows
        .into_iter()
        .map(raw_row)
        .collect::<ApiResult<Vec<_>>>()?;

    let sender = state.config.read().await.sender.clone();
    let entries = ingest(&rows, &sender, &state.store).await?;

    info!("Created {} label entries", entries.len());
    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            count: entries.len(),
            entries,
        }),
    ))
}

fn raw_row(cells: HashMap<String, Value>) -> ApiResult<RawRow> {
    cells
        .into_iter()
        .map(|(column, cell)| -> ApiResult<(String, Option<String>)> {
            let text = cell_text(&column, cell)?;
            Ok((column, text))
        })
        .collect()
}

fn cell_text(column: &str, cell: Value) -> ApiResult<Option<String>> {
    match cell {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ApiError::BadRequest(format!(
            "Column '{}' must hold a scalar value",
            column
        ))),
    }
}
