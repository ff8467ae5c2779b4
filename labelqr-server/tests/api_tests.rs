//! Integration tests for labelqr-server API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Ingest: success, validation rejection, unconfigured sender
//! - Entry history: ordering, point lookup, clear-all
//! - Scan decoding
//! - Sender settings read/update and write-back

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use labelqr_common::config::{load_toml_config, TomlConfig};
use labelqr_common::db::init_database;
use labelqr_common::{SenderInfo, SqliteEntryStore};
use labelqr_server::{build_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

struct TestApp {
    _dir: TempDir,
    config_path: std::path::PathBuf,
    router: Router,
}

impl TestApp {
    async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Should parse JSON")
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

fn configured_sender() -> SenderInfo {
    SenderInfo::new("Gallery Nine", "42 Harbor Rd", "Portland", "ME", "04101")
}

/// Test helper: app over a fresh database in a temp directory
async fn setup_app(sender: SenderInfo) -> TestApp {
    setup_app_with_config(TomlConfig {
        sender,
        ..TomlConfig::default()
    })
    .await
}

async fn setup_app_with_config(config: TomlConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("labelqr.db"))
        .await
        .expect("Should create test database");
    let config_path = dir.path().join("labelqr.toml");

    let state = AppState::new(SqliteEntryStore::new(pool), config, config_path.clone());
    TestApp {
        _dir: dir,
        config_path,
        router: build_router(state),
    }
}

fn artist_row(name: &str) -> Value {
    json!({
        "Artist Name": name,
        "Phone": "555-0100",
        "Address: Address Line 1": "123 Main",
        "Address: Address Line 2": "",
        "Address: City": "Springfield",
        "Address: State": null,
        "Address: Zip/Postal Code": 12345,
        "Address: Country": "  "
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(configured_sender()).await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "labelqr-server");
    assert!(body["version"].is_string());
}

// =============================================================================
// Ingest
// =============================================================================

#[tokio::test]
async fn test_ingest_creates_entries_in_order() {
    let app = setup_app(configured_sender()).await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/ingest",
            json!({ "rows": [artist_row("First"), artist_row("Second")] }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 2);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries[0]["artist"]["name"], "First");
    assert_eq!(entries[1]["artist"]["name"], "Second");
    assert_eq!(entries[0]["artist"]["address"], "123 Main, Springfield, 12345");
    assert_eq!(entries[0]["sender"]["name"], "Gallery Nine");
    assert_eq!(entries[0]["reference_id"].as_str().unwrap().len(), 8);
    assert_ne!(entries[0]["reference_id"], entries[1]["reference_id"]);

    let payload = entries[0]["payload"].as_str().unwrap();
    assert!(payload.starts_with("SR:\nNM: Gallery Nine\n"));
    assert!(payload.ends_with("AT:\nNM: First\nPH: 555-0100\nADD: 123 Main, Springfield, 12345"));
}

#[tokio::test]
async fn test_ingest_missing_artist_name_rejects_batch() {
    let app = setup_app(configured_sender()).await;

    let (status, body) = app
        .send_json(
            "POST",
            "/api/ingest",
            json!({ "rows": [artist_row("Good"), { "Phone": "555" }] }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("Artist Name"));

    let (_, list) = app.get("/api/entries").await;
    assert_eq!(list["total"], 0);
}

#[tokio::test]
async fn test_ingest_requires_configured_sender() {
    let app = setup_app(SenderInfo::default()).await;

    let (status, body) = app
        .send_json("POST", "/api/ingest", json!({ "rows": [artist_row("Jane")] }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("Sender is not configured"));
}

#[tokio::test]
async fn test_ingest_rejects_nested_cells() {
    let app = setup_app(configured_sender()).await;

    let (status, _) = app
        .send_json(
            "POST",
            "/api/ingest",
            json!({ "rows": [{ "Artist Name": ["Jane"] }] }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Entry history
// =============================================================================

#[tokio::test]
async fn test_entries_most_recent_first_and_lookup() {
    let app = setup_app(configured_sender()).await;

    for name in ["One", "Two", "Three"] {
        let (status, _) = app
            .send_json("POST", "/api/ingest", json!({ "rows": [artist_row(name)] }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/api/entries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let names: Vec<&str> = body["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["artist"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Three", "Two", "One"]);

    let reference_id = body["entries"][1]["reference_id"].as_str().unwrap();
    let (status, entry) = app.get(&format!("/api/entries/{}", reference_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["artist"]["name"], "Two");
}

#[tokio::test]
async fn test_unknown_entry_is_404() {
    let app = setup_app(configured_sender()).await;

    let (status, body) = app.get("/api/entries/zzzzzzzz").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_clear_entries() {
    let app = setup_app(configured_sender()).await;
    app.send_json("POST", "/api/ingest", json!({ "rows": [artist_row("Jane")] }))
        .await;

    let (status, body) = app.delete("/api/entries").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cleared"], true);

    let (_, list) = app.get("/api/entries").await;
    assert_eq!(list["total"], 0);
    assert!(list["entries"].as_array().unwrap().is_empty());
}

// =============================================================================
// Scan
// =============================================================================

#[tokio::test]
async fn test_scan_ingested_payload() {
    let app = setup_app(configured_sender()).await;
    let (_, body) = app
        .send_json("POST", "/api/ingest", json!({ "rows": [artist_row("Jane")] }))
        .await;
    let payload = body["entries"][0]["payload"].as_str().unwrap().to_string();

    let (status, scan) = app
        .send_json("POST", "/api/scan", json!({ "qr_data": payload }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(scan["success"], true);
    assert_eq!(scan["sender"]["city"], "Portland");
    assert_eq!(scan["artist"]["phone"], "555-0100");
    let text = scan["formatted_result"].as_str().unwrap();
    assert!(text.contains("Sender Information"));
    assert!(text.contains("Location: Portland, ME 04101"));
    assert!(text.contains("Artist Information"));
}

#[tokio::test]
async fn test_scan_partial_payload() {
    let app = setup_app(configured_sender()).await;

    let (status, scan) = app
        .send_json("POST", "/api/scan", json!({ "qr_data": "AT:\nNM: Jane\n" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(scan["success"], true);
    assert!(scan.get("sender").is_none());
    assert_eq!(scan["artist"]["name"], "Jane");
}

#[tokio::test]
async fn test_scan_unrecognized_payload() {
    let app = setup_app(configured_sender()).await;

    let (status, scan) = app
        .send_json("POST", "/api/scan", json!({ "qr_data": "https://example.com" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(scan["success"], false);
    assert_eq!(scan["formatted_result"], "Failed to parse QR code data");
}

#[tokio::test]
async fn test_scan_without_data_is_bad_request() {
    let app = setup_app(configured_sender()).await;

    let (status, body) = app.send_json("POST", "/api/scan", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("No QR data"));
}

// =============================================================================
// Sender settings
// =============================================================================

#[tokio::test]
async fn test_get_sender_settings_unconfigured() {
    let app = setup_app(SenderInfo::default()).await;

    let (status, body) = app.get("/api/settings/sender").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], false);
    assert_eq!(body["missing"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_update_sender_settings_persists_and_applies() {
    let app = setup_app(SenderInfo::default()).await;

    let (status, body) = app
        .send_json(
            "PUT",
            "/api/settings/sender",
            json!({
                "name": " Studio B ",
                "address": "7 Pier St",
                "city": "Astoria",
                "state": "OR",
                "zip": "97103"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["configured"], true);
    assert_eq!(body["sender"]["name"], "Studio B");

    let saved = load_toml_config(&app.config_path).unwrap();
    assert_eq!(saved.sender.city, "Astoria");

    let (status, body) = app
        .send_json("POST", "/api/ingest", json!({ "rows": [artist_row("Jane")] }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["entries"][0]["sender"]["name"], "Studio B");
}

#[tokio::test]
async fn test_update_sender_settings_keeps_runtime_overrides_out_of_file() {
    // Running config carries command-line overrides the file never had
    let app = setup_app_with_config(TomlConfig {
        database_path: Some(std::path::PathBuf::from("/tmp/scratch.db")),
        port: 9999,
        ..TomlConfig::default()
    })
    .await;
    std::fs::write(&app.config_path, "port = 5790\n[logging]\nlevel = \"debug\"\n").unwrap();

    let (status, _) = app
        .send_json(
            "PUT",
            "/api/settings/sender",
            json!({
                "name": "Studio B",
                "address": "7 Pier St",
                "city": "Astoria",
                "state": "OR",
                "zip": "97103"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let saved = load_toml_config(&app.config_path).unwrap();
    assert_eq!(saved.port, 5790);
    assert_eq!(saved.database_path, None);
    assert_eq!(saved.logging.level, "debug");
    assert_eq!(saved.sender.name, "Studio B");

    let content = std::fs::read_to_string(&app.config_path).unwrap();
    assert!(!content.contains("scratch.db"));
    assert!(!content.contains("9999"));
}

#[tokio::test]
async fn test_update_sender_settings_requires_all_fields() {
    let app = setup_app(configured_sender()).await;

    let (status, body) = app
        .send_json(
            "PUT",
            "/api/settings/sender",
            json!({ "name": "Studio B", "address": "", "city": "Astoria" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("address"));
    assert!(!app.config_path.exists());

    let (_, current) = app.get("/api/settings/sender").await;
    assert_eq!(current["sender"]["name"], "Gallery Nine");
}
