//! HTTP API handlers for labelqr-server

pub mod entries;
pub mod health;
pub mod ingest;
pub mod scan;
pub mod settings;

pub use entries::{clear_entries, get_entry, list_entries};
pub use health::health_routes;
pub use ingest::ingest_rows;
pub use scan::scan_payload;
pub use settings::{get_sender_settings, update_sender_settings};
