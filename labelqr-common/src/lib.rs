//! # LabelQR Common Library
//!
//! Core shared by the LabelQR service and any scanning front end:
//! - Payload codec (encode / decode / display formatting)
//! - Entry store backed by SQLite
//! - Spreadsheet-row ingestion into stored entries
//! - Scan session state machine
//! - Configuration loading and error types

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod records;
pub mod reference_id;
pub mod scan;
pub mod store;
pub mod time;

pub use codec::{decode, encode, format_for_display, DecodedRecord};
pub use db::models::Entry;
pub use error::{Error, Result};
pub use ingest::{ingest, IngestError, RawRow};
pub use records::{ArtistRecord, SenderInfo};
pub use store::{EntryStore, SqliteEntryStore};
