//! Spreadsheet-row ingestion
//!
//! Turns rows from an external spreadsheet reader into encoded, stored
//! entries. A row is a mapping from column header to optional cell value.
//!
//! The whole batch is validated before anything is written, so an invalid
//! row never leaves a partial batch behind. A storage failure part way
//! through does leave the earlier rows of the batch stored.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::codec;
use crate::db::models::Entry;
use crate::records::{ArtistRecord, SenderInfo};
use crate::reference_id::{RandomReferenceIds, ReferenceIdSource};
use crate::store::EntryStore;
use crate::time;

/// One spreadsheet row: column header to cell value (`None` for empty cells)
pub type RawRow = HashMap<String, Option<String>>;

pub const ARTIST_NAME_FIELD: &str = "Artist Name";
pub const PHONE_FIELD: &str = "Phone";

/// Address columns, in the order they are joined
pub const ADDRESS_FIELDS: [&str; 6] = [
    "Address: Address Line 1",
    "Address: Address Line 2",
    "Address: City",
    "Address: State",
    "Address: Zip/Postal Code",
    "Address: Country",
];

pub const ADDRESS_SEPARATOR: &str = ", ";

/// Upper bound on reference id draws for a single entry
pub const MAX_ID_ATTEMPTS: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IngestError {
    /// Sender configuration incomplete
    #[error("Sender is not configured, missing: {}", .missing.join(", "))]
    InvalidSender { missing: Vec<&'static str> },

    /// Required column empty or absent (row index is 0-based)
    #[error("Row {row}: missing required field '{field}'")]
    InvalidRow { row: usize, field: &'static str },

    /// Entry could not be stored; `saved` rows of the batch were already written
    #[error("Failed to store entry for row {row} ({saved} earlier rows stored)")]
    Persistence { row: usize, saved: usize },
}

impl IngestError {
    /// True for errors caused by the input rather than by storage
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IngestError::InvalidSender { .. } | IngestError::InvalidRow { .. }
        )
    }
}

/// Ingest rows with random reference ids
pub async fn ingest<S>(
    rows: &[RawRow],
    sender: &SenderInfo,
    store: &S,
) -> Result<Vec<Entry>, IngestError>
where
    S: EntryStore + ?Sized,
{
    ingest_with_ids(rows, sender, store, &mut RandomReferenceIds).await
}

/// Ingest rows drawing reference ids from `ids`.
///
/// Returns the new entries in input order.
pub async fn ingest_with_ids<S, I>(
    rows: &[RawRow],
    sender: &SenderInfo,
    store: &S,
    ids: &mut I,
) -> Result<Vec<Entry>, IngestError>
where
    S: EntryStore + ?Sized,
    I: ReferenceIdSource + Send,
{
    validate_sender(sender)?;
    for (row, fields) in rows.iter().enumerate() {
        validate_row(row, fields)?;
    }

    let mut entries = Vec::with_capacity(rows.len());
    for (row, fields) in rows.iter().enumerate() {
        let artist = artist_from_row(fields);
        let payload = codec::encode(sender, &artist);
        let entry = store_entry(store, ids, sender, artist, payload)
            .await
            .ok_or(IngestError::Persistence {
                row,
                saved: entries.len(),
            })?;
        entries.push(entry);
    }

    info!("Ingested {} entries", entries.len());
    Ok(entries)
}

pub fn validate_sender(sender: &SenderInfo) -> Result<(), IngestError> {
    let missing = sender.missing_fields();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::InvalidSender { missing })
    }
}

pub fn validate_row(row: usize, fields: &RawRow) -> Result<(), IngestError> {
    match field_value(fields, ARTIST_NAME_FIELD) {
        Some(_) => Ok(()),
        None => Err(IngestError::InvalidRow {
            row,
            field: ARTIST_NAME_FIELD,
        }),
    }
}

/// Build the artist record for a row that passed [`validate_row`]
pub fn artist_from_row(fields: &RawRow) -> ArtistRecord {
    ArtistRecord {
        name: field_value(fields, ARTIST_NAME_FIELD)
            .unwrap_or_default()
            .to_string(),
        phone: field_value(fields, PHONE_FIELD)
            .unwrap_or_default()
            .to_string(),
        address: combined_address(fields),
    }
}

/// Join the non-blank address columns with `", "`
pub fn combined_address(fields: &RawRow) -> String {
    ADDRESS_FIELDS
        .iter()
        .filter_map(|name| field_value(fields, name))
        .collect::<Vec<_>>()
        .join(ADDRESS_SEPARATOR)
}

/// Trimmed cell value; absent, null and blank cells are all `None`
fn field_value<'a>(fields: &'a RawRow, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .and_then(|value| value.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

async fn store_entry<S, I>(
    store: &S,
    ids: &mut I,
    sender: &SenderInfo,
    artist: ArtistRecord,
    payload: String,
) -> Option<Entry>
where
    S: EntryStore + ?Sized,
    I: ReferenceIdSource + Send,
{
    let mut attempts = 0;
    let mut entry = Entry {
        reference_id: String::new(),
        sender: sender.clone(),
        artist,
        payload,
        created_at: time::now(),
    };

    loop {
        entry.reference_id = allocate_reference_id(store, ids, &mut attempts).await?;
        if store.save(&entry).await {
            return Some(entry);
        }

        // Another writer may have taken the id between check and insert
        if store.reference_id_exists(&entry.reference_id).await {
            debug!("Reference id {} taken during save, retrying", entry.reference_id);
            continue;
        }

        warn!("Giving up on entry for artist '{}'", entry.artist.name);
        return None;
    }
}

async fn allocate_reference_id<S, I>(store: &S, ids: &mut I, attempts: &mut usize) -> Option<String>
where
    S: EntryStore + ?Sized,
    I: ReferenceIdSource + Send,
{
    while *attempts < MAX_ID_ATTEMPTS {
        *attempts += 1;
        let candidate = ids.next_id();
        if !store.reference_id_exists(&candidate).await {
            return Some(candidate);
        }
        debug!("Reference id {} already in use, regenerating", candidate);
    }

    warn!("No free reference id after {} attempts", MAX_ID_ATTEMPTS);
    None
}
