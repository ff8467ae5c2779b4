//! Entry store
//!
//! Append-only log of [`Entry`] records keyed by reference id. The only
//! writes are single-entry inserts and a bulk clear; there is no update and
//! no per-entry delete.
//!
//! [`EntryStore`] is the boolean boundary used by ingestion and the HTTP
//! layer: I/O faults are logged and turned into `false` / empty results.
//! The fallible building blocks live on [`SqliteEntryStore`] for callers
//! that need the cause.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::{debug, warn};

use crate::db::models::Entry;
use crate::records::{ArtistRecord, SenderInfo};
use crate::{time, Error, Result};

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a new entry. False on id collision or storage failure.
    async fn save(&self, entry: &Entry) -> bool;

    /// Every live entry, most recent first
    async fn get_all(&self) -> Vec<Entry>;

    /// Delete every entry
    async fn clear_all(&self) -> bool;

    /// True when `reference_id` is taken (or could not be checked)
    async fn reference_id_exists(&self, reference_id: &str) -> bool;

    /// Look up a single entry
    async fn get(&self, reference_id: &str) -> Option<Entry>;
}

/// SQLite implementation over the `entries` table
#[derive(Debug, Clone)]
pub struct SqliteEntryStore {
    pool: SqlitePool,
}

const SELECT_COLUMNS: &str = r#"
    SELECT reference_id, sender_name, sender_address, sender_city, sender_state,
           sender_zip, artist_name, artist_phone, artist_address, payload, created_at
    FROM entries
"#;

impl SqliteEntryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert one entry; a taken reference id yields [`Error::Collision`]
    pub async fn insert_entry(&self, entry: &Entry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO entries (
                reference_id, sender_name, sender_address, sender_city, sender_state,
                sender_zip, artist_name, artist_phone, artist_address, payload, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.reference_id)
        .bind(&entry.sender.name)
        .bind(&entry.sender.address)
        .bind(&entry.sender.city)
        .bind(&entry.sender.state)
        .bind(&entry.sender.zip)
        .bind(&entry.artist.name)
        .bind(&entry.artist.phone)
        .bind(&entry.artist.address)
        .bind(&entry.payload)
        .bind(time::to_storage(&entry.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let is_collision = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if is_collision {
                Error::Collision(entry.reference_id.clone())
            } else {
                Error::Database(e)
            }
        })?;

        Ok(())
    }

    pub async fn fetch_all_entries(&self) -> Result<Vec<Entry>> {
        let sql = format!("{} ORDER BY created_at DESC, rowid DESC", SELECT_COLUMNS);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(entry_from_row).collect()
    }

    pub async fn fetch_entry(&self, reference_id: &str) -> Result<Option<Entry>> {
        let sql = format!("{} WHERE reference_id = ?", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(reference_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    /// Returns the number of deleted entries
    pub async fn delete_all_entries(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM entries")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn entry_exists(&self, reference_id: &str) -> Result<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM entries WHERE reference_id = ?")
            .bind(reference_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<Entry> {
    let created_at: String = row.try_get("created_at")?;

    Ok(Entry {
        reference_id: row.try_get("reference_id")?,
        sender: SenderInfo {
            name: row.try_get("sender_name")?,
            address: row.try_get("sender_address")?,
            city: row.try_get("sender_city")?,
            state: row.try_get("sender_state")?,
            zip: row.try_get("sender_zip")?,
        },
        artist: ArtistRecord {
            name: row.try_get("artist_name")?,
            phone: row.try_get("artist_phone")?,
            address: row.try_get("artist_address")?,
        },
        payload: row.try_get("payload")?,
        created_at: time::from_storage(&created_at)?,
    })
}

#[async_trait]
impl EntryStore for SqliteEntryStore {
    async fn save(&self, entry: &Entry) -> bool {
        match self.insert_entry(entry).await {
            Ok(()) => {
                debug!("Saved entry {}", entry.reference_id);
                true
            }
            Err(e) => {
                warn!("Failed to save entry {}: {}", entry.reference_id, e);
                false
            }
        }
    }

    async fn get_all(&self) -> Vec<Entry> {
        self.fetch_all_entries().await.unwrap_or_else(|e| {
            warn!("Failed to load entries: {}", e);
            Vec::new()
        })
    }

    async fn clear_all(&self) -> bool {
        match self.delete_all_entries().await {
            Ok(deleted) => {
                debug!("Cleared {} entries", deleted);
                true
            }
            Err(e) => {
                warn!("Failed to clear entries: {}", e);
                false
            }
        }
    }

    async fn reference_id_exists(&self, reference_id: &str) -> bool {
        // An unverifiable id is treated as taken
        self.entry_exists(reference_id).await.unwrap_or_else(|e| {
            warn!("Failed to check reference id {}: {}", reference_id, e);
            true
        })
    }

    async fn get(&self, reference_id: &str) -> Option<Entry> {
        self.fetch_entry(reference_id).await.unwrap_or_else(|e| {
            warn!("Failed to load entry {}: {}", reference_id, e);
            None
        })
    }
}
