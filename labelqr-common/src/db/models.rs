//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{ArtistRecord, SenderInfo};

/// One generated label: sender snapshot, artist, and the encoded payload.
///
/// Never modified after creation. The rendered QR image is a pure function
/// of `payload` and is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub reference_id: String,
    pub sender: SenderInfo,
    pub artist: ArtistRecord,
    pub payload: String,
    pub created_at: DateTime<Utc>,
}
