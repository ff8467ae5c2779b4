//! QR payload codec
//!
//! A payload is two sections of `TAG: value` lines separated by one blank
//! line. The sender section (`SR:`) carries name, address, city, state and
//! postal code; the artist section (`AT:`) carries name, phone and a
//! free-form address:
//!
//! ```text
//! SR:
//! NM: <name>
//! ADD: <address>
//! CT: <city>
//! STT: <state>
//! CD: <zip>
//!
//! AT:
//! NM: <name>
//! PH: <phone>
//! ADD: <address>
//! ```
//!
//! Values are not escaped. A value containing a newline produces a payload
//! that decodes differently from what was encoded.

use serde::Serialize;

use crate::records::{ArtistRecord, SenderInfo};

pub const SENDER_MARKER: &str = "SR:";
pub const ARTIST_MARKER: &str = "AT:";

pub const TAG_NAME: &str = "NM";
pub const TAG_ADDRESS: &str = "ADD";
pub const TAG_CITY: &str = "CT";
pub const TAG_STATE: &str = "STT";
pub const TAG_ZIP: &str = "CD";
pub const TAG_PHONE: &str = "PH";

/// Returned by [`format_for_display`] when there is nothing to show
pub const FORMAT_FAILURE: &str = "Failed to parse QR code data";

/// Encode a sender/artist pair into payload text.
///
/// Output depends only on the inputs. Carriage returns inside values are
/// normalized to `\n` first so the result is identical across platforms.
pub fn encode(sender: &SenderInfo, artist: &ArtistRecord) -> String {
    [
        SENDER_MARKER.to_string(),
        tagged(TAG_NAME, &sender.name),
        tagged(TAG_ADDRESS, &sender.address),
        tagged(TAG_CITY, &sender.city),
        tagged(TAG_STATE, &sender.state),
        tagged(TAG_ZIP, &sender.zip),
        String::new(),
        ARTIST_MARKER.to_string(),
        tagged(TAG_NAME, &artist.name),
        tagged(TAG_PHONE, &artist.phone),
        tagged(TAG_ADDRESS, &artist.address),
    ]
    .join("\n")
}

fn tagged(tag: &str, value: &str) -> String {
    format!("{}: {}", tag, normalize_line_endings(value))
}

/// Replace `\r\n` and lone `\r` with `\n`
pub fn normalize_line_endings(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

/// Sender fields recovered from a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedSender {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl DecodedSender {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
    }

    fn set(&mut self, tag: &str, value: String) {
        let slot = match tag {
            TAG_NAME => &mut self.name,
            TAG_ADDRESS => &mut self.address,
            TAG_CITY => &mut self.city,
            TAG_STATE => &mut self.state,
            TAG_ZIP => &mut self.zip,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Artist fields recovered from a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodedArtist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl DecodedArtist {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.address.is_none()
    }

    fn set(&mut self, tag: &str, value: String) {
        let slot = match tag {
            TAG_NAME => &mut self.name,
            TAG_PHONE => &mut self.phone,
            TAG_ADDRESS => &mut self.address,
            _ => return,
        };
        *slot = Some(value);
    }
}

/// Structured view of a payload, only as populated as the input allowed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    sender: DecodedSender,
    artist: DecodedArtist,
}

impl DecodedRecord {
    /// Sender section, `None` when no sender tag was recognized
    pub fn sender(&self) -> Option<&DecodedSender> {
        (!self.sender.is_empty()).then_some(&self.sender)
    }

    /// Artist section, `None` when no artist tag was recognized
    pub fn artist(&self) -> Option<&DecodedArtist> {
        (!self.artist.is_empty()).then_some(&self.artist)
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty() && self.artist.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Sender,
    Artist,
}

/// Decode payload text.
///
/// Never fails. Blank lines, lines without a colon, unknown tags and tags
/// seen before any section marker are skipped. A repeated tag overwrites
/// the earlier value.
pub fn decode(payload: &str) -> DecodedRecord {
    let mut record = DecodedRecord::default();
    let mut section = None;

    for line in payload.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == SENDER_MARKER {
            section = Some(Section::Sender);
            continue;
        }
        if line == ARTIST_MARKER {
            section = Some(Section::Artist);
            continue;
        }

        let Some(current) = section else {
            continue;
        };
        let Some((tag, value)) = line.split_once(':') else {
            continue;
        };

        let tag = tag.trim();
        let value = value.trim().to_string();
        match current {
            Section::Sender => record.sender.set(tag, value),
            Section::Artist => record.artist.set(tag, value),
        }
    }

    record
}

/// Render a decoded record as a multi-line summary for screens and printers
pub fn format_for_display(decoded: &DecodedRecord) -> String {
    if decoded.is_empty() {
        return FORMAT_FAILURE.to_string();
    }

    let mut lines: Vec<String> = Vec::new();

    if let Some(sender) = decoded.sender() {
        lines.push("Sender Information".to_string());
        push_field(&mut lines, "Name", &sender.name);
        push_field(&mut lines, "Address", &sender.address);
        if let (Some(city), Some(state), Some(zip)) = (
            non_empty(&sender.city),
            non_empty(&sender.state),
            non_empty(&sender.zip),
        ) {
            lines.push(format!("Location: {}, {} {}", city, state, zip));
        }
        lines.push(String::new());
    }

    if let Some(artist) = decoded.artist() {
        lines.push("Artist Information".to_string());
        push_field(&mut lines, "Name", &artist.name);
        push_field(&mut lines, "Phone", &artist.phone);
        push_field(&mut lines, "Address", &artist.address);
    }

    lines.join("\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn push_field(lines: &mut Vec<String>, label: &str, value: &Option<String>) {
    if let Some(value) = non_empty(value) {
        lines.push(format!("{}: {}", label, value));
    }
}
