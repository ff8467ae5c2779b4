//! Scanning: payload to display text, and the per-scanner session state
//!
//! Image capture and QR detection belong to the front end. This module
//! starts where the detector hands over payload text, or reports that no
//! code was found.

use crate::codec::{self, DecodedRecord};
use crate::{Error, Result};

/// Decoded payload together with its display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub decoded: DecodedRecord,
    pub formatted: String,
}

impl ScanResult {
    /// True when at least one known tag was recognized
    pub fn is_recognized(&self) -> bool {
        !self.decoded.is_empty()
    }
}

/// Decode and format one scanned payload
pub fn scan(payload: &str) -> ScanResult {
    let decoded = codec::decode(payload);
    let formatted = codec::format_for_display(&decoded);
    ScanResult { decoded, formatted }
}

/// State of one scanner (camera or upload widget)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    Scanning,
    ResultReady(ScanResult),
    /// Capture finished without finding a code; not an error
    NoCodeDetected,
}

/// Owns the state of one scanner. One session per scanning front end.
#[derive(Debug, Default)]
pub struct ScanSession {
    state: ScanState,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.state, ScanState::Scanning)
    }

    /// Begin capturing. Allowed from any state except `Scanning`.
    pub fn start(&mut self) -> Result<()> {
        if self.is_scanning() {
            return Err(Error::InvalidState("scan already in progress".to_string()));
        }
        self.state = ScanState::Scanning;
        Ok(())
    }

    /// Finish capturing with the detector output (`None`: nothing found)
    pub fn complete(&mut self, payload: Option<&str>) -> Result<&ScanState> {
        if !self.is_scanning() {
            return Err(Error::InvalidState("no scan in progress".to_string()));
        }
        self.state = match payload {
            Some(text) => ScanState::ResultReady(scan(text)),
            None => ScanState::NoCodeDetected,
        };
        Ok(&self.state)
    }

    /// Drop any result and return to idle
    pub fn reset(&mut self) {
        self.state = ScanState::Idle;
    }

    /// Take the ready result, leaving the session idle
    pub fn take_result(&mut self) -> Option<ScanResult> {
        match std::mem::take(&mut self.state) {
            ScanState::ResultReady(result) => Some(result),
            other => {
                self.state = other;
                None
            }
        }
    }
}
