//! Reference id generation
//!
//! A reference id is the first eight hex digits of a random UUIDv4. Ids are
//! only unique per store; callers must check for collisions.

use uuid::Uuid;

/// Length of every reference id
pub const REFERENCE_ID_LEN: usize = 8;

/// Source of candidate reference ids
pub trait ReferenceIdSource {
    fn next_id(&mut self) -> String;
}

/// Random ids backed by UUIDv4
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomReferenceIds;

impl ReferenceIdSource for RandomReferenceIds {
    fn next_id(&mut self) -> String {
        generate()
    }
}

/// Generate a new random reference id
pub fn generate() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(REFERENCE_ID_LEN);
    id
}
