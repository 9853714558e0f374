//! Ownership and visibility rules.

use crate::{Result, VaultError};

use super::types::Entry;

/// Whether `caller` owns `entry`.
pub fn is_owner(entry: &Entry, caller: Option<i64>) -> bool {
    caller == Some(entry.owner_id)
}

/// Whether `caller` (None for anonymous) may read `entry`'s content.
pub fn can_read(entry: &Entry, caller: Option<i64>) -> bool {
    entry.is_public || is_owner(entry, caller)
}

/// Gate a looked-up entry for reading.
///
/// A missing entry and an entry the caller may not read both produce the
/// same `NotFound`.
pub fn ensure_readable(entry: Option<Entry>, caller: Option<i64>) -> Result<Entry> {
    match entry {
        Some(entry) if can_read(&entry, caller) => Ok(entry),
        _ => Err(VaultError::NotFound("entry".to_string())),
    }
}
