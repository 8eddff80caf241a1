//! Persistence boundary.
//!
//! Records live in four named collections, each persisted as one JSON document. Core
//! operations receive a store handle instead of reaching for global state, so tests run
//! against [`MemoryStore`] and the application runs against [`DbStore`], optionally
//! wrapped in a [`MirroredStore`] that copies every write to a remote endpoint.
//!
//! Writes that depend on the current contents go through [`Store::modify`], which holds
//! exclusive access to the collection for the whole read-modify-write.
//! [`Store::modify_pair`] does the same for two collections in one commit.

mod db;
mod memory;
mod mirrored;

pub use db::DbStore;
pub use memory::MemoryStore;
pub use mirrored::MirroredStore;

use crate::errors::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt, future::Future};

/// Named record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// [`crate::models::ProductionEntry`] records
    ProductionEntries,
    /// [`crate::models::User`] records
    Users,
    /// [`crate::models::OffDay`] records
    OffDays,
    /// [`crate::models::LogEntry`] records
    ActivityLog,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Self; 4] = [
        Self::ProductionEntries,
        Self::Users,
        Self::OffDays,
        Self::ActivityLog,
    ];

    /// Storage key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ProductionEntries => "production_entries",
            Self::Users => "users",
            Self::OffDays => "off_days",
            Self::ActivityLog => "activity_log",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Key-value document store holding the record collections.
pub trait Store: Send + Sync {
    /// Reads every record of a collection. A collection never written reads as empty.
    fn get<T>(&self, collection: Collection) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send;

    /// Replaces a collection with `records`.
    fn put<T>(&self, collection: Collection, records: &[T]) -> impl Future<Output = Result<()>> + Send
    where
        T: Serialize + Sync;

    /// Runs `f` over the current records while holding exclusive access, then writes the
    /// result back if it differs from what was stored. If `f` fails nothing is written.
    fn modify<T, R, F>(&self, collection: Collection, f: F) -> impl Future<Output = Result<R>> + Send
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send;

    /// Like [`Store::modify`] over two distinct collections at once. Both documents are
    /// written together or not at all, which keeps a record and its activity-log line
    /// in step.
    fn modify_pair<A, B, R, F>(
        &self,
        first: Collection,
        second: Collection,
        f: F,
    ) -> impl Future<Output = Result<R>> + Send
    where
        A: Serialize + DeserializeOwned + Send,
        B: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<A>, &mut Vec<B>) -> Result<R> + Send;
}

/// Decodes a stored document, treating a missing document as an empty collection.
pub(crate) fn decode<T: DeserializeOwned>(collection: Collection, raw: Option<&str>) -> Result<Vec<T>> {
    raw.map_or_else(
        || Ok(Vec::new()),
        |raw| {
            serde_json::from_str(raw).map_err(|e| Error::Persistence {
                message: format!("collection '{collection}' is malformed: {e}"),
            })
        },
    )
}

/// Encodes records as the stored document.
pub(crate) fn encode<T: Serialize>(records: &[T]) -> Result<String> {
    serde_json::to_string(records).map_err(Into::into)
}

/// Whether an encoded document differs from what is stored. Writing an empty
/// collection where none existed counts as no change.
pub(crate) fn is_changed(stored: Option<&str>, encoded: &str) -> bool {
    stored.map_or(encoded != "[]", |stored| stored != encoded)
}

/// Rejects a pair write that names the same collection twice.
pub(crate) fn ensure_distinct(first: Collection, second: Collection) -> Result<()> {
    if first == second {
        return Err(Error::Persistence {
            message: format!("collection '{first}' cannot be paired with itself"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_decode_missing_is_empty() {
        let records: Vec<String> = decode(Collection::Users, None).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_decode_malformed_is_persistence_error() {
        let result: Result<Vec<String>> = decode(Collection::Users, Some("{not json"));
        assert!(matches!(result, Err(Error::Persistence { .. })));
    }

    #[test]
    fn test_is_changed() {
        assert!(!is_changed(None, "[]"));
        assert!(is_changed(None, "[1]"));
        assert!(!is_changed(Some("[1]"), "[1]"));
        assert!(is_changed(Some("[1]"), "[1,2]"));
    }

    #[test]
    fn test_ensure_distinct() {
        assert!(ensure_distinct(Collection::Users, Collection::ActivityLog).is_ok());
        assert!(matches!(
            ensure_distinct(Collection::Users, Collection::Users),
            Err(Error::Persistence { .. })
        ));
    }
}
