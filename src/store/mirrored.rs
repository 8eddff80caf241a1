//! Store decorator that copies every successful write to the remote mirror.
//!
//! The pushed snapshot is captured inside the write itself and stamped with a sequence
//! number, so a slow push can never overwrite the mirror with an older document.

use super::{Collection, Store};
use crate::{errors::Result, sync::RemoteMirror};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Records of one collection as captured by a write, with its sequence number.
type Snapshot = (u64, Vec<Value>);

/// Wraps a store and pushes each changed collection to an optional [`RemoteMirror`].
///
/// Mirror failures are logged as warnings and never fail the write.
#[derive(Debug)]
pub struct MirroredStore<S> {
    inner: S,
    mirror: Option<RemoteMirror>,
    sequence: AtomicU64,
    pushed: Mutex<HashMap<Collection, u64>>,
}

fn to_values<T: Serialize>(records: &[T]) -> Result<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(Into::into))
        .collect()
}

/// Records `sequence` as the latest push of `collection` unless a newer one already went
/// out. Returns whether the snapshot should be pushed.
fn claim_push(pushed: &mut HashMap<Collection, u64>, collection: Collection, sequence: u64) -> bool {
    match pushed.get(&collection) {
        Some(&last) if last >= sequence => false,
        _ => {
            pushed.insert(collection, sequence);
            true
        }
    }
}

impl<S: Store> MirroredStore<S> {
    /// Wraps `inner`; with `mirror == None` this is a pass-through.
    #[must_use]
    pub fn new(inner: S, mirror: Option<RemoteMirror>) -> Self {
        Self {
            inner,
            mirror,
            sequence: AtomicU64::new(1),
            pushed: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    /// Whether a mirror is configured.
    #[must_use]
    pub const fn is_mirrored(&self) -> bool {
        self.mirror.is_some()
    }

    /// Replaces local collections with the mirror's copies. Collections the mirror
    /// cannot serve are left untouched. Returns how many collections were refreshed.
    pub async fn pull_all(&self) -> Result<usize> {
        let Some(mirror) = &self.mirror else {
            return Ok(0);
        };

        let mut refreshed = 0;
        for collection in Collection::ALL {
            match mirror.fetch(collection).await {
                Ok(records) => {
                    self.inner.put(collection, &records).await?;
                    refreshed += 1;
                }
                Err(e) => warn!(%collection, "Failed to pull collection from mirror: {e}"),
            }
        }

        info!("Pulled {refreshed} collections from mirror {}", mirror.base_url());
        Ok(refreshed)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    /// Runs `f` and returns a snapshot of the records when `f` changed them.
    fn capture<T, R>(
        &self,
        records: &mut Vec<T>,
        f: impl FnOnce(&mut Vec<T>) -> Result<R>,
    ) -> Result<(R, Option<Snapshot>)>
    where
        T: Serialize,
    {
        if self.mirror.is_none() {
            return Ok((f(records)?, None));
        }

        let before = to_values(records)?;
        let result = f(records)?;
        let after = to_values(records)?;
        let snapshot = (before != after).then(|| (self.next_sequence(), after));
        Ok((result, snapshot))
    }

    async fn push_snapshot(&self, collection: Collection, snapshot: Option<Snapshot>) {
        let (Some(mirror), Some((sequence, records))) = (&self.mirror, snapshot) else {
            return;
        };

        // Held across the request so pushes of one store reach the mirror in order.
        let mut pushed = self.pushed.lock().await;
        if !claim_push(&mut pushed, collection, sequence) {
            debug!(%collection, sequence, "Skipping stale mirror push");
            return;
        }

        if let Err(e) = mirror.push(collection, records).await {
            warn!(%collection, "Failed to push collection to mirror: {e}");
        }
    }
}

impl<S: Store> Store for MirroredStore<S> {
    async fn get<T>(&self, collection: Collection) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        self.inner.get(collection).await
    }

    async fn put<T>(&self, collection: Collection, records: &[T]) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let snapshot = match &self.mirror {
            Some(_) => Some(to_values(records)?),
            None => None,
        };
        self.inner.put(collection, records).await?;
        let snapshot = snapshot.map(|records| (self.next_sequence(), records));
        self.push_snapshot(collection, snapshot).await;
        Ok(())
    }

    async fn modify<T, R, F>(&self, collection: Collection, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
    {
        let (result, snapshot) = self
            .inner
            .modify(collection, |records: &mut Vec<T>| self.capture(records, f))
            .await?;
        self.push_snapshot(collection, snapshot).await;
        Ok(result)
    }

    async fn modify_pair<A, B, R, F>(&self, first: Collection, second: Collection, f: F) -> Result<R>
    where
        A: Serialize + DeserializeOwned + Send,
        B: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<A>, &mut Vec<B>) -> Result<R> + Send,
    {
        let (result, first_snapshot, second_snapshot) = self
            .inner
            .modify_pair(first, second, |a: &mut Vec<A>, b: &mut Vec<B>| {
                if self.mirror.is_none() {
                    return Ok((f(a, b)?, None, None));
                }
                let before = (to_values(a)?, to_values(b)?);
                let result = f(a, b)?;
                let first_after = to_values(a)?;
                let second_after = to_values(b)?;
                let first_snapshot =
                    (before.0 != first_after).then(|| (self.next_sequence(), first_after));
                let second_snapshot =
                    (before.1 != second_after).then(|| (self.next_sequence(), second_after));
                Ok((result, first_snapshot, second_snapshot))
            })
            .await?;

        self.push_snapshot(first, first_snapshot).await;
        self.push_snapshot(second, second_snapshot).await;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn unreachable_mirror() -> Result<RemoteMirror> {
        // Port 9 (discard) on localhost refuses connections in test environments.
        RemoteMirror::new("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn test_passthrough_without_mirror() -> Result<()> {
        let store = MirroredStore::new(MemoryStore::new(), None);
        assert!(!store.is_mirrored());

        store.put(Collection::OffDays, &["a".to_string()]).await?;
        let records: Vec<String> = store.get(Collection::OffDays).await?;
        assert_eq!(records, vec!["a".to_string()]);
        assert_eq!(store.pull_all().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_mirror_does_not_fail_writes() -> Result<()> {
        let store = MirroredStore::new(MemoryStore::new(), Some(unreachable_mirror()?));

        store.put(Collection::Users, &[1_u32]).await?;
        store
            .modify(Collection::Users, |records: &mut Vec<u32>| {
                records.push(2);
                Ok(())
            })
            .await?;

        let records: Vec<u32> = store.inner().get(Collection::Users).await?;
        assert_eq!(records, vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_only_when_changed() -> Result<()> {
        let store = MirroredStore::new(MemoryStore::new(), Some(unreachable_mirror()?));
        let mut records = vec![1_u32];

        let ((), unchanged) = store.capture(&mut records, |_| Ok(()))?;
        assert!(unchanged.is_none());

        let ((), changed) = store.capture(&mut records, |r| {
            r.push(2);
            Ok(())
        })?;
        let (sequence, values) =
            changed.ok_or_else(|| crate::errors::Error::validation("expected a snapshot"))?;
        assert_eq!(values, vec![Value::from(1), Value::from(2)]);

        let ((), later) = store.capture(&mut records, |r| {
            r.clear();
            Ok(())
        })?;
        assert!(later.is_some_and(|(next, values)| next > sequence && values.is_empty()));
        Ok(())
    }

    #[tokio::test]
    async fn test_noop_modify_pair_with_mirror() -> Result<()> {
        let store = MirroredStore::new(MemoryStore::new(), Some(unreachable_mirror()?));

        let count = store
            .modify_pair(
                Collection::ProductionEntries,
                Collection::ActivityLog,
                |entries: &mut Vec<u32>, log: &mut Vec<String>| Ok(entries.len() + log.len()),
            )
            .await?;

        assert_eq!(count, 0);
        assert_eq!(store.inner().raw(Collection::ProductionEntries)?, None);
        assert_eq!(store.inner().raw(Collection::ActivityLog)?, None);
        Ok(())
    }

    #[test]
    fn test_claim_push_skips_older_snapshots() {
        let mut pushed = HashMap::new();

        assert!(claim_push(&mut pushed, Collection::Users, 5));
        assert!(!claim_push(&mut pushed, Collection::Users, 3));
        assert!(!claim_push(&mut pushed, Collection::Users, 5));
        assert!(claim_push(&mut pushed, Collection::ActivityLog, 3));
        assert!(claim_push(&mut pushed, Collection::Users, 6));
    }
}
