//! SeaORM-backed store. Each collection is one row of the `collections` table.

use super::{Collection, Store, decode, encode, ensure_distinct, is_changed};
use crate::{
    entities::{CollectionEntity, collection},
    errors::Result,
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

/// Store persisting collections in a SQL database through SeaORM.
#[derive(Debug, Clone)]
pub struct DbStore {
    db: DatabaseConnection,
}

impl DbStore {
    /// Wraps an open connection. Tables must already exist, see
    /// [`crate::config::database::create_tables`].
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Current write counter of a collection, `None` if it was never written.
    pub async fn version(&self, collection: Collection) -> Result<Option<i64>> {
        Ok(find_row(&self.db, collection).await?.map(|row| row.version))
    }
}

async fn find_row<C>(db: &C, collection: Collection) -> Result<Option<collection::Model>>
where
    C: ConnectionTrait,
{
    CollectionEntity::find()
        .filter(collection::Column::Key.eq(collection.key()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Inserts or updates the row for `collection`, bumping its version.
async fn write_row<C>(
    db: &C,
    collection: Collection,
    existing: Option<collection::Model>,
    value: String,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now().naive_utc();

    if let Some(row) = existing {
        let version = row.version + 1;
        let mut active_model: collection::ActiveModel = row.into();
        active_model.value = Set(value);
        active_model.version = Set(version);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
        debug!(%collection, version, "collection updated");
    } else {
        let new_row = collection::ActiveModel {
            key: Set(collection.key().to_string()),
            value: Set(value),
            version: Set(1),
            updated_at: Set(now),
            ..Default::default()
        };
        new_row.insert(db).await?;
        debug!(%collection, "collection created");
    }

    Ok(())
}

impl Store for DbStore {
    async fn get<T>(&self, collection: Collection) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let row = find_row(&self.db, collection).await?;
        decode(collection, row.as_ref().map(|r| r.value.as_str()))
    }

    async fn put<T>(&self, collection: Collection, records: &[T]) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let value = encode(records)?;

        let txn = self.db.begin().await?;
        let existing = find_row(&txn, collection).await?;
        write_row(&txn, collection, existing, value).await?;
        txn.commit().await?;

        Ok(())
    }

    async fn modify<T, R, F>(&self, collection: Collection, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
    {
        // The read and the write share one transaction; an error from `f` drops it
        // uncommitted, which rolls back.
        let txn = self.db.begin().await?;

        let existing = find_row(&txn, collection).await?;
        let mut records = decode(collection, existing.as_ref().map(|r| r.value.as_str()))?;
        let result = f(&mut records)?;

        let value = encode(&records)?;
        if is_changed(existing.as_ref().map(|r| r.value.as_str()), &value) {
            write_row(&txn, collection, existing, value).await?;
        }

        txn.commit().await?;
        Ok(result)
    }

    async fn modify_pair<A, B, R, F>(&self, first: Collection, second: Collection, f: F) -> Result<R>
    where
        A: Serialize + DeserializeOwned + Send,
        B: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<A>, &mut Vec<B>) -> Result<R> + Send,
    {
        ensure_distinct(first, second)?;
        let txn = self.db.begin().await?;

        let first_row = find_row(&txn, first).await?;
        let second_row = find_row(&txn, second).await?;
        let mut first_records = decode(first, first_row.as_ref().map(|r| r.value.as_str()))?;
        let mut second_records = decode(second, second_row.as_ref().map(|r| r.value.as_str()))?;
        let result = f(&mut first_records, &mut second_records)?;

        let first_value = encode(&first_records)?;
        let second_value = encode(&second_records)?;
        if is_changed(first_row.as_ref().map(|r| r.value.as_str()), &first_value) {
            write_row(&txn, first, first_row, first_value).await?;
        }
        if is_changed(second_row.as_ref().map(|r| r.value.as_str()), &second_value) {
            write_row(&txn, second, second_row, second_value).await?;
        }

        txn.commit().await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_db_store;

    #[tokio::test]
    async fn test_missing_collection_reads_empty() -> Result<()> {
        let store = setup_db_store().await?;
        let records: Vec<String> = store.get(Collection::ProductionEntries).await?;
        assert!(records.is_empty());
        assert_eq!(store.version(Collection::ProductionEntries).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_put_bumps_version() -> Result<()> {
        let store = setup_db_store().await?;
        store.put(Collection::OffDays, &["x".to_string()]).await?;
        assert_eq!(store.version(Collection::OffDays).await?, Some(1));

        store
            .put(Collection::OffDays, &["x".to_string(), "y".to_string()])
            .await?;
        assert_eq!(store.version(Collection::OffDays).await?, Some(2));

        let records: Vec<String> = store.get(Collection::OffDays).await?;
        assert_eq!(records.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_modify_unchanged_keeps_version() -> Result<()> {
        let store = setup_db_store().await?;
        store.put(Collection::Users, &[1_u32]).await?;

        store
            .modify(Collection::Users, |records: &mut Vec<u32>| Ok(records.len()))
            .await?;
        assert_eq!(store.version(Collection::Users).await?, Some(1));

        store
            .modify(Collection::Users, |records: &mut Vec<u32>| {
                records.push(2);
                Ok(())
            })
            .await?;
        assert_eq!(store.version(Collection::Users).await?, Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn test_modify_error_rolls_back() -> Result<()> {
        let store = setup_db_store().await?;
        store.put(Collection::Users, &[1_u32]).await?;

        let result: Result<()> = store
            .modify(Collection::Users, |records: &mut Vec<u32>| {
                records.push(9);
                Err(crate::errors::Error::validation("nope"))
            })
            .await;
        assert!(result.is_err());

        let records: Vec<u32> = store.get(Collection::Users).await?;
        assert_eq!(records, vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn test_modify_pair_commits_both() -> Result<()> {
        let store = setup_db_store().await?;
        store
            .modify_pair(
                Collection::ProductionEntries,
                Collection::ActivityLog,
                |entries: &mut Vec<u32>, log: &mut Vec<String>| {
                    entries.push(7);
                    log.push("planned".to_string());
                    Ok(())
                },
            )
            .await?;

        assert_eq!(store.version(Collection::ProductionEntries).await?, Some(1));
        assert_eq!(store.version(Collection::ActivityLog).await?, Some(1));
        let log: Vec<String> = store.get(Collection::ActivityLog).await?;
        assert_eq!(log, vec!["planned".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_modify_pair_malformed_log_leaves_entries_untouched() -> Result<()> {
        let store = setup_db_store().await?;
        store.put(Collection::ActivityLog, &[1_u32]).await?;

        let result = store
            .modify_pair(
                Collection::ProductionEntries,
                Collection::ActivityLog,
                |entries: &mut Vec<u32>, log: &mut Vec<String>| {
                    entries.push(7);
                    log.push("planned".to_string());
                    Ok(())
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(store.version(Collection::ProductionEntries).await?, None);
        assert_eq!(store.version(Collection::ActivityLog).await?, Some(1));
        Ok(())
    }
}
