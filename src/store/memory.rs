//! In-process store used by tests and as a scratch backend.

use super::{Collection, Store, decode, encode, ensure_distinct, is_changed};
use crate::errors::{Error, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

/// Store keeping each collection as an encoded JSON string behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Collection, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document for a collection, exactly as written.
    pub fn raw(&self, collection: Collection) -> Result<Option<String>> {
        Ok(self.lock()?.get(&collection).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Collection, String>>> {
        self.documents.lock().map_err(|_| Error::Persistence {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

impl Store for MemoryStore {
    async fn get<T>(&self, collection: Collection) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let documents = self.lock()?;
        decode(collection, documents.get(&collection).map(String::as_str))
    }

    async fn put<T>(&self, collection: Collection, records: &[T]) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let encoded = encode(records)?;
        self.lock()?.insert(collection, encoded);
        Ok(())
    }

    async fn modify<T, R, F>(&self, collection: Collection, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Result<R> + Send,
    {
        let mut documents = self.lock()?;
        let stored = documents.get(&collection).map(String::as_str);
        let mut records = decode(collection, stored)?;
        let result = f(&mut records)?;

        let encoded = encode(&records)?;
        if is_changed(stored, &encoded) {
            documents.insert(collection, encoded);
        }
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
        let mut documents = self.lock()?;
        let stored_first = documents.get(&first).cloned();
        let stored_second = documents.get(&second).cloned();

        let mut first_records = decode(first, stored_first.as_deref())?;
        let mut second_records = decode(second, stored_second.as_deref())?;
        let result = f(&mut first_records, &mut second_records)?;

        // Encode both before inserting either.
        let encoded_first = encode(&first_records)?;
        let encoded_second = encode(&second_records)?;
        if is_changed(stored_first.as_deref(), &encoded_first) {
            documents.insert(first, encoded_first);
        }
        if is_changed(stored_second.as_deref(), &encoded_second) {
            documents.insert(second, encoded_second);
        }
        Ok(result)
    }
}
