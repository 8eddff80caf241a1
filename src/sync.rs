//! HTTP client for the optional remote mirror of the record collections.
//!
//! The mirror is a plain document endpoint: `POST {url}/collections/{name}` replaces a
//! collection, `GET {url}/collections/{name}` returns it. The tracker never depends on
//! it being reachable.

use crate::{errors::Result, store::Collection};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Wire shape of a mirrored collection.
#[derive(Debug, Serialize, Deserialize)]
pub struct RemoteCollection {
    /// Collection key
    pub collection: String,
    /// Records as JSON documents
    pub records: Vec<Value>,
}

/// HTTP client for the remote mirror.
#[derive(Debug, Clone)]
pub struct RemoteMirror {
    client: Client,
    base_url: String,
}

impl RemoteMirror {
    /// Creates a client for the mirror at `base_url` (e.g. `"https://sheets.example.com/api"`).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/collections/{}", self.base_url, collection.key())
    }

    /// Replaces the remote copy of a collection.
    pub async fn push(&self, collection: Collection, records: Vec<Value>) -> Result<()> {
        let body = RemoteCollection {
            collection: collection.key().to_string(),
            records,
        };

        self.client
            .post(self.collection_url(collection))
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Fetches the remote copy of a collection.
    pub async fn fetch(&self, collection: Collection) -> Result<Vec<Value>> {
        let remote: RemoteCollection = self
            .client
            .get(self.collection_url(collection))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(remote.records)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_collection_url_strips_trailing_slash() {
        let mirror = RemoteMirror::new("https://mirror.example.com/api/").unwrap();
        assert_eq!(mirror.base_url(), "https://mirror.example.com/api");
        assert_eq!(
            mirror.collection_url(Collection::ProductionEntries),
            "https://mirror.example.com/api/collections/production_entries"
        );
    }
}
