//! In-memory backend for tests and development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{validate_key, Collection, LoadReport, Record, RecordStore};

/// In-memory record store.
///
/// Data is lost when the process exits; intended for tests and development,
/// mirroring the file backend's contract exactly (including key validation).
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(Collection, String), serde_json::Value>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection.
    pub async fn count(&self, collection: Collection) -> usize {
        let records = self.records.read().await;
        records.keys().filter(|(c, _)| *c == collection).count()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load_all(&self, collection: Collection) -> Result<LoadReport> {
        let records = self.records.read().await;
        let mut report = LoadReport::default();
        for ((c, key), value) in records.iter() {
            if *c == collection {
                report.records.push(Record {
                    key: key.clone(),
                    value: value.clone(),
                });
            }
        }
        report.records.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(report)
    }

    async fn save(
        &self,
        collection: Collection,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        validate_key(key)?;
        let mut records = self.records.write().await;
        records.insert((collection, key.to_string()), value.clone());
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<bool> {
        validate_key(key)?;
        let mut records = self.records.write().await;
        Ok(records.remove(&(collection, key.to_string())).is_some())
    }
}
