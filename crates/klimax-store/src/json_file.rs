//! File-per-record JSON backend.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::store::{validate_key, Collection, LoadFailure, LoadReport, Record, RecordStore};

/// JSON record store: one `{key}.json` file per record, collections mapped to
/// directories under the data root.
///
/// Saves are atomic — the record is written to a `.tmp` sibling and renamed
/// over the destination, so a crash mid-write never leaves a half-written
/// record behind.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at the given data directory.
    ///
    /// The directory does not have to exist yet; it is created on first save.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Data root path.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        let dir = collection.dir();
        if dir.is_empty() {
            self.root.clone()
        } else {
            self.root.join(dir)
        }
    }

    fn record_path(&self, collection: Collection, key: &str) -> PathBuf {
        self.collection_dir(collection).join(format!("{key}.json"))
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn load_all(&self, collection: Collection) -> Result<LoadReport> {
        let dir = self.collection_dir(collection);
        let mut report = LoadReport::default();

        if !dir.exists() {
            return Ok(report);
        }

        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|source| Error::Io {
            path: dir.clone(),
            source,
        })?;

        while let Some(entry) = entries.next_entry().await.map_err(|source| Error::Io {
            path: dir.clone(),
            source,
        })? {
            let path = entry.path();
            // The ranks collection shares the root with the nested collection
            // directories, so non-json entries and subdirectories are skipped.
            if path.is_dir() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            let Some(key) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };

            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(collection = %collection, key = %key, error = %e, "Skipping unreadable record");
                    report.failures.push(LoadFailure {
                        key,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match serde_json::from_str(&text) {
                Ok(value) => report.records.push(Record { key, value }),
                Err(e) => {
                    warn!(collection = %collection, key = %key, error = %e, "Skipping corrupt record");
                    report.failures.push(LoadFailure {
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.records.sort_by(|a, b| a.key.cmp(&b.key));
        debug!(
            collection = %collection,
            loaded = report.records.len(),
            skipped = report.failures.len(),
            "Collection loaded"
        );
        Ok(report)
    }

    async fn save(
        &self,
        collection: Collection,
        key: &str,
        value: &serde_json::Value,
    ) -> Result<()> {
        validate_key(key)?;

        let dir = self.collection_dir(collection);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| Error::Io {
                path: dir.clone(),
                source,
            })?;

        let content = serde_json::to_string_pretty(value).map_err(|source| Error::Encode {
            key: key.to_string(),
            source,
        })?;

        // Write atomically: temp sibling first, then rename over the target.
        let path = self.record_path(collection, key);
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .map_err(|source| Error::Io {
                path: temp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;

        debug!(collection = %collection, key = %key, path = ?path, "Record saved");
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<bool> {
        validate_key(key)?;

        let path = self.record_path(collection, key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(collection = %collection, key = %key, "Record deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::Io { path, source }),
        }
    }
}
