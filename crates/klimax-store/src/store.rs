//! Storage contract: collections, records, and the `RecordStore` trait.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Storage areas under the ranks data root.
///
/// Rank definitions live at the root itself; the remaining collections are
/// nested directories below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Rank definitions, stored at the data root
    Ranks,
    /// Ladder definitions, nested under `ladders/`
    Ladders,
    /// Player rank records, nested under `players/`
    Players,
    /// Pending rank-up transactions, nested under `journal/`
    Journal,
}

impl Collection {
    /// Directory of this collection relative to the data root.
    ///
    /// Empty for [`Collection::Ranks`], which occupies the root itself.
    #[must_use]
    pub fn dir(self) -> &'static str {
        match self {
            Collection::Ranks => "",
            Collection::Ladders => "ladders",
            Collection::Players => "players",
            Collection::Journal => "journal",
        }
    }

    /// Collection name for logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Collection::Ranks => "ranks",
            Collection::Ladders => "ladders",
            Collection::Players => "players",
            Collection::Journal => "journal",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A single named record produced by a bulk load.
#[derive(Debug, Clone)]
pub struct Record {
    /// Record key (the filename stem for file backends)
    pub key: String,
    /// Decoded JSON payload
    pub value: serde_json::Value,
}

/// A record that could not be read or decoded during a bulk load.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    /// Key of the offending record
    pub key: String,
    /// Human-readable reason
    pub reason: String,
}

/// Outcome of a bulk load: decoded records plus per-record failures.
///
/// A failure never aborts the bulk — the rest of the collection still loads.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully decoded records, sorted by key
    pub records: Vec<Record>,
    /// Records skipped because they could not be read or parsed
    pub failures: Vec<LoadFailure>,
}

/// Store for named JSON records grouped into collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load every record in a collection.
    ///
    /// Unreadable or unparsable records are reported in
    /// [`LoadReport::failures`] and skipped; only a failure touching the
    /// collection as a whole is an error.
    async fn load_all(&self, collection: Collection) -> Result<LoadReport>;

    /// Save one record, replacing any existing record under the same key.
    async fn save(&self, collection: Collection, key: &str, value: &serde_json::Value)
        -> Result<()>;

    /// Delete one record. Returns `false` if no such record existed.
    async fn delete(&self, collection: Collection, key: &str) -> Result<bool>;
}

/// Keys become storage names, so they must be plain non-empty path segments.
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.contains(['/', '\\'])
        || key.contains('\0')
        || key == "."
        || key == ".."
    {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}
