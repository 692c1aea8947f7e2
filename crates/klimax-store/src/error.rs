//! Error types for the record store.

use std::path::PathBuf;

/// Errors that can occur in record store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem error while touching a record or collection directory
    #[error("io error at {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded for storage
    #[error("failed to encode record '{key}': {source}")]
    Encode {
        /// Record key
        key: String,
        /// Underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Record key is not usable as a storage name
    #[error("invalid record key: {0:?}")]
    InvalidKey(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;
