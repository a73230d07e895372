//! Store error hierarchy.

use thiserror::Error;

/// Errors from the event store and reader.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Payload serialization failure.
    #[error("payload serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Filesystem failure creating the database directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation on a store that is not open.
    #[error("event store is not open")]
    NotOpen,
}

/// Convenience alias used throughout the store crate.
pub type Result<T> = std::result::Result<T, StoreError>;
