/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored value for a key could not be decoded
    #[error("Persisted value for '{key}' is unreadable: {reason}")]
    PersistenceRead { key: String, reason: String },

    /// Error from the underlying key-value store
    #[error("Store error: {0}")]
    Store(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StorageError {
    /// Create a persistence read error
    pub fn persistence_read(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PersistenceRead {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for reverie_core::ReverieError {
    fn from(err: StorageError) -> Self {
        reverie_core::ReverieError::persistence(err.to_string())
    }
}

impl From<reverie_core::ReverieError> for StorageError {
    fn from(err: reverie_core::ReverieError) -> Self {
        StorageError::Store(err.to_string())
    }
}
