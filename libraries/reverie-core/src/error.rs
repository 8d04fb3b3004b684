/// Core error types for Reverie
use crate::types::{PlaylistId, TrackId};
use thiserror::Error;

/// Result type alias using `ReverieError`
pub type Result<T> = std::result::Result<T, ReverieError>;

/// Error shared across collaborator boundaries
#[derive(Error, Debug)]
pub enum ReverieError {
    /// Durable store could not be read or written
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A blob could not be turned into a track
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Track id is not registered
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Playlist id is not in the store
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Caller passed something out of range
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ReverieError {
    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create an ingest error
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
