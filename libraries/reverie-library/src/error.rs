//! Error types for the track registry and playlist store

use reverie_core::types::{PlaylistId, TrackId};
use thiserror::Error;

/// Library errors
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Metadata extraction failed; no track was created
    #[error("Track ingest failed for {file_name}: {reason}")]
    TrackIngest { file_name: String, reason: String },

    /// Playlist does not exist
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Track does not exist in the registry
    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    /// Index out of bounds
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, LibraryError>;

impl From<LibraryError> for reverie_core::ReverieError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::TrackIngest { .. } => reverie_core::ReverieError::ingest(err.to_string()),
            LibraryError::PlaylistNotFound(id) => reverie_core::ReverieError::PlaylistNotFound(id),
            LibraryError::TrackNotFound(id) => reverie_core::ReverieError::TrackNotFound(id),
            LibraryError::IndexOutOfBounds(_) => {
                reverie_core::ReverieError::invalid_input(err.to_string())
            }
        }
    }
}
