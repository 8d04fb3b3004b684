//! Error types for playback sessions

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Engine could not load or decode a track
    #[error("Failed to load track {track}: {reason}")]
    TrackLoad {
        /// Title of the failed track
        track: String,
        /// Engine-reported reason
        reason: String,
    },

    /// Command not valid in the current state
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Session service is no longer running
    #[error("Session service has shut down")]
    ServiceClosed,

    /// Engine adapter call failed
    #[error("Engine error: {0}")]
    Engine(String),
}

impl PlaybackError {
    /// Build an `InvalidCommand` error
    pub fn invalid_command(message: impl Into<String>) -> Self {
        Self::InvalidCommand(message.into())
    }

    /// Build an `Engine` error
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
