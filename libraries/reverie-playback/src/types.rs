//! Session status and snapshot types

use reverie_core::types::{PlaylistId, Preferences, RepeatMode, Track, DEFAULT_VOLUME};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Playback status of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// Nothing played yet
    #[default]
    Idle,
    /// Waiting for the engine to report a load
    Loading,
    /// Audio is playing
    Playing,
    /// Paused mid-track
    Paused,
    /// Explicitly stopped, or the queue ran out
    Stopped,
    /// Engine reported a failure for the current track
    Errored,
}

impl PlaybackStatus {
    /// Whether a track is loaded and can be paused, resumed, or seeked
    pub fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }

    /// Stable lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable copy of observable session state
///
/// Published after every processed input. Consumers (control surfaces,
/// persistence, UIs) read snapshots and never touch the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Track loaded or loading
    pub current_track: Option<Track>,

    /// Playlist the queue was started from
    pub current_playlist: Option<PlaylistId>,

    /// Playback status
    pub status: PlaybackStatus,

    /// Position in seconds, within `[0, duration_seconds]`
    pub position_seconds: f64,

    /// Duration of the current track in seconds
    pub duration_seconds: f64,

    /// Stored volume in `[0, 1]` (kept while muted)
    pub volume: f32,

    /// Mute flag
    pub muted: bool,

    /// Shuffle flag
    pub shuffle: bool,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Number of queue entries
    pub queue_len: usize,

    /// Cursor into the queue
    pub cursor: Option<usize>,
}

impl SessionSnapshot {
    /// Volume actually sent to the engine
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.volume
        }
    }

    /// The persisted subset
    pub fn preferences(&self) -> Preferences {
        Preferences {
            volume: self.volume,
            muted: self.muted,
            shuffle: self.shuffle,
            repeat: self.repeat,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            current_track: None,
            current_playlist: None,
            status: PlaybackStatus::Idle,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume: DEFAULT_VOLUME,
            muted: false,
            shuffle: false,
            repeat: RepeatMode::None,
            queue_len: 0,
            cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_states() {
        assert!(PlaybackStatus::Playing.is_active());
        assert!(PlaybackStatus::Paused.is_active());
        assert!(!PlaybackStatus::Loading.is_active());
        assert!(!PlaybackStatus::Idle.is_active());
        assert!(!PlaybackStatus::Errored.is_active());
    }

    #[test]
    fn muted_snapshot_has_zero_effective_volume() {
        let mut snapshot = SessionSnapshot::default();
        assert_eq!(snapshot.effective_volume(), 0.7);

        snapshot.muted = true;
        assert_eq!(snapshot.effective_volume(), 0.0);
        assert_eq!(snapshot.preferences().volume, 0.7);
    }
}
