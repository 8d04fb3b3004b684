//! Session events
//!
//! Emitted by the controller while it processes an input and broadcast by
//! the service afterwards, in emission order.

use crate::types::PlaybackStatus;
use reverie_core::types::{Preferences, Track, TrackId};
use serde::{Deserialize, Serialize};

/// Events emitted by the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Status changed
    StateChanged {
        /// New status
        status: PlaybackStatus,
    },

    /// Current track changed (`None` when the queue ran out)
    TrackChanged {
        /// New current track
        track: Option<Track>,
    },

    /// Position or duration changed
    PositionChanged {
        /// Position in seconds
        position_seconds: f64,
        /// Duration in seconds
        duration_seconds: f64,
    },

    /// Volume or mute changed
    VolumeChanged {
        /// Stored level in `[0, 1]`
        volume: f32,
        /// Whether muted
        muted: bool,
    },

    /// Queue contents, order, or cursor changed
    QueueChanged {
        /// Number of entries
        length: usize,
        /// Cursor index
        cursor: Option<usize>,
    },

    /// Persisted preferences changed
    PreferencesChanged(Preferences),

    /// Engine failed to load or play a track; the session skips it
    TrackLoadFailed {
        /// Failed track
        track_id: TrackId,
        /// Engine-reported reason
        message: String,
    },

    /// Queue ran out; playback stopped
    QueueEnded,
}
