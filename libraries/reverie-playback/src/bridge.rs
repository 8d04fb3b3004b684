//! External control bridge (OS media keys, lock screen, Now Playing)
//!
//! Two directions:
//! - Inbound: the surface calls [`TransportActions`], implemented by
//!   `SessionHandle`, so external play/pause/seek/next/previous go through
//!   the same command queue as everything else. Handlers are registered once,
//!   when the bridge is built.
//! - Outbound: every published [`SessionSnapshot`] is mirrored to the
//!   surface, deduplicated against what was last published. Values always
//!   come from the snapshot, never from an inbound command.

use crate::types::{PlaybackStatus, SessionSnapshot};
use reverie_core::types::{Track, TrackId};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Transport commands an external surface may issue
pub trait TransportActions: Send + Sync {
    /// Resume playback
    fn play(&self);

    /// Pause playback
    fn pause(&self);

    /// Skip to next track
    fn next(&self);

    /// Go to previous track
    fn previous(&self);

    /// Seek to position (in seconds)
    fn seek_to(&self, position_seconds: f64);
}

/// Now-playing metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    /// Track title
    pub title: String,
    /// Artist
    pub artist: Option<String>,
    /// Album
    pub album: Option<String>,
}

impl From<&Track> for MediaMetadata {
    fn from(track: &Track) -> Self {
        Self {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
        }
    }
}

/// Position state for scrubbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionState {
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Position in seconds
    pub position_seconds: f64,
    /// 1.0 while playing, 0.0 otherwise
    pub rate: f64,
}

impl PositionState {
    /// Position state mirrored from a snapshot
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        Self {
            duration_seconds: snapshot.duration_seconds,
            position_seconds: snapshot.position_seconds,
            rate: if snapshot.status == PlaybackStatus::Playing {
                1.0
            } else {
                0.0
            },
        }
    }
}

/// Platform media-control integration
pub trait ControlSurface: Send {
    /// Install the inbound command handlers
    fn register_action_handlers(&mut self, actions: Arc<dyn TransportActions>);

    /// Show now-playing metadata
    fn publish_metadata(&mut self, metadata: &MediaMetadata);

    /// Remove now-playing metadata (nothing is current)
    fn clear_metadata(&mut self);

    /// Update the scrubber
    fn publish_position_state(&mut self, state: PositionState);

    /// Update play/pause state
    fn publish_playback_status(&mut self, status: PlaybackStatus);
}

/// Mirrors session snapshots to a [`ControlSurface`]
pub struct ExternalControlBridge<S: ControlSurface> {
    surface: S,
    last_track: Option<TrackId>,
    last_position: Option<PositionState>,
    last_status: Option<PlaybackStatus>,
}

impl<S: ControlSurface> ExternalControlBridge<S> {
    /// Wrap `surface` and register `actions` as its handlers
    pub fn new(mut surface: S, actions: Arc<dyn TransportActions>) -> Self {
        surface.register_action_handlers(actions);
        Self {
            surface,
            last_track: None,
            last_position: None,
            last_status: None,
        }
    }

    /// Publish whatever changed since the last mirrored snapshot
    pub fn mirror(&mut self, snapshot: &SessionSnapshot) {
        let track_id = snapshot.current_track.as_ref().map(|t| t.id.clone());
        if track_id != self.last_track {
            match &snapshot.current_track {
                Some(track) => self.surface.publish_metadata(&MediaMetadata::from(track)),
                None => self.surface.clear_metadata(),
            }
            self.last_track = track_id;
        }

        let position = PositionState::from_snapshot(snapshot);
        if self.last_position != Some(position) {
            self.surface.publish_position_state(position);
            self.last_position = Some(position);
        }

        if self.last_status != Some(snapshot.status) {
            self.surface.publish_playback_status(snapshot.status);
            self.last_status = Some(snapshot.status);
        }
    }

    /// Mirror snapshots until the session stops publishing
    pub async fn run(mut self, mut snapshots: watch::Receiver<SessionSnapshot>) -> S {
        let initial = snapshots.borrow_and_update().clone();
        self.mirror(&initial);

        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            self.mirror(&snapshot);
        }

        debug!("Snapshot channel closed; bridge stopping");
        self.surface
    }

    /// The wrapped surface
    pub fn surface(&self) -> &S {
        &self.surface
    }
}
