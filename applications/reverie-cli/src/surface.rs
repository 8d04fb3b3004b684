/// Terminal stand-in for OS media controls
///
/// Mirrors now-playing state to the log and hands out the registered
/// transport actions so the demo can press "media keys".
use reverie_playback::{
    ControlSurface, MediaMetadata, PlaybackStatus, PositionState, TransportActions,
};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Registered transport actions, shared with whoever presses the keys
pub type MediaKeys = Arc<Mutex<Option<Arc<dyn TransportActions>>>>;

#[derive(Default)]
pub struct LoggingSurface {
    keys: MediaKeys,
}

impl LoggingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared slot holding the registered actions
    pub fn media_keys(&self) -> MediaKeys {
        Arc::clone(&self.keys)
    }
}

impl ControlSurface for LoggingSurface {
    fn register_action_handlers(&mut self, actions: Arc<dyn TransportActions>) {
        if let Ok(mut slot) = self.keys.lock() {
            *slot = Some(actions);
        }
        debug!("Media key handlers registered");
    }

    fn publish_metadata(&mut self, metadata: &MediaMetadata) {
        info!(
            "Now playing: {} - {}",
            metadata.artist.as_deref().unwrap_or("Unknown Artist"),
            metadata.title
        );
    }

    fn clear_metadata(&mut self) {
        info!("Nothing playing");
    }

    fn publish_position_state(&mut self, state: PositionState) {
        debug!(
            "Position {:.1}/{:.1}s (rate {})",
            state.position_seconds, state.duration_seconds, state.rate
        );
    }

    fn publish_playback_status(&mut self, status: PlaybackStatus) {
        info!("Playback {}", status);
    }
}

/// Press a media key, if handlers are registered
pub fn press(keys: &MediaKeys, key: impl FnOnce(&dyn TransportActions)) {
    let actions = keys.lock().ok().and_then(|slot| slot.clone());
    match actions {
        Some(actions) => key(actions.as_ref()),
        None => debug!("Media key pressed before handlers were registered"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingActions {
        next: AtomicUsize,
    }

    impl TransportActions for CountingActions {
        fn play(&self) {}
        fn pause(&self) {}
        fn next(&self) {
            self.next.fetch_add(1, Ordering::SeqCst);
        }
        fn previous(&self) {}
        fn seek_to(&self, _: f64) {}
    }

    #[test]
    fn media_keys_reach_registered_actions() {
        let mut surface = LoggingSurface::new();
        let keys = surface.media_keys();

        // Nothing registered yet
        press(&keys, |actions| actions.next());

        let actions = Arc::new(CountingActions::default());
        surface.register_action_handlers(actions.clone());
        press(&keys, |actions| actions.next());

        assert_eq!(actions.next.load(Ordering::SeqCst), 1);
    }
}
