//! Persistence gateway
//!
//! Each persisted field lives under its own key as a JSON value, so one
//! corrupt entry only resets that field to its default.

use crate::error::{Result, StorageError};
use reverie_core::types::{Playlist, Preferences, RepeatMode, DEFAULT_VOLUME};
use reverie_core::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

// Key constants
/// Volume in `[0, 1]`
pub const KEY_VOLUME: &str = "playback.volume";

/// Mute flag
pub const KEY_MUTED: &str = "playback.muted";

/// Shuffle flag
pub const KEY_SHUFFLE: &str = "playback.shuffle";

/// Repeat mode ("None", "One", "All")
pub const KEY_REPEAT: &str = "playback.repeat";

/// All playlists, with their tracks
pub const KEY_PLAYLISTS: &str = "library.playlists";

/// Minimized player UI flag (opaque to playback)
pub const KEY_UI_MINIMIZED: &str = "ui.minimized";

/// Visualizer visibility UI flag (opaque to playback)
pub const KEY_UI_VISUALIZER: &str = "ui.visualizer";

/// UI flags persisted on behalf of the presentation layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiFlags {
    /// Player shown minimized
    pub minimized: bool,

    /// Visualizer shown
    pub visualizer: bool,
}

/// Everything the gateway restores at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersistedState {
    /// Volume, mute, shuffle, repeat
    pub preferences: Preferences,

    /// User playlists
    pub playlists: Vec<Playlist>,

    /// Presentation flags
    pub ui: UiFlags,
}

/// Reads and writes persisted state through a `KeyValueStore`
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceGateway {
    /// Create a gateway over `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Restore persisted state
    ///
    /// Never fails: each missing or unreadable key falls back to its default
    /// and the problem is logged.
    pub async fn load(&self) -> PersistedState {
        let defaults = Preferences::default();

        let volume: f32 = self.read_or(KEY_VOLUME, defaults.volume).await;
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            warn!("Stored volume {} is not finite, using default", volume);
            DEFAULT_VOLUME
        };

        let preferences = Preferences {
            volume,
            muted: self.read_or(KEY_MUTED, defaults.muted).await,
            shuffle: self.read_or(KEY_SHUFFLE, defaults.shuffle).await,
            repeat: self.read_or(KEY_REPEAT, RepeatMode::None).await,
        };

        let playlists: Vec<Playlist> = self.read_or(KEY_PLAYLISTS, Vec::new()).await;
        let ui = UiFlags {
            minimized: self.read_or(KEY_UI_MINIMIZED, false).await,
            visualizer: self.read_or(KEY_UI_VISUALIZER, false).await,
        };

        debug!(
            "Restored preferences {:?}, {} playlists",
            preferences,
            playlists.len()
        );

        PersistedState {
            preferences,
            playlists,
            ui,
        }
    }

    /// Persist every section
    ///
    /// # Errors
    /// Returns the first write failure
    pub async fn save(&self, state: &PersistedState) -> Result<()> {
        self.save_preferences(&state.preferences).await?;
        self.save_playlists(&state.playlists).await?;
        self.save_ui_flags(state.ui).await
    }

    /// Persist volume, mute, shuffle, and repeat
    ///
    /// # Errors
    /// Returns the first write failure
    pub async fn save_preferences(&self, preferences: &Preferences) -> Result<()> {
        self.write(KEY_VOLUME, &preferences.volume.clamp(0.0, 1.0))
            .await?;
        self.write(KEY_MUTED, &preferences.muted).await?;
        self.write(KEY_SHUFFLE, &preferences.shuffle).await?;
        self.write(KEY_REPEAT, &preferences.repeat).await
    }

    /// Persist all playlists
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails
    pub async fn save_playlists(&self, playlists: &[Playlist]) -> Result<()> {
        self.write(KEY_PLAYLISTS, playlists).await
    }

    /// Persist the UI flags
    ///
    /// # Errors
    /// Returns the first write failure
    pub async fn save_ui_flags(&self, ui: UiFlags) -> Result<()> {
        self.write(KEY_UI_MINIMIZED, &ui.minimized).await?;
        self.write(KEY_UI_VISUALIZER, &ui.visualizer).await
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.store.load(key).await? else {
            return Ok(None);
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StorageError::persistence_read(key, e.to_string()))
    }

    async fn read_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.read(key).await {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!("{}; falling back to default", e);
                default
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes =
            serde_json::to_vec(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.save(key, &bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKeyValueStore;

    fn gateway() -> (PersistenceGateway, Arc<MemoryKeyValueStore>) {
        let store = Arc::new(MemoryKeyValueStore::new());
        (PersistenceGateway::new(store.clone()), store)
    }

    #[tokio::test]
    async fn empty_store_yields_defaults() {
        let (gateway, _) = gateway();
        let state = gateway.load().await;

        assert_eq!(state.preferences.volume, 0.7);
        assert!(!state.preferences.shuffle);
        assert_eq!(state.preferences.repeat, RepeatMode::None);
        assert!(state.playlists.is_empty());
        assert_eq!(state.ui, UiFlags::default());
    }

    #[tokio::test]
    async fn malformed_key_only_resets_that_field() {
        let (gateway, store) = gateway();
        store.save(KEY_VOLUME, b"{not json").await.unwrap();
        store.save(KEY_SHUFFLE, b"true").await.unwrap();
        store.save(KEY_REPEAT, b"\"Sideways\"").await.unwrap();

        let state = gateway.load().await;

        assert_eq!(state.preferences.volume, 0.7);
        assert!(state.preferences.shuffle);
        assert_eq!(state.preferences.repeat, RepeatMode::None);
    }

    #[tokio::test]
    async fn out_of_range_volume_is_clamped_on_load() {
        let (gateway, store) = gateway();
        store.save(KEY_VOLUME, b"3.5").await.unwrap();

        assert_eq!(gateway.load().await.preferences.volume, 1.0);
    }

    #[tokio::test]
    async fn ui_flags_pass_through() {
        let (gateway, _) = gateway();
        let ui = UiFlags {
            minimized: true,
            visualizer: true,
        };
        gateway.save_ui_flags(ui).await.unwrap();

        assert_eq!(gateway.load().await.ui, ui);
    }
}
