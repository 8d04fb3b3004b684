//! Reverie Storage
//!
//! Persists the user-facing playback preferences, playlists, and a couple of
//! opaque UI flags to a durable key-value store, and restores them at
//! startup.
//!
//! Position and current track are deliberately not persisted: a fresh launch
//! always starts idle.
//!
//! # Example
//!
//! ```rust,no_run
//! use reverie_storage::{PersistenceGateway, SqliteKeyValueStore};
//! use std::sync::Arc;
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteKeyValueStore::connect("sqlite://reverie.db").await?;
//! let gateway = PersistenceGateway::new(Arc::new(store));
//!
//! // Never fails: unreadable keys fall back to defaults
//! let state = gateway.load().await;
//! println!("volume = {}", state.preferences.volume);
//! # Ok(())
//! # }
//! ```

mod error;
mod gateway;
mod memory;
mod sqlite;
mod writer;

pub use error::{Result, StorageError};
pub use gateway::{
    PersistedState, PersistenceGateway, UiFlags, KEY_MUTED, KEY_PLAYLISTS, KEY_REPEAT,
    KEY_SHUFFLE, KEY_UI_MINIMIZED, KEY_UI_VISUALIZER, KEY_VOLUME,
};
pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;
pub use writer::{PersistUpdate, PersistenceHandle, PersistenceWriter};
