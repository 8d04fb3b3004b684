//! Reverie Library
//!
//! The shared data layer: a registry that owns every ingested `Track` and a
//! store that owns every `Playlist`.
//!
//! Tracks are owned independently of playlists. A track may appear in any
//! number of playlists (and several times in one), and deleting a playlist
//! never removes tracks from the registry.
//!
//! # Example
//!
//! ```rust
//! use reverie_core::types::{Mood, Season, SourceRef, Track};
//! use reverie_library::PlaylistStore;
//!
//! let mut store = PlaylistStore::new();
//! let playlist = store.create_playlist("Rainy Days", Some(Mood::new("calm")), Some(Season::Autumn));
//!
//! let track = Track::new("Drizzle", 201.0, SourceRef::new("file:///music/drizzle.ogg"));
//! store.add_track_to_playlist(&playlist.id, track).unwrap();
//!
//! let suggestion = store.suggest_playlist_for_mood_and_season(Some(&Mood::new("Calm")), None);
//! assert_eq!(suggestion.map(|p| p.id.clone()), Some(playlist.id));
//! ```

mod error;
mod playlists;
mod registry;

pub use error::{LibraryError, Result};
pub use playlists::{PlaylistListener, PlaylistStore};
pub use registry::TrackRegistry;
