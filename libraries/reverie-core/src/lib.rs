//! Reverie Core
//!
//! Domain types, collaborator traits, and error handling shared by every
//! Reverie crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Playlist`, `Mood`, `Season`, `Preferences`
//! - **Collaborator Traits**: `MetadataExtractor`, `KeyValueStore`
//! - **Error Handling**: Unified `ReverieError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use reverie_core::types::{Mood, Playlist, Season, SourceRef, Track};
//!
//! let track = Track::new("Morning Light", 214.0, SourceRef::new("file:///music/light.flac"))
//!     .with_artist("Aurora Fields");
//!
//! let mut playlist = Playlist::new("Sunrise");
//! playlist.mood = Some(Mood::new("Calm"));
//! playlist.season = Some(Season::Spring);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ReverieError, Result};
pub use traits::{KeyValueStore, MetadataExtractor};

pub use types::{
    ExtractedMetadata, IngestError, Mood, Playlist, PlaylistId, PlaylistUpdate, Preferences,
    RepeatMode, Season, SourceRef, Track, TrackBlob, TrackId, DEFAULT_VOLUME,
};
