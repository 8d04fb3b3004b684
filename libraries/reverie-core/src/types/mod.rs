mod ids;
mod playlist;
mod preferences;
mod track;

pub use ids::{PlaylistId, SourceRef, TrackId};
pub use playlist::{Mood, Playlist, PlaylistUpdate, Season};
pub use preferences::{Preferences, RepeatMode, DEFAULT_VOLUME};
pub use track::{ExtractedMetadata, IngestError, Track, TrackBlob};
