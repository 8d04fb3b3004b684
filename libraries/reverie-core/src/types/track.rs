/// Track domain type
use crate::types::{SourceRef, TrackId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// A single playable media item
///
/// Immutable once created; the track registry owns the canonical copy and
/// everything else holds clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: Option<String>,

    /// Album name
    pub album: Option<String>,

    /// Track duration in seconds (never negative)
    #[serde(deserialize_with = "non_negative_seconds")]
    pub duration_seconds: f64,

    /// Handle the playback engine resolves to bytes
    pub source_ref: SourceRef,

    /// When the track was added to the library
    pub added_at: DateTime<Utc>,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(title: impl Into<String>, duration_seconds: f64, source_ref: SourceRef) -> Self {
        Self {
            id: TrackId::generate(),
            title: title.into(),
            artist: None,
            album: None,
            duration_seconds: duration_seconds.max(0.0),
            source_ref,
            added_at: Utc::now(),
        }
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album
    #[must_use]
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }
}

fn non_negative_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let seconds = f64::deserialize(deserializer)?;
    Ok(if seconds.is_finite() { seconds.max(0.0) } else { 0.0 })
}

/// Raw input handed to the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackBlob {
    /// Original file name, used as a title fallback
    pub file_name: String,

    /// Where the engine will find the bytes once ingested
    pub source_ref: SourceRef,

    /// Raw bytes (may be empty when the extractor reads from `source_ref`)
    pub data: Vec<u8>,
}

impl TrackBlob {
    /// Create a blob
    pub fn new(file_name: impl Into<String>, source_ref: SourceRef, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            source_ref,
            data,
        }
    }

    /// File name without its extension
    pub fn file_stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// What a metadata extractor learned about a blob
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedMetadata {
    /// Duration in seconds
    pub duration_seconds: f64,

    /// Title tag
    pub title: Option<String>,

    /// Artist tag
    pub artist: Option<String>,

    /// Album tag
    pub album: Option<String>,
}

/// Metadata extraction failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestError {
    /// Human-readable reason
    pub message: String,
}

impl IngestError {
    /// Create an ingest error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for IngestError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_creation() {
        let track = Track::new("Song", 180.0, SourceRef::new("file:///a.mp3"))
            .with_artist("Artist")
            .with_album("Album");

        assert_eq!(track.title, "Song");
        assert_eq!(track.artist.as_deref(), Some("Artist"));
        assert_eq!(track.album.as_deref(), Some("Album"));
        assert_eq!(track.duration_seconds, 180.0);
    }

    #[test]
    fn negative_duration_is_clamped() {
        let track = Track::new("Song", -3.0, SourceRef::new("x"));
        assert_eq!(track.duration_seconds, 0.0);
    }

    #[test]
    fn blob_file_stem() {
        let blob = TrackBlob::new("night drive.flac", SourceRef::new("blob:1"), Vec::new());
        assert_eq!(blob.file_stem(), "night drive");

        let bare = TrackBlob::new("untitled", SourceRef::new("blob:2"), Vec::new());
        assert_eq!(bare.file_stem(), "untitled");
    }

    #[test]
    fn negative_duration_is_clamped_on_deserialize() {
        let track = Track::new("Song", 180.0, SourceRef::new("file:///a.mp3"));
        let mut value = serde_json::to_value(&track).unwrap();
        value["duration_seconds"] = serde_json::json!(-5.0);

        let restored: Track = serde_json::from_value(value).unwrap();
        assert_eq!(restored.duration_seconds, 0.0);
        assert_eq!(restored.id, track.id);
    }
}
