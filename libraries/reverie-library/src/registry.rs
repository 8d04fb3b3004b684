//! Track registry
//!
//! Owns every ingested track. Ingestion is all-or-nothing: a blob whose
//! metadata cannot be extracted never produces a registry entry.

use crate::error::{LibraryError, Result};
use reverie_core::types::{Playlist, Track, TrackBlob, TrackId};
use reverie_core::MetadataExtractor;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of ingested tracks
pub struct TrackRegistry {
    extractor: Arc<dyn MetadataExtractor>,
    tracks: HashMap<TrackId, Track>,
    /// Registration order, for stable listing
    order: Vec<TrackId>,
}

impl TrackRegistry {
    /// Create an empty registry backed by `extractor`
    pub fn new(extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self {
            extractor,
            tracks: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Ingest a blob and register the resulting track
    ///
    /// Title falls back to the blob's file stem when the extractor finds no
    /// title tag.
    ///
    /// # Errors
    /// Returns `LibraryError::TrackIngest` if extraction fails or reports an
    /// unusable duration. Nothing is registered in that case.
    pub async fn ingest_track(&mut self, blob: TrackBlob) -> Result<Track> {
        let metadata = match self.extractor.extract_metadata(&blob).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Failed to ingest {}: {}", blob.file_name, e);
                return Err(LibraryError::TrackIngest {
                    file_name: blob.file_name,
                    reason: e.message,
                });
            }
        };

        if !metadata.duration_seconds.is_finite() || metadata.duration_seconds < 0.0 {
            warn!(
                "Rejecting {}: invalid duration {}",
                blob.file_name, metadata.duration_seconds
            );
            return Err(LibraryError::TrackIngest {
                file_name: blob.file_name,
                reason: format!("invalid duration: {}", metadata.duration_seconds),
            });
        }

        let title = metadata
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| blob.file_stem().to_string());

        let mut track = Track::new(title, metadata.duration_seconds, blob.source_ref);
        track.artist = metadata.artist;
        track.album = metadata.album;

        info!("Ingested '{}' ({:.1}s)", track.title, track.duration_seconds);
        self.insert(track.clone());
        Ok(track)
    }

    /// Register an already-built track (e.g. restored from persisted playlists)
    ///
    /// Returns false if a track with the same id is already registered.
    pub fn register(&mut self, track: Track) -> bool {
        if self.tracks.contains_key(&track.id) {
            return false;
        }
        self.insert(track);
        true
    }

    /// Register every track referenced by `playlists`
    pub fn register_from_playlists(&mut self, playlists: &[Playlist]) {
        let before = self.tracks.len();
        for track in playlists.iter().flat_map(|p| p.tracks.iter()) {
            self.register(track.clone());
        }
        debug!(
            "Registered {} tracks from {} playlists",
            self.tracks.len() - before,
            playlists.len()
        );
    }

    /// Look up a track by id
    pub fn get(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.get(id)
    }

    /// Look up a track by id, failing if absent
    ///
    /// # Errors
    /// Returns `LibraryError::TrackNotFound` if the id is unknown
    pub fn require(&self, id: &TrackId) -> Result<&Track> {
        self.get(id)
            .ok_or_else(|| LibraryError::TrackNotFound(id.clone()))
    }

    /// All tracks in registration order
    pub fn tracks(&self) -> Vec<&Track> {
        self.order
            .iter()
            .filter_map(|id| self.tracks.get(id))
            .collect()
    }

    /// Number of registered tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    fn insert(&mut self, track: Track) {
        self.order.push(track.id.clone());
        self.tracks.insert(track.id.clone(), track);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_core::types::{ExtractedMetadata, IngestError, SourceRef};

    struct FixedExtractor(std::result::Result<ExtractedMetadata, IngestError>);

    #[async_trait::async_trait]
    impl MetadataExtractor for FixedExtractor {
        async fn extract_metadata(
            &self,
            _blob: &TrackBlob,
        ) -> std::result::Result<ExtractedMetadata, IngestError> {
            self.0.clone()
        }
    }

    fn blob(name: &str) -> TrackBlob {
        TrackBlob::new(name, SourceRef::new(format!("blob:{name}")), vec![1, 2, 3])
    }

    #[tokio::test]
    async fn ingest_uses_file_stem_without_title_tag() {
        let extractor = FixedExtractor(Ok(ExtractedMetadata {
            duration_seconds: 93.5,
            ..Default::default()
        }));
        let mut registry = TrackRegistry::new(Arc::new(extractor));

        let track = registry.ingest_track(blob("lullaby.mp3")).await.unwrap();

        assert_eq!(track.title, "lullaby");
        assert_eq!(track.duration_seconds, 93.5);
        assert_eq!(track.source_ref.as_str(), "blob:lullaby.mp3");
        assert_eq!(registry.get(&track.id), Some(&track));
    }

    #[tokio::test]
    async fn ingest_failure_registers_nothing() {
        let extractor = FixedExtractor(Err(IngestError::new("not audio")));
        let mut registry = TrackRegistry::new(Arc::new(extractor));

        let result = registry.ingest_track(blob("notes.txt")).await;

        assert!(matches!(result, Err(LibraryError::TrackIngest { .. })));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn non_finite_duration_is_rejected() {
        let extractor = FixedExtractor(Ok(ExtractedMetadata {
            duration_seconds: f64::NAN,
            ..Default::default()
        }));
        let mut registry = TrackRegistry::new(Arc::new(extractor));

        assert!(registry.ingest_track(blob("broken.wav")).await.is_err());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn register_is_idempotent_per_id() {
        let extractor = FixedExtractor(Err(IngestError::new("unused")));
        let mut registry = TrackRegistry::new(Arc::new(extractor));
        let track = Track::new("A", 10.0, SourceRef::new("a"));

        assert!(registry.register(track.clone()));
        assert!(!registry.register(track.clone()));
        assert_eq!(registry.len(), 1);
        assert!(registry.require(&track.id).is_ok());
        assert!(registry.require(&TrackId::new("missing")).is_err());
    }
}
