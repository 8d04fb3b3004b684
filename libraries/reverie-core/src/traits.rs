/// Collaborator traits for Reverie
///
/// These are the seams through which the core reaches the outside world:
/// file ingestion and a durable key-value store. Playback engine and
/// media-control surface traits live next to the code that drives them in
/// `reverie-playback`.
use crate::error::Result;
use crate::types::{ExtractedMetadata, IngestError, TrackBlob};
use async_trait::async_trait;

/// File ingestion interface
///
/// Implementers read whatever tags and timing information a blob carries.
/// A failure means no track may be created from the blob.
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    /// Extract duration (and optional tags) from a blob
    ///
    /// # Errors
    /// Returns an `IngestError` if the blob cannot be probed
    async fn extract_metadata(
        &self,
        blob: &TrackBlob,
    ) -> std::result::Result<ExtractedMetadata, IngestError>;
}

/// Durable key-value store
///
/// Values are opaque bytes; callers own the encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`
    ///
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written
    async fn save(&self, key: &str, value: &[u8]) -> Result<()>;
}
