/// Demo metadata extractor
///
/// Demo blobs carry plain `key=value` lines instead of real audio, e.g.
///
/// ```text
/// title=Harbor Lights
/// artist=Tide
/// duration=184.5
/// ```
use async_trait::async_trait;
use reverie_core::types::{ExtractedMetadata, IngestError, TrackBlob};
use reverie_core::MetadataExtractor;

pub struct DemoExtractor;

#[async_trait]
impl MetadataExtractor for DemoExtractor {
    async fn extract_metadata(&self, blob: &TrackBlob) -> Result<ExtractedMetadata, IngestError> {
        let text = std::str::from_utf8(&blob.data)
            .map_err(|_| IngestError::new(format!("{} is not a tag sheet", blob.file_name)))?;

        let mut metadata = ExtractedMetadata::default();
        let mut duration = None;

        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim() {
                "title" => metadata.title = Some(value),
                "artist" => metadata.artist = Some(value),
                "album" => metadata.album = Some(value),
                "duration" => {
                    let seconds: f64 = value
                        .parse()
                        .map_err(|_| IngestError::new(format!("bad duration '{value}'")))?;
                    duration = Some(seconds);
                }
                _ => {}
            }
        }

        metadata.duration_seconds =
            duration.ok_or_else(|| IngestError::new("no duration in tag sheet"))?;
        Ok(metadata)
    }
}

/// Build a demo tag sheet
pub fn tag_sheet(title: &str, artist: &str, album: &str, duration_seconds: f64) -> Vec<u8> {
    format!("title={title}\nartist={artist}\nalbum={album}\nduration={duration_seconds}\n")
        .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_core::types::SourceRef;

    fn blob(data: &[u8]) -> TrackBlob {
        TrackBlob::new("demo.txt", SourceRef::new("sim://demo"), data.to_vec())
    }

    #[tokio::test]
    async fn reads_tags_and_duration() {
        let data = tag_sheet("Harbor Lights", "Tide", "Coastline", 184.5);
        let metadata = DemoExtractor.extract_metadata(&blob(&data)).await.unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Harbor Lights"));
        assert_eq!(metadata.artist.as_deref(), Some("Tide"));
        assert_eq!(metadata.album.as_deref(), Some("Coastline"));
        assert_eq!(metadata.duration_seconds, 184.5);
    }

    #[tokio::test]
    async fn missing_duration_is_an_ingest_error() {
        let err = DemoExtractor
            .extract_metadata(&blob(b"title=No Length\n"))
            .await
            .unwrap_err();
        assert!(err.message.contains("duration"));

        assert!(DemoExtractor
            .extract_metadata(&blob(b"duration=soon\n"))
            .await
            .is_err());
    }
}
