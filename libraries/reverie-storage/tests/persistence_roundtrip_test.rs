//! Persistence round trips through real stores

use reverie_core::types::{Mood, Playlist, Preferences, RepeatMode, Season, SourceRef, Track};
use reverie_storage::{
    MemoryKeyValueStore, PersistedState, PersistenceGateway, PersistenceWriter,
    SqliteKeyValueStore, UiFlags,
};
use std::sync::Arc;

fn sample_playlist() -> Playlist {
    let mut playlist = Playlist::new("Evening");
    playlist.mood = Some(Mood::new("calm"));
    playlist.season = Some(Season::Autumn);
    playlist.tracks.push(
        Track::new("Low Tide", 201.5, SourceRef::new("file:///music/low-tide.flac"))
            .with_artist("Harbor"),
    );
    playlist
}

fn sample_preferences() -> Preferences {
    Preferences {
        volume: 0.3,
        muted: false,
        shuffle: true,
        repeat: RepeatMode::All,
    }
}

#[tokio::test]
async fn sqlite_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("reverie.db").display());
    let playlist = sample_playlist();

    {
        let store = SqliteKeyValueStore::connect(&url).await.unwrap();
        let gateway = PersistenceGateway::new(Arc::new(store));
        gateway
            .save(&PersistedState {
                preferences: sample_preferences(),
                playlists: vec![playlist.clone()],
                ui: UiFlags::default(),
            })
            .await
            .unwrap();
    }

    let store = SqliteKeyValueStore::connect(&url).await.unwrap();
    let restored = PersistenceGateway::new(Arc::new(store)).load().await;

    assert_eq!(restored.preferences, sample_preferences());
    assert_eq!(restored.playlists, vec![playlist]);
}

#[tokio::test]
async fn writer_flushes_latest_state_before_exit() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let gateway = PersistenceGateway::new(store.clone());
    let (writer, handle) = PersistenceWriter::new(gateway.clone(), PersistedState::default());
    let task = writer.spawn();

    // Intermediate values are coalesced away; only the last one matters
    let mut prefs = sample_preferences();
    prefs.volume = 0.9;
    handle.preferences_changed(prefs);
    handle.preferences_changed(sample_preferences());
    handle.playlists_changed(&[sample_playlist()]);

    drop(handle);
    task.await.unwrap();

    let restored = gateway.load().await;
    assert_eq!(restored.preferences, sample_preferences());
    assert_eq!(restored.playlists.len(), 1);
    assert_eq!(restored.playlists[0].name, "Evening");
}

#[tokio::test]
async fn writer_skips_unchanged_sections() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let gateway = PersistenceGateway::new(store.clone());
    let (writer, handle) = PersistenceWriter::new(gateway, PersistedState::default());
    let task = writer.spawn();

    handle.preferences_changed(Preferences::default());
    handle.ui_flags_changed(UiFlags::default());

    drop(handle);
    task.await.unwrap();

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn listener_closures_feed_the_writer() {
    let store = Arc::new(MemoryKeyValueStore::new());
    let gateway = PersistenceGateway::new(store.clone());
    let (writer, handle) = PersistenceWriter::new(gateway.clone(), PersistedState::default());
    let task = writer.spawn();

    let on_playlists = handle.playlist_listener();
    let on_preferences = handle.preferences_hook();
    on_playlists(&[sample_playlist()]);
    on_preferences(&sample_preferences());

    drop(on_playlists);
    drop(on_preferences);
    drop(handle);
    task.await.unwrap();

    let restored = gateway.load().await;
    assert_eq!(restored.preferences.repeat, RepeatMode::All);
    assert_eq!(restored.playlists.len(), 1);
}
