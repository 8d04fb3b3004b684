/// Reverie - media session demo and preference tool
mod config;
mod engine;
mod extractor;
mod surface;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::CliConfig;
use engine::{SimulatedCatalog, SimulatedEngine};
use extractor::DemoExtractor;
use reverie_core::types::{Mood, Playlist, PlaylistId, RepeatMode, Season, SourceRef, TrackBlob};
use reverie_library::{PlaylistStore, TrackRegistry};
use reverie_playback::{
    session_channel, ExternalControlBridge, SessionController, SessionEvent, SessionService,
    Volume,
};
use reverie_storage::{
    PersistedState, PersistenceGateway, PersistenceHandle, PersistenceWriter, SqliteKeyValueStore,
};
use std::{path::PathBuf, sync::Arc, time::Duration};
use surface::LoggingSurface;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEMO_PLAYLIST: &str = "Reverie Demo";

/// Slack on top of the demo's expected running time
const DEMO_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "reverie")]
#[command(about = "Reverie media session orchestrator", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./reverie.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the demo playlist through a simulated engine
    Demo {
        /// Press the "next" media key as soon as the first track starts
        #[arg(long)]
        skip_first: bool,
    },
    /// Show or change persisted preferences
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
    /// Manage playlists
    Playlists {
        #[command(subcommand)]
        action: PlaylistAction,
    },
}

#[derive(Subcommand)]
enum PrefsAction {
    /// Print stored preferences
    Show,
    /// Update stored preferences
    Set {
        /// Volume in [0, 1]
        #[arg(long)]
        volume: Option<f32>,
        #[arg(long)]
        muted: Option<bool>,
        #[arg(long)]
        shuffle: Option<bool>,
        /// none, one or all
        #[arg(long)]
        repeat: Option<RepeatMode>,
        #[arg(long)]
        minimized: Option<bool>,
        #[arg(long)]
        visualizer: Option<bool>,
    },
}

#[derive(Subcommand)]
enum PlaylistAction {
    /// List playlists
    List,
    /// Create an empty playlist
    Create {
        name: String,
        #[arg(long)]
        mood: Option<String>,
        #[arg(long)]
        season: Option<Season>,
    },
    /// Delete a playlist by id
    Delete { id: String },
    /// Suggest a playlist for a mood and/or season
    Suggest {
        #[arg(long)]
        mood: Option<String>,
        #[arg(long)]
        season: Option<Season>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = SqliteKeyValueStore::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open {}", config.database_url))?;
    let gateway = PersistenceGateway::new(Arc::new(store));
    let state = gateway.load().await;
    info!(
        "Restored {} playlists from {}",
        state.playlists.len(),
        config.database_url
    );

    let (writer, persist) = PersistenceWriter::new(gateway, state.clone());
    let writer = writer.spawn();

    let result = match cli.command {
        Commands::Demo { skip_first } => run_demo(&config, &state, &persist, skip_first).await,
        Commands::Prefs { action } => prefs(action, &state, &persist),
        Commands::Playlists { action } => playlists(action, &state, &persist),
    };

    // The writer drains once its last handle is gone
    drop(persist);
    writer.await.context("Persistence writer panicked")?;
    result
}

fn prefs(
    action: PrefsAction,
    state: &PersistedState,
    persist: &PersistenceHandle,
) -> anyhow::Result<()> {
    match action {
        PrefsAction::Show => {
            let p = state.preferences;
            println!("Preferences:");
            println!("  volume:     {:.2}", p.volume);
            println!("  muted:      {}", p.muted);
            println!("  shuffle:    {}", p.shuffle);
            println!("  repeat:     {}", p.repeat);
            println!("  minimized:  {}", state.ui.minimized);
            println!("  visualizer: {}", state.ui.visualizer);
        }
        PrefsAction::Set {
            volume,
            muted,
            shuffle,
            repeat,
            minimized,
            visualizer,
        } => {
            let mut preferences = state.preferences;
            let mut level = Volume::new(preferences.volume, preferences.muted);
            if let Some(volume) = volume {
                if !level.set_level(volume) {
                    anyhow::bail!("volume must be a finite number");
                }
            }
            preferences.volume = level.level();
            preferences.muted = muted.unwrap_or(preferences.muted);
            preferences.shuffle = shuffle.unwrap_or(preferences.shuffle);
            preferences.repeat = repeat.unwrap_or(preferences.repeat);
            persist.preferences_changed(preferences);

            let mut ui = state.ui;
            ui.minimized = minimized.unwrap_or(ui.minimized);
            ui.visualizer = visualizer.unwrap_or(ui.visualizer);
            persist.ui_flags_changed(ui);

            println!(
                "Saved: volume {:.2}, muted {}, shuffle {}, repeat {}",
                preferences.volume, preferences.muted, preferences.shuffle, preferences.repeat
            );
        }
    }
    Ok(())
}

fn playlists(
    action: PlaylistAction,
    state: &PersistedState,
    persist: &PersistenceHandle,
) -> anyhow::Result<()> {
    let mut store = PlaylistStore::from_playlists(state.playlists.clone());
    store.set_listener(Box::new(persist.playlist_listener()));

    match action {
        PlaylistAction::List => {
            println!("Playlists:");
            for playlist in store.playlists() {
                println!("  {} - {}", playlist.id, describe(playlist));
            }
        }
        PlaylistAction::Create { name, mood, season } => {
            let playlist = store.create_playlist(name, mood.map(Mood::new), season);
            println!("Created {} - {}", playlist.id, describe(&playlist));
        }
        PlaylistAction::Delete { id } => {
            let removed = store.delete_playlist(&PlaylistId::new(id))?;
            println!("Deleted {}", removed.name);
        }
        PlaylistAction::Suggest { mood, season } => {
            let mood = mood.map(Mood::new);
            match store.suggest_playlist_for_mood_and_season(mood.as_ref(), season) {
                Some(playlist) => println!("Suggested: {} - {}", playlist.id, describe(playlist)),
                None => println!("No matching playlist"),
            }
        }
    }
    Ok(())
}

fn describe(playlist: &Playlist) -> String {
    let mut tags = Vec::new();
    if let Some(mood) = &playlist.mood {
        tags.push(mood.to_string());
    }
    if let Some(season) = playlist.season {
        tags.push(season.to_string());
    }

    let mut line = format!("{} ({} tracks)", playlist.name, playlist.tracks.len());
    if !tags.is_empty() {
        line.push_str(&format!(" [{}]", tags.join(", ")));
    }
    line
}

/// Find the demo playlist, ingesting the demo tracks the first time
async fn demo_playlist(
    config: &CliConfig,
    state: &PersistedState,
    persist: &PersistenceHandle,
) -> anyhow::Result<Playlist> {
    let mut registry = TrackRegistry::new(Arc::new(DemoExtractor));
    registry.register_from_playlists(&state.playlists);

    let mut store = PlaylistStore::from_playlists(state.playlists.clone());
    store.set_listener(Box::new(persist.playlist_listener()));

    let existing = store
        .playlists()
        .iter()
        .find(|p| p.name == DEMO_PLAYLIST)
        .cloned();
    let playlist_id = match existing {
        Some(playlist) if !playlist.tracks.is_empty() => return Ok(playlist),
        Some(playlist) => playlist.id,
        None => {
            store
                .create_playlist(DEMO_PLAYLIST, Some(Mood::new("calm")), None)
                .id
        }
    };

    for i in 1..=config.demo.track_count {
        let data = extractor::tag_sheet(
            &format!("Demo Track {i}"),
            "Reverie Ensemble",
            "Simulations",
            config.demo.track_seconds,
        );
        let blob = TrackBlob::new(
            format!("demo-{i}.txt"),
            SourceRef::new(format!("sim://demo/{i}")),
            data,
        );
        match registry.ingest_track(blob).await {
            Ok(track) => {
                store.add_track_to_playlist(&playlist_id, track)?;
            }
            Err(e) => warn!("Skipping demo track {}: {}", i, e),
        }
    }

    store
        .get(&playlist_id)
        .cloned()
        .context("Demo playlist vanished")
}

async fn run_demo(
    config: &CliConfig,
    state: &PersistedState,
    persist: &PersistenceHandle,
    skip_first: bool,
) -> anyhow::Result<()> {
    let playlist = demo_playlist(config, state, persist).await?;
    let Some(first) = playlist.tracks.first().cloned() else {
        anyhow::bail!("Demo playlist has no tracks");
    };

    let mut catalog = SimulatedCatalog::new();
    let mut total_seconds = 0.0;
    for (i, track) in playlist.tracks.iter().enumerate() {
        let every = config.demo.broken_every;
        if every > 0 && (i + 1) % every == 0 {
            catalog.insert_broken(track.source_ref.clone());
        } else {
            catalog.insert(track.source_ref.clone(), track.duration_seconds);
            total_seconds += track.duration_seconds;
        }
    }

    let (handle, inbox) = session_channel();
    let engine = SimulatedEngine::new(handle.engine_sink(), catalog, config.engine.clone());
    let controller = SessionController::new(Box::new(engine), state.preferences);
    let session = SessionService::new(controller, inbox)
        .with_preferences_hook(persist.preferences_hook())
        .spawn();

    let surface = LoggingSurface::new();
    let keys = surface.media_keys();
    let bridge = ExternalControlBridge::new(surface, Arc::new(handle.clone()));
    let bridge = tokio::spawn(bridge.run(handle.subscribe_snapshots()));

    let mut events = handle.subscribe_events();
    info!(
        "Playing '{}' ({} tracks, repeat {}, shuffle {})",
        playlist.name,
        playlist.tracks.len(),
        state.preferences.repeat,
        state.preferences.shuffle
    );
    handle.play_track(first, Some(playlist.clone()))?;

    let budget = Duration::from_secs_f64(total_seconds / config.engine.speed) + DEMO_GRACE;
    let finished = tokio::time::timeout(budget, async {
        let mut skipped = !skip_first;
        loop {
            match events.recv().await {
                Ok(SessionEvent::QueueEnded) | Err(RecvError::Closed) => break,
                Ok(SessionEvent::TrackChanged { track: Some(track) }) => {
                    info!("Track: {}", track.title);
                    if !skipped {
                        skipped = true;
                        surface::press(&keys, |actions| actions.next());
                    }
                }
                Ok(SessionEvent::TrackLoadFailed { track_id, message }) => {
                    warn!("Skipped {}: {}", track_id, message);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => warn!("Missed {} session events", missed),
            }
        }
    })
    .await;

    if finished.is_err() {
        info!("Demo time budget reached; stopping");
    }

    handle.shutdown()?;
    let controller = session.await.context("Session task panicked")?;
    bridge.await.context("Bridge task panicked")?;

    let snapshot = controller.snapshot();
    info!(
        "Session finished: {} (queue {} entries, volume {:.2})",
        snapshot.status, snapshot.queue_len, snapshot.volume
    );
    Ok(())
}
