//! Simulated playback engine
//!
//! Stands in for a real decoder/output. Each load spawns a task that "decodes"
//! for a short delay, then advances a virtual clock while playing and reports
//! ticks and the end of track through the session's engine sink.

use crate::config::EngineSettings;
use reverie_core::types::SourceRef;
use reverie_playback::{EngineEventSink, LoadGeneration, PlaybackEngine, PlaybackError, Result};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
enum Control {
    Play,
    Pause,
    Seek(f64),
}

/// Source catalog the simulated engine can "decode"
#[derive(Debug, Clone, Default)]
pub struct SimulatedCatalog {
    durations: HashMap<SourceRef, f64>,
    broken: HashSet<SourceRef>,
}

impl SimulatedCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a playable source
    pub fn insert(&mut self, source: SourceRef, duration_seconds: f64) {
        self.durations.insert(source, duration_seconds);
    }

    /// Register a source that fails to decode
    pub fn insert_broken(&mut self, source: SourceRef) {
        self.broken.insert(source);
    }
}

pub struct SimulatedEngine {
    sink: EngineEventSink,
    catalog: SimulatedCatalog,
    settings: EngineSettings,
    volume: f32,
    current: Option<(mpsc::UnboundedSender<Control>, JoinHandle<()>)>,
}

impl SimulatedEngine {
    pub fn new(sink: EngineEventSink, catalog: SimulatedCatalog, settings: EngineSettings) -> Self {
        Self {
            sink,
            catalog,
            settings,
            volume: 0.0,
            current: None,
        }
    }

    fn control(&self, control: Control) -> Result<()> {
        let Some((tx, _)) = &self.current else {
            return Err(PlaybackError::engine("no track loaded"));
        };
        tx.send(control)
            .map_err(|_| PlaybackError::engine("playback task finished"))
    }
}

impl PlaybackEngine for SimulatedEngine {
    fn load(&mut self, source: &SourceRef, generation: LoadGeneration) -> Result<()> {
        if let Some((_, task)) = self.current.take() {
            task.abort();
        }

        let load_delay = Duration::from_millis(self.settings.load_delay_ms);
        let sink = self.sink.clone();

        if self.catalog.broken.contains(source) {
            let source = source.clone();
            tokio::spawn(async move {
                tokio::time::sleep(load_delay).await;
                sink.error(generation, format!("corrupt stream in {}", source.as_str()));
            });
            return Ok(());
        }

        let Some(&duration) = self.catalog.durations.get(source) else {
            return Err(PlaybackError::engine(format!(
                "unknown source {}",
                source.as_str()
            )));
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let clock = TrackClock {
            sink,
            generation,
            duration,
            load_delay,
            tick: Duration::from_millis(self.settings.tick_interval_ms),
            speed: self.settings.speed,
        };
        let task = tokio::spawn(clock.run(rx));

        debug!("Simulated load of {} ({})", source.as_str(), generation);
        self.current = Some((tx, task));
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.control(Control::Play)
    }

    fn pause(&mut self) -> Result<()> {
        // Pausing a finished or missing track is a no-op
        if let Err(e) = self.control(Control::Pause) {
            debug!("Simulated pause ignored: {}", e);
        }
        Ok(())
    }

    fn seek(&mut self, position_seconds: f64) -> Result<()> {
        self.control(Control::Seek(position_seconds))
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        debug!("Simulated output gain {:.2}", volume);
        self.volume = volume;
        Ok(())
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        if let Some((_, task)) = self.current.take() {
            task.abort();
        }
    }
}

/// Virtual clock for one loaded track
struct TrackClock {
    sink: EngineEventSink,
    generation: LoadGeneration,
    duration: f64,
    load_delay: Duration,
    tick: Duration,
    speed: f64,
}

impl TrackClock {
    async fn run(self, mut control: mpsc::UnboundedReceiver<Control>) {
        tokio::time::sleep(self.load_delay).await;
        self.sink.loaded(self.generation, self.duration);

        let step = self.tick.as_secs_f64() * self.speed;
        let mut ticker = tokio::time::interval(self.tick);
        let mut playing = false;
        let mut position = 0.0_f64;

        loop {
            tokio::select! {
                command = control.recv() => match command {
                    Some(Control::Play) => playing = true,
                    Some(Control::Pause) => playing = false,
                    Some(Control::Seek(to)) => position = to.clamp(0.0, self.duration),
                    None => return,
                },
                _ = ticker.tick(), if playing => {
                    position += step;
                    if position >= self.duration {
                        self.sink.ended(self.generation);
                        return;
                    }
                    self.sink.tick(self.generation, position);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reverie_core::types::{Preferences, Track};
    use reverie_playback::{session_channel, PlaybackStatus, SessionController, SessionService};

    fn fast_settings() -> EngineSettings {
        EngineSettings {
            speed: 1.0,
            tick_interval_ms: 100,
            load_delay_ms: 10,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn plays_track_to_the_end() {
        let (handle, inbox) = session_channel();
        let track = Track::new("Short", 1.0, SourceRef::new("sim://short"));

        let mut catalog = SimulatedCatalog::new();
        catalog.insert(track.source_ref.clone(), 1.0);
        let engine = SimulatedEngine::new(handle.engine_sink(), catalog, fast_settings());

        let controller = SessionController::new(Box::new(engine), Preferences::default());
        let task = SessionService::new(controller, inbox).spawn();
        let mut snapshots = handle.subscribe_snapshots();

        handle.play_track(track, None).unwrap();
        let done = snapshots
            .wait_for(|s| s.status == PlaybackStatus::Stopped)
            .await
            .unwrap()
            .clone();

        assert!(done.current_track.is_none());
        handle.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn broken_source_reports_error() {
        let (handle, inbox) = session_channel();
        let broken = Track::new("Broken", 10.0, SourceRef::new("sim://broken"));

        let mut catalog = SimulatedCatalog::new();
        catalog.insert_broken(broken.source_ref.clone());
        let engine = SimulatedEngine::new(handle.engine_sink(), catalog, fast_settings());

        let controller = SessionController::new(Box::new(engine), Preferences::default());
        let task = SessionService::new(controller, inbox).spawn();
        let mut events = handle.subscribe_events();

        handle.play_track(broken, None).unwrap();
        loop {
            match events.recv().await.unwrap() {
                reverie_playback::SessionEvent::TrackLoadFailed { .. } => break,
                _ => continue,
            }
        }

        handle.shutdown().unwrap();
        let controller = task.await.unwrap();
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
    }
}
