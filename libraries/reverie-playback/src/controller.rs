//! Session controller - the playback state machine
//!
//! Owns the session (current track, status, position, volume) and the
//! queue, issues commands to the engine, and reacts to engine events.
//!
//! ```text
//! Idle ──> Loading ──> Playing <──> Paused
//!             ^                         │
//!             └── Stopped / Errored <───┘  (stop, failure, end of queue)
//! ```
//!
//! Every input is handled synchronously; side effects are recorded as
//! [`SessionEvent`]s and collected with [`SessionController::drain_events`].

use crate::{
    engine::{EngineEvent, LoadGeneration, PlaybackEngine},
    error::{PlaybackError, Result},
    events::SessionEvent,
    queue::QueueOrchestrator,
    types::{PlaybackStatus, SessionSnapshot},
    volume::Volume,
};
use reverie_core::types::{Playlist, PlaylistId, Preferences, RepeatMode, Track};
use tracing::{debug, info, warn};

/// Commands accepted by the session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Load and play `track`; a different `playlist` replaces the queue
    PlayTrack {
        /// Track to play
        track: Track,
        /// Playlist the track was chosen from
        playlist: Option<Playlist>,
    },

    /// Resume from pause
    Play,

    /// Pause playback
    Pause,

    /// Stop playback
    Stop,

    /// Seek to position (in seconds)
    Seek(f64),

    /// Set volume in `[0, 1]`
    SetVolume(f32),

    /// Toggle mute
    ToggleMute,

    /// Skip to the next track
    Next,

    /// Go to the previous track
    Previous,

    /// Append a track to the queue
    Enqueue(Track),

    /// Append several tracks to the queue
    EnqueueAll(Vec<Track>),

    /// Remove the queue entry at an index
    RemoveAt(usize),

    /// Clear the queue
    ClearQueue,

    /// Flip shuffle
    ToggleShuffle,

    /// Set shuffle
    SetShuffle(bool),

    /// Set repeat mode
    SetRepeat(RepeatMode),

    /// Advance repeat mode (None -> All -> One -> None)
    CycleRepeat,
}

/// Playback state machine
pub struct SessionController {
    engine: Box<dyn PlaybackEngine>,
    queue: QueueOrchestrator,
    volume: Volume,

    status: PlaybackStatus,
    current_track: Option<Track>,
    current_playlist: Option<PlaylistId>,
    position_seconds: f64,
    duration_seconds: f64,

    // Generation of the outstanding load; older engine events are stale
    generation: LoadGeneration,

    // Consecutive load failures since the last successful load
    failure_streak: usize,

    // Event queue, drained by the service after each input
    pending_events: Vec<SessionEvent>,
}

impl SessionController {
    /// Create a controller with restored preferences
    pub fn new(engine: Box<dyn PlaybackEngine>, preferences: Preferences) -> Self {
        Self::with_queue(engine, preferences, QueueOrchestrator::new())
    }

    /// Create a controller around a specific queue (e.g. seeded shuffle)
    pub fn with_queue(
        engine: Box<dyn PlaybackEngine>,
        preferences: Preferences,
        mut queue: QueueOrchestrator,
    ) -> Self {
        queue.set_shuffle(preferences.shuffle);
        queue.set_repeat_mode(preferences.repeat);

        let mut controller = Self {
            engine,
            queue,
            volume: Volume::new(preferences.volume, preferences.muted),
            status: PlaybackStatus::Idle,
            current_track: None,
            current_playlist: None,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            generation: LoadGeneration::default(),
            failure_streak: 0,
            pending_events: Vec::new(),
        };
        controller.push_volume_to_engine();
        controller
    }

    /// Apply a command
    pub fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::PlayTrack { track, playlist } => self.play_track(track, playlist),
            SessionCommand::Play => self.play(),
            SessionCommand::Pause => self.pause(),
            SessionCommand::Stop => self.stop(),
            SessionCommand::Seek(position) => self.seek(position),
            SessionCommand::SetVolume(level) => self.set_volume(level),
            SessionCommand::ToggleMute => self.toggle_mute(),
            SessionCommand::Next => self.next(),
            SessionCommand::Previous => self.previous(),
            SessionCommand::Enqueue(track) => self.enqueue(track),
            SessionCommand::EnqueueAll(tracks) => self.enqueue_all(tracks),
            SessionCommand::RemoveAt(index) => self.remove_at(index),
            SessionCommand::ClearQueue => self.clear_queue(),
            SessionCommand::ToggleShuffle => self.toggle_shuffle(),
            SessionCommand::SetShuffle(enabled) => self.set_shuffle(enabled),
            SessionCommand::SetRepeat(mode) => self.set_repeat(mode),
            SessionCommand::CycleRepeat => self.cycle_repeat(),
        }
    }

    /// Apply an engine event
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Loaded {
                generation,
                duration_seconds,
            } => self.on_loaded(generation, duration_seconds),
            EngineEvent::Tick {
                generation,
                position_seconds,
            } => self.on_tick(generation, position_seconds),
            EngineEvent::Ended { generation } => self.on_ended(generation),
            EngineEvent::Error {
                generation,
                message,
            } => self.on_error(generation, &message),
        }
    }

    // ===== Playback Control =====

    /// Load and play `track`
    ///
    /// When `playlist` differs from the playlist the queue came from, the
    /// queue is replaced with its tracks. The cursor then moves to `track`,
    /// which is appended if the queue does not hold it.
    pub fn play_track(&mut self, track: Track, playlist: Option<Playlist>) {
        self.failure_streak = 0;

        let playlist_id = playlist.as_ref().map(|p| p.id.clone());
        if let Some(playlist) = playlist {
            if self.current_playlist.as_ref() != Some(&playlist.id) {
                debug!(
                    "Replacing queue with playlist '{}' ({} tracks)",
                    playlist.name,
                    playlist.tracks.len()
                );
                self.queue.replace(playlist.tracks);
            }
        }
        self.current_playlist = playlist_id;

        if self.queue.select(&track.id).is_none() {
            let key = self.queue.enqueue(track.clone());
            self.queue.select_key(key);
        }
        self.emit_queue_changed();

        self.begin_load(track);
    }

    /// Resume playback (Paused only)
    pub fn play(&mut self) {
        if self.status != PlaybackStatus::Paused {
            self.reject("play");
            return;
        }

        if let Err(e) = self.engine.play() {
            warn!("Engine failed to resume: {}", e);
        }
        self.set_status(PlaybackStatus::Playing);
    }

    /// Pause playback (Playing only)
    pub fn pause(&mut self) {
        if self.status != PlaybackStatus::Playing {
            self.reject("pause");
            return;
        }

        if let Err(e) = self.engine.pause() {
            warn!("Engine failed to pause: {}", e);
        }
        self.set_status(PlaybackStatus::Paused);
    }

    /// Stop playback
    ///
    /// Keeps the current track but drops interest in any pending load.
    pub fn stop(&mut self) {
        self.generation = self.generation.next();
        self.failure_streak = 0;

        if let Err(e) = self.engine.pause() {
            warn!("Engine failed to pause on stop: {}", e);
        }

        self.position_seconds = 0.0;
        self.set_status(PlaybackStatus::Stopped);
        self.emit_position_changed();
    }

    /// Seek within the current track (Playing or Paused)
    pub fn seek(&mut self, position_seconds: f64) {
        if !self.status.is_active() {
            self.reject("seek");
            return;
        }
        if !position_seconds.is_finite() {
            self.reject("seek to non-finite position");
            return;
        }

        let position = clamp_position(position_seconds, self.duration_seconds);
        if let Err(e) = self.engine.seek(position) {
            warn!("Engine failed to seek: {}", e);
            return;
        }

        self.position_seconds = position;
        self.emit_position_changed();
    }

    /// Skip to the next track under the current shuffle/repeat policy
    pub fn next(&mut self) {
        if self.queue.is_empty() {
            self.reject("next on empty queue");
            return;
        }

        self.failure_streak = 0;
        self.advance();
    }

    /// Go to the previous track (wraps to the last entry)
    pub fn previous(&mut self) {
        let Some(track) = self.queue.previous() else {
            self.reject("previous on empty queue");
            return;
        };

        self.failure_streak = 0;
        self.emit_queue_changed();
        self.begin_load(track);
    }

    // ===== Volume =====

    /// Set volume; clamped to `[0, 1]`, non-finite input ignored
    pub fn set_volume(&mut self, level: f32) {
        let before = self.volume;
        if !self.volume.set_level(level) {
            self.reject("set volume to non-finite level");
            return;
        }
        if self.volume != before {
            self.volume_changed();
        }
    }

    /// Toggle mute (stored level is kept)
    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.volume_changed();
    }

    // ===== Queue Management =====

    /// Append a track
    pub fn enqueue(&mut self, track: Track) {
        self.queue.enqueue(track);
        self.emit_queue_changed();
    }

    /// Append several tracks
    pub fn enqueue_all(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.queue.enqueue_all(tracks);
        self.emit_queue_changed();
    }

    /// Remove the queue entry at `index`
    ///
    /// The current track keeps playing if its entry is removed.
    pub fn remove_at(&mut self, index: usize) {
        if self.queue.remove_at(index).is_none() {
            self.reject("remove past end of queue");
            return;
        }
        self.emit_queue_changed();
    }

    /// Clear the queue; the current track keeps playing
    pub fn clear_queue(&mut self) {
        self.queue.clear();
        self.current_playlist = None;
        self.emit_queue_changed();
    }

    /// Flip shuffle
    pub fn toggle_shuffle(&mut self) {
        self.queue.toggle_shuffle();
        self.emit_queue_changed();
        self.emit_preferences_changed();
    }

    /// Set shuffle
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.queue.set_shuffle(enabled) {
            self.emit_queue_changed();
            self.emit_preferences_changed();
        }
    }

    /// Set repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.queue.repeat_mode() != mode {
            self.queue.set_repeat_mode(mode);
            self.emit_preferences_changed();
        }
    }

    /// Advance repeat mode
    pub fn cycle_repeat(&mut self) {
        self.queue.cycle_repeat_mode();
        self.emit_preferences_changed();
    }

    // ===== Engine Events =====

    /// Engine finished loading
    pub fn on_loaded(&mut self, generation: LoadGeneration, duration_seconds: f64) {
        if !self.is_current(generation, "loaded") {
            return;
        }
        if self.status != PlaybackStatus::Loading {
            debug!("Ignoring load completion while {}", self.status);
            return;
        }

        self.failure_streak = 0;
        if duration_seconds.is_finite() && duration_seconds >= 0.0 {
            self.duration_seconds = duration_seconds;
        }
        self.position_seconds = 0.0;

        if let Err(e) = self.engine.play() {
            warn!("Engine failed to start playback: {}", e);
        }
        self.set_status(PlaybackStatus::Playing);
        self.emit_position_changed();
    }

    /// Engine reported a position
    pub fn on_tick(&mut self, generation: LoadGeneration, position_seconds: f64) {
        if !self.is_current(generation, "tick") {
            return;
        }
        if !self.status.is_active() || !position_seconds.is_finite() {
            return;
        }

        let position = clamp_position(position_seconds, self.duration_seconds);
        if position != self.position_seconds {
            self.position_seconds = position;
            self.emit_position_changed();
        }
    }

    /// Engine reached the end of the track
    pub fn on_ended(&mut self, generation: LoadGeneration) {
        if !self.is_current(generation, "ended") {
            return;
        }
        self.advance();
    }

    /// Engine failed to load or play the track
    pub fn on_error(&mut self, generation: LoadGeneration, message: &str) {
        if !self.is_current(generation, "error") {
            return;
        }
        self.fail_current(message);
    }

    // ===== State Queries =====

    /// Current status
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Track loaded or loading
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Position in seconds
    pub fn position(&self) -> f64 {
        self.position_seconds
    }

    /// Duration of the current track in seconds
    pub fn duration(&self) -> f64 {
        self.duration_seconds
    }

    /// Volume controller
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// The queue
    pub fn queue(&self) -> &QueueOrchestrator {
        &self.queue
    }

    /// Generation of the outstanding load
    pub fn generation(&self) -> LoadGeneration {
        self.generation
    }

    /// The persisted subset of the session
    pub fn preferences(&self) -> Preferences {
        Preferences {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            shuffle: self.queue.is_shuffled(),
            repeat: self.queue.repeat_mode(),
        }
    }

    /// Immutable copy of observable state
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_track: self.current_track.clone(),
            current_playlist: self.current_playlist.clone(),
            status: self.status,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
            shuffle: self.queue.is_shuffled(),
            repeat: self.queue.repeat_mode(),
            queue_len: self.queue.len(),
            cursor: self.queue.cursor(),
        }
    }

    /// Take all events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    /// The one place that decides what plays after the current track
    fn advance(&mut self) {
        match self.queue.next() {
            Some(track) => {
                self.emit_queue_changed();
                self.begin_load(track);
            }
            None => self.end_of_queue(),
        }
    }

    /// Load `track`, skipping forward past entries the engine rejects outright
    fn begin_load(&mut self, track: Track) {
        let mut candidate = Some(track);
        while let Some(track) = candidate.take() {
            if let Err(e) = self.start_load(track) {
                candidate = self.record_failure(&e.to_string());
            }
        }
    }

    fn start_load(&mut self, track: Track) -> Result<()> {
        self.generation = self.generation.next();

        let track_changed = self.current_track.as_ref().map(|t| &t.id) != Some(&track.id);
        let source = track.source_ref.clone();

        debug!("Loading '{}' ({})", track.title, self.generation);
        self.position_seconds = 0.0;
        self.duration_seconds = non_negative(track.duration_seconds);
        self.current_track = Some(track);

        self.set_status(PlaybackStatus::Loading);
        if track_changed {
            self.emit_track_changed();
        }
        self.emit_position_changed();

        self.engine.load(&source, self.generation)
    }

    /// Surface an asynchronous failure, then skip
    fn fail_current(&mut self, message: &str) {
        if let Some(track) = self.record_failure(message) {
            self.begin_load(track);
        }
    }

    /// Surface the failure and pick the entry to try next
    ///
    /// Stops instead once the failure streak exceeds the queue length, so an
    /// error arriving after the queue was cleared stops at once.
    fn record_failure(&mut self, message: &str) -> Option<Track> {
        let error = PlaybackError::TrackLoad {
            track: self
                .current_track
                .as_ref()
                .map_or_else(|| "<none>".to_string(), |t| t.title.clone()),
            reason: message.to_string(),
        };
        warn!("{}", error);

        self.set_status(PlaybackStatus::Errored);
        if let Some(track) = &self.current_track {
            self.pending_events.push(SessionEvent::TrackLoadFailed {
                track_id: track.id.clone(),
                message: message.to_string(),
            });
        }

        self.failure_streak += 1;
        if self.failure_streak > self.queue.len() {
            warn!(
                "{} consecutive load failures; stopping playback",
                self.failure_streak
            );
            self.end_of_queue();
            return None;
        }

        match self.queue.next() {
            Some(track) => {
                self.emit_queue_changed();
                Some(track)
            }
            None => {
                self.end_of_queue();
                None
            }
        }
    }

    fn end_of_queue(&mut self) {
        info!("Queue ended");
        self.generation = self.generation.next();
        self.failure_streak = 0;

        if let Err(e) = self.engine.pause() {
            warn!("Engine failed to pause at end of queue: {}", e);
        }

        self.position_seconds = 0.0;
        self.duration_seconds = 0.0;
        self.set_status(PlaybackStatus::Stopped);
        if self.current_track.take().is_some() {
            self.emit_track_changed();
        }
        self.emit_position_changed();
        self.emit_queue_changed();
        self.pending_events.push(SessionEvent::QueueEnded);
    }

    fn is_current(&self, generation: LoadGeneration, what: &str) -> bool {
        if generation == self.generation {
            return true;
        }
        debug!(
            "Dropping stale engine {} for {} (current {})",
            what, generation, self.generation
        );
        false
    }

    fn reject(&self, command: &str) {
        let error = PlaybackError::invalid_command(format!("{} while {}", command, self.status));
        debug!("Ignoring command: {}", error);
    }

    fn push_volume_to_engine(&mut self) {
        if let Err(e) = self.engine.set_volume(self.volume.gain()) {
            warn!("Engine failed to set volume: {}", e);
        }
    }

    fn volume_changed(&mut self) {
        self.push_volume_to_engine();
        self.pending_events.push(SessionEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        });
        self.emit_preferences_changed();
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!("Session {} -> {}", self.status, status);
            self.status = status;
            self.pending_events
                .push(SessionEvent::StateChanged { status });
        }
    }

    fn emit_track_changed(&mut self) {
        self.pending_events.push(SessionEvent::TrackChanged {
            track: self.current_track.clone(),
        });
    }

    fn emit_position_changed(&mut self) {
        self.pending_events.push(SessionEvent::PositionChanged {
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
        });
    }

    fn emit_queue_changed(&mut self) {
        self.pending_events.push(SessionEvent::QueueChanged {
            length: self.queue.len(),
            cursor: self.queue.cursor(),
        });
    }

    fn emit_preferences_changed(&mut self) {
        self.pending_events
            .push(SessionEvent::PreferencesChanged(self.preferences()));
    }
}

/// Durations from persisted or engine data may be negative or NaN
fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

/// `f64::clamp` panics when the bounds are inverted; this never does
fn clamp_position(position: f64, duration: f64) -> f64 {
    position.min(non_negative(duration)).max(0.0)
}
