//! Session service - serialized command loop
//!
//! One tokio task owns the [`SessionController`]. Caller commands and engine
//! events arrive on the same unbounded channel and are processed strictly
//! one at a time. After each input the service broadcasts the emitted
//! events and publishes a fresh snapshot.
//!
//! ```text
//! SessionHandle ──┐
//!                 ├──> mpsc<SessionInput> ──> SessionService ──> watch<SessionSnapshot>
//! EngineEventSink ┘                               │          └─> broadcast<SessionEvent>
//!                                                 └─> preferences hook
//! ```

use crate::{
    bridge::TransportActions,
    controller::{SessionCommand, SessionController},
    engine::{EngineEvent, EngineEventSink},
    error::{PlaybackError, Result},
    events::SessionEvent,
    types::SessionSnapshot,
};
use reverie_core::types::{Playlist, Preferences, RepeatMode, Track};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Capacity of the event broadcast; slow subscribers lag rather than block
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Input to the session loop
#[derive(Debug)]
pub enum SessionInput {
    /// Caller command
    Command(Box<SessionCommand>),

    /// Engine report
    Engine(EngineEvent),

    /// Stop the loop
    Shutdown,
}

/// Callback run with the new preferences whenever they change
pub type PreferencesHook = Box<dyn Fn(&Preferences) + Send + Sync>;

/// Create the channels that connect handles to a service
///
/// The handle can be cloned freely and is also the source of the engine's
/// event sink, so the engine can be built before the service.
pub fn session_channel() -> (SessionHandle, SessionInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(SessionSnapshot::default());
    let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

    let handle = SessionHandle {
        tx,
        snapshots: snapshot_rx,
        events: event_tx.clone(),
    };
    let inbox = SessionInbox {
        rx,
        snapshot_tx,
        event_tx,
    };
    (handle, inbox)
}

/// Receiving side of [`session_channel`]
pub struct SessionInbox {
    rx: mpsc::UnboundedReceiver<SessionInput>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    event_tx: broadcast::Sender<SessionEvent>,
}

/// Cloneable entry point to a running session
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionInput>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionHandle {
    /// Send a command
    ///
    /// # Errors
    /// Returns `ServiceClosed` once the service has stopped
    pub fn send(&self, command: SessionCommand) -> Result<()> {
        self.tx
            .send(SessionInput::Command(Box::new(command)))
            .map_err(|_| PlaybackError::ServiceClosed)
    }

    /// Play `track`, optionally from `playlist`
    pub fn play_track(&self, track: Track, playlist: Option<Playlist>) -> Result<()> {
        self.send(SessionCommand::PlayTrack { track, playlist })
    }

    /// Resume playback
    pub fn play(&self) -> Result<()> {
        self.send(SessionCommand::Play)
    }

    /// Pause playback
    pub fn pause(&self) -> Result<()> {
        self.send(SessionCommand::Pause)
    }

    /// Stop playback
    pub fn stop(&self) -> Result<()> {
        self.send(SessionCommand::Stop)
    }

    /// Seek to position (in seconds)
    pub fn seek(&self, position_seconds: f64) -> Result<()> {
        self.send(SessionCommand::Seek(position_seconds))
    }

    /// Set volume in `[0, 1]`
    pub fn set_volume(&self, level: f32) -> Result<()> {
        self.send(SessionCommand::SetVolume(level))
    }

    /// Toggle mute
    pub fn toggle_mute(&self) -> Result<()> {
        self.send(SessionCommand::ToggleMute)
    }

    /// Skip to next track
    pub fn next(&self) -> Result<()> {
        self.send(SessionCommand::Next)
    }

    /// Go to previous track
    pub fn previous(&self) -> Result<()> {
        self.send(SessionCommand::Previous)
    }

    /// Append a track to the queue
    pub fn enqueue(&self, track: Track) -> Result<()> {
        self.send(SessionCommand::Enqueue(track))
    }

    /// Append several tracks to the queue
    pub fn enqueue_all(&self, tracks: Vec<Track>) -> Result<()> {
        self.send(SessionCommand::EnqueueAll(tracks))
    }

    /// Remove the queue entry at `index`
    pub fn remove_at(&self, index: usize) -> Result<()> {
        self.send(SessionCommand::RemoveAt(index))
    }

    /// Clear the queue
    pub fn clear_queue(&self) -> Result<()> {
        self.send(SessionCommand::ClearQueue)
    }

    /// Flip shuffle
    pub fn toggle_shuffle(&self) -> Result<()> {
        self.send(SessionCommand::ToggleShuffle)
    }

    /// Set shuffle
    pub fn set_shuffle(&self, enabled: bool) -> Result<()> {
        self.send(SessionCommand::SetShuffle(enabled))
    }

    /// Set repeat mode
    pub fn set_repeat(&self, mode: RepeatMode) -> Result<()> {
        self.send(SessionCommand::SetRepeat(mode))
    }

    /// Advance repeat mode
    pub fn cycle_repeat(&self) -> Result<()> {
        self.send(SessionCommand::CycleRepeat)
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver for snapshot updates
    pub fn subscribe_snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Receiver for session events
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Sink for the engine adapter
    pub fn engine_sink(&self) -> EngineEventSink {
        EngineEventSink::new(self.tx.clone())
    }

    /// Ask the service to stop after the inputs already queued
    ///
    /// # Errors
    /// Returns `ServiceClosed` if it already stopped
    pub fn shutdown(&self) -> Result<()> {
        self.tx
            .send(SessionInput::Shutdown)
            .map_err(|_| PlaybackError::ServiceClosed)
    }

    fn transport(&self, command: SessionCommand) {
        if let Err(e) = self.send(command) {
            debug!("Dropping external transport command: {}", e);
        }
    }
}

/// External transport commands enter through the same queue as everything
/// else
impl TransportActions for SessionHandle {
    fn play(&self) {
        self.transport(SessionCommand::Play);
    }

    fn pause(&self) {
        self.transport(SessionCommand::Pause);
    }

    fn next(&self) {
        self.transport(SessionCommand::Next);
    }

    fn previous(&self) {
        self.transport(SessionCommand::Previous);
    }

    fn seek_to(&self, position_seconds: f64) {
        self.transport(SessionCommand::Seek(position_seconds));
    }
}

/// Owns the controller and runs the input loop
pub struct SessionService {
    controller: SessionController,
    inbox: SessionInbox,
    preferences_hook: Option<PreferencesHook>,
}

impl SessionService {
    /// Create a service for `controller`, fed by `inbox`
    pub fn new(controller: SessionController, inbox: SessionInbox) -> Self {
        Self {
            controller,
            inbox,
            preferences_hook: None,
        }
    }

    /// Run `hook` whenever volume, mute, shuffle, or repeat change
    #[must_use]
    pub fn with_preferences_hook(
        mut self,
        hook: impl Fn(&Preferences) + Send + Sync + 'static,
    ) -> Self {
        self.preferences_hook = Some(Box::new(hook));
        self
    }

    /// Spawn onto the current tokio runtime
    ///
    /// The task yields the controller back when it stops.
    pub fn spawn(self) -> JoinHandle<SessionController> {
        tokio::spawn(self.run())
    }

    /// Process inputs until shutdown or until every sender is gone
    pub async fn run(mut self) -> SessionController {
        info!("Session service started");
        self.publish();

        while let Some(input) = self.inbox.rx.recv().await {
            match input {
                SessionInput::Command(command) => self.controller.handle_command(*command),
                SessionInput::Engine(event) => self.controller.handle_engine_event(event),
                SessionInput::Shutdown => break,
            }
            self.publish();
        }

        info!("Session service stopped");
        self.controller
    }

    fn publish(&mut self) {
        for event in self.controller.drain_events() {
            if let SessionEvent::PreferencesChanged(preferences) = &event {
                if let Some(hook) = &self.preferences_hook {
                    hook(preferences);
                }
            }
            // Err only means nobody is subscribed
            let _ = self.inbox.event_tx.send(event);
        }

        let snapshot = self.controller.snapshot();
        self.inbox.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
