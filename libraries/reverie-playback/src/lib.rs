//! Reverie Playback
//!
//! Decides what plays next and drives an injected playback engine.
//!
//! This crate provides:
//! - Queue orchestration with shuffle (restorable) and repeat None/One/All
//! - The session state machine (`Idle -> Loading -> Playing <-> Paused`)
//! - A serialized command loop shared by callers and engine events
//! - Load generations, so late events from superseded loads are dropped
//! - A bridge that mirrors session state to OS media controls
//!
//! # Architecture
//!
//! `reverie-playback` owns no audio code and no storage:
//! - The engine is reached only through [`PlaybackEngine`]
//! - Persistence hooks in through a preferences callback
//! - Media controls plug in through [`ControlSurface`]
//!
//! # Example
//!
//! ```rust,no_run
//! use reverie_core::types::{Preferences, SourceRef, Track};
//! use reverie_playback::{
//!     session_channel, LoadGeneration, PlaybackEngine, Result, SessionController, SessionService,
//! };
//!
//! struct SilentEngine;
//!
//! impl PlaybackEngine for SilentEngine {
//!     fn load(&mut self, _: &SourceRef, _: LoadGeneration) -> Result<()> { Ok(()) }
//!     fn play(&mut self) -> Result<()> { Ok(()) }
//!     fn pause(&mut self) -> Result<()> { Ok(()) }
//!     fn seek(&mut self, _: f64) -> Result<()> { Ok(()) }
//!     fn set_volume(&mut self, _: f32) -> Result<()> { Ok(()) }
//! }
//!
//! # async fn example() -> Result<()> {
//! let (handle, inbox) = session_channel();
//! let controller = SessionController::new(Box::new(SilentEngine), Preferences::default());
//! let task = SessionService::new(controller, inbox).spawn();
//!
//! let track = Track::new("Morning Light", 214.0, SourceRef::new("file:///music/light.flac"));
//! handle.play_track(track, None)?;
//! handle.set_volume(0.5)?;
//!
//! handle.shutdown()?;
//! let _controller = task.await;
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod controller;
pub mod engine;
pub mod error;
pub mod events;
pub mod queue;
pub mod service;
pub mod shuffle;
pub mod types;
pub mod volume;

pub use bridge::{
    ControlSurface, ExternalControlBridge, MediaMetadata, PositionState, TransportActions,
};
pub use controller::{SessionCommand, SessionController};
pub use engine::{EngineEvent, EngineEventSink, LoadGeneration, PlaybackEngine};
pub use error::{PlaybackError, Result};
pub use events::SessionEvent;
pub use queue::{EntryKey, QueueEntry, QueueOrchestrator};
pub use service::{
    session_channel, PreferencesHook, SessionHandle, SessionInbox, SessionInput, SessionService,
};
pub use types::{PlaybackStatus, SessionSnapshot};
pub use volume::Volume;
