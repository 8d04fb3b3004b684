//! Engine adapter
//!
//! The playback engine (decoder plus audio output) is injected. Commands go
//! to it through [`PlaybackEngine`]; it reports back asynchronously through
//! an [`EngineEventSink`], tagging every event with the [`LoadGeneration`] it
//! was given on `load`.

use crate::error::Result;
use crate::service::SessionInput;
use reverie_core::types::SourceRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Tag identifying one load request
///
/// Bumped on every load and on stop. Engine events carrying an older
/// generation are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadGeneration(u64);

impl LoadGeneration {
    /// Wrap a raw generation value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The generation after this one
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

/// Playback engine primitive
///
/// Calls return quickly; results of `load` arrive later as events.
pub trait PlaybackEngine: Send {
    /// Start loading `source`; report through the sink with `generation`
    fn load(&mut self, source: &SourceRef, generation: LoadGeneration) -> Result<()>;

    /// Start or resume output of the loaded track
    fn play(&mut self) -> Result<()>;

    /// Pause output
    fn pause(&mut self) -> Result<()>;

    /// Jump to `position_seconds` in the loaded track
    fn seek(&mut self, position_seconds: f64) -> Result<()>;

    /// Set output gain in `[0, 1]`
    fn set_volume(&mut self, volume: f32) -> Result<()>;
}

/// Asynchronous report from the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Track decoded and ready
    Loaded {
        /// Load request this answers
        generation: LoadGeneration,
        /// Track duration in seconds
        duration_seconds: f64,
    },

    /// Playback position update
    Tick {
        /// Load request this belongs to
        generation: LoadGeneration,
        /// Position in seconds
        position_seconds: f64,
    },

    /// Track played to the end
    Ended {
        /// Load request this belongs to
        generation: LoadGeneration,
    },

    /// Load or playback failed
    Error {
        /// Load request this belongs to
        generation: LoadGeneration,
        /// Engine-reported reason
        message: String,
    },
}

impl EngineEvent {
    /// Generation carried by the event
    pub fn generation(&self) -> LoadGeneration {
        match self {
            Self::Loaded { generation, .. }
            | Self::Tick { generation, .. }
            | Self::Ended { generation }
            | Self::Error { generation, .. } => *generation,
        }
    }
}

/// Handle the engine uses to report events into the session
///
/// Events land on the same serialized channel as commands.
#[derive(Debug, Clone)]
pub struct EngineEventSink {
    tx: UnboundedSender<SessionInput>,
}

impl EngineEventSink {
    pub(crate) fn new(tx: UnboundedSender<SessionInput>) -> Self {
        Self { tx }
    }

    /// Report a finished load
    pub fn loaded(&self, generation: LoadGeneration, duration_seconds: f64) {
        self.send(EngineEvent::Loaded {
            generation,
            duration_seconds,
        });
    }

    /// Report the playback position
    pub fn tick(&self, generation: LoadGeneration, position_seconds: f64) {
        self.send(EngineEvent::Tick {
            generation,
            position_seconds,
        });
    }

    /// Report end of track
    pub fn ended(&self, generation: LoadGeneration) {
        self.send(EngineEvent::Ended { generation });
    }

    /// Report a failure
    pub fn error(&self, generation: LoadGeneration, message: impl Into<String>) {
        self.send(EngineEvent::Error {
            generation,
            message: message.into(),
        });
    }

    /// Whether the session is still receiving
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, event: EngineEvent) {
        if self.tx.send(SessionInput::Engine(event)).is_err() {
            debug!("Session closed; dropping engine event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_increase() {
        let g = LoadGeneration::default();
        assert!(g.next() > g);
        assert_eq!(g.next().next().value(), 2);
    }

    #[test]
    fn event_reports_generation() {
        let generation = LoadGeneration::new(9);
        let event = EngineEvent::Error {
            generation,
            message: "bad header".into(),
        };
        assert_eq!(event.generation(), generation);
    }

    #[tokio::test]
    async fn sink_routes_into_session_channel() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = EngineEventSink::new(tx);
        sink.ended(LoadGeneration::new(4));

        match rx.recv().await {
            Some(SessionInput::Engine(EngineEvent::Ended { generation })) => {
                assert_eq!(generation.value(), 4);
            }
            other => panic!("unexpected input: {other:?}"),
        }
    }
}
