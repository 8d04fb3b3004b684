//! Shared fixtures for playback integration tests

#![allow(dead_code)]

use reverie_core::types::{Playlist, SourceRef, Track};
use reverie_playback::{LoadGeneration, PlaybackEngine, PlaybackError, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Call made on the engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Load(SourceRef, LoadGeneration),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

/// Engine that records every call; sources in `failing` refuse to load
#[derive(Clone, Default)]
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    failing: Arc<Mutex<HashSet<SourceRef>>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `load` fail synchronously for `source`
    pub fn fail_on(&self, source: &SourceRef) {
        self.failing.lock().unwrap().insert(source.clone());
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Sources passed to `load`, in order
    pub fn loads(&self) -> Vec<SourceRef> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                EngineCall::Load(source, _) => Some(source),
                _ => None,
            })
            .collect()
    }

    pub fn last_volume(&self) -> Option<f32> {
        self.calls().into_iter().rev().find_map(|call| match call {
            EngineCall::SetVolume(v) => Some(v),
            _ => None,
        })
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PlaybackEngine for RecordingEngine {
    fn load(&mut self, source: &SourceRef, generation: LoadGeneration) -> Result<()> {
        self.record(EngineCall::Load(source.clone(), generation));
        if self.failing.lock().unwrap().contains(source) {
            return Err(PlaybackError::engine(format!("cannot decode {}", source.as_str())));
        }
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.record(EngineCall::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(EngineCall::Pause);
        Ok(())
    }

    fn seek(&mut self, position_seconds: f64) -> Result<()> {
        self.record(EngineCall::Seek(position_seconds));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.record(EngineCall::SetVolume(volume));
        Ok(())
    }
}

pub fn create_test_track(name: &str) -> Track {
    Track::new(
        format!("Track {}", name),
        180.0,
        SourceRef::new(format!("file:///music/{}.flac", name)),
    )
    .with_artist("Test Artist")
}

pub fn create_test_playlist(name: &str, track_names: &[&str]) -> Playlist {
    let mut playlist = Playlist::new(name);
    playlist.tracks = track_names.iter().map(|n| create_test_track(n)).collect();
    playlist
}
