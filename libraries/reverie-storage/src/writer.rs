//! Background persistence writer
//!
//! Playback commands must never wait on disk. State changes are pushed onto
//! an unbounded channel through a cheap `PersistenceHandle`; a single tokio
//! task drains it, coalesces bursts, and writes only sections that actually
//! changed.
//!
//! ```text
//! SessionService / PlaylistStore          PersistenceWriter task
//!        │  preferences_changed(p)                 │
//!        │────────────────────────────────────────>│ coalesce
//!        │  playlists_changed(list)                │ diff against last write
//!        │────────────────────────────────────────>│ gateway.save_*()
//! ```

use crate::gateway::{PersistedState, PersistenceGateway, UiFlags};
use reverie_core::types::{Playlist, Preferences};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// A change to persist
#[derive(Debug, Clone)]
pub enum PersistUpdate {
    /// Volume / mute / shuffle / repeat changed
    Preferences(Preferences),

    /// Playlist collection changed
    Playlists(Vec<Playlist>),

    /// UI flags changed
    UiFlags(UiFlags),
}

/// Cloneable sender side of the writer
#[derive(Debug, Clone)]
pub struct PersistenceHandle {
    tx: UnboundedSender<PersistUpdate>,
}

impl PersistenceHandle {
    /// Queue a preferences write
    pub fn preferences_changed(&self, preferences: Preferences) {
        self.send(PersistUpdate::Preferences(preferences));
    }

    /// Queue a playlists write
    pub fn playlists_changed(&self, playlists: &[Playlist]) {
        self.send(PersistUpdate::Playlists(playlists.to_vec()));
    }

    /// Queue a UI flags write
    pub fn ui_flags_changed(&self, ui: UiFlags) {
        self.send(PersistUpdate::UiFlags(ui));
    }

    /// Closure suitable for a playlist store change listener
    pub fn playlist_listener(&self) -> impl Fn(&[Playlist]) + Send + Sync + 'static {
        let handle = self.clone();
        move |playlists: &[Playlist]| handle.playlists_changed(playlists)
    }

    /// Closure suitable for a session preferences hook
    pub fn preferences_hook(&self) -> impl Fn(&Preferences) + Send + Sync + 'static {
        let handle = self.clone();
        move |preferences: &Preferences| handle.preferences_changed(*preferences)
    }

    fn send(&self, update: PersistUpdate) {
        if self.tx.send(update).is_err() {
            debug!("Persistence writer stopped; dropping update");
        }
    }
}

#[derive(Default)]
struct Pending {
    preferences: Option<Preferences>,
    playlists: Option<Vec<Playlist>>,
    ui: Option<UiFlags>,
}

impl Pending {
    fn apply(&mut self, update: PersistUpdate) {
        match update {
            PersistUpdate::Preferences(p) => self.preferences = Some(p),
            PersistUpdate::Playlists(p) => self.playlists = Some(p),
            PersistUpdate::UiFlags(ui) => self.ui = Some(ui),
        }
    }
}

/// Task that owns the gateway and performs all writes
pub struct PersistenceWriter {
    gateway: PersistenceGateway,
    rx: UnboundedReceiver<PersistUpdate>,
    /// Last successfully written state
    written: PersistedState,
}

impl PersistenceWriter {
    /// Create a writer; `initial` is what the store already holds
    pub fn new(gateway: PersistenceGateway, initial: PersistedState) -> (Self, PersistenceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                gateway,
                rx,
                written: initial,
            },
            PersistenceHandle { tx },
        )
    }

    /// Spawn onto the current tokio runtime
    ///
    /// The task ends once every `PersistenceHandle` has been dropped and the
    /// queue is drained.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Drain updates until all handles are gone
    pub async fn run(mut self) {
        while let Some(update) = self.rx.recv().await {
            let mut pending = Pending::default();
            pending.apply(update);
            while let Ok(more) = self.rx.try_recv() {
                pending.apply(more);
            }
            self.flush(pending).await;
        }
        debug!("Persistence writer finished");
    }

    async fn flush(&mut self, pending: Pending) {
        if let Some(preferences) = pending.preferences {
            if preferences != self.written.preferences {
                match self.gateway.save_preferences(&preferences).await {
                    Ok(()) => self.written.preferences = preferences,
                    Err(e) => error!("Failed to persist preferences: {}", e),
                }
            }
        }

        if let Some(playlists) = pending.playlists {
            if playlists != self.written.playlists {
                match self.gateway.save_playlists(&playlists).await {
                    Ok(()) => self.written.playlists = playlists,
                    Err(e) => error!("Failed to persist playlists: {}", e),
                }
            }
        }

        if let Some(ui) = pending.ui {
            if ui != self.written.ui {
                match self.gateway.save_ui_flags(ui).await {
                    Ok(()) => self.written.ui = ui,
                    Err(e) => error!("Failed to persist UI flags: {}", e),
                }
            }
        }
    }
}
