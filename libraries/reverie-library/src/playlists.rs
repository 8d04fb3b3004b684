//! Playlist store
//!
//! CRUD over playlists plus the mood/season suggestion used by the journal
//! side of the app. Every mutation refreshes `updated_at` and notifies the
//! optional change listener with the full playlist list.

use crate::error::{LibraryError, Result};
use reverie_core::types::{Mood, Playlist, PlaylistId, PlaylistUpdate, Season, Track};
use tracing::debug;

/// Callback invoked with every playlist after each mutation
pub type PlaylistListener = Box<dyn Fn(&[Playlist]) + Send + Sync>;

/// In-memory playlist store (creation order preserved)
#[derive(Default)]
pub struct PlaylistStore {
    playlists: Vec<Playlist>,
    listener: Option<PlaylistListener>,
}

impl PlaylistStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a store from persisted playlists
    pub fn from_playlists(playlists: Vec<Playlist>) -> Self {
        Self {
            playlists,
            listener: None,
        }
    }

    /// Install a change listener, replacing any previous one
    pub fn set_listener(&mut self, listener: PlaylistListener) {
        self.listener = Some(listener);
    }

    /// Create a playlist
    pub fn create_playlist(
        &mut self,
        name: impl Into<String>,
        mood: Option<Mood>,
        season: Option<Season>,
    ) -> Playlist {
        let mut playlist = Playlist::new(name);
        playlist.mood = mood;
        playlist.season = season;

        debug!("Created playlist '{}' ({})", playlist.name, playlist.id);
        self.playlists.push(playlist.clone());
        self.notify();
        playlist
    }

    /// Append a track to a playlist
    ///
    /// # Errors
    /// Returns `PlaylistNotFound` if the playlist does not exist
    pub fn add_track_to_playlist(&mut self, id: &PlaylistId, track: Track) -> Result<&Playlist> {
        let playlist = self.find_mut(id)?;
        playlist.tracks.push(track);
        playlist.touch();
        self.notify();
        self.get(id).ok_or_else(|| LibraryError::PlaylistNotFound(id.clone()))
    }

    /// Remove the track at `index` from a playlist
    ///
    /// Removal is positional because a playlist may hold the same track twice.
    ///
    /// # Errors
    /// Returns `PlaylistNotFound` or `IndexOutOfBounds`
    pub fn remove_track_from_playlist(&mut self, id: &PlaylistId, index: usize) -> Result<Track> {
        let playlist = self.find_mut(id)?;
        if index >= playlist.tracks.len() {
            return Err(LibraryError::IndexOutOfBounds(index));
        }
        let removed = playlist.tracks.remove(index);
        playlist.touch();
        self.notify();
        Ok(removed)
    }

    /// Apply a partial metadata update
    ///
    /// # Errors
    /// Returns `PlaylistNotFound` if the playlist does not exist
    pub fn update_playlist(&mut self, id: &PlaylistId, update: PlaylistUpdate) -> Result<&Playlist> {
        let playlist = self.find_mut(id)?;

        if let Some(name) = update.name {
            playlist.name = name;
        }
        if let Some(description) = update.description {
            playlist.description = description;
        }
        if let Some(mood) = update.mood {
            playlist.mood = mood;
        }
        if let Some(season) = update.season {
            playlist.season = season;
        }
        playlist.touch();

        self.notify();
        self.get(id).ok_or_else(|| LibraryError::PlaylistNotFound(id.clone()))
    }

    /// Delete a playlist, returning it
    ///
    /// Tracks are not touched; they remain owned by the registry.
    ///
    /// # Errors
    /// Returns `PlaylistNotFound` if the playlist does not exist
    pub fn delete_playlist(&mut self, id: &PlaylistId) -> Result<Playlist> {
        let position = self
            .playlists
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| LibraryError::PlaylistNotFound(id.clone()))?;

        let removed = self.playlists.remove(position);
        debug!("Deleted playlist '{}' ({})", removed.name, removed.id);
        self.notify();
        Ok(removed)
    }

    /// Suggest a playlist for a journal entry's mood and season
    ///
    /// Priority: exact mood+season match, then mood only, then season only.
    /// Within a tier the earliest-created playlist wins.
    pub fn suggest_playlist_for_mood_and_season(
        &self,
        mood: Option<&Mood>,
        season: Option<Season>,
    ) -> Option<&Playlist> {
        if let (Some(mood), Some(season)) = (mood, season) {
            if let Some(found) = self
                .playlists
                .iter()
                .find(|p| p.mood.as_ref() == Some(mood) && p.season == Some(season))
            {
                return Some(found);
            }
        }

        if let Some(mood) = mood {
            if let Some(found) = self.playlists.iter().find(|p| p.mood.as_ref() == Some(mood)) {
                return Some(found);
            }
        }

        season.and_then(|season| self.playlists.iter().find(|p| p.season == Some(season)))
    }

    /// Look up a playlist
    pub fn get(&self, id: &PlaylistId) -> Option<&Playlist> {
        self.playlists.iter().find(|p| &p.id == id)
    }

    /// All playlists in creation order
    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    /// Whether there are no playlists
    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    fn find_mut(&mut self, id: &PlaylistId) -> Result<&mut Playlist> {
        self.playlists
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| LibraryError::PlaylistNotFound(id.clone()))
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener(&self.playlists);
        }
    }
}
