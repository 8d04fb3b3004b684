//! Queue orchestration
//!
//! Decides which track plays next under the current shuffle and repeat
//! policy. Pure data structure: no engine, no timers, no I/O.
//!
//! ```text
//! entries:         [ C  A  D  B ]     (play order, shuffled)
//!                        ^ cursor
//! original_order:  [ A  B  C  D ]     (keys only, while shuffled)
//! ```
//!
//! Entries are identified by a key handed out on enqueue, never by track id,
//! so the same track may appear several times.

use crate::shuffle::shuffle_entries;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reverie_core::types::{RepeatMode, Track, TrackId};
use std::collections::{HashMap, HashSet};

/// Unique, monotonically increasing identity of a queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryKey(u64);

impl EntryKey {
    /// Wrap a raw key value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw key value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A track placed in the queue
#[derive(Debug, Clone, PartialEq)]
pub struct QueueEntry {
    /// Identity of this placement
    pub key: EntryKey,

    /// The queued track
    pub track: Track,
}

/// Ordered play queue with cursor, shuffle, and repeat
#[derive(Debug, Clone)]
pub struct QueueOrchestrator {
    /// Entries in play order
    entries: Vec<QueueEntry>,

    /// Pre-shuffle order (keys); empty unless shuffled
    original_order: Vec<EntryKey>,

    /// Index of the current entry
    cursor: Option<usize>,

    shuffle: bool,
    repeat: RepeatMode,
    next_key: u64,
    rng: StdRng,
}

impl Default for QueueOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueOrchestrator {
    /// Create an empty queue seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty queue with a specific random source
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            entries: Vec::new(),
            original_order: Vec::new(),
            cursor: None,
            shuffle: false,
            repeat: RepeatMode::None,
            next_key: 0,
            rng,
        }
    }

    /// Create an empty queue with a deterministic shuffle
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    // ===== Mutation =====

    /// Append a track
    ///
    /// While shuffled only the play order grows; the entry joins the
    /// original order when shuffle is turned off.
    pub fn enqueue(&mut self, track: Track) -> EntryKey {
        let key = self.allocate_key();
        self.entries.push(QueueEntry { key, track });
        key
    }

    /// Append several tracks in order
    pub fn enqueue_all(&mut self, tracks: impl IntoIterator<Item = Track>) {
        for track in tracks {
            self.enqueue(track);
        }
    }

    /// Replace the whole queue, keeping the shuffle policy
    ///
    /// The cursor is cleared. With shuffle on, the new order is captured as
    /// the original order and then shuffled.
    pub fn replace(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.entries.clear();
        self.original_order.clear();
        self.cursor = None;
        self.enqueue_all(tracks);

        if self.shuffle {
            self.original_order = self.entries.iter().map(|e| e.key).collect();
            shuffle_entries(&mut self.entries, &mut self.rng);
        }
    }

    /// Remove the entry at `index`
    ///
    /// Removing the current entry leaves the cursor on the entry that slid
    /// into its place, clamped to the last index, or `None` once empty.
    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.entries.len() {
            return None;
        }

        let removed = self.entries.remove(index);
        self.original_order.retain(|key| *key != removed.key);

        self.cursor = match self.cursor {
            Some(_) if self.entries.is_empty() => None,
            Some(c) if index < c => Some(c - 1),
            Some(c) if index == c => Some(c.min(self.entries.len() - 1)),
            other => other,
        };

        Some(removed.track)
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.original_order.clear();
        self.cursor = None;
    }

    // ===== Shuffle / Repeat =====

    /// Flip shuffle; returns the new state
    pub fn toggle_shuffle(&mut self) -> bool {
        self.set_shuffle(!self.shuffle);
        self.shuffle
    }

    /// Turn shuffle on or off
    ///
    /// Returns `true` if the state changed. The cursor keeps pointing at the
    /// same entry either way.
    pub fn set_shuffle(&mut self, enabled: bool) -> bool {
        if enabled == self.shuffle {
            return false;
        }

        let current = self.current_key();

        if enabled {
            self.original_order = self.entries.iter().map(|e| e.key).collect();
            shuffle_entries(&mut self.entries, &mut self.rng);
        } else {
            self.restore_original_order();
        }

        self.shuffle = enabled;
        self.cursor = current.and_then(|key| self.position_of(key));
        true
    }

    /// Whether shuffle is on
    pub fn is_shuffled(&self) -> bool {
        self.shuffle
    }

    /// Set repeat mode
    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.repeat = mode;
    }

    /// Advance to the next repeat mode; returns it
    pub fn cycle_repeat_mode(&mut self) -> RepeatMode {
        self.repeat = self.repeat.cycle();
        self.repeat
    }

    /// Current repeat mode
    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    // ===== Navigation =====

    /// Move to the track that should play next
    ///
    /// Repeat One returns the current entry again. Past the end, repeat All
    /// wraps to the first entry; otherwise the cursor is cleared and `None`
    /// is returned.
    pub fn next(&mut self) -> Option<Track> {
        if self.entries.is_empty() {
            return None;
        }

        if self.repeat == RepeatMode::One {
            if let Some(entry) = self.current() {
                return Some(entry.track.clone());
            }
        }

        let candidate = self.cursor.map_or(0, |c| c + 1);
        if candidate < self.entries.len() {
            self.cursor = Some(candidate);
        } else if self.repeat == RepeatMode::All {
            self.cursor = Some(0);
        } else {
            self.cursor = None;
            return None;
        }

        self.current().map(|entry| entry.track.clone())
    }

    /// Move to the previous entry
    ///
    /// Always wraps from the first entry to the last, regardless of repeat
    /// mode.
    pub fn previous(&mut self) -> Option<Track> {
        let last = self.entries.len().checked_sub(1)?;
        let index = match self.cursor {
            Some(c) if c > 0 => c - 1,
            _ => last,
        };
        self.cursor = Some(index);
        self.current().map(|entry| entry.track.clone())
    }

    /// Point the cursor at the first entry holding `track_id`
    pub fn select(&mut self, track_id: &TrackId) -> Option<usize> {
        let index = self.entries.iter().position(|e| &e.track.id == track_id)?;
        self.cursor = Some(index);
        Some(index)
    }

    /// Point the cursor at the entry with `key`
    pub fn select_key(&mut self, key: EntryKey) -> Option<usize> {
        let index = self.position_of(key)?;
        self.cursor = Some(index);
        Some(index)
    }

    // ===== Queries =====

    /// Entry under the cursor
    pub fn current(&self) -> Option<&QueueEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Cursor index
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entries in play order
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Pre-shuffle order (empty unless shuffled)
    pub fn original_order(&self) -> &[EntryKey] {
        &self.original_order
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // ===== Internal =====

    fn allocate_key(&mut self) -> EntryKey {
        let key = EntryKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn current_key(&self) -> Option<EntryKey> {
        self.current().map(|e| e.key)
    }

    fn position_of(&self, key: EntryKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Rebuild play order from `original_order`, then append entries enqueued
    /// while shuffled in enqueue order
    fn restore_original_order(&mut self) {
        let original: HashSet<EntryKey> = self.original_order.iter().copied().collect();

        let mut late: Vec<QueueEntry> = Vec::new();
        let mut by_key: HashMap<EntryKey, QueueEntry> = HashMap::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            if original.contains(&entry.key) {
                by_key.insert(entry.key, entry);
            } else {
                late.push(entry);
            }
        }
        late.sort_by_key(|e| e.key);

        self.entries = self
            .original_order
            .drain(..)
            .filter_map(|key| by_key.remove(&key))
            .chain(late)
            .collect();
    }
}
