//! Property-based tests for queue orchestration
//!
//! Uses proptest to verify queue invariants across random track lists and
//! operation sequences.

use proptest::prelude::*;
use reverie_core::types::{RepeatMode, SourceRef, Track};
use reverie_playback::{EntryKey, QueueOrchestrator};
use std::collections::HashSet;

// ===== Helpers =====

fn arbitrary_track() -> impl Strategy<Value = Track> {
    (
        "[A-Za-z ]{1,30}",                       // title
        proptest::option::of("[A-Za-z ]{1,20}"), // artist
        1.0f64..600.0,                           // duration
    )
        .prop_map(|(title, artist, duration)| {
            let track = Track::new(title, duration, SourceRef::new("file:///music/test.flac"));
            match artist {
                Some(artist) => track.with_artist(artist),
                None => track,
            }
        })
}

fn arbitrary_tracks() -> impl Strategy<Value = Vec<Track>> {
    prop::collection::vec(arbitrary_track(), 1..40)
}

#[derive(Debug, Clone)]
enum QueueOp {
    Next,
    Previous,
    Enqueue,
    Remove(usize),
    ToggleShuffle,
    CycleRepeat,
}

fn arbitrary_op() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        Just(QueueOp::Next),
        Just(QueueOp::Previous),
        Just(QueueOp::Enqueue),
        (0usize..50).prop_map(QueueOp::Remove),
        Just(QueueOp::ToggleShuffle),
        Just(QueueOp::CycleRepeat),
    ]
}

fn keys(queue: &QueueOrchestrator) -> Vec<EntryKey> {
    queue.entries().iter().map(|e| e.key).collect()
}

fn queue_of(tracks: Vec<Track>, seed: u64) -> QueueOrchestrator {
    let mut queue = QueueOrchestrator::with_seed(seed);
    queue.enqueue_all(tracks);
    queue
}

// ===== Property Tests =====

proptest! {
    /// Property: shuffling on then off restores the exact order and cursor entry
    #[test]
    fn double_toggle_restores_order(
        tracks in arbitrary_tracks(),
        seed in any::<u64>(),
        steps in 0usize..10,
    ) {
        let mut queue = queue_of(tracks, seed);
        for _ in 0..steps {
            queue.next();
        }
        let before = keys(&queue);
        let current = queue.current().map(|e| e.key);

        queue.toggle_shuffle();
        prop_assert_eq!(queue.current().map(|e| e.key), current);
        queue.toggle_shuffle();

        prop_assert_eq!(keys(&queue), before);
        prop_assert_eq!(queue.current().map(|e| e.key), current);
        prop_assert!(queue.original_order().is_empty());
    }

    /// Property: repeat One never moves the cursor
    #[test]
    fn repeat_one_keeps_cursor(
        tracks in arbitrary_tracks(),
        start in 0usize..40,
        calls in 1usize..20,
    ) {
        let mut queue = queue_of(tracks, 1);
        let id = queue.entries()[start % queue.len()].track.id.clone();
        queue.select(&id);
        let cursor = queue.cursor();
        queue.set_repeat_mode(RepeatMode::One);

        for _ in 0..calls {
            prop_assert_eq!(queue.next().map(|t| t.id), Some(id.clone()));
        }
        prop_assert_eq!(queue.cursor(), cursor);
    }

    /// Property: repeat All visits every entry and returns in `len` steps
    #[test]
    fn repeat_all_cycles_in_len_steps(tracks in arbitrary_tracks(), start in 0usize..40) {
        let mut queue = queue_of(tracks, 2);
        queue.set_repeat_mode(RepeatMode::All);
        let len = queue.len();
        let start = start % len;
        let key = queue.entries()[start].key;
        queue.select_key(key);

        let mut seen = HashSet::new();
        for _ in 0..len {
            prop_assert!(queue.next().is_some());
            seen.insert(queue.current().map(|e| e.key));
        }

        prop_assert_eq!(queue.cursor(), Some(start));
        prop_assert_eq!(seen.len(), len);
    }

    /// Property: next stops at the end without repeat, previous always wraps
    #[test]
    fn next_stops_previous_wraps(tracks in arbitrary_tracks()) {
        let mut queue = queue_of(tracks, 3);
        let len = queue.len();

        for _ in 0..len {
            prop_assert!(queue.next().is_some());
        }
        prop_assert!(queue.next().is_none());
        prop_assert_eq!(queue.cursor(), None);

        queue.next();
        prop_assert_eq!(queue.cursor(), Some(0));
        prop_assert!(queue.previous().is_some());
        prop_assert_eq!(queue.cursor(), Some(len - 1));
    }

    /// Property: cursor and original order stay consistent under any operations
    #[test]
    fn invariants_hold_under_random_operations(
        tracks in arbitrary_tracks(),
        ops in prop::collection::vec(arbitrary_op(), 1..60),
        seed in any::<u64>(),
    ) {
        let extra = tracks[0].clone();
        let mut queue = queue_of(tracks, seed);

        for op in ops {
            match op {
                QueueOp::Next => { queue.next(); }
                QueueOp::Previous => { queue.previous(); }
                QueueOp::Enqueue => { queue.enqueue(extra.clone()); }
                QueueOp::Remove(i) => { queue.remove_at(i); }
                QueueOp::ToggleShuffle => { queue.toggle_shuffle(); }
                QueueOp::CycleRepeat => { queue.cycle_repeat_mode(); }
            }

            if let Some(cursor) = queue.cursor() {
                prop_assert!(cursor < queue.len());
            }
            if !queue.is_shuffled() {
                prop_assert!(queue.original_order().is_empty());
            }

            // Original order never references removed entries
            let present: HashSet<EntryKey> = keys(&queue).into_iter().collect();
            prop_assert!(queue.original_order().iter().all(|k| present.contains(k)));

            // Keys stay unique
            prop_assert_eq!(present.len(), queue.len());
        }

        // Unshuffling yields every remaining entry exactly once
        let mut before: Vec<EntryKey> = keys(&queue);
        queue.set_shuffle(false);
        let mut after = keys(&queue);
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}
