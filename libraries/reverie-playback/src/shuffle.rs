//! Shuffle for queue randomization
//!
//! Uniform Fisher-Yates over the queue entries. The random source is
//! injected so tests can use a seeded generator.

use crate::queue::QueueEntry;
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle queue entries in place
///
/// Each entry has equal probability of landing at any position.
pub fn shuffle_entries<R: Rng + ?Sized>(entries: &mut [QueueEntry], rng: &mut R) {
    entries.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::EntryKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use reverie_core::types::{SourceRef, Track};

    fn entries(n: u64) -> Vec<QueueEntry> {
        (0..n)
            .map(|i| QueueEntry {
                key: EntryKey::new(i),
                track: Track::new(format!("Track {i}"), 100.0, SourceRef::new(format!("mem://{i}"))),
            })
            .collect()
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut shuffled = entries(40);
        shuffle_entries(&mut shuffled, &mut StdRng::seed_from_u64(7));

        let mut keys: Vec<u64> = shuffled.iter().map(|e| e.key.value()).collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = entries(20);
        let mut b = entries(20);
        shuffle_entries(&mut a, &mut StdRng::seed_from_u64(42));
        shuffle_entries(&mut b, &mut StdRng::seed_from_u64(42));

        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_changes_order() {
        let original = entries(50);
        let mut shuffled = original.clone();
        shuffle_entries(&mut shuffled, &mut StdRng::seed_from_u64(1));

        // 50! orderings; identity is practically impossible
        assert_ne!(original, shuffled);
    }
}
