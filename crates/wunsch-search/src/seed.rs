// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Seed Derivation
//!
//! Without an explicit seed, runs must still be reproducible: the master
//! seed is a SHA-256 digest over the allocation-relevant input (slot counts,
//! workshops sorted by id with capacity and title, participants sorted by id
//! with their wish lists), truncated to the first 8 bytes big-endian. The
//! same snapshot therefore always replays the same run, and any edit to a
//! capacity, title, or wish list yields a fresh one.
//!
//! Per-attempt sub-seeds are drawn up front from a `ChaCha8Rng` seeded with
//! the master seed, so attempt `i` sees the same seed regardless of how the
//! attempts are scheduled across threads.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use wunsch_model::{
    index::{ParticipantIndex, WorkshopIndex},
    model::Model,
};

/// Resolves the master seed for a run: the configured seed if one is set,
/// otherwise the input digest.
pub fn master_seed(model: &Model) -> u64 {
    match model.config().seed {
        Some(seed) => seed,
        None => digest_seed(model),
    }
}

/// Computes the deterministic input-digest seed for a model.
pub fn digest_seed(model: &Model) -> u64 {
    let mut hasher = Sha256::new();

    hasher.update(model.config().num_wishes.to_be_bytes());
    hasher.update(model.config().num_assign.to_be_bytes());

    let mut workshops: Vec<WorkshopIndex> = model.workshops().collect();
    workshops.sort_by(|&a, &b| model.workshop_id(a).cmp(model.workshop_id(b)));
    for w in workshops {
        hasher.update(model.workshop_id(w).as_bytes());
        hasher.update([0u8]);
        hasher.update(model.workshop_total_capacity(w).to_be_bytes());
        hasher.update(model.workshop_title(w).as_bytes());
        hasher.update([0u8]);
    }

    let mut participants: Vec<ParticipantIndex> = model.participants().collect();
    participants.sort_by(|&a, &b| model.participant_id(a).cmp(model.participant_id(b)));
    for p in participants {
        hasher.update(model.participant_id(p).as_bytes());
        hasher.update([0u8]);
        for &w in model.preferences(p) {
            hasher.update(model.workshop_id(w).as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([0xFFu8]);
    }

    let digest = hasher.finalize();
    u64::from_be_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

/// Derives `count` per-attempt sub-seeds from the master seed. Attempt `i`
/// always receives `seeds[i]`, independent of thread scheduling.
pub fn derive_sub_seeds(master: u64, count: usize) -> Vec<u64> {
    let mut rng = ChaCha8Rng::seed_from_u64(master);
    (0..count).map(|_| rng.random::<u64>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wunsch_model::{
        config::MatchingConfig,
        model::{ModelBuilder, PreferenceList},
    };

    fn model(capacity: u32, title: &str) -> Model {
        let cfg = MatchingConfig {
            num_wishes: 2,
            num_assign: 1,
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg);
        let w0 = builder.add_workshop_uniform("w0", title, None, capacity);
        let w1 = builder.add_workshop_uniform("w1", "B", None, 5);
        let mut prefs = PreferenceList::new();
        prefs.extend([w0, w1]);
        builder.add_participant("p0", "c0", prefs);
        builder.build()
    }

    #[test]
    fn test_digest_is_stable() {
        let a = digest_seed(&model(5, "A"));
        let b = digest_seed(&model(5, "A"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_changes_with_input() {
        let base = digest_seed(&model(5, "A"));
        assert_ne!(base, digest_seed(&model(6, "A")));
        assert_ne!(base, digest_seed(&model(5, "A2")));
    }

    #[test]
    fn test_digest_ignores_insertion_order() {
        // Same workshops and participants added in a different order hash
        // identically: the digest sorts by id.
        let cfg = MatchingConfig {
            num_wishes: 1,
            num_assign: 1,
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg.clone());
        let w0 = builder.add_workshop_uniform("w0", "A", None, 3);
        builder.add_workshop_uniform("w1", "B", None, 4);
        let mut prefs = PreferenceList::new();
        prefs.push(w0);
        builder.add_participant("p0", "c0", prefs);
        builder.add_participant("p1", "c1", PreferenceList::new());
        let forward = builder.build();

        let mut builder = ModelBuilder::new(cfg);
        builder.add_workshop_uniform("w1", "B", None, 4);
        let w0 = builder.add_workshop_uniform("w0", "A", None, 3);
        builder.add_participant("p1", "c1", PreferenceList::new());
        let mut prefs = PreferenceList::new();
        prefs.push(w0);
        builder.add_participant("p0", "c0", prefs);
        let reversed = builder.build();

        assert_eq!(digest_seed(&forward), digest_seed(&reversed));
    }

    #[test]
    fn test_master_seed_prefers_explicit_seed() {
        let mut m = model(5, "A");
        assert_eq!(master_seed(&m), digest_seed(&m));

        let cfg = MatchingConfig {
            num_wishes: 2,
            num_assign: 1,
            seed: Some(1234),
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg);
        builder.add_workshop_uniform("w0", "A", None, 5);
        m = builder.build();
        assert_eq!(master_seed(&m), 1234);
    }

    #[test]
    fn test_sub_seeds_deterministic_and_distinct() {
        let a = derive_sub_seeds(7, 12);
        let b = derive_sub_seeds(7, 12);
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);

        let mut deduped = a.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), a.len());

        assert_ne!(derive_sub_seeds(8, 12), a);
    }
}
