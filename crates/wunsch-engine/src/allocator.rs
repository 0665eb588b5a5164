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

//! # Allocator Core
//!
//! The constrained assignment state machine:
//!
//! `Init → RoundOneCapped → RoundTwoFairRedistribution → RandomFill → Done`
//!
//! Round one walks the slots and hands every participant their
//! highest-ranked preference with remaining capacity, subject to the slicing
//! cap that keeps the most-demanded workshops from being monopolized by
//! whoever happens to be processed first. Round two orders the still-short
//! participants by a blend of current happiness and their round-one
//! processing position (`alpha_fairness` controls the blend) and retries
//! their remaining wishes against everything left, cap lifted. Random fill
//! then tops participants up to `num_assign` slots wherever capacity admits
//! it, never granting the same workshop twice to one participant and never
//! exceeding a workshop-slot's capacity.
//!
//! All tie-breaking flows through one `ChaCha8Rng` seeded per run; the same
//! seed over the same model reproduces the assignment bit for bit.

use crate::{objective::happiness_vector, weights::WeightVector};
use fixedbitset::FixedBitSet;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn};
use wunsch_model::{
    config::SlicingMode,
    index::{ParticipantIndex, SlotIndex, WorkshopIndex},
    model::Model,
    solution::{Assignment, Placement, Round},
};

/// The multi-round allocator over one immutable model.
#[derive(Clone, Copy, Debug)]
pub struct Allocator<'a> {
    model: &'a Model,
    weights: &'a WeightVector,
}

impl<'a> Allocator<'a> {
    /// Creates an allocator for the given model and weight vector.
    #[inline]
    pub fn new(model: &'a Model, weights: &'a WeightVector) -> Self {
        Self { model, weights }
    }

    /// Runs the full pipeline: capped round one, fair redistribution,
    /// random fill.
    pub fn allocate(&self, seed: u64) -> Assignment {
        self.run(seed, true)
    }

    /// Runs the greedy pipeline: capped round one and random fill only.
    /// Fastest and least fair, used by the `greedy` strategy.
    pub fn allocate_greedy(&self, seed: u64) -> Assignment {
        self.run(seed, false)
    }

    /// The per-workshop-slot ceiling round one may fill up to.
    fn round_cap(&self, capacity: u32) -> u32 {
        let config = self.model.config();
        match config.slicing_mode {
            SlicingMode::Off => capacity,
            SlicingMode::Relative => {
                // Ceiling division so small workshops keep at least one
                // round-one seat as long as they have capacity at all.
                ((u64::from(capacity) * u64::from(config.slicing_value)).div_ceil(100)) as u32
            }
            SlicingMode::Fixed => capacity.min(config.slicing_value),
        }
    }

    fn run(&self, seed: u64, fair_redistribution: bool) -> Assignment {
        let model = self.model;
        let num_participants = model.num_participants();
        let num_workshops = model.num_workshops();
        let num_slots = model.num_slots();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        // Init: remaining capacity and round-one caps, flattened
        // workshop-major like the model's own capacity table.
        let mut remaining: Vec<u32> = model
            .workshops()
            .flat_map(|w| model.slots().map(move |s| model.capacity(w, s)))
            .collect();
        let round_caps: Vec<u32> = remaining.iter().map(|&c| self.round_cap(c)).collect();
        let mut round_one_fill = vec![0u32; remaining.len()];

        let mut order: Vec<ParticipantIndex> = model.participants().collect();
        order.shuffle(&mut rng);
        let mut position = vec![0usize; num_participants];
        for (i, &p) in order.iter().enumerate() {
            position[p.get()] = i;
        }

        let mut assignment = Assignment::empty(num_participants, num_slots);
        let mut assigned_ws = vec![FixedBitSet::with_capacity(num_workshops); num_participants];

        // RoundOneCapped.
        for s in 0..num_slots {
            let mut granted = 0usize;
            for &p in &order {
                let prefs = model.preferences(p);
                for (rank0, &w) in prefs.iter().enumerate() {
                    if assigned_ws[p.get()].contains(w.get()) {
                        continue;
                    }
                    let idx = w.get() * num_slots + s;
                    if remaining[idx] == 0 || round_one_fill[idx] >= round_caps[idx] {
                        continue;
                    }
                    remaining[idx] -= 1;
                    round_one_fill[idx] += 1;
                    assigned_ws[p.get()].insert(w.get());
                    assignment.place(
                        p,
                        SlotIndex::new(s),
                        Placement {
                            workshop: w,
                            round: Round::PreferenceCapped,
                            priority: Some(rank0 + 1),
                        },
                    );
                    granted += 1;
                    break;
                }
            }
            debug!(slot = s + 1, granted, "round one slot pass complete");
        }

        // RoundTwoFairRedistribution.
        if fair_redistribution {
            let happiness = happiness_vector(model, &assignment, self.weights);
            let alpha = model.config().alpha_fairness;
            let position_denom = num_participants.saturating_sub(1).max(1) as f64;

            let mut pending: Vec<(f64, ParticipantIndex)> = model
                .participants()
                .filter(|&p| assignment.filled_count(p) < num_slots)
                .map(|p| {
                    let key = alpha * happiness[p.get()]
                        + (1.0 - alpha) * (position[p.get()] as f64 / position_denom);
                    (key, p)
                })
                .collect();
            pending.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut granted = 0usize;
            for &(_, p) in &pending {
                let prefs = model.preferences(p);
                for s in 0..num_slots {
                    if assignment.get(p, SlotIndex::new(s)).is_some() {
                        continue;
                    }
                    for (rank0, &w) in prefs.iter().enumerate() {
                        if assigned_ws[p.get()].contains(w.get()) {
                            continue;
                        }
                        let idx = w.get() * num_slots + s;
                        if remaining[idx] == 0 {
                            continue;
                        }
                        remaining[idx] -= 1;
                        assigned_ws[p.get()].insert(w.get());
                        assignment.place(
                            p,
                            SlotIndex::new(s),
                            Placement {
                                workshop: w,
                                round: Round::FairRedistribution,
                                priority: Some(rank0 + 1),
                            },
                        );
                        granted += 1;
                        break;
                    }
                }
            }
            debug!(granted, "fair redistribution complete");
        }

        // RandomFill.
        let mut open_slots = 0usize;
        for &p in &order {
            for s in 0..num_slots {
                if assignment.get(p, SlotIndex::new(s)).is_some() {
                    continue;
                }
                let candidates: Vec<WorkshopIndex> = model
                    .workshops()
                    .filter(|w| {
                        remaining[w.get() * num_slots + s] > 0
                            && !assigned_ws[p.get()].contains(w.get())
                    })
                    .collect();
                let Some(&w) = candidates.get(rng.random_range(0..candidates.len().max(1)))
                else {
                    open_slots += 1;
                    continue;
                };
                remaining[w.get() * num_slots + s] -= 1;
                assigned_ws[p.get()].insert(w.get());
                assignment.place(
                    p,
                    SlotIndex::new(s),
                    Placement {
                        workshop: w,
                        round: Round::RandomFill,
                        priority: None,
                    },
                );
            }
        }
        if open_slots > 0 {
            warn!(
                open_slots,
                "capacity exhausted; some participants stay below num_assign"
            );
        }

        assignment
    }
}
