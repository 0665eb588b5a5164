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

//! # Happiness and Fairness Objectives
//!
//! Per-participant happiness is the sum of the weights of the preference
//! ranks a participant actually received, normalized by the best achievable
//! sum, clamped to [0, 1]. Fulfillment is judged by membership — a wished
//! workshop granted by random fill still counts for its rank — while round
//! provenance is only used by the reporter's per-priority breakdown.
//!
//! An [`ObjectiveValue`] reduces a happiness vector to a comparable key with
//! a strict total order (via `f64::total_cmp`), so the seed-search driver
//! can rank candidate assignments:
//!
//! - `fair_maxmin`: (min, mean), maximize.
//! - `happy_mean`: (mean, min), maximize.
//! - `leximin`: the sorted-ascending happiness vector, maximize
//!   lexicographically.

use crate::weights::WeightVector;
use wunsch_model::{config::Objective, model::Model, solution::Assignment};

/// Computes the normalized happiness of every participant.
///
/// Participants with an empty preference list score 0.0 and are included;
/// with `topk_equals_slots` set, fulfilled ranks beyond `num_assign`
/// contribute nothing.
pub fn happiness_vector(model: &Model, assignment: &Assignment, weights: &WeightVector) -> Vec<f64> {
    model
        .participants()
        .map(|p| participant_happiness(model, assignment, weights, p))
        .collect()
}

/// Computes the normalized happiness of a single participant. The solver's
/// repair passes use this to re-score only the two participants a swap
/// touched.
pub fn participant_happiness(
    model: &Model,
    assignment: &Assignment,
    weights: &WeightVector,
    participant: wunsch_model::index::ParticipantIndex,
) -> f64 {
    let num_assign = model.num_slots();
    let topk_only = model.config().topk_equals_slots;
    let max_score = weights.max_score(num_assign);

    let prefs = model.preferences(participant);
    if prefs.is_empty() || max_score <= 0.0 {
        return 0.0;
    }
    let mut score = 0.0;
    for (_, placement) in assignment.placements(participant) {
        if let Some(rank0) = prefs.iter().position(|&w| w == placement.workshop) {
            if topk_only && rank0 >= num_assign {
                continue;
            }
            score += weights.get(rank0);
        }
    }
    (score / max_score).clamp(0.0, 1.0)
}

/// Returns the arithmetic mean, 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Returns the minimum, 0.0 for an empty slice.
pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// A comparable reduction of a happiness vector; larger is better.
///
/// Values are only comparable when produced by the same objective over the
/// same participant set, which is all the seed-search driver ever does.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectiveValue {
    key: Vec<f64>,
}

impl ObjectiveValue {
    /// Reduces a happiness vector under the given objective.
    pub fn evaluate(objective: Objective, happiness: &[f64]) -> Self {
        let key = match objective {
            Objective::FairMaxmin => vec![min(happiness), mean(happiness)],
            Objective::HappyMean => vec![mean(happiness), min(happiness)],
            Objective::Leximin => {
                let mut sorted = happiness.to_vec();
                sorted.sort_by(f64::total_cmp);
                sorted
            }
        };
        Self { key }
    }

    /// Returns the comparison key (diagnostic use).
    #[inline]
    pub fn key(&self) -> &[f64] {
        &self.key
    }

    /// Returns whether `self` strictly beats `other`.
    #[inline]
    pub fn beats(&self, other: &Self) -> bool {
        self.cmp_key(other) == std::cmp::Ordering::Greater
    }

    fn cmp_key(&self, other: &Self) -> std::cmp::Ordering {
        debug_assert_eq!(
            self.key.len(),
            other.key.len(),
            "called `ObjectiveValue` comparison across different candidate shapes"
        );
        for (a, b) in self.key.iter().zip(&other.key) {
            match a.total_cmp(b) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl Eq for ObjectiveValue {}

impl PartialOrd for ObjectiveValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectiveValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cmp_key(other)
    }
}

impl std::fmt::Display for ObjectiveValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectiveValue[")?;
        for (i, v) in self.key.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", v)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wunsch_model::{
        config::MatchingConfig,
        index::{ParticipantIndex, SlotIndex, WorkshopIndex},
        model::{ModelBuilder, PreferenceList},
        solution::{Placement, Round},
    };

    fn fixture() -> (wunsch_model::model::Model, WeightVector) {
        let cfg = MatchingConfig {
            num_wishes: 3,
            num_assign: 2,
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg);
        let w0 = builder.add_workshop_uniform("w0", "A", None, 10);
        let w1 = builder.add_workshop_uniform("w1", "B", None, 10);
        let w2 = builder.add_workshop_uniform("w2", "C", None, 10);
        let mut prefs = PreferenceList::new();
        prefs.extend([w0, w1, w2]);
        builder.add_participant("p0", "c0", prefs);
        builder.add_participant("p1", "c1", PreferenceList::new());
        let model = builder.build();
        let weights = WeightVector::linear(0.2, 3); // [1.0, 0.6, 0.2]
        (model, weights)
    }

    fn place(a: &mut Assignment, p: usize, s: usize, w: usize, priority: Option<usize>) {
        a.place(
            ParticipantIndex::new(p),
            SlotIndex::new(s),
            Placement {
                workshop: WorkshopIndex::new(w),
                round: Round::PreferenceCapped,
                priority,
            },
        );
    }

    #[test]
    fn test_happiness_membership_based() {
        let (model, weights) = fixture();
        let mut a = Assignment::empty(2, 2);
        // p0 receives wish 1 and wish 3; max achievable = 1.0 + 0.6 = 1.6.
        place(&mut a, 0, 0, 0, Some(1));
        place(&mut a, 0, 1, 2, None); // random fill that happens to be rank 3

        let h = happiness_vector(&model, &a, &weights);
        assert!((h[0] - (1.0 + 0.2) / 1.6).abs() < 1e-9);
        assert_eq!(h[1], 0.0); // no wishes
    }

    #[test]
    fn test_happiness_empty_assignment_is_zero() {
        let (model, weights) = fixture();
        let a = Assignment::empty(2, 2);
        let h = happiness_vector(&model, &a, &weights);
        assert_eq!(h, vec![0.0, 0.0]);
    }

    #[test]
    fn test_topk_equals_slots_ignores_deep_ranks() {
        let (model, weights) = fixture();
        let mut model = model;
        // Rebuild with topk_equals_slots via config clone.
        let mut cfg = model.config().clone();
        cfg.topk_equals_slots = true;
        let mut builder = ModelBuilder::new(cfg);
        let w0 = builder.add_workshop_uniform("w0", "A", None, 10);
        let w1 = builder.add_workshop_uniform("w1", "B", None, 10);
        let w2 = builder.add_workshop_uniform("w2", "C", None, 10);
        let mut prefs = PreferenceList::new();
        prefs.extend([w0, w1, w2]);
        builder.add_participant("p0", "c0", prefs);
        model = builder.build();

        let mut a = Assignment::empty(1, 2);
        // Rank 3 is beyond num_assign = 2, contributes nothing.
        place(&mut a, 0, 0, 2, Some(3));
        let h = happiness_vector(&model, &a, &weights);
        assert_eq!(h[0], 0.0);
    }

    #[test]
    fn test_fair_maxmin_prefers_higher_minimum() {
        // A has min 0.6 mean 0.7; B has min 0.4 mean 0.9.
        let a = ObjectiveValue::evaluate(Objective::FairMaxmin, &[0.6, 0.7, 0.8]);
        let b = ObjectiveValue::evaluate(Objective::FairMaxmin, &[0.4, 0.9, 1.0]);
        assert!(a.beats(&b));
        assert!(a > b);
    }

    #[test]
    fn test_happy_mean_prefers_higher_mean() {
        let a = ObjectiveValue::evaluate(Objective::HappyMean, &[0.6, 0.7, 0.8]);
        let b = ObjectiveValue::evaluate(Objective::HappyMean, &[0.4, 0.9, 1.0]);
        assert!(b.beats(&a));
    }

    #[test]
    fn test_leximin_improves_worst_first() {
        let a = ObjectiveValue::evaluate(Objective::Leximin, &[0.5, 0.5, 0.9]);
        let b = ObjectiveValue::evaluate(Objective::Leximin, &[0.4, 0.9, 0.9]);
        assert!(a.beats(&b));

        // Equal worst-off: the second-worst decides.
        let c = ObjectiveValue::evaluate(Objective::Leximin, &[0.5, 0.6, 0.7]);
        let d = ObjectiveValue::evaluate(Objective::Leximin, &[0.5, 0.5, 1.0]);
        assert!(c.beats(&d));
    }

    #[test]
    fn test_objective_value_equality() {
        let a = ObjectiveValue::evaluate(Objective::FairMaxmin, &[0.5, 0.7]);
        let b = ObjectiveValue::evaluate(Objective::FairMaxmin, &[0.7, 0.5]);
        assert_eq!(a, b);
        assert!(!a.beats(&b));
    }

    #[test]
    fn test_mean_min_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(min(&[]), 0.0);
        assert_eq!(min(&[0.3, 0.1]), 0.1);
    }
}
