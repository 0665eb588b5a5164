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

//! # Summary Reporting
//!
//! Pure metric computation over a finished assignment. Nothing here mutates
//! state or draws randomness; the same model and assignment always produce
//! the same summary.
//!
//! Fulfillment metrics are membership-based (a wished workshop counts at its
//! rank regardless of which round granted it), with one exception:
//! `per_priority_fulfilled` reports round provenance, counting only
//! placements that were granted *as* a ranked wish.

use crate::{
    objective::{happiness_vector, mean, min},
    weights::WeightVector,
};
use serde::Serialize;
use wunsch_model::{model::Model, solution::Assignment};

/// The run summary: population counts, fairness metrics, and coverage
/// histograms. Field names are part of the serialized contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub seed: String,
    pub participants_total: usize,
    pub assignments_total: usize,
    pub participants_no_wishes: usize,
    pub all_filled_to_slots: bool,
    pub happy_index: f64,
    pub min_user_happy: f64,
    pub median_user_happy: f64,
    pub gini_dissatisfaction: f64,
    pub jain_index: f64,
    pub top1_coverage: f64,
    pub no_topk_rate: f64,
    /// `hist[k-1]` = participants with at least one top-`k` wish granted.
    pub topk_coverage_hist: Vec<usize>,
    /// `per_priority_fulfilled[r-1]` = placements granted as wish rank `r`.
    pub per_priority_fulfilled: Vec<usize>,
    pub per_slot_assigned_counts: Vec<usize>,
    pub assignment_distribution: Vec<usize>,
    pub capacity_remaining_total: u64,
}

/// Per-workshop seat accounting, summed over all slots.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkshopUtilization {
    pub workshop_id: String,
    pub title: String,
    pub capacity_total: u64,
    pub capacity_used: u64,
    pub capacity_remaining: u64,
}

/// Computes the full summary for a finished assignment.
pub fn summarize(
    model: &Model,
    assignment: &Assignment,
    weights: &WeightVector,
    seed: u64,
) -> Summary {
    let num_participants = model.num_participants();
    let num_slots = model.num_slots();
    let num_wishes = model.config().num_wishes;

    let happiness = happiness_vector(model, assignment, weights);
    let assignments_total = assignment.total_placements();

    // Per-participant: the smallest rank (one-based) among granted wishes,
    // judged by membership. usize::MAX marks "no wish granted".
    let best_granted_rank: Vec<usize> = model
        .participants()
        .map(|p| {
            let prefs = model.preferences(p);
            assignment
                .placements(p)
                .filter_map(|(_, pl)| prefs.iter().position(|&w| w == pl.workshop))
                .map(|rank0| rank0 + 1)
                .min()
                .unwrap_or(usize::MAX)
        })
        .collect();

    let mut topk_coverage_hist = vec![0usize; num_wishes];
    for &best in &best_granted_rank {
        if best == usize::MAX {
            continue;
        }
        for entry in topk_coverage_hist.iter_mut().skip(best - 1) {
            *entry += 1;
        }
    }

    let k = model.config().num_assign.min(num_wishes).max(1);
    let covered_topk = best_granted_rank.iter().filter(|&&b| b <= k).count();
    let covered_top1 = best_granted_rank.iter().filter(|&&b| b == 1).count();
    let (top1_coverage, no_topk_rate) = if num_participants == 0 {
        (0.0, 0.0)
    } else {
        (
            covered_top1 as f64 / num_participants as f64,
            (num_participants - covered_topk) as f64 / num_participants as f64,
        )
    };

    let mut per_priority_fulfilled = vec![0usize; num_wishes];
    let mut per_slot_assigned_counts = vec![0usize; num_slots];
    let mut assignment_distribution = vec![0usize; num_slots + 1];
    for p in model.participants() {
        assignment_distribution[assignment.filled_count(p)] += 1;
        for (slot, placement) in assignment.placements(p) {
            per_slot_assigned_counts[slot.get()] += 1;
            if let Some(priority) = placement.priority {
                per_priority_fulfilled[priority - 1] += 1;
            }
        }
    }

    Summary {
        seed: seed.to_string(),
        participants_total: num_participants,
        assignments_total,
        participants_no_wishes: model.participants_without_wishes(),
        all_filled_to_slots: model
            .participants()
            .all(|p| assignment.filled_count(p) == num_slots),
        happy_index: mean(&happiness),
        min_user_happy: min(&happiness),
        median_user_happy: median(&happiness),
        gini_dissatisfaction: gini(&happiness.iter().map(|h| 1.0 - h).collect::<Vec<_>>()),
        jain_index: jain(&happiness),
        top1_coverage,
        no_topk_rate,
        topk_coverage_hist,
        per_priority_fulfilled,
        per_slot_assigned_counts,
        assignment_distribution,
        capacity_remaining_total: model.total_capacity() - assignments_total as u64,
    }
}

/// Computes the per-workshop seat table, ordered like the model.
pub fn workshop_utilization(model: &Model, assignment: &Assignment) -> Vec<WorkshopUtilization> {
    let mut used = vec![0u64; model.num_workshops()];
    for p in model.participants() {
        for (_, placement) in assignment.placements(p) {
            used[placement.workshop.get()] += 1;
        }
    }

    model
        .workshops()
        .map(|w| {
            let capacity_total = model.workshop_total_capacity(w);
            let capacity_used = used[w.get()];
            WorkshopUtilization {
                workshop_id: model.workshop_id(w).to_string(),
                title: model.workshop_title(w).to_string(),
                capacity_total,
                capacity_used,
                capacity_remaining: capacity_total.saturating_sub(capacity_used),
            }
        })
        .collect()
}

/// Returns the median, averaging the two middle values for even counts.
/// 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Gini coefficient via mean absolute difference. 0.0 when the mean is 0
/// (everyone equally satisfied) or the slice is empty.
pub fn gini(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mut abs_diff_sum = 0.0;
    for a in values {
        for b in values {
            abs_diff_sum += (a - b).abs();
        }
    }
    abs_diff_sum / (2.0 * n as f64 * total)
}

/// Jain's fairness index: `(Σh)² / (n · Σh²)`. 1.0 when all values are 0
/// (vacuously fair) or the slice is empty.
pub fn jain(values: &[f64]) -> f64 {
    let n = values.len();
    let sum: f64 = values.iter().sum();
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    if n == 0 || sum_sq <= 0.0 {
        return 1.0;
    }
    (sum * sum) / (n as f64 * sum_sq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::Allocator;
    use wunsch_model::{
        config::MatchingConfig,
        index::{ParticipantIndex, SlotIndex, WorkshopIndex},
        model::{ModelBuilder, PreferenceList},
        solution::{Placement, Round},
    };

    fn model_two_workshops() -> Model {
        let cfg = MatchingConfig {
            num_wishes: 2,
            num_assign: 2,
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg);
        let w0 = builder.add_workshop_uniform("w0", "Pottery", None, 3);
        let w1 = builder.add_workshop_uniform("w1", "Archery", None, 3);
        let mut prefs = PreferenceList::new();
        prefs.extend([w0, w1]);
        builder.add_participant("p0", "c0", prefs);
        let mut prefs = PreferenceList::new();
        prefs.extend([w1, w0]);
        builder.add_participant("p1", "c1", prefs);
        builder.add_participant("p2", "c2", PreferenceList::new());
        builder.build()
    }

    #[test]
    fn test_summary_counts_and_flags() {
        let model = model_two_workshops();
        let weights = WeightVector::from_config(model.config());
        let assignment = Allocator::new(&model, &weights).allocate(17);
        let summary = summarize(&model, &assignment, &weights, 17);

        assert_eq!(summary.seed, "17");
        assert_eq!(summary.participants_total, 3);
        assert_eq!(summary.participants_no_wishes, 1);
        // Capacity 3 per workshop-slot comfortably fits 3 participants.
        assert!(summary.all_filled_to_slots);
        assert_eq!(summary.assignments_total, 6);
        assert_eq!(summary.per_slot_assigned_counts, vec![3, 3]);
        assert_eq!(summary.assignment_distribution, vec![0, 0, 3]);
        assert_eq!(summary.capacity_remaining_total, 12 - 6);
    }

    #[test]
    fn test_membership_vs_provenance() {
        // One participant, random fill happens to grant their first wish:
        // coverage counts it, per_priority_fulfilled does not.
        let cfg = MatchingConfig {
            num_wishes: 1,
            num_assign: 1,
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg);
        let w0 = builder.add_workshop_uniform("w0", "A", None, 1);
        let mut prefs = PreferenceList::new();
        prefs.push(w0);
        builder.add_participant("p0", "c0", prefs);
        let model = builder.build();
        let weights = WeightVector::from_config(model.config());

        let mut assignment = Assignment::empty(1, 1);
        assignment.place(
            ParticipantIndex::new(0),
            SlotIndex::new(0),
            Placement {
                workshop: WorkshopIndex::new(0),
                round: Round::RandomFill,
                priority: None,
            },
        );
        let summary = summarize(&model, &assignment, &weights, 0);

        assert_eq!(summary.top1_coverage, 1.0);
        assert_eq!(summary.no_topk_rate, 0.0);
        assert_eq!(summary.topk_coverage_hist, vec![1]);
        assert_eq!(summary.per_priority_fulfilled, vec![0]);
        assert!((summary.happy_index - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_wishes_counts_as_uncovered() {
        let model = model_two_workshops();
        let weights = WeightVector::from_config(model.config());
        let assignment = Allocator::new(&model, &weights).allocate(4);
        let summary = summarize(&model, &assignment, &weights, 4);

        // p2 has no wishes: never covered, pulls no_topk_rate above zero.
        assert!((summary.no_topk_rate - 1.0 / 3.0).abs() < 1e-9);
        assert!(summary.top1_coverage <= 2.0 / 3.0 + 1e-9);
    }

    #[test]
    fn test_empty_model_edge_values() {
        let cfg = MatchingConfig {
            num_wishes: 2,
            num_assign: 1,
            ..MatchingConfig::default()
        };
        let mut builder = ModelBuilder::new(cfg);
        builder.add_workshop_uniform("w0", "A", None, 5);
        let model = builder.build();
        let weights = WeightVector::from_config(model.config());
        let assignment = Assignment::empty(0, 1);
        let summary = summarize(&model, &assignment, &weights, 1);

        assert_eq!(summary.participants_total, 0);
        assert!(summary.all_filled_to_slots);
        assert_eq!(summary.happy_index, 0.0);
        assert_eq!(summary.gini_dissatisfaction, 0.0);
        assert_eq!(summary.jain_index, 1.0);
        assert_eq!(summary.top1_coverage, 0.0);
        assert_eq!(summary.no_topk_rate, 0.0);
    }

    #[test]
    fn test_workshop_utilization_table() {
        let model = model_two_workshops();
        let weights = WeightVector::from_config(model.config());
        let assignment = Allocator::new(&model, &weights).allocate(8);
        let table = workshop_utilization(&model, &assignment);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].workshop_id, "w0");
        assert_eq!(table[0].title, "Pottery");
        for row in &table {
            assert_eq!(row.capacity_total, 6);
            assert_eq!(row.capacity_remaining, row.capacity_total - row.capacity_used);
        }
        let used: u64 = table.iter().map(|r| r.capacity_used).sum();
        assert_eq!(used, assignment.total_placements() as u64);
    }

    #[test]
    fn test_gini_known_values() {
        assert_eq!(gini(&[]), 0.0);
        assert_eq!(gini(&[0.0, 0.0]), 0.0);
        // All equal: perfectly even.
        assert!(gini(&[0.5, 0.5, 0.5]).abs() < 1e-9);
        // One person holds everything: (n-1)/n = 0.5 for n = 2.
        assert!((gini(&[1.0, 0.0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_jain_known_values() {
        assert_eq!(jain(&[]), 1.0);
        assert_eq!(jain(&[0.0, 0.0]), 1.0);
        assert!((jain(&[0.5, 0.5]) - 1.0).abs() < 1e-9);
        // One of two starved: 1/2.
        assert!((jain(&[1.0, 0.0]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[]), 0.0);
        assert!((median(&[0.3]) - 0.3).abs() < 1e-9);
        assert!((median(&[0.1, 0.9, 0.5]) - 0.5).abs() < 1e-9);
        assert!((median(&[0.1, 0.2, 0.8, 0.9]) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_summary_serializes_contract_keys() {
        let model = model_two_workshops();
        let weights = WeightVector::from_config(model.config());
        let assignment = Allocator::new(&model, &weights).allocate(17);
        let summary = summarize(&model, &assignment, &weights, 17);

        let json = serde_json::to_value(&summary).unwrap();
        for key in [
            "seed",
            "participants_total",
            "assignments_total",
            "participants_no_wishes",
            "all_filled_to_slots",
            "happy_index",
            "min_user_happy",
            "median_user_happy",
            "gini_dissatisfaction",
            "jain_index",
            "top1_coverage",
            "no_topk_rate",
            "topk_coverage_hist",
            "per_priority_fulfilled",
            "per_slot_assigned_counts",
            "assignment_distribution",
            "capacity_remaining_total",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["seed"], "17");
    }
}
