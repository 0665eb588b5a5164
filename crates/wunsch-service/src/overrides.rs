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

//! # Run-Time Overrides
//!
//! Per-request configuration deltas. A caller experimenting with a snapshot
//! can override individual knobs without touching the stored configuration;
//! every `None` falls through to the snapshot's value (and from there to the
//! defaults). Validation happens after the merge, so a bad override fails
//! the same way a bad stored value would.

use serde::Deserialize;
use wunsch_model::loading::ConfigRecord;

/// Optional per-request configuration deltas. All fields default to `None`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunOverrides {
    pub num_wishes: Option<usize>,
    pub num_assign: Option<usize>,
    pub seed: Option<u64>,
    pub topk_equals_slots: Option<bool>,
    pub slicing_mode: Option<String>,
    /// `round_cap_pct` is the wire name used by older callers.
    #[serde(alias = "round_cap_pct")]
    pub slicing_value: Option<u32>,
    pub weights_mode: Option<String>,
    pub weights_base: Option<f64>,
    pub linear_min: Option<f64>,
    pub weights_json: Option<String>,
    pub alpha_fairness: Option<f64>,
    pub strategy: Option<String>,
    pub objective: Option<String>,
    pub seeds: Option<usize>,
    #[serde(alias = "time_budget")]
    pub time_budget_ms: Option<u64>,
}

impl RunOverrides {
    /// Returns whether no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges these overrides onto a stored configuration record, field by
    /// field. The stored record is untouched.
    pub fn apply(&self, stored: &ConfigRecord) -> ConfigRecord {
        ConfigRecord {
            num_wishes: self.num_wishes.or(stored.num_wishes),
            num_assign: self.num_assign.or(stored.num_assign),
            seed: self.seed.or(stored.seed),
            topk_equals_slots: self.topk_equals_slots.or(stored.topk_equals_slots),
            slicing_mode: self.slicing_mode.clone().or_else(|| stored.slicing_mode.clone()),
            slicing_value: self.slicing_value.or(stored.slicing_value),
            weights_mode: self.weights_mode.clone().or_else(|| stored.weights_mode.clone()),
            weights_base: self.weights_base.or(stored.weights_base),
            linear_min: self.linear_min.or(stored.linear_min),
            weights_json: self.weights_json.clone().or_else(|| stored.weights_json.clone()),
            alpha_fairness: self.alpha_fairness.or(stored.alpha_fairness),
            strategy: self.strategy.clone().or_else(|| stored.strategy.clone()),
            objective: self.objective.clone().or_else(|| stored.objective.clone()),
            seeds: self.seeds.or(stored.seeds),
            time_budget_ms: self.time_budget_ms.or(stored.time_budget_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_keep_stored_values() {
        let stored = ConfigRecord {
            num_wishes: Some(4),
            strategy: Some("solver".to_string()),
            ..ConfigRecord::default()
        };
        let merged = RunOverrides::default().apply(&stored);
        assert_eq!(merged, stored);
        assert!(RunOverrides::default().is_empty());
    }

    #[test]
    fn test_override_wins_over_stored() {
        let stored = ConfigRecord {
            num_wishes: Some(4),
            seed: Some(1),
            strategy: Some("fair".to_string()),
            ..ConfigRecord::default()
        };
        let overrides = RunOverrides {
            seed: Some(99),
            strategy: Some("greedy".to_string()),
            ..RunOverrides::default()
        };
        let merged = overrides.apply(&stored);
        assert_eq!(merged.num_wishes, Some(4));
        assert_eq!(merged.seed, Some(99));
        assert_eq!(merged.strategy.as_deref(), Some("greedy"));
    }

    #[test]
    fn test_deserializes_from_partial_json() {
        let overrides: RunOverrides =
            serde_json::from_str(r#"{"seed": 7, "objective": "leximin"}"#).unwrap();
        assert_eq!(overrides.seed, Some(7));
        assert_eq!(overrides.objective.as_deref(), Some("leximin"));
        assert_eq!(overrides.num_wishes, None);
        assert!(!overrides.is_empty());
    }

    #[test]
    fn test_deserializes_wire_aliases() {
        let overrides: RunOverrides =
            serde_json::from_str(r#"{"round_cap_pct": 40, "time_budget": 1500}"#).unwrap();
        assert_eq!(overrides.slicing_value, Some(40));
        assert_eq!(overrides.time_budget_ms, Some(1500));
    }
}
