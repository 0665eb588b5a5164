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

//! # Matching Configuration
//!
//! The resolved, validated configuration consumed by the allocator and the
//! search driver, together with the mode enums it is made of. String-typed
//! configuration coming from the collaborator is parsed into these enums by
//! the loader; everything past the loader works with typed values only.
//!
//! Defaults follow the documented fallbacks: five wishes, three slots to
//! fill, relative slicing at 50%, linear weights from 1.0 down to 0.2
//! (`{1: 1.0, 2: 0.8, 3: 0.6, 4: 0.4, 5: 0.2}`).

use serde::Serialize;

/// The allocation strategy the search driver runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Multi-seed search: run the allocator under several tie-break seeds
    /// and keep the best candidate per the objective.
    Fair,
    /// Iterative leximin improvement within a time budget, falling back to
    /// the `Fair` result on exhaustion.
    Solver,
    /// A single deterministic allocator pass without fairness
    /// redistribution. Fastest and least fair, by design.
    Greedy,
}

/// The fairness objective that orders candidate assignments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Maximize the minimum happiness, tie-break by mean.
    FairMaxmin,
    /// Maximize the arithmetic mean happiness, tie-break by minimum.
    HappyMean,
    /// Lexicographically maximize the sorted-ascending happiness vector.
    Leximin,
}

/// How round one caps the fill of high-demand workshop-slot pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlicingMode {
    /// No cap; round one may consume the full capacity.
    Off,
    /// Cap at `slicing_value` percent of the workshop-slot capacity.
    Relative,
    /// Cap at an absolute per-slot ceiling of `slicing_value` seats.
    Fixed,
}

/// How the per-priority weight vector is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsMode {
    /// Explicit per-rank weights; missing trailing ranks repeat the last
    /// provided weight.
    Manual,
    /// Interpolate evenly from 1.0 down to `linear_min`.
    Linear,
    /// Multiply the previous rank's weight by `weights_base`.
    Geometric,
}

/// The error returned when a mode string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModeError {
    /// The configuration field being parsed (e.g. "strategy").
    pub field: &'static str,
    /// The offending value.
    pub value: String,
}

impl std::fmt::Display for UnknownModeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown {} value '{}'", self.field, self.value)
    }
}

impl std::error::Error for UnknownModeError {}

impl std::str::FromStr for Strategy {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fair" => Ok(Self::Fair),
            "solver" => Ok(Self::Solver),
            "greedy" => Ok(Self::Greedy),
            other => Err(UnknownModeError {
                field: "strategy",
                value: other.to_owned(),
            }),
        }
    }
}

impl std::str::FromStr for Objective {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fair_maxmin" => Ok(Self::FairMaxmin),
            "happy_mean" => Ok(Self::HappyMean),
            "leximin" => Ok(Self::Leximin),
            other => Err(UnknownModeError {
                field: "objective",
                value: other.to_owned(),
            }),
        }
    }
}

impl std::str::FromStr for SlicingMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "relative" => Ok(Self::Relative),
            "fixed" => Ok(Self::Fixed),
            other => Err(UnknownModeError {
                field: "slicing_mode",
                value: other.to_owned(),
            }),
        }
    }
}

impl std::str::FromStr for WeightsMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "linear" => Ok(Self::Linear),
            "geometric" => Ok(Self::Geometric),
            other => Err(UnknownModeError {
                field: "weights_mode",
                value: other.to_owned(),
            }),
        }
    }
}

/// The fully resolved matching configuration.
///
/// Built by the loader from a [`crate::loading::ConfigRecord`] with all
/// fallbacks applied; immutable afterwards. `manual_weights` holds explicit
/// per-rank overrides as `(rank, weight)` pairs sorted by rank (one-based),
/// and is only consulted when `weights_mode` is [`WeightsMode::Manual`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchingConfig {
    pub num_wishes: usize,
    pub num_assign: usize,
    pub seed: Option<u64>,
    pub topk_equals_slots: bool,
    pub slicing_mode: SlicingMode,
    pub slicing_value: u32,
    pub weights_mode: WeightsMode,
    pub weights_base: f64,
    pub linear_min: f64,
    pub manual_weights: Vec<(usize, f64)>,
    pub alpha_fairness: f64,
    pub strategy: Strategy,
    pub objective: Objective,
    pub seeds: usize,
    pub time_budget_ms: Option<u64>,
}

impl MatchingConfig {
    pub const DEFAULT_NUM_WISHES: usize = 5;
    pub const DEFAULT_NUM_ASSIGN: usize = 3;
    pub const DEFAULT_SLICING_VALUE: u32 = 50;
    pub const DEFAULT_WEIGHTS_BASE: f64 = 0.8;
    pub const DEFAULT_LINEAR_MIN: f64 = 0.2;
    pub const DEFAULT_ALPHA_FAIRNESS: f64 = 0.4;
    pub const DEFAULT_SEEDS: usize = 12;
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            num_wishes: Self::DEFAULT_NUM_WISHES,
            num_assign: Self::DEFAULT_NUM_ASSIGN,
            seed: None,
            topk_equals_slots: false,
            slicing_mode: SlicingMode::Relative,
            slicing_value: Self::DEFAULT_SLICING_VALUE,
            weights_mode: WeightsMode::Linear,
            weights_base: Self::DEFAULT_WEIGHTS_BASE,
            linear_min: Self::DEFAULT_LINEAR_MIN,
            manual_weights: Vec::new(),
            alpha_fairness: Self::DEFAULT_ALPHA_FAIRNESS,
            strategy: Strategy::Fair,
            objective: Objective::FairMaxmin,
            seeds: Self::DEFAULT_SEEDS,
            time_budget_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_match_documented_fallbacks() {
        let cfg = MatchingConfig::default();
        assert_eq!(cfg.num_wishes, 5);
        assert_eq!(cfg.num_assign, 3);
        assert_eq!(cfg.slicing_mode, SlicingMode::Relative);
        assert_eq!(cfg.slicing_value, 50);
        assert_eq!(cfg.weights_mode, WeightsMode::Linear);
        assert_eq!(cfg.linear_min, MatchingConfig::DEFAULT_LINEAR_MIN);
        assert_eq!(cfg.seeds, 12);
        assert!(cfg.seed.is_none());
        assert!(!cfg.topk_equals_slots);
    }

    #[test]
    fn test_mode_parsing_roundtrip() {
        assert_eq!(Strategy::from_str("fair").unwrap(), Strategy::Fair);
        assert_eq!(Strategy::from_str("solver").unwrap(), Strategy::Solver);
        assert_eq!(Strategy::from_str("greedy").unwrap(), Strategy::Greedy);
        assert_eq!(
            Objective::from_str("leximin").unwrap(),
            Objective::Leximin
        );
        assert_eq!(
            SlicingMode::from_str("off").unwrap(),
            SlicingMode::Off
        );
        assert_eq!(
            WeightsMode::from_str("linear").unwrap(),
            WeightsMode::Linear
        );
    }

    #[test]
    fn test_unknown_mode_reports_field_and_value() {
        let err = Strategy::from_str("brute").unwrap_err();
        assert_eq!(err.field, "strategy");
        assert_eq!(err.value, "brute");
        assert_eq!(format!("{}", err), "Unknown strategy value 'brute'");
    }

    #[test]
    fn test_serializes_snake_case() {
        let json = serde_json::to_string(&Objective::FairMaxmin).unwrap();
        assert_eq!(json, "\"fair_maxmin\"");
        let json = serde_json::to_string(&SlicingMode::Relative).unwrap();
        assert_eq!(json, "\"relative\"");
    }
}
