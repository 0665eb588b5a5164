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

//! # Per-Priority Weight Vectors
//!
//! A dense vector of length `num_wishes` assigning a score weight to every
//! preference rank. Three generation modes exist:
//!
//! - **geometric**: `w[0] = 1.0`, `w[k] = w[k-1] * base` (default base 0.8).
//! - **linear**: interpolate evenly from 1.0 down to `linear_min`
//!   (default 0.2).
//! - **manual**: explicit per-rank values; gaps and missing trailing ranks
//!   carry the last provided weight forward. An empty manual map falls back
//!   to the linear default, which reproduces the documented default vector
//!   `[1.0, 0.8, 0.6, 0.4, 0.2]`.
//!
//! The vector also defines the happiness normalization: the best a
//! participant can do is receive their top `min(num_assign, num_wishes)`
//! wishes, so that sum is the denominator that maps raw scores to [0, 1].

use wunsch_model::config::{MatchingConfig, WeightsMode};

/// A dense per-priority weight vector, rank 1 first.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightVector {
    weights: Vec<f64>,
}

impl WeightVector {
    /// Generates the weight vector a configuration calls for.
    pub fn from_config(config: &MatchingConfig) -> Self {
        match config.weights_mode {
            WeightsMode::Geometric => Self::geometric(config.weights_base, config.num_wishes),
            WeightsMode::Linear => Self::linear(config.linear_min, config.num_wishes),
            WeightsMode::Manual => {
                Self::manual(&config.manual_weights, config.linear_min, config.num_wishes)
            }
        }
    }

    /// Geometric decay: each rank's weight is the previous one times `base`.
    pub fn geometric(base: f64, num_wishes: usize) -> Self {
        let mut weights = Vec::with_capacity(num_wishes);
        let mut w = 1.0;
        for _ in 0..num_wishes {
            weights.push(w);
            w *= base;
        }
        Self { weights }
    }

    /// Even interpolation from 1.0 down to `linear_min` inclusive.
    pub fn linear(linear_min: f64, num_wishes: usize) -> Self {
        if num_wishes == 1 {
            return Self { weights: vec![1.0] };
        }
        let step = (1.0 - linear_min) / (num_wishes - 1) as f64;
        let weights = (0..num_wishes).map(|k| 1.0 - step * k as f64).collect();
        Self { weights }
    }

    /// Explicit per-rank weights as sorted `(rank, weight)` pairs (one-based
    /// ranks). Unlisted ranks carry the last provided weight forward; ranks
    /// before the first listed one take the first provided weight. An empty
    /// list falls back to [`Self::linear`].
    pub fn manual(pairs: &[(usize, f64)], linear_min: f64, num_wishes: usize) -> Self {
        debug_assert!(
            pairs.windows(2).all(|w| w[0].0 < w[1].0),
            "called `WeightVector::manual` with unsorted or duplicate ranks"
        );

        if pairs.is_empty() {
            return Self::linear(linear_min, num_wishes);
        }

        let mut weights = Vec::with_capacity(num_wishes);
        let mut current = pairs[0].1;
        let mut next_pair = 0;
        for rank in 1..=num_wishes {
            while next_pair < pairs.len() && pairs[next_pair].0 <= rank {
                current = pairs[next_pair].1;
                next_pair += 1;
            }
            weights.push(current);
        }
        Self { weights }
    }

    /// Returns the weight of a zero-based rank, or 0.0 past the end.
    #[inline]
    pub fn get(&self, rank0: usize) -> f64 {
        self.weights.get(rank0).copied().unwrap_or(0.0)
    }

    /// Returns the number of ranks covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Returns whether the vector is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Returns the weights as a slice, rank 1 first.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// The maximum achievable raw score: the sum of the best
    /// `min(num_assign, num_wishes)` weights. Weight vectors are
    /// non-increasing in all generation modes, so this is the prefix sum.
    pub fn max_score(&self, num_assign: usize) -> f64 {
        let take = num_assign.min(self.weights.len());
        self.weights[..take].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                (a - e).abs() < 1e-9,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_geometric_decay() {
        let w = WeightVector::geometric(0.8, 5);
        assert_close(w.as_slice(), &[1.0, 0.8, 0.64, 0.512, 0.4096]);
    }

    #[test]
    fn test_linear_interpolation() {
        let w = WeightVector::linear(0.2, 5);
        assert_close(w.as_slice(), &[1.0, 0.8, 0.6, 0.4, 0.2]);
    }

    #[test]
    fn test_linear_single_rank() {
        let w = WeightVector::linear(0.2, 1);
        assert_close(w.as_slice(), &[1.0]);
    }

    #[test]
    fn test_manual_carries_last_weight_forward() {
        let w = WeightVector::manual(&[(1, 1.0), (2, 0.7)], 0.2, 5);
        assert_close(w.as_slice(), &[1.0, 0.7, 0.7, 0.7, 0.7]);
    }

    #[test]
    fn test_manual_gap_in_the_middle() {
        let w = WeightVector::manual(&[(1, 1.0), (4, 0.3)], 0.2, 5);
        assert_close(w.as_slice(), &[1.0, 1.0, 1.0, 0.3, 0.3]);
    }

    #[test]
    fn test_manual_empty_falls_back_to_linear() {
        let w = WeightVector::manual(&[], 0.2, 5);
        assert_close(w.as_slice(), &[1.0, 0.8, 0.6, 0.4, 0.2]);
    }

    #[test]
    fn test_from_config_dispatch() {
        let mut cfg = MatchingConfig::default();
        cfg.weights_mode = WeightsMode::Geometric;
        assert_close(
            WeightVector::from_config(&cfg).as_slice(),
            &[1.0, 0.8, 0.64, 0.512, 0.4096],
        );
        cfg.weights_mode = WeightsMode::Linear;
        assert_close(
            WeightVector::from_config(&cfg).as_slice(),
            &[1.0, 0.8, 0.6, 0.4, 0.2],
        );
    }

    #[test]
    fn test_default_config_yields_documented_fallback_weights() {
        let w = WeightVector::from_config(&MatchingConfig::default());
        assert_close(w.as_slice(), &[1.0, 0.8, 0.6, 0.4, 0.2]);
    }

    #[test]
    fn test_max_score_prefix_sum() {
        let w = WeightVector::linear(0.2, 5);
        assert!((w.max_score(3) - 2.4).abs() < 1e-9);
        assert!((w.max_score(10) - 3.0).abs() < 1e-9);
        assert!((w.max_score(1) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_get_past_the_end_is_zero() {
        let w = WeightVector::linear(0.2, 3);
        assert_eq!(w.get(5), 0.0);
    }
}
