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

//! # Wunsch Engine
//!
//! The computational core of the Wunsch fair-allocation engine: per-priority
//! weight vectors, fairness objectives, the multi-round allocator, and the
//! statistics reporter.
//!
//! ## Modules
//!
//! - `weights`: Dense per-priority score weights (manual, linear, geometric
//!   decay) and the happiness normalization they induce.
//! - `objective`: Per-participant happiness, plus the strict total order
//!   (`ObjectiveValue`) that ranks candidate assignments under the
//!   `fair_maxmin`, `happy_mean`, and `leximin` objectives.
//! - `allocator`: The constrained assignment state machine —
//!   `RoundOneCapped`, `RoundTwoFairRedistribution`, `RandomFill` — with
//!   seed-controlled tie-breaking throughout.
//! - `report`: Pure summary metrics over a finished assignment (happy
//!   index, Gini, Jain, coverage histograms, per-slot counts).
//!
//! Everything here is deterministic given the same model and seed; all
//! randomness flows through an injected `ChaCha8Rng`.

pub mod allocator;
pub mod objective;
pub mod report;
pub mod weights;
