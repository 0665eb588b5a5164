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

//! # Wunsch Search
//!
//! The multi-attempt search layer on top of the allocator core: stable seed
//! derivation, pluggable search monitors (time budget, external interrupt),
//! and the driver that runs the configured strategy and returns the winning
//! assignment.
//!
//! ## Modules
//!
//! - `seed`: Master-seed resolution (explicit or input-digest) and sub-seed
//!   derivation, so the same snapshot reproduces the same run.
//! - `monitor`: The `SearchMonitor` event trait plus the time-limit,
//!   interrupt, and composite implementations threaded through the driver.
//! - `driver`: The `SearchDriver` running the `fair`, `solver`, or `greedy`
//!   strategy over a model.
//! - `result`: `RunOutcome`, `TerminationReason`, and run statistics.

pub mod driver;
pub mod monitor;
pub mod result;
pub mod seed;
