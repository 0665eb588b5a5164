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

//! # Wunsch Service
//!
//! The embedding-facing facade over the allocation pipeline: fetch a
//! snapshot from a [`source::SnapshotSource`], merge run-time overrides into
//! its configuration, load the model, run the configured search strategy,
//! and serialize the resulting report.
//!
//! ## Modules
//!
//! - `source`: The `SnapshotSource` abstraction plus the in-memory and JSON
//!   implementations.
//! - `overrides`: `RunOverrides`, the per-request configuration deltas.
//! - `service`: `MatchingService` with `dry_run`, `run`, and `stats`, and
//!   the `RunReport` they produce.
//! - `stats`: `InputStats`, the no-allocation inspection of a snapshot.
//! - `error`: `ServiceError`.

pub mod error;
pub mod overrides;
pub mod service;
pub mod source;
pub mod stats;
