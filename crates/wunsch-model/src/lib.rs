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

//! # Wunsch Model
//!
//! **The core domain model for the Wunsch fair-allocation engine.**
//!
//! This crate defines the data structures shared by every other crate in the
//! workspace: workshops with per-slot capacities, participants with ranked
//! preference lists, the matching configuration, and the assignment produced
//! by the allocator.
//!
//! ## Architecture
//!
//! The crate keeps a strict separation between **construction** and
//! **solving**:
//!
//! * **`index`**: Strongly-typed wrappers (`ParticipantIndex`,
//!   `WorkshopIndex`, `SlotIndex`) to prevent logical indexing errors.
//! * **`config`**: The resolved `MatchingConfig` plus the strategy, objective,
//!   slicing, and weight-mode enums.
//! * **`model`**: The immutable `Model` (flattened, solver-friendly layout)
//!   and the mutable, validating `ModelBuilder`.
//! * **`solution`**: The `Assignment` output format with per-placement round
//!   and priority provenance.
//! * **`loading`**: The snapshot loader that turns plain collaborator records
//!   into a validated `Model`.
//!
//! The engine never talks to the external content store directly. The
//! collaborator hands over plain record structs, and everything past the
//! loader operates on immutable in-memory data.

pub mod config;
pub mod index;
pub mod loading;
pub mod model;
pub mod solution;
