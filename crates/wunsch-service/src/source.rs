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

//! # Snapshot Sources
//!
//! Where the service gets its input from. The trait seam exists so the same
//! service runs against an in-memory snapshot in tests and against whatever
//! registration backend the embedding wires in (the snapshot is fetched
//! fresh per operation; the service holds no input state of its own).

use wunsch_model::loading::Snapshot;

/// Failure to produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The backing store could not be reached or read.
    Unavailable(String),
    /// The input existed but could not be decoded into a [`Snapshot`].
    Malformed(String),
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Unavailable(message) => {
                write!(f, "snapshot source unavailable: {}", message)
            }
            SourceError::Malformed(message) => {
                write!(f, "snapshot source malformed: {}", message)
            }
        }
    }
}

impl std::error::Error for SourceError {}

/// Provides the registration snapshot an operation runs against.
pub trait SnapshotSource {
    fn fetch(&self) -> Result<Snapshot, SourceError>;
}

/// A source over an owned snapshot. The test and embedding workhorse.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemorySource {
    snapshot: Snapshot,
}

impl InMemorySource {
    /// Creates a source over the given snapshot.
    #[inline]
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Parses a JSON snapshot document.
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let snapshot: Snapshot =
            serde_json::from_str(json).map_err(|e| SourceError::Malformed(e.to_string()))?;
        Ok(Self::new(snapshot))
    }
}

impl SnapshotSource for InMemorySource {
    fn fetch(&self) -> Result<Snapshot, SourceError> {
        Ok(self.snapshot.clone())
    }
}
