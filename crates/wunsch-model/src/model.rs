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

//! # Problem Model
//!
//! The immutable, solver-facing snapshot of one matching problem: workshops
//! with per-slot capacities, participants with ranked preference lists, and
//! the resolved configuration.
//!
//! Data is stored in a Structure of Arrays layout with flattened capacity
//! tables (`workshop * num_slots + slot`) so the allocator's inner loops
//! stay cache-friendly. The mutable counterpart is [`ModelBuilder`], which
//! validates eagerly so the allocator never sees an inconsistent state.

use crate::{
    config::MatchingConfig,
    index::{ParticipantIndex, SlotIndex, WorkshopIndex},
};
use smallvec::SmallVec;

/// A short inline preference list; most events collect five wishes or fewer.
pub type PreferenceList = SmallVec<[WorkshopIndex; 8]>;

/// The immutable problem snapshot consumed by the allocator and reporter.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    config: MatchingConfig,
    workshop_ids: Vec<String>,
    workshop_titles: Vec<String>,
    workshop_ext_ids: Vec<Option<String>>,
    /// Flattened per-slot capacities, `workshop * num_slots + slot`.
    capacities: Vec<u32>,
    participant_ids: Vec<String>,
    participant_codes: Vec<String>,
    preferences: Vec<PreferenceList>,
}

impl Model {
    /// Returns the resolved configuration this model was built with.
    #[inline]
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Returns the number of workshops.
    #[inline]
    pub fn num_workshops(&self) -> usize {
        self.workshop_ids.len()
    }

    /// Returns the number of participants.
    #[inline]
    pub fn num_participants(&self) -> usize {
        self.participant_ids.len()
    }

    /// Returns the number of concurrent time slots (`num_assign`).
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.config.num_assign
    }

    /// Returns the capacity of a workshop in a specific slot.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if either index is out of bounds.
    #[inline]
    pub fn capacity(&self, workshop: WorkshopIndex, slot: SlotIndex) -> u32 {
        debug_assert!(
            workshop.get() < self.num_workshops(),
            "called `Model::capacity` with workshop index out of bounds: the len is {} but the index is {}",
            self.num_workshops(),
            workshop.get()
        );
        debug_assert!(
            slot.get() < self.num_slots(),
            "called `Model::capacity` with slot index out of bounds: the len is {} but the index is {}",
            self.num_slots(),
            slot.get()
        );

        self.capacities[workshop.get() * self.num_slots() + slot.get()]
    }

    /// Returns the total capacity across all workshop-slot pairs.
    #[inline]
    pub fn total_capacity(&self) -> u64 {
        self.capacities.iter().map(|&c| u64::from(c)).sum()
    }

    /// Returns the total capacity of one workshop summed over its slots.
    #[inline]
    pub fn workshop_total_capacity(&self, workshop: WorkshopIndex) -> u64 {
        let start = workshop.get() * self.num_slots();
        self.capacities[start..start + self.num_slots()]
            .iter()
            .map(|&c| u64::from(c))
            .sum()
    }

    /// Returns the external id of a workshop.
    #[inline]
    pub fn workshop_id(&self, workshop: WorkshopIndex) -> &str {
        &self.workshop_ids[workshop.get()]
    }

    /// Returns the title of a workshop.
    #[inline]
    pub fn workshop_title(&self, workshop: WorkshopIndex) -> &str {
        &self.workshop_titles[workshop.get()]
    }

    /// Returns the optional secondary external id of a workshop.
    #[inline]
    pub fn workshop_ext_id(&self, workshop: WorkshopIndex) -> Option<&str> {
        self.workshop_ext_ids[workshop.get()].as_deref()
    }

    /// Returns the external id of a participant.
    #[inline]
    pub fn participant_id(&self, participant: ParticipantIndex) -> &str {
        &self.participant_ids[participant.get()]
    }

    /// Returns the external code of a participant.
    #[inline]
    pub fn participant_code(&self, participant: ParticipantIndex) -> &str {
        &self.participant_codes[participant.get()]
    }

    /// Returns the ranked preference list of a participant (priority 1 first).
    #[inline]
    pub fn preferences(&self, participant: ParticipantIndex) -> &[WorkshopIndex] {
        &self.preferences[participant.get()]
    }

    /// Returns the number of participants with an empty preference list.
    pub fn participants_without_wishes(&self) -> usize {
        self.preferences.iter().filter(|p| p.is_empty()).count()
    }

    /// Iterates over all workshop indices.
    #[inline]
    pub fn workshops(&self) -> impl Iterator<Item = WorkshopIndex> {
        (0..self.num_workshops()).map(WorkshopIndex::new)
    }

    /// Iterates over all participant indices.
    #[inline]
    pub fn participants(&self) -> impl Iterator<Item = ParticipantIndex> {
        (0..self.num_participants()).map(ParticipantIndex::new)
    }

    /// Iterates over all slot indices.
    #[inline]
    pub fn slots(&self) -> impl Iterator<Item = SlotIndex> {
        (0..self.num_slots()).map(SlotIndex::new)
    }
}

/// The mutable, validating counterpart of [`Model`].
///
/// Workshops must be added before the participants that reference them;
/// all validation is fail-fast via assertions since the loader is the only
/// production caller and has already normalized the input.
#[derive(Clone, Debug)]
pub struct ModelBuilder {
    config: MatchingConfig,
    workshop_ids: Vec<String>,
    workshop_titles: Vec<String>,
    workshop_ext_ids: Vec<Option<String>>,
    capacities: Vec<u32>,
    participant_ids: Vec<String>,
    participant_codes: Vec<String>,
    preferences: Vec<PreferenceList>,
}

impl ModelBuilder {
    /// Creates a new builder for the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if `num_assign` or `num_wishes` is zero.
    pub fn new(config: MatchingConfig) -> Self {
        assert!(
            config.num_assign > 0,
            "called `ModelBuilder::new` with num_assign = 0"
        );
        assert!(
            config.num_wishes > 0,
            "called `ModelBuilder::new` with num_wishes = 0"
        );

        Self {
            config,
            workshop_ids: Vec::new(),
            workshop_titles: Vec::new(),
            workshop_ext_ids: Vec::new(),
            capacities: Vec::new(),
            participant_ids: Vec::new(),
            participant_codes: Vec::new(),
            preferences: Vec::new(),
        }
    }

    /// Adds a workshop with explicit per-slot capacities and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if `capacities` does not have exactly `num_assign` entries.
    pub fn add_workshop(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        ext_id: Option<String>,
        capacities: &[u32],
    ) -> WorkshopIndex {
        assert_eq!(
            capacities.len(),
            self.config.num_assign,
            "called `ModelBuilder::add_workshop` with {} per-slot capacities, expected {}",
            capacities.len(),
            self.config.num_assign
        );

        let index = WorkshopIndex::new(self.workshop_ids.len());
        self.workshop_ids.push(id.into());
        self.workshop_titles.push(title.into());
        self.workshop_ext_ids.push(ext_id);
        self.capacities.extend_from_slice(capacities);
        index
    }

    /// Adds a workshop with the same capacity in every slot.
    pub fn add_workshop_uniform(
        &mut self,
        id: impl Into<String>,
        title: impl Into<String>,
        ext_id: Option<String>,
        capacity: u32,
    ) -> WorkshopIndex {
        let caps = vec![capacity; self.config.num_assign];
        self.add_workshop(id, title, ext_id, &caps)
    }

    /// Adds a participant with an already-resolved preference list.
    ///
    /// # Panics
    ///
    /// Panics if the list is longer than `num_wishes`, contains duplicates,
    /// or references a workshop that has not been added yet.
    pub fn add_participant(
        &mut self,
        id: impl Into<String>,
        code: impl Into<String>,
        preferences: PreferenceList,
    ) -> ParticipantIndex {
        assert!(
            preferences.len() <= self.config.num_wishes,
            "called `ModelBuilder::add_participant` with {} preferences, num_wishes is {}",
            preferences.len(),
            self.config.num_wishes
        );
        for (i, w) in preferences.iter().enumerate() {
            assert!(
                w.get() < self.workshop_ids.len(),
                "called `ModelBuilder::add_participant` with unknown workshop index {}",
                w.get()
            );
            assert!(
                !preferences[..i].contains(w),
                "called `ModelBuilder::add_participant` with duplicate workshop index {}",
                w.get()
            );
        }

        let index = ParticipantIndex::new(self.participant_ids.len());
        self.participant_ids.push(id.into());
        self.participant_codes.push(code.into());
        self.preferences.push(preferences);
        index
    }

    /// Finalizes the builder into an immutable [`Model`].
    pub fn build(self) -> Model {
        Model {
            config: self.config,
            workshop_ids: self.workshop_ids,
            workshop_titles: self.workshop_titles,
            workshop_ext_ids: self.workshop_ext_ids,
            capacities: self.capacities,
            participant_ids: self.participant_ids,
            participant_codes: self.participant_codes,
            preferences: self.preferences,
        }
    }
}
