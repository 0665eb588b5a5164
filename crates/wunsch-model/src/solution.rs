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

//! # Assignment (Solution Type)
//!
//! The output of one allocator run: per participant, per slot, an optional
//! placement carrying the assigned workshop plus provenance (which round
//! produced it and, for preference-driven rounds, which priority rank it
//! fulfilled). The reporter derives all summary metrics from this.
//!
//! Storage is a flattened `participant * num_slots + slot` vector, matching
//! the model's layout. An `Assignment` is immutable once the allocator hands
//! it over; mutation methods exist only for the allocator and the solver's
//! repair passes.

use crate::index::{ParticipantIndex, SlotIndex, WorkshopIndex};

/// Which allocator round produced a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Round {
    /// Round one: preference-driven, under the slicing cap.
    PreferenceCapped,
    /// Round two: preference-driven redistribution favoring the worst-off.
    FairRedistribution,
    /// Final fill: random, preference-blind, capacity-respecting.
    RandomFill,
}

/// One granted workshop seat for one participant in one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// The assigned workshop.
    pub workshop: WorkshopIndex,
    /// The round that produced this placement.
    pub round: Round,
    /// The one-based preference rank this placement fulfilled, if any.
    /// `None` for random fill.
    pub priority: Option<usize>,
}

/// The per-run mapping `participant -> slot -> workshop`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    slots: Vec<Option<Placement>>,
    num_slots: usize,
}

impl Assignment {
    /// Creates an empty assignment for the given dimensions.
    pub fn empty(num_participants: usize, num_slots: usize) -> Self {
        Self {
            slots: vec![None; num_participants * num_slots],
            num_slots,
        }
    }

    #[inline]
    fn offset(&self, participant: ParticipantIndex, slot: SlotIndex) -> usize {
        debug_assert!(
            slot.get() < self.num_slots,
            "called `Assignment` accessor with slot index out of bounds: the len is {} but the index is {}",
            self.num_slots,
            slot.get()
        );
        participant.get() * self.num_slots + slot.get()
    }

    /// Returns the placement of a participant in a slot, if any.
    #[inline]
    pub fn get(&self, participant: ParticipantIndex, slot: SlotIndex) -> Option<&Placement> {
        self.slots[self.offset(participant, slot)].as_ref()
    }

    /// Places a participant into a slot.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if the slot is already occupied.
    #[inline]
    pub fn place(&mut self, participant: ParticipantIndex, slot: SlotIndex, placement: Placement) {
        let offset = self.offset(participant, slot);
        debug_assert!(
            self.slots[offset].is_none(),
            "called `Assignment::place` on an occupied slot: participant {} slot {}",
            participant.get(),
            slot.get()
        );
        self.slots[offset] = Some(placement);
    }

    /// Replaces the placement of a participant in a slot, returning the old
    /// one. Used by the solver's repair passes.
    #[inline]
    pub fn replace(
        &mut self,
        participant: ParticipantIndex,
        slot: SlotIndex,
        placement: Placement,
    ) -> Option<Placement> {
        let offset = self.offset(participant, slot);
        self.slots[offset].replace(placement)
    }

    /// Returns the number of participants covered by this assignment.
    #[inline]
    pub fn num_participants(&self) -> usize {
        if self.num_slots == 0 {
            0
        } else {
            self.slots.len() / self.num_slots
        }
    }

    /// Returns the number of slots per participant.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Returns how many slots of a participant are filled.
    pub fn filled_count(&self, participant: ParticipantIndex) -> usize {
        let start = participant.get() * self.num_slots;
        self.slots[start..start + self.num_slots]
            .iter()
            .filter(|p| p.is_some())
            .count()
    }

    /// Iterates over the (slot, placement) pairs of one participant.
    pub fn placements(
        &self,
        participant: ParticipantIndex,
    ) -> impl Iterator<Item = (SlotIndex, &Placement)> {
        let start = participant.get() * self.num_slots;
        self.slots[start..start + self.num_slots]
            .iter()
            .enumerate()
            .filter_map(|(s, p)| p.as_ref().map(|p| (SlotIndex::new(s), p)))
    }

    /// Returns whether a participant already holds the given workshop in any
    /// slot. A workshop is granted at most once per participant.
    pub fn holds_workshop(&self, participant: ParticipantIndex, workshop: WorkshopIndex) -> bool {
        self.placements(participant)
            .any(|(_, p)| p.workshop == workshop)
    }

    /// Returns the total number of granted seats across all participants.
    pub fn total_placements(&self) -> usize {
        self.slots.iter().filter(|p| p.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pi(i: usize) -> ParticipantIndex {
        ParticipantIndex::new(i)
    }

    fn si(i: usize) -> SlotIndex {
        SlotIndex::new(i)
    }

    fn wi(i: usize) -> WorkshopIndex {
        WorkshopIndex::new(i)
    }

    fn placement(w: usize, round: Round, priority: Option<usize>) -> Placement {
        Placement {
            workshop: wi(w),
            round,
            priority,
        }
    }

    #[test]
    fn test_empty_assignment_shape() {
        let a = Assignment::empty(4, 3);
        assert_eq!(a.num_participants(), 4);
        assert_eq!(a.num_slots(), 3);
        assert_eq!(a.total_placements(), 0);
        assert!(a.get(pi(3), si(2)).is_none());
        assert_eq!(a.filled_count(pi(0)), 0);
    }

    #[test]
    fn test_place_and_query() {
        let mut a = Assignment::empty(2, 2);
        a.place(pi(0), si(1), placement(5, Round::PreferenceCapped, Some(1)));
        a.place(pi(1), si(0), placement(3, Round::RandomFill, None));

        assert_eq!(a.total_placements(), 2);
        assert_eq!(a.filled_count(pi(0)), 1);
        let p = a.get(pi(0), si(1)).unwrap();
        assert_eq!(p.workshop, wi(5));
        assert_eq!(p.round, Round::PreferenceCapped);
        assert_eq!(p.priority, Some(1));
        assert!(a.holds_workshop(pi(0), wi(5)));
        assert!(!a.holds_workshop(pi(0), wi(3)));
    }

    #[test]
    fn test_placements_iterator_skips_open_slots() {
        let mut a = Assignment::empty(1, 3);
        a.place(pi(0), si(2), placement(1, Round::FairRedistribution, Some(2)));
        let collected: Vec<_> = a.placements(pi(0)).collect();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].0, si(2));
        assert_eq!(collected[0].1.workshop, wi(1));
    }

    #[test]
    fn test_replace_returns_previous() {
        let mut a = Assignment::empty(1, 1);
        a.place(pi(0), si(0), placement(0, Round::PreferenceCapped, Some(1)));
        let old = a.replace(pi(0), si(0), placement(2, Round::FairRedistribution, Some(3)));
        assert_eq!(old.unwrap().workshop, wi(0));
        assert_eq!(a.get(pi(0), si(0)).unwrap().workshop, wi(2));
    }

    #[test]
    fn test_equality_is_bitwise_over_placements() {
        let mut a = Assignment::empty(2, 2);
        let mut b = Assignment::empty(2, 2);
        assert_eq!(a, b);
        a.place(pi(0), si(0), placement(1, Round::PreferenceCapped, Some(1)));
        assert_ne!(a, b);
        b.place(pi(0), si(0), placement(1, Round::PreferenceCapped, Some(1)));
        assert_eq!(a, b);
    }
}
