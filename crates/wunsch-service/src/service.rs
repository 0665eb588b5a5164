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

//! # Matching Service
//!
//! The facade an embedding talks to. Every operation fetches a fresh
//! snapshot, merges the request's overrides into the stored configuration,
//! and either inspects the input (`stats`) or runs the full pipeline
//! (`dry_run`, `run`).
//!
//! `run` and `dry_run` compute the identical result: the engine never
//! persists anything, so committing an assignment back to the registration
//! store is the embedding's concern. Both exist so callers can express
//! intent and so a future persisting wrapper has a seam to hook into.

use crate::{
    error::ServiceError,
    overrides::RunOverrides,
    source::SnapshotSource,
    stats::InputStats,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use tracing::info;
use wunsch_engine::report::{summarize, workshop_utilization, Summary, WorkshopUtilization};
use wunsch_model::loading::{Snapshot, SnapshotLoader};
use wunsch_search::driver::SearchDriver;

/// The serialized result of a run. Key names are part of the contract.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub summary: Summary,
    pub by_workshop: Vec<WorkshopUtilization>,
    /// `participant id -> {one-based slot -> workshop id}`.
    pub by_participant: BTreeMap<String, BTreeMap<String, String>>,
}

/// The service facade over one snapshot source.
#[derive(Debug, Clone)]
pub struct MatchingService<S> {
    source: S,
}

impl<S> MatchingService<S>
where
    S: SnapshotSource,
{
    /// Creates a service over the given source.
    #[inline]
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Runs the full pipeline and returns the report without persisting
    /// anything.
    pub fn dry_run(&self, overrides: &RunOverrides) -> Result<RunReport, ServiceError> {
        self.compute(overrides)
    }

    /// Runs the full pipeline. Identical to [`Self::dry_run`]; the caller
    /// owns persistence.
    pub fn run(&self, overrides: &RunOverrides) -> Result<RunReport, ServiceError> {
        self.compute(overrides)
    }

    /// Inspects the snapshot without allocating: resolved configuration,
    /// counts, histograms, previews.
    pub fn stats(&self) -> Result<InputStats, ServiceError> {
        let snapshot = self.source.fetch()?;
        let loaded = SnapshotLoader::new().load(&snapshot)?;
        Ok(InputStats::from_loaded(&loaded))
    }

    fn compute(&self, overrides: &RunOverrides) -> Result<RunReport, ServiceError> {
        let snapshot = self.source.fetch()?;
        let snapshot = Snapshot {
            config: overrides.apply(&snapshot.config),
            ..snapshot
        };
        let loaded = SnapshotLoader::new().load(&snapshot)?;
        let model = &loaded.model;

        let driver = SearchDriver::new(model);
        let stop_flag = AtomicBool::new(false);
        let outcome = driver.run(&stop_flag);
        info!(
            master_seed = outcome.master_seed,
            winning_attempt = outcome.winning_attempt,
            reason = %outcome.reason,
            duration_ms = outcome.statistics.search_duration.as_millis() as u64,
            "matching run finished"
        );

        let summary = summarize(
            model,
            &outcome.assignment,
            driver.weights(),
            outcome.master_seed,
        );
        let by_workshop = workshop_utilization(model, &outcome.assignment);

        let mut by_participant = BTreeMap::new();
        for p in model.participants() {
            let mut slots = BTreeMap::new();
            for (slot, placement) in outcome.assignment.placements(p) {
                slots.insert(
                    slot.display_rank().to_string(),
                    model.workshop_id(placement.workshop).to_string(),
                );
            }
            by_participant.insert(model.participant_id(p).to_string(), slots);
        }

        Ok(RunReport {
            summary,
            by_workshop,
            by_participant,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use wunsch_model::loading::ConfigurationError;

    fn service() -> MatchingService<InMemorySource> {
        let json = r#"{
            "workshops": [
                {"id": "w1", "title": "Pottery", "capacity": 4},
                {"id": "w2", "title": "Archery", "capacity": 4},
                {"id": "w3", "title": "Chess", "capacity": 4}
            ],
            "participants": [
                {"id": "p1", "code": "a", "preferences": ["w1", "w2", "w3"]},
                {"id": "p2", "code": "b", "preferences": ["w2", "w3", "w1"]},
                {"id": "p3", "code": "c", "preferences": ["w3", "w1", "w2"]},
                {"id": "p4", "code": "d", "preferences": []}
            ],
            "config": {"num_wishes": 3, "num_assign": 2, "seed": 11, "seeds": 4}
        }"#;
        MatchingService::new(InMemorySource::from_json(json).unwrap())
    }

    #[test]
    fn test_dry_run_produces_full_report() {
        let report = service().dry_run(&RunOverrides::default()).unwrap();

        assert_eq!(report.summary.participants_total, 4);
        assert_eq!(report.summary.seed, "11");
        assert_eq!(report.by_workshop.len(), 3);
        assert_eq!(report.by_participant.len(), 4);
        // Capacity 4 per slot fits all four participants in both slots.
        assert!(report.summary.all_filled_to_slots);
        for slots in report.by_participant.values() {
            assert_eq!(slots.len(), 2);
            assert!(slots.contains_key("1"));
            assert!(slots.contains_key("2"));
        }
    }

    #[test]
    fn test_run_equals_dry_run() {
        let svc = service();
        let a = svc.dry_run(&RunOverrides::default()).unwrap();
        let b = svc.run(&RunOverrides::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_overrides_change_the_run() {
        let svc = service();
        let base = svc.dry_run(&RunOverrides::default()).unwrap();
        let reseeded = svc
            .dry_run(&RunOverrides {
                seed: Some(12345),
                ..RunOverrides::default()
            })
            .unwrap();
        assert_eq!(reseeded.summary.seed, "12345");
        assert_eq!(base.summary.seed, "11");
    }

    #[test]
    fn test_no_workshops_is_a_configuration_error() {
        let json = r#"{"workshops": [], "participants": [], "config": {}}"#;
        let svc = MatchingService::new(InMemorySource::from_json(json).unwrap());
        let err = svc.dry_run(&RunOverrides::default()).unwrap_err();
        assert_eq!(
            err,
            ServiceError::Configuration(ConfigurationError::NoWorkshops)
        );
    }

    #[test]
    fn test_bad_override_fails_like_a_bad_stored_value() {
        let err = service()
            .dry_run(&RunOverrides {
                strategy: Some("simulated-annealing".to_string()),
                ..RunOverrides::default()
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Configuration(_)));
    }

    #[test]
    fn test_stats_does_not_allocate() {
        let stats = service().stats().unwrap();
        assert_eq!(stats.participants_total, 4);
        assert_eq!(stats.workshops_total, 3);
        assert_eq!(stats.participants_no_wishes, 1);
    }

    #[test]
    fn test_report_serializes_contract_keys() {
        let report = service().dry_run(&RunOverrides::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("summary").is_some());
        assert!(json.get("by_workshop").is_some());
        assert!(json.get("by_participant").is_some());
        assert!(json["summary"]["happy_index"].is_number());
        assert_eq!(json["by_workshop"][0]["title"], "Pottery");
        let first = &json["by_participant"]["p1"];
        assert!(first.is_object());
    }
}
