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

//! # Snapshot Loader
//!
//! Turns plain collaborator records (workshops, participants, configuration)
//! into a validated [`Model`].
//!
//! The loader is deliberately lenient with participant data and strict with
//! configuration: preference entries that resolve to no known workshop are
//! dropped and counted, duplicate entries keep their first occurrence, and
//! over-long wish lists are truncated to `num_wishes` — while a malformed
//! configuration or an empty workshop list fails the whole run with a
//! [`ConfigurationError`] before any allocation starts.
//!
//! Preference entries may name a workshop by id or by exact title. When the
//! collaborator delivers several records for the same participant, the first
//! record wins; sources are expected to order records latest-first.

use crate::{
    config::{MatchingConfig, Objective, SlicingMode, Strategy, UnknownModeError, WeightsMode},
    index::WorkshopIndex,
    model::{Model, ModelBuilder, PreferenceList},
};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The error type for snapshot loading.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The snapshot contains no workshops at all.
    NoWorkshops,
    /// A numeric configuration value is out of its admissible range.
    InvalidValue {
        /// The configuration field.
        field: &'static str,
        /// The offending value, stringified.
        value: String,
    },
    /// A mode string does not name a known variant.
    UnknownMode(UnknownModeError),
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoWorkshops => write!(f, "No workshops in snapshot; nothing to allocate"),
            Self::InvalidValue { field, value } => {
                write!(f, "Invalid configuration value for {}: '{}'", field, value)
            }
            Self::UnknownMode(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<UnknownModeError> for ConfigurationError {
    fn from(e: UnknownModeError) -> Self {
        Self::UnknownMode(e)
    }
}

/// A workshop's capacity as delivered by the collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CapacityRecord {
    /// The same maximum headcount in every slot.
    Uniform(u32),
    /// An explicit per-slot capacity vector.
    PerSlot(Vec<u32>),
}

/// One workshop as delivered by the collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkshopRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ext_id: Option<String>,
    pub capacity: CapacityRecord,
}

/// One participant with their ranked wish list. Preference entries may be
/// workshop ids or exact workshop titles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub id: String,
    pub code: String,
    #[serde(default)]
    pub preferences: Vec<String>,
}

/// The stored configuration, every field optional. Missing fields fall back
/// to the documented defaults during [`resolve_config`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    #[serde(default)]
    pub num_wishes: Option<usize>,
    #[serde(default)]
    pub num_assign: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub topk_equals_slots: Option<bool>,
    #[serde(default)]
    pub slicing_mode: Option<String>,
    #[serde(default)]
    pub slicing_value: Option<u32>,
    #[serde(default)]
    pub weights_mode: Option<String>,
    #[serde(default)]
    pub weights_base: Option<f64>,
    #[serde(default)]
    pub linear_min: Option<f64>,
    /// Explicit per-rank weights as a JSON object, e.g. `{"1": 1.0, "2": 0.7}`.
    #[serde(default)]
    pub weights_json: Option<String>,
    #[serde(default)]
    pub alpha_fairness: Option<f64>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub seeds: Option<usize>,
    #[serde(default)]
    pub time_budget_ms: Option<u64>,
}

/// The full input snapshot, as handed over by a `SnapshotSource`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub workshops: Vec<WorkshopRecord>,
    pub participants: Vec<ParticipantRecord>,
    #[serde(default)]
    pub config: ConfigRecord,
}

/// Counters describing what the loader normalized away.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Preference entries that resolved to no known workshop.
    pub unresolved_preferences: usize,
    /// Preference entries dropped as duplicates within one wish list.
    pub duplicate_preferences: usize,
    /// Preference entries cut off beyond `num_wishes`.
    pub truncated_preferences: usize,
    /// Later records for an already-seen participant id.
    pub duplicate_participants: usize,
}

/// The result of a successful load: the model plus the normalization report.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedModel {
    pub model: Model,
    pub report: LoadReport,
}

/// Resolves a [`ConfigRecord`] into a [`MatchingConfig`], applying defaults
/// and validating ranges.
pub fn resolve_config(record: &ConfigRecord) -> Result<MatchingConfig, ConfigurationError> {
    let defaults = MatchingConfig::default();

    let num_wishes = record.num_wishes.unwrap_or(defaults.num_wishes);
    if num_wishes == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "num_wishes",
            value: "0".to_owned(),
        });
    }

    let num_assign = record.num_assign.unwrap_or(defaults.num_assign);
    if num_assign == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "num_assign",
            value: "0".to_owned(),
        });
    }

    let slicing_mode = match &record.slicing_mode {
        Some(s) => s.parse::<SlicingMode>()?,
        None => defaults.slicing_mode,
    };
    let slicing_value = record.slicing_value.unwrap_or(defaults.slicing_value);
    if slicing_mode == SlicingMode::Relative && slicing_value > 100 {
        return Err(ConfigurationError::InvalidValue {
            field: "slicing_value",
            value: slicing_value.to_string(),
        });
    }

    let weights_mode = match &record.weights_mode {
        Some(s) => s.parse::<WeightsMode>()?,
        None => defaults.weights_mode,
    };
    let weights_base = record.weights_base.unwrap_or(defaults.weights_base);
    if !weights_base.is_finite() || weights_base <= 0.0 {
        return Err(ConfigurationError::InvalidValue {
            field: "weights_base",
            value: weights_base.to_string(),
        });
    }
    let linear_min = record.linear_min.unwrap_or(defaults.linear_min);
    if !linear_min.is_finite() || !(0.0..=1.0).contains(&linear_min) {
        return Err(ConfigurationError::InvalidValue {
            field: "linear_min",
            value: linear_min.to_string(),
        });
    }

    let manual_weights = match &record.weights_json {
        Some(json) => parse_manual_weights(json)?,
        None => Vec::new(),
    };

    let alpha_fairness = record.alpha_fairness.unwrap_or(defaults.alpha_fairness);
    if !alpha_fairness.is_finite() || !(0.0..=1.0).contains(&alpha_fairness) {
        return Err(ConfigurationError::InvalidValue {
            field: "alpha_fairness",
            value: alpha_fairness.to_string(),
        });
    }

    let strategy = match &record.strategy {
        Some(s) => s.parse::<Strategy>()?,
        None => defaults.strategy,
    };
    let objective = match &record.objective {
        Some(s) => s.parse::<Objective>()?,
        None => defaults.objective,
    };

    let seeds = record.seeds.unwrap_or(defaults.seeds);
    if seeds == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "seeds",
            value: "0".to_owned(),
        });
    }

    Ok(MatchingConfig {
        num_wishes,
        num_assign,
        seed: record.seed,
        topk_equals_slots: record.topk_equals_slots.unwrap_or(false),
        slicing_mode,
        slicing_value,
        weights_mode,
        weights_base,
        linear_min,
        manual_weights,
        alpha_fairness,
        strategy,
        objective,
        seeds,
        time_budget_ms: record.time_budget_ms,
    })
}

/// Parses the explicit weights JSON object into sorted `(rank, weight)` pairs.
fn parse_manual_weights(json: &str) -> Result<Vec<(usize, f64)>, ConfigurationError> {
    let map: std::collections::BTreeMap<String, f64> =
        serde_json::from_str(json).map_err(|_| ConfigurationError::InvalidValue {
            field: "weights_json",
            value: json.to_owned(),
        })?;

    let mut weights = Vec::with_capacity(map.len());
    for (rank, weight) in map {
        let rank: usize = rank
            .parse()
            .ok()
            .filter(|&r| r >= 1)
            .ok_or_else(|| ConfigurationError::InvalidValue {
                field: "weights_json",
                value: rank.clone(),
            })?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigurationError::InvalidValue {
                field: "weights_json",
                value: weight.to_string(),
            });
        }
        weights.push((rank, weight));
    }
    weights.sort_by_key(|&(rank, _)| rank);
    Ok(weights)
}

/// The snapshot loader. Stateless; configuration comes with the snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotLoader;

impl SnapshotLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Loads a snapshot into a validated model.
    ///
    /// Fails with [`ConfigurationError`] if the snapshot has no workshops or
    /// the configuration is malformed; participant data problems are
    /// normalized away and counted in the [`LoadReport`].
    pub fn load(&self, snapshot: &Snapshot) -> Result<LoadedModel, ConfigurationError> {
        let config = resolve_config(&snapshot.config)?;

        if snapshot.workshops.is_empty() {
            return Err(ConfigurationError::NoWorkshops);
        }

        let mut builder = ModelBuilder::new(config.clone());
        let mut by_id: FxHashMap<&str, WorkshopIndex> = FxHashMap::default();
        let mut by_title: FxHashMap<&str, WorkshopIndex> = FxHashMap::default();

        for record in &snapshot.workshops {
            let caps = expand_capacity(&record.capacity, config.num_assign, &record.id);
            let index =
                builder.add_workshop(&record.id, &record.title, record.ext_id.clone(), &caps);
            by_id.insert(record.id.as_str(), index);
            // First title wins; ambiguous titles resolve to the earliest
            // workshop, id matches always take precedence anyway.
            by_title.entry(record.title.as_str()).or_insert(index);
        }

        let mut report = LoadReport::default();
        let mut seen_participants: FxHashSet<&str> = FxHashSet::default();

        for record in &snapshot.participants {
            if !seen_participants.insert(record.id.as_str()) {
                report.duplicate_participants += 1;
                debug!(participant = %record.id, "dropping later record for already-seen participant");
                continue;
            }

            let mut preferences = PreferenceList::new();
            for entry in &record.preferences {
                let resolved = by_id
                    .get(entry.as_str())
                    .or_else(|| by_title.get(entry.as_str()))
                    .copied();
                let Some(workshop) = resolved else {
                    report.unresolved_preferences += 1;
                    warn!(participant = %record.id, entry = %entry, "preference entry resolves to no workshop, dropping");
                    continue;
                };
                if preferences.contains(&workshop) {
                    report.duplicate_preferences += 1;
                    continue;
                }
                if preferences.len() == config.num_wishes {
                    report.truncated_preferences += 1;
                    continue;
                }
                preferences.push(workshop);
            }

            builder.add_participant(&record.id, &record.code, preferences);
        }

        let model = builder.build();
        debug!(
            workshops = model.num_workshops(),
            participants = model.num_participants(),
            num_wishes = config.num_wishes,
            num_assign = config.num_assign,
            "snapshot loaded"
        );

        Ok(LoadedModel { model, report })
    }
}

/// Expands a capacity record to exactly `num_assign` per-slot values.
///
/// Short per-slot vectors are extended with their last value, long ones are
/// truncated; an empty vector means the workshop admits nobody.
fn expand_capacity(record: &CapacityRecord, num_assign: usize, workshop_id: &str) -> Vec<u32> {
    match record {
        CapacityRecord::Uniform(c) => vec![*c; num_assign],
        CapacityRecord::PerSlot(caps) => {
            if caps.is_empty() {
                warn!(workshop = %workshop_id, "empty per-slot capacity vector, treating as zero capacity");
                return vec![0; num_assign];
            }
            if caps.len() != num_assign {
                debug!(
                    workshop = %workshop_id,
                    provided = caps.len(),
                    expected = num_assign,
                    "per-slot capacity arity mismatch, normalizing"
                );
            }
            let last = *caps.last().expect("non-empty checked above");
            (0..num_assign)
                .map(|s| caps.get(s).copied().unwrap_or(last))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{ParticipantIndex, SlotIndex, WorkshopIndex};

    fn workshop(id: &str, title: &str, capacity: u32) -> WorkshopRecord {
        WorkshopRecord {
            id: id.to_owned(),
            title: title.to_owned(),
            ext_id: None,
            capacity: CapacityRecord::Uniform(capacity),
        }
    }

    fn participant(id: &str, preferences: &[&str]) -> ParticipantRecord {
        ParticipantRecord {
            id: id.to_owned(),
            code: format!("code-{id}"),
            preferences: preferences.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_no_workshops_is_a_configuration_error() {
        let snapshot = Snapshot {
            workshops: vec![],
            participants: vec![participant("p1", &[])],
            config: ConfigRecord::default(),
        };
        let err = SnapshotLoader::new().load(&snapshot).unwrap_err();
        assert_eq!(err, ConfigurationError::NoWorkshops);
    }

    #[test]
    fn test_resolves_by_id_and_title_drops_unresolved() {
        let snapshot = Snapshot {
            workshops: vec![workshop("w1", "Robotics", 5), workshop("w2", "Pottery", 5)],
            participants: vec![participant("p1", &["Pottery", "w1", "Macrame"])],
            config: ConfigRecord::default(),
        };
        let loaded = SnapshotLoader::new().load(&snapshot).unwrap();
        let prefs = loaded.model.preferences(ParticipantIndex::new(0));
        assert_eq!(prefs, &[WorkshopIndex::new(1), WorkshopIndex::new(0)]);
        assert_eq!(loaded.report.unresolved_preferences, 1);
    }

    #[test]
    fn test_duplicates_and_truncation_are_counted() {
        let config = ConfigRecord {
            num_wishes: Some(2),
            ..ConfigRecord::default()
        };
        let snapshot = Snapshot {
            workshops: vec![
                workshop("w1", "A", 1),
                workshop("w2", "B", 1),
                workshop("w3", "C", 1),
            ],
            participants: vec![participant("p1", &["w1", "w1", "w2", "w3"])],
            config,
        };
        let loaded = SnapshotLoader::new().load(&snapshot).unwrap();
        assert_eq!(loaded.model.preferences(ParticipantIndex::new(0)).len(), 2);
        assert_eq!(loaded.report.duplicate_preferences, 1);
        assert_eq!(loaded.report.truncated_preferences, 1);
    }

    #[test]
    fn test_first_participant_record_wins() {
        let snapshot = Snapshot {
            workshops: vec![workshop("w1", "A", 1), workshop("w2", "B", 1)],
            participants: vec![participant("p1", &["w1"]), participant("p1", &["w2"])],
            config: ConfigRecord::default(),
        };
        let loaded = SnapshotLoader::new().load(&snapshot).unwrap();
        assert_eq!(loaded.model.num_participants(), 1);
        assert_eq!(
            loaded.model.preferences(ParticipantIndex::new(0)),
            &[WorkshopIndex::new(0)]
        );
        assert_eq!(loaded.report.duplicate_participants, 1);
    }

    #[test]
    fn test_per_slot_capacity_normalization() {
        let mut w = workshop("w1", "A", 0);
        w.capacity = CapacityRecord::PerSlot(vec![4, 2]);
        let snapshot = Snapshot {
            workshops: vec![w],
            participants: vec![],
            config: ConfigRecord::default(), // num_assign = 3
        };
        let loaded = SnapshotLoader::new().load(&snapshot).unwrap();
        let w0 = WorkshopIndex::new(0);
        assert_eq!(loaded.model.capacity(w0, SlotIndex::new(0)), 4);
        assert_eq!(loaded.model.capacity(w0, SlotIndex::new(1)), 2);
        // Short vector extends with its last value.
        assert_eq!(loaded.model.capacity(w0, SlotIndex::new(2)), 2);
    }

    #[test]
    fn test_config_defaults_and_validation() {
        let cfg = resolve_config(&ConfigRecord::default()).unwrap();
        assert_eq!(cfg.num_wishes, 5);
        assert_eq!(cfg.num_assign, 3);
        assert_eq!(cfg.slicing_value, 50);

        let bad = ConfigRecord {
            num_assign: Some(0),
            ..ConfigRecord::default()
        };
        assert!(matches!(
            resolve_config(&bad),
            Err(ConfigurationError::InvalidValue {
                field: "num_assign",
                ..
            })
        ));

        let bad = ConfigRecord {
            slicing_value: Some(150),
            ..ConfigRecord::default()
        };
        assert!(matches!(
            resolve_config(&bad),
            Err(ConfigurationError::InvalidValue {
                field: "slicing_value",
                ..
            })
        ));

        let bad = ConfigRecord {
            strategy: Some("brute".to_owned()),
            ..ConfigRecord::default()
        };
        assert!(matches!(
            resolve_config(&bad),
            Err(ConfigurationError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_manual_weights_parsing() {
        let record = ConfigRecord {
            weights_mode: Some("manual".to_owned()),
            weights_json: Some(r#"{"1": 1.0, "3": 0.5, "2": 0.7}"#.to_owned()),
            ..ConfigRecord::default()
        };
        let cfg = resolve_config(&record).unwrap();
        assert_eq!(cfg.manual_weights, vec![(1, 1.0), (2, 0.7), (3, 0.5)]);

        let bad = ConfigRecord {
            weights_json: Some(r#"{"0": 1.0}"#.to_owned()),
            ..ConfigRecord::default()
        };
        assert!(resolve_config(&bad).is_err());

        let bad = ConfigRecord {
            weights_json: Some("not json".to_owned()),
            ..ConfigRecord::default()
        };
        assert!(resolve_config(&bad).is_err());
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = Snapshot {
            workshops: vec![workshop("w1", "A", 3)],
            participants: vec![participant("p1", &["w1"])],
            config: ConfigRecord {
                num_assign: Some(2),
                strategy: Some("greedy".to_owned()),
                ..ConfigRecord::default()
            },
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
