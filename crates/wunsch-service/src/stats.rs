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

//! # Input Statistics
//!
//! The no-allocation inspection of a snapshot: resolved configuration,
//! population counts, demand and wish-count histograms, and previews of the
//! first few records. What an operator looks at before committing to a run.

use serde::Serialize;
use wunsch_model::{
    config::MatchingConfig,
    loading::{LoadReport, LoadedModel},
    model::Model,
};

/// How many leading records the previews include.
const PREVIEW_LEN: usize = 5;

/// Per-workshop demand: how many participants wished for it, at any rank.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkshopDemand {
    pub workshop_id: String,
    pub title: String,
    pub capacity_total: u64,
    pub wished_by: usize,
}

/// The full inspection report of a loaded snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputStats {
    /// The resolved configuration the run would use.
    pub config: MatchingConfig,
    pub workshops_total: usize,
    pub participants_total: usize,
    pub participants_no_wishes: usize,
    pub preference_entries_total: usize,
    pub capacity_total: u64,
    /// `wishes_histogram[n]` = participants with exactly `n` wishes.
    pub wishes_histogram: Vec<usize>,
    pub demand_by_workshop: Vec<WorkshopDemand>,
    pub workshop_preview: Vec<String>,
    pub participant_preview: Vec<String>,
    /// What the loader dropped or repaired on the way in.
    pub load_report: LoadReport,
}

impl InputStats {
    /// Computes the statistics over a loaded model.
    pub fn from_loaded(loaded: &LoadedModel) -> Self {
        let model = &loaded.model;

        let mut wishes_histogram = vec![0usize; model.config().num_wishes + 1];
        let mut wished_by = vec![0usize; model.num_workshops()];
        let mut preference_entries_total = 0;
        for p in model.participants() {
            let prefs = model.preferences(p);
            wishes_histogram[prefs.len()] += 1;
            preference_entries_total += prefs.len();
            for &w in prefs {
                wished_by[w.get()] += 1;
            }
        }

        InputStats {
            config: model.config().clone(),
            workshops_total: model.num_workshops(),
            participants_total: model.num_participants(),
            participants_no_wishes: model.participants_without_wishes(),
            preference_entries_total,
            capacity_total: model.total_capacity(),
            wishes_histogram,
            demand_by_workshop: demand_table(model, &wished_by),
            workshop_preview: model
                .workshops()
                .take(PREVIEW_LEN)
                .map(|w| format!("{}: {}", model.workshop_id(w), model.workshop_title(w)))
                .collect(),
            participant_preview: model
                .participants()
                .take(PREVIEW_LEN)
                .map(|p| model.participant_id(p).to_string())
                .collect(),
            load_report: loaded.report,
        }
    }
}

fn demand_table(model: &Model, wished_by: &[usize]) -> Vec<WorkshopDemand> {
    model
        .workshops()
        .map(|w| WorkshopDemand {
            workshop_id: model.workshop_id(w).to_string(),
            title: model.workshop_title(w).to_string(),
            capacity_total: model.workshop_total_capacity(w),
            wished_by: wished_by[w.get()],
        })
        .collect()
}
