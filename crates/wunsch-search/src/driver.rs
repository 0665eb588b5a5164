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

//! # Search Driver
//!
//! Runs the configured strategy over a model and returns the winning
//! assignment:
//!
//! - `greedy`: one pass of the capped allocator without fair redistribution,
//!   seeded with the master seed.
//! - `fair`: the full allocator over `seeds` derived sub-seeds, evaluated in
//!   parallel with `std::thread::scope`; the strictly best objective wins,
//!   ties go to the lowest attempt index.
//! - `solver`: the `fair` winner as incumbent, then a budget-bounded repair
//!   pass swapping same-slot placements between participant pairs, keeping
//!   only moves that strictly improve the objective.
//!
//! Candidates are merged in attempt order after the threads join, so the
//! winner never depends on thread scheduling. Only wall-clock budgets and
//! interrupts can make a run non-exhaustive, and the outcome says so.

use crate::{
    monitor::{
        composite::CompositeMonitor,
        interrupt::InterruptMonitor,
        search_monitor::{SearchCommand, SearchMonitor},
        time_limit::TimeLimitMonitor,
    },
    result::{RunOutcome, SearchStatisticsBuilder, TerminationReason},
    seed,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use wunsch_engine::{
    allocator::Allocator,
    objective::{happiness_vector, participant_happiness, ObjectiveValue},
    weights::WeightVector,
};
use wunsch_model::{
    config::Strategy,
    index::{ParticipantIndex, SlotIndex},
    model::Model,
    solution::{Assignment, Placement},
};

/// One evaluated attempt of the seed search.
#[derive(Debug, Clone)]
struct Candidate {
    attempt: usize,
    seed: u64,
    objective: ObjectiveValue,
    assignment: Assignment,
}

/// The strategy-dispatching search driver over one model.
pub struct SearchDriver<'a> {
    model: &'a Model,
    weights: WeightVector,
}

impl<'a> SearchDriver<'a> {
    /// Upper bound on repair moves per solver run, on top of the wall-clock
    /// budget.
    const MAX_REPAIR_MOVES: u64 = 50_000;

    /// Creates a driver for the given model, deriving the weight vector from
    /// its configuration.
    pub fn new(model: &'a Model) -> Self {
        Self {
            model,
            weights: WeightVector::from_config(model.config()),
        }
    }

    /// Returns the weight vector the driver scores with.
    #[inline]
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// Runs the configured strategy. `stop_flag` interrupts the search from
    /// another thread; the best assignment found so far is still returned.
    pub fn run(&self, stop_flag: &AtomicBool) -> RunOutcome {
        let master = seed::master_seed(self.model);
        let start = Instant::now();

        match self.model.config().strategy {
            Strategy::Greedy => self.run_greedy(master, start),
            Strategy::Fair => self.run_fair(master, start, stop_flag),
            Strategy::Solver => self.run_solver(master, start, stop_flag),
        }
    }

    fn run_greedy(&self, master: u64, start: Instant) -> RunOutcome {
        let allocator = Allocator::new(self.model, &self.weights);
        let assignment = allocator.allocate_greedy(master);
        let happiness = happiness_vector(self.model, &assignment, &self.weights);
        let objective = ObjectiveValue::evaluate(self.model.config().objective, &happiness);
        debug!(master_seed = master, %objective, "greedy pass complete");

        RunOutcome {
            assignment,
            master_seed: master,
            winning_seed: master,
            winning_attempt: 0,
            objective,
            reason: TerminationReason::Completed,
            statistics: SearchStatisticsBuilder::new()
                .attempts_evaluated(1)
                .search_duration(start.elapsed())
                .build(),
        }
    }

    fn run_fair(&self, master: u64, start: Instant, stop_flag: &AtomicBool) -> RunOutcome {
        let config = self.model.config();
        let seeds = seed::derive_sub_seeds(master, config.seeds);
        let time_budget = config.time_budget_ms.map(Duration::from_millis);
        let worker_count = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(seeds.len())
            .max(1);

        let model = self.model;
        let weights = &self.weights;
        let objective_kind = config.objective;

        let mut worker_results: Vec<(Vec<Candidate>, Option<String>)> =
            Vec::with_capacity(worker_count);
        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(worker_count);
            for worker in 0..worker_count {
                let seeds = &seeds;
                let handle = scope.spawn(move || {
                    let mut monitor = CompositeMonitor::new();
                    monitor.add_monitor(InterruptMonitor::new(stop_flag));
                    if let Some(budget) = time_budget {
                        // Attempts are few and heavy: check the clock on
                        // every one.
                        monitor.add_monitor(TimeLimitMonitor::with_clock_check_mask(budget, 0));
                    }
                    monitor.on_enter_search(model);

                    let allocator = Allocator::new(model, weights);
                    let mut candidates = Vec::new();
                    let mut stopped = None;
                    for attempt in (worker..seeds.len()).step_by(worker_count) {
                        if let SearchCommand::Terminate(reason) = monitor.search_command() {
                            stopped = Some(reason);
                            break;
                        }
                        let assignment = allocator.allocate(seeds[attempt]);
                        let happiness = happiness_vector(model, &assignment, weights);
                        let objective = ObjectiveValue::evaluate(objective_kind, &happiness);
                        monitor.on_candidate_found(&objective);
                        monitor.on_step();
                        candidates.push(Candidate {
                            attempt,
                            seed: seeds[attempt],
                            objective,
                            assignment,
                        });
                    }

                    monitor.on_exit_search();
                    (candidates, stopped)
                });
                handles.push(handle);
            }
            for handle in handles {
                worker_results.push(handle.join().expect("seed search thread panicked"));
            }
        });

        let stop_message = worker_results
            .iter()
            .find_map(|(_, stopped)| stopped.clone());
        let mut candidates: Vec<Candidate> = worker_results
            .into_iter()
            .flat_map(|(candidates, _)| candidates)
            .collect();
        candidates.sort_by_key(|c| c.attempt);
        let attempts_evaluated = candidates.len() as u64;

        // Fold in attempt order, keeping only strict improvements: equal
        // objectives resolve to the lowest attempt index.
        let best = candidates.into_iter().reduce(|best, candidate| {
            if candidate.objective.beats(&best.objective) {
                candidate
            } else {
                best
            }
        });

        let best = match best {
            Some(best) => best,
            None => {
                // The budget expired before a single attempt finished. One
                // synchronous attempt is still owed to the caller.
                warn!("search budget expired before any attempt completed; running one attempt synchronously");
                let allocator = Allocator::new(model, weights);
                let assignment = allocator.allocate(seeds[0]);
                let happiness = happiness_vector(model, &assignment, weights);
                let objective = ObjectiveValue::evaluate(objective_kind, &happiness);
                Candidate {
                    attempt: 0,
                    seed: seeds[0],
                    objective,
                    assignment,
                }
            }
        };

        let reason = match stop_message {
            None => TerminationReason::Completed,
            Some(message) => {
                warn!(%message, attempts_evaluated, "seed search stopped early");
                if stop_flag.load(Ordering::Relaxed) {
                    TerminationReason::Interrupted(message)
                } else {
                    TerminationReason::BudgetExhausted(message)
                }
            }
        };
        debug!(
            attempt = best.attempt,
            objective = %best.objective,
            attempts_evaluated,
            "seed search complete"
        );

        RunOutcome {
            assignment: best.assignment,
            master_seed: master,
            winning_seed: best.seed,
            winning_attempt: best.attempt,
            objective: best.objective,
            reason,
            statistics: SearchStatisticsBuilder::new()
                .attempts_evaluated(attempts_evaluated)
                .used_threads(worker_count)
                .search_duration(start.elapsed())
                .build(),
        }
    }

    fn run_solver(&self, master: u64, start: Instant, stop_flag: &AtomicBool) -> RunOutcome {
        let incumbent = self.run_fair(master, start, stop_flag);
        if self.model.num_participants() < 2 {
            return incumbent;
        }

        let config = self.model.config();
        let remaining_budget = config
            .time_budget_ms
            .map(|ms| Duration::from_millis(ms).saturating_sub(start.elapsed()));

        let mut monitor = CompositeMonitor::new();
        monitor.add_monitor(InterruptMonitor::new(stop_flag));
        if let Some(budget) = remaining_budget {
            monitor.add_monitor(TimeLimitMonitor::new(budget));
        }
        monitor.on_enter_search(self.model);

        let mut assignment = incumbent.assignment.clone();
        let mut happiness = happiness_vector(self.model, &assignment, &self.weights);
        let mut objective = incumbent.objective.clone();

        // Decorrelate the repair trajectory from the winning attempt's
        // allocation randomness.
        let mut rng = ChaCha8Rng::seed_from_u64(master ^ 0x9E37_79B9_7F4A_7C15);
        let num_participants = self.model.num_participants();
        let num_slots = self.model.num_slots();

        let mut moves = 0u64;
        let mut improvements = 0u64;
        let mut stopped = None;
        while moves < Self::MAX_REPAIR_MOVES {
            if let SearchCommand::Terminate(reason) = monitor.search_command() {
                stopped = Some(reason);
                break;
            }
            monitor.on_step();
            moves += 1;

            let p = ParticipantIndex::new(rng.random_range(0..num_participants));
            let q = ParticipantIndex::new(rng.random_range(0..num_participants));
            let slot = SlotIndex::new(rng.random_range(0..num_slots));
            if p == q {
                continue;
            }
            let (Some(pl_p), Some(pl_q)) = (assignment.get(p, slot), assignment.get(q, slot))
            else {
                continue;
            };
            if pl_p.workshop == pl_q.workshop
                || assignment.holds_workshop(p, pl_q.workshop)
                || assignment.holds_workshop(q, pl_p.workshop)
            {
                continue;
            }
            let (pl_p, pl_q) = (*pl_p, *pl_q);

            self.swap_same_slot(&mut assignment, p, q, slot, pl_q, pl_p);
            let old_p = happiness[p.get()];
            let old_q = happiness[q.get()];
            happiness[p.get()] =
                participant_happiness(self.model, &assignment, &self.weights, p);
            happiness[q.get()] =
                participant_happiness(self.model, &assignment, &self.weights, q);
            let candidate = ObjectiveValue::evaluate(config.objective, &happiness);

            if candidate.beats(&objective) {
                monitor.on_candidate_found(&candidate);
                objective = candidate;
                improvements += 1;
            } else {
                self.swap_same_slot(&mut assignment, p, q, slot, pl_p, pl_q);
                happiness[p.get()] = old_p;
                happiness[q.get()] = old_q;
            }
        }
        monitor.on_exit_search();

        let reason = match (&incumbent.reason, stopped) {
            (TerminationReason::Completed, None) => TerminationReason::Completed,
            (TerminationReason::Completed, Some(message)) => {
                warn!(%message, improvements, "repair pass stopped early; keeping best repaired incumbent");
                if stop_flag.load(Ordering::Relaxed) {
                    TerminationReason::Interrupted(message)
                } else {
                    TerminationReason::BudgetExhausted(message)
                }
            }
            (reason, _) => reason.clone(),
        };
        debug!(moves, improvements, objective = %objective, "repair pass complete");

        RunOutcome {
            assignment,
            master_seed: master,
            winning_seed: incumbent.winning_seed,
            winning_attempt: incumbent.winning_attempt,
            objective,
            reason,
            statistics: SearchStatisticsBuilder::new()
                .attempts_evaluated(incumbent.statistics.attempts_evaluated)
                .repair_moves(moves)
                .used_threads(incumbent.statistics.used_threads)
                .search_duration(start.elapsed())
                .build(),
        }
    }

    /// Gives `p` the placement `for_p` and `q` the placement `for_q` in one
    /// slot, re-deriving each priority from the new holder's wish list.
    /// Same-slot swaps keep every capacity count unchanged.
    fn swap_same_slot(
        &self,
        assignment: &mut Assignment,
        p: ParticipantIndex,
        q: ParticipantIndex,
        slot: SlotIndex,
        for_p: Placement,
        for_q: Placement,
    ) {
        let rank_of = |participant: ParticipantIndex, placement: &Placement| {
            self.model
                .preferences(participant)
                .iter()
                .position(|&w| w == placement.workshop)
                .map(|rank0| rank0 + 1)
        };
        assignment.replace(
            p,
            slot,
            Placement {
                priority: rank_of(p, &for_p),
                ..for_p
            },
        );
        assignment.replace(
            q,
            slot,
            Placement {
                priority: rank_of(q, &for_q),
                ..for_q
            },
        );
    }
}
