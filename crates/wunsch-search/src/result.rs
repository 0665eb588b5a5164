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

use wunsch_engine::objective::ObjectiveValue;
use wunsch_model::solution::Assignment;

/// Why the search stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// Every configured attempt was evaluated.
    Completed,
    /// A budget monitor stopped the search early. The string carries the
    /// monitor's message.
    BudgetExhausted(String),
    /// An external interrupt stopped the search early.
    Interrupted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::Completed => write!(f, "Completed"),
            TerminationReason::BudgetExhausted(reason) => {
                write!(f, "Budget Exhausted: {}", reason)
            }
            TerminationReason::Interrupted(reason) => write!(f, "Interrupted: {}", reason),
        }
    }
}

/// Statistics collected during a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Number of seeded attempts fully evaluated.
    pub attempts_evaluated: u64,
    /// Number of repair moves tried by the solver strategy (0 otherwise).
    pub repair_moves: u64,
    /// Number of threads used during the search.
    pub used_threads: usize,
    /// Total duration of the search.
    pub search_duration: std::time::Duration,
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(f, "  Attempts Evaluated: {}", self.attempts_evaluated)?;
        writeln!(f, "  Repair Moves: {}", self.repair_moves)?;
        writeln!(f, "  Used Threads: {}", self.used_threads)?;
        writeln!(
            f,
            "  Search Duration (secs): {:.3}",
            self.search_duration.as_secs_f64()
        )
    }
}

/// Builder for `SearchStatistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatisticsBuilder {
    attempts_evaluated: u64,
    repair_moves: u64,
    used_threads: usize,
    search_duration: std::time::Duration,
}

impl Default for SearchStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStatisticsBuilder {
    /// Creates a new `SearchStatisticsBuilder` with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            attempts_evaluated: 0,
            repair_moves: 0,
            used_threads: 1,
            search_duration: std::time::Duration::ZERO,
        }
    }

    /// Sets the number of attempts evaluated.
    #[inline]
    pub fn attempts_evaluated(mut self, attempts_evaluated: u64) -> Self {
        self.attempts_evaluated = attempts_evaluated;
        self
    }

    /// Sets the number of repair moves tried.
    #[inline]
    pub fn repair_moves(mut self, repair_moves: u64) -> Self {
        self.repair_moves = repair_moves;
        self
    }

    /// Sets the number of threads used.
    #[inline]
    pub fn used_threads(mut self, used_threads: usize) -> Self {
        self.used_threads = used_threads;
        self
    }

    /// Sets the total search duration.
    #[inline]
    pub fn search_duration(mut self, search_duration: std::time::Duration) -> Self {
        self.search_duration = search_duration;
        self
    }

    /// Builds the `SearchStatistics` instance.
    #[inline]
    pub fn build(self) -> SearchStatistics {
        SearchStatistics {
            attempts_evaluated: self.attempts_evaluated,
            repair_moves: self.repair_moves,
            used_threads: self.used_threads,
            search_duration: self.search_duration,
        }
    }
}

/// The result of a full search run: the winning assignment plus the seeds
/// and diagnostics needed to reproduce and explain it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The winning assignment.
    pub assignment: Assignment,
    /// The master seed the run was driven by.
    pub master_seed: u64,
    /// The sub-seed of the winning attempt.
    pub winning_seed: u64,
    /// The index of the winning attempt (lowest index wins ties).
    pub winning_attempt: usize,
    /// The objective value of the winning assignment.
    pub objective: ObjectiveValue,
    /// Why the search stopped.
    pub reason: TerminationReason,
    /// Run statistics.
    pub statistics: SearchStatistics,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunOutcome(attempt: {}, seed: {}, objective: {}, reason: {})",
            self.winning_attempt, self.winning_seed, self.objective, self.reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_builder_defaults() {
        let stats = SearchStatisticsBuilder::new().build();
        assert_eq!(stats.attempts_evaluated, 0);
        assert_eq!(stats.repair_moves, 0);
        assert_eq!(stats.used_threads, 1);
        assert_eq!(stats.search_duration, std::time::Duration::ZERO);
    }

    #[test]
    fn test_statistics_builder_sets_fields() {
        let stats = SearchStatisticsBuilder::new()
            .attempts_evaluated(12)
            .repair_moves(340)
            .used_threads(4)
            .search_duration(std::time::Duration::from_millis(250))
            .build();
        assert_eq!(stats.attempts_evaluated, 12);
        assert_eq!(stats.repair_moves, 340);
        assert_eq!(stats.used_threads, 4);
        assert_eq!(stats.search_duration.as_millis(), 250);
    }

    #[test]
    fn test_termination_reason_display() {
        assert_eq!(TerminationReason::Completed.to_string(), "Completed");
        assert_eq!(
            TerminationReason::BudgetExhausted("time budget reached".to_string()).to_string(),
            "Budget Exhausted: time budget reached"
        );
    }
}
