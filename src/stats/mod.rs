//! Pure statistics over normalized matches.

pub mod fairness;
pub mod outcome;
pub mod team_stats;

use std::fmt;

pub use fairness::{Fairness, FairnessStats, classify_fairness, classify_goal_difference, fairness_stats};
pub use outcome::{Outcome, OutcomeStats, classify_outcome, outcome_stats};
pub use team_stats::{
    TeamSeasonStats, TeamSummary, TournamentGroup, filter_team_matches, group_by_tournament,
    team_display_name,
};

/// Percentage aggregate, or a marker when nothing has been played yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateStats<T> {
    NoMatchesPlayed { not_played: usize },
    Computed(T),
}

impl<T> AggregateStats<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            AggregateStats::Computed(stats) => Some(stats),
            AggregateStats::NoMatchesPlayed { .. } => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for AggregateStats<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateStats::NoMatchesPlayed { .. } => f.write_str("No matches played yet"),
            AggregateStats::Computed(stats) => stats.fmt(f),
        }
    }
}

/// `count / played * 100`. Callers guarantee `played > 0`.
pub(crate) fn percentage(count: usize, played: usize) -> f64 {
    count as f64 / played as f64 * 100.0
}
