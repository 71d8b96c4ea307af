use serde::Serialize;
use std::fmt;

use super::{AggregateStats, percentage};
use crate::data_fetcher::models::MatchRecord;

/// Result of a played match from one team's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl Outcome {
    /// The same match seen from the other side.
    pub fn inverted(self) -> Self {
        match self {
            Outcome::Win => Outcome::Loss,
            Outcome::Draw => Outcome::Draw,
            Outcome::Loss => Outcome::Win,
        }
    }
}

/// Classifies `record` for `team_id`. `None` iff the match isn't played.
///
/// A team that isn't the home side is scored as the away side.
pub fn classify_outcome(record: &MatchRecord, team_id: &str) -> Option<Outcome> {
    let (home, away) = record.scores()?;
    let (own, other) = if record.is_home_team(team_id) {
        (home, away)
    } else {
        (away, home)
    };

    Some(match own.cmp(&other) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Equal => Outcome::Draw,
        std::cmp::Ordering::Less => Outcome::Loss,
    })
}

/// Win/draw/loss counts with percentages over played matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutcomeStats {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub not_played: usize,
    pub win_pct: f64,
    pub draw_pct: f64,
    pub loss_pct: f64,
}

impl OutcomeStats {
    pub fn played(&self) -> usize {
        self.wins + self.draws + self.losses
    }
}

impl fmt::Display for OutcomeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(W: {:.1}% / D: {:.1}% / L: {:.1}%)",
            self.win_pct, self.draw_pct, self.loss_pct
        )
    }
}

/// Counts outcomes for `team_id` over `matches`.
pub fn outcome_stats<'a, I>(matches: I, team_id: &str) -> AggregateStats<OutcomeStats>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut stats = OutcomeStats::default();
    for record in matches {
        match classify_outcome(record, team_id) {
            Some(Outcome::Win) => stats.wins += 1,
            Some(Outcome::Draw) => stats.draws += 1,
            Some(Outcome::Loss) => stats.losses += 1,
            None => stats.not_played += 1,
        }
    }

    let played = stats.played();
    if played == 0 {
        return AggregateStats::NoMatchesPlayed {
            not_played: stats.not_played,
        };
    }

    stats.win_pct = percentage(stats.wins, played);
    stats.draw_pct = percentage(stats.draws, played);
    stats.loss_pct = percentage(stats.losses, played);
    AggregateStats::Computed(stats)
}
