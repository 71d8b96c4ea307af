use serde::Serialize;
use std::fmt;

use super::{AggregateStats, percentage};
use crate::data_fetcher::models::MatchRecord;

/// Largest goal difference still counted as fair.
pub const FAIR_MAX_DIFF: u32 = 2;
/// Largest goal difference counted as uneven. Anything above is devastating.
pub const UNEVEN_MAX_DIFF: u32 = 5;

/// Bucket of a played match by absolute goal difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Fairness {
    Fair,
    Uneven,
    Devastating,
}

impl fmt::Display for Fairness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Fairness::Fair => "fair",
            Fairness::Uneven => "uneven",
            Fairness::Devastating => "devastating",
        };
        f.write_str(label)
    }
}

/// 0-2 fair, 3-5 uneven, 6 and up devastating.
pub fn classify_goal_difference(diff: u32) -> Fairness {
    match diff {
        d if d <= FAIR_MAX_DIFF => Fairness::Fair,
        d if d <= UNEVEN_MAX_DIFF => Fairness::Uneven,
        _ => Fairness::Devastating,
    }
}

/// `None` iff the match isn't played.
pub fn classify_fairness(record: &MatchRecord) -> Option<Fairness> {
    let (home, away) = record.scores()?;
    Some(classify_goal_difference(home.abs_diff(away)))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FairnessStats {
    pub fair: usize,
    pub uneven: usize,
    pub devastating: usize,
    pub not_played: usize,
    pub fair_pct: f64,
    pub uneven_pct: f64,
    pub devastating_pct: f64,
}

impl FairnessStats {
    pub fn played(&self) -> usize {
        self.fair + self.uneven + self.devastating
    }
}

impl fmt::Display for FairnessStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(Fair: {:.1}% / Uneven: {:.1}% / Devastating: {:.1}%)",
            self.fair_pct, self.uneven_pct, self.devastating_pct
        )
    }
}

/// Counts fairness buckets over `matches`.
pub fn fairness_stats<'a, I>(matches: I) -> AggregateStats<FairnessStats>
where
    I: IntoIterator<Item = &'a MatchRecord>,
{
    let mut stats = FairnessStats::default();
    for record in matches {
        match classify_fairness(record) {
            Some(Fairness::Fair) => stats.fair += 1,
            Some(Fairness::Uneven) => stats.uneven += 1,
            Some(Fairness::Devastating) => stats.devastating += 1,
            None => stats.not_played += 1,
        }
    }

    let played = stats.played();
    if played == 0 {
        return AggregateStats::NoMatchesPlayed {
            not_played: stats.not_played,
        };
    }

    stats.fair_pct = percentage(stats.fair, played);
    stats.uneven_pct = percentage(stats.uneven, played);
    stats.devastating_pct = percentage(stats.devastating, played);
    AggregateStats::Computed(stats)
}
