use std::collections::BTreeMap;

use super::match_record::MatchRecord;
use super::tournament::Tournament;

/// Everything one multi-year query produced. Owned by the caller, never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResult {
    pub total_matches: usize,
    /// Every queried year has an entry, empty when nothing was found.
    pub matches_by_year: BTreeMap<i32, Vec<MatchRecord>>,
    /// Only years where discovery returned tournaments.
    pub tournaments_by_year: BTreeMap<i32, Vec<Tournament>>,
    pub all_matches: Vec<MatchRecord>,
}

impl AggregationResult {
    /// Years newest first, the order they were fetched in.
    pub fn years_descending(&self) -> impl Iterator<Item = (&i32, &Vec<MatchRecord>)> {
        self.matches_by_year.iter().rev()
    }

    pub fn tournament_count(&self) -> usize {
        self.tournaments_by_year.values().map(Vec::len).sum()
    }
}
