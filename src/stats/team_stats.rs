use serde::Serialize;
use std::collections::BTreeMap;

use super::outcome::{Outcome, classify_outcome};
use crate::constants::team;
use crate::data_fetcher::models::{AggregationResult, MatchRecord, Standing};

/// Matches where either side is `team_id` (string comparison).
pub fn filter_team_matches(matches: &[MatchRecord], team_id: &str) -> Vec<MatchRecord> {
    matches
        .iter()
        .filter(|m| m.involves_team(team_id))
        .cloned()
        .collect()
}

/// One tournament's matches, as produced by [`group_by_tournament`].
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentGroup {
    pub tournament_id: u32,
    pub tournament_name: String,
    pub matches: Vec<MatchRecord>,
}

impl TournamentGroup {
    /// Matches ordered by date, undated ones last.
    pub fn sorted_by_date(&self) -> Vec<&MatchRecord> {
        let mut sorted: Vec<&MatchRecord> = self.matches.iter().collect();
        sorted.sort_by_key(|m| (m.date.is_none(), m.date));
        sorted
    }
}

/// Groups matches by tournament, keeping the order tournaments first appear in.
pub fn group_by_tournament(matches: &[MatchRecord]) -> Vec<TournamentGroup> {
    let mut groups: Vec<TournamentGroup> = Vec::new();
    for record in matches {
        match groups
            .iter_mut()
            .find(|g| g.tournament_id == record.tournament_id)
        {
            Some(group) => group.matches.push(record.clone()),
            None => groups.push(TournamentGroup {
                tournament_id: record.tournament_id,
                tournament_name: record.tournament_name.clone(),
                matches: vec![record.clone()],
            }),
        }
    }
    groups
}

fn ratio(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(count) / f64::from(total)
    }
}

/// One team's record in a single season, played matches only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamSeasonStats {
    pub year: i32,
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
}

impl TeamSeasonStats {
    pub fn from_matches<'a, I>(year: i32, matches: I, team_id: &str) -> Self
    where
        I: IntoIterator<Item = &'a MatchRecord>,
    {
        let mut stats = Self {
            year,
            ..Self::default()
        };

        for record in matches {
            if !record.involves_team(team_id) {
                continue;
            }
            let (Some(outcome), Some((home, away))) =
                (classify_outcome(record, team_id), record.scores())
            else {
                continue;
            };

            let (scored, conceded) = if record.is_home_team(team_id) {
                (home, away)
            } else {
                (away, home)
            };

            stats.matches_played += 1;
            stats.goals_for = stats.goals_for.saturating_add(scored);
            stats.goals_against = stats.goals_against.saturating_add(conceded);
            match outcome {
                Outcome::Win => stats.wins += 1,
                Outcome::Draw => stats.draws += 1,
                Outcome::Loss => stats.losses += 1,
            }
        }
        stats
    }

    /// Adds one tournament table line to the season totals.
    pub fn add_standing(&mut self, standing: &Standing) {
        self.matches_played = self.matches_played.saturating_add(standing.played);
        self.wins = self.wins.saturating_add(standing.wins);
        self.draws = self.draws.saturating_add(standing.draws);
        self.losses = self.losses.saturating_add(standing.losses);
        self.goals_for = self.goals_for.saturating_add(standing.goals_for);
        self.goals_against = self.goals_against.saturating_add(standing.goals_against);
    }

    /// Season totals of `team_id` summed over every table it appears in.
    pub fn from_standings<'a, I>(year: i32, standings: I, team_id: &str) -> Self
    where
        I: IntoIterator<Item = &'a Standing>,
    {
        let mut stats = Self {
            year,
            ..Self::default()
        };
        for standing in standings.into_iter().filter(|s| s.is_team(team_id)) {
            stats.add_standing(standing);
        }
        stats
    }

    pub fn win_ratio(&self) -> f64 {
        ratio(self.wins, self.matches_played)
    }

    pub fn draw_ratio(&self) -> f64 {
        ratio(self.draws, self.matches_played)
    }

    pub fn loss_ratio(&self) -> f64 {
        ratio(self.losses, self.matches_played)
    }

    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

/// A team's performance over a range of seasons.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub team_id: String,
    pub team_name: String,
    pub total_matches: u32,
    pub total_wins: u32,
    pub total_draws: u32,
    pub total_losses: u32,
    pub total_goals_for: u32,
    pub total_goals_against: u32,
    /// Seasons in ascending order, only those where the team played.
    pub yearly: Vec<TeamSeasonStats>,
}

impl TeamSummary {
    /// Summarizes `team_id` over `start_year..=end_year` of `result`.
    pub fn from_aggregation(
        result: &AggregationResult,
        team_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Self {
        let seasons = result
            .matches_by_year
            .iter()
            .filter(|(year, _)| (start_year..=end_year).contains(*year))
            .map(|(year, matches)| TeamSeasonStats::from_matches(*year, matches, team_id));

        Self::from_seasons(
            team_id,
            team_display_name(&result.all_matches, team_id),
            seasons,
        )
    }

    /// Summarizes `team_id` from tournament tables keyed by year.
    pub fn from_standings(
        standings_by_year: &BTreeMap<i32, Vec<Standing>>,
        team_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Self {
        let seasons = standings_by_year
            .iter()
            .filter(|(year, _)| (start_year..=end_year).contains(*year))
            .map(|(year, rows)| TeamSeasonStats::from_standings(*year, rows, team_id));

        let team_name = standings_by_year
            .values()
            .flatten()
            .filter(|s| s.is_team(team_id))
            .find_map(|s| s.team_name.clone())
            .unwrap_or_else(|| team_display_name(&[], team_id));

        Self::from_seasons(team_id, team_name, seasons)
    }

    fn from_seasons(
        team_id: &str,
        team_name: String,
        seasons: impl Iterator<Item = TeamSeasonStats>,
    ) -> Self {
        let seasons: BTreeMap<i32, TeamSeasonStats> = seasons
            .filter(|stats| stats.matches_played > 0)
            .map(|stats| (stats.year, stats))
            .collect();

        let yearly: Vec<TeamSeasonStats> = seasons.into_values().collect();
        // Goal counts come straight from upstream text, so totals saturate
        let sum = |f: fn(&TeamSeasonStats) -> u32| {
            yearly.iter().map(f).fold(0, u32::saturating_add)
        };

        Self {
            team_id: team_id.to_string(),
            team_name,
            total_matches: sum(|s| s.matches_played),
            total_wins: sum(|s| s.wins),
            total_draws: sum(|s| s.draws),
            total_losses: sum(|s| s.losses),
            total_goals_for: sum(|s| s.goals_for),
            total_goals_against: sum(|s| s.goals_against),
            yearly,
        }
    }

    pub fn overall_win_ratio(&self) -> f64 {
        ratio(self.total_wins, self.total_matches)
    }

    pub fn overall_draw_ratio(&self) -> f64 {
        ratio(self.total_draws, self.total_matches)
    }

    pub fn overall_loss_ratio(&self) -> f64 {
        ratio(self.total_losses, self.total_matches)
    }
}

/// Name of `team_id` as reported by upstream, falling back to the team table.
pub fn team_display_name(matches: &[MatchRecord], team_id: &str) -> String {
    matches
        .iter()
        .find_map(|m| {
            if m.is_home_team(team_id) {
                m.home_team_name.clone()
            } else if m.is_away_team(team_id) {
                m.away_team_name.clone()
            } else {
                None
            }
        })
        .unwrap_or_else(|| match team_id.trim().parse::<u32>() {
            Ok(id) => team::name_for(id),
            Err(_) => format!("Unknown Team ({team_id})"),
        })
}
