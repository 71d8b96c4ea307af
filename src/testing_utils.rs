use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::data_fetcher::models::{
    DiscoveryQuery, MatchRecord, RawMatch, RawTournament, ScrapedMatch, SoapMatch, SoapStanding,
    Tournament,
};
use crate::data_fetcher::sources::{MatchSource, StandingsSource, TournamentSource};
use crate::error::AppError;

/// Test utilities for creating mock data and testing scenarios
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Default kickoff used by the builders: 12 May 2024 17:00
    pub fn default_date() -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 5, 12).and_then(|d| d.and_hms_opt(17, 0, 0))
    }

    /// Creates a played match between two team ids
    pub fn create_played_match(
        match_id: &str,
        home_team_id: &str,
        away_team_id: &str,
        home_score: u32,
        away_score: u32,
    ) -> MatchRecord {
        MatchRecord {
            match_id: Some(match_id.to_string()),
            date: Self::default_date(),
            home_team_id: Some(home_team_id.to_string()),
            away_team_id: Some(away_team_id.to_string()),
            home_team_name: Some(format!("Team {home_team_id}")),
            away_team_name: Some(format!("Team {away_team_id}")),
            home_score: Some(home_score),
            away_score: Some(away_score),
            venue: Some("Test Arena".to_string()),
            tournament_id: 1,
            tournament_name: "Test Tournament".to_string(),
        }
    }

    /// Creates a fixture that has not been played yet
    pub fn create_unplayed_match(
        match_id: &str,
        home_team_id: &str,
        away_team_id: &str,
    ) -> MatchRecord {
        MatchRecord {
            home_score: None,
            away_score: None,
            ..Self::create_played_match(match_id, home_team_id, away_team_id, 0, 0)
        }
    }

    /// Moves a match to another tournament and date
    pub fn in_tournament(
        record: MatchRecord,
        tournament_id: u32,
        tournament_name: &str,
        date: Option<NaiveDateTime>,
    ) -> MatchRecord {
        MatchRecord {
            tournament_id,
            tournament_name: tournament_name.to_string(),
            date,
            ..record
        }
    }

    /// Creates a discovered tournament in the fifth-flokkur age group
    pub fn create_tournament(tournament_id: u32, name: &str, year: i32) -> Tournament {
        Tournament {
            tournament_id,
            name: name.to_string(),
            year,
            age_group_id: crate::constants::age_group::FIFTH_FLOKKUR,
            tournament_type: crate::constants::tournament_type::ISLANDSMOT,
            status: None,
            category: None,
            gender: None,
        }
    }

    /// Creates a tournament row the way the listing page yields it
    pub fn create_raw_tournament(tournament_id: u32, name: &str, year: i32) -> RawTournament {
        RawTournament {
            tournament_id: Some(tournament_id.to_string()),
            name: name.to_string(),
            url: format!("/mot/stakt-mot/?motnumer={tournament_id}"),
            year: Some(year.to_string()),
            ..Default::default()
        }
    }

    /// Creates a SOAP match, `None` score meaning not played
    pub fn create_soap_match(
        match_id: &str,
        home_team_id: &str,
        away_team_id: &str,
        score: Option<(u32, u32)>,
    ) -> RawMatch {
        RawMatch::Soap(SoapMatch {
            match_number: Some(match_id.to_string()),
            match_date: Some("2024-05-12T17:00:00".to_string()),
            home_club_id: Some(home_team_id.to_string()),
            away_club_id: Some(away_team_id.to_string()),
            home_club_name: Some(format!("Team {home_team_id}")),
            away_club_name: Some(format!("Team {away_team_id}")),
            home_result: score.map(|(h, _)| h.to_string()),
            away_result: score.map(|(_, a)| a.to_string()),
            venue_name: Some("Test Arena".to_string()),
        })
    }

    /// Creates a `MotStada` row, points at three per win and one per draw
    pub fn create_soap_standing(
        club_id: &str,
        record: (u32, u32, u32),
        goals: (u32, u32),
    ) -> SoapStanding {
        let (won, drawn, lost) = record;
        SoapStanding {
            club_id: Some(club_id.to_string()),
            club_name: Some(format!("Team {club_id}")),
            played: Some((won + drawn + lost).to_string()),
            won: Some(won.to_string()),
            drawn: Some(drawn.to_string()),
            lost: Some(lost.to_string()),
            goals_scored: Some(goals.0.to_string()),
            goals_conceded: Some(goals.1.to_string()),
            points: Some((won * 3 + drawn).to_string()),
        }
    }

    /// Creates a scraped match with raw page text for date and score
    pub fn create_scraped_match(
        match_id: &str,
        home_team_id: &str,
        away_team_id: &str,
        date_text: &str,
        score_text: &str,
    ) -> RawMatch {
        RawMatch::Scraped(ScrapedMatch {
            match_id: Some(match_id.to_string()),
            date_text: Some(date_text.to_string()),
            home_team_id: Some(home_team_id.to_string()),
            away_team_id: Some(away_team_id.to_string()),
            home_team_name: Some(format!("Team {home_team_id}")),
            away_team_name: Some(format!("Team {away_team_id}")),
            score_text: Some(score_text.to_string()),
            venue: None,
        })
    }
}

fn simulated_failure(what: &str) -> AppError {
    AppError::network_connection(format!("fake://{what}"), "simulated failure")
}

/// In-memory match source that counts how often it is asked.
#[derive(Debug, Default)]
pub struct FakeMatchSource {
    matches: HashMap<u32, Vec<RawMatch>>,
    standings: HashMap<u32, Vec<SoapStanding>>,
    failing: HashSet<u32>,
    calls: AtomicUsize,
    requested: Mutex<Vec<u32>>,
}

impl FakeMatchSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matches(mut self, tournament_id: u32, matches: Vec<RawMatch>) -> Self {
        self.matches.insert(tournament_id, matches);
        self
    }

    pub fn with_standings(mut self, tournament_id: u32, standings: Vec<SoapStanding>) -> Self {
        self.standings.insert(tournament_id, standings);
        self
    }

    /// Makes every fetch for `tournament_id` fail with a transport error.
    pub fn failing_for(mut self, tournament_id: u32) -> Self {
        self.failing.insert(tournament_id);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Tournament ids in the order they were requested.
    pub fn requested(&self) -> Vec<u32> {
        self.requested
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl MatchSource for FakeMatchSource {
    fn source_name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_raw_matches(&self, tournament_id: u32) -> Result<Vec<RawMatch>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(tournament_id);
        }

        if self.failing.contains(&tournament_id) {
            return Err(simulated_failure(&format!("matches/{tournament_id}")));
        }
        Ok(self.matches.get(&tournament_id).cloned().unwrap_or_default())
    }
}

impl StandingsSource for FakeMatchSource {
    async fn fetch_raw_standings(&self, tournament_id: u32) -> Result<Vec<SoapStanding>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requested) = self.requested.lock() {
            requested.push(tournament_id);
        }

        if self.failing.contains(&tournament_id) {
            return Err(simulated_failure(&format!("standings/{tournament_id}")));
        }
        Ok(self.standings.get(&tournament_id).cloned().unwrap_or_default())
    }
}

/// In-memory tournament discovery keyed by year.
#[derive(Debug, Default)]
pub struct FakeTournamentSource {
    tournaments: HashMap<i32, Vec<RawTournament>>,
    failing_years: HashSet<i32>,
    calls: AtomicUsize,
    queries: Mutex<Vec<DiscoveryQuery>>,
}

impl FakeTournamentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tournaments(mut self, year: i32, tournaments: Vec<RawTournament>) -> Self {
        self.tournaments.insert(year, tournaments);
        self
    }

    pub fn failing_for_year(mut self, year: i32) -> Self {
        self.failing_years.insert(year);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Queries in the order they were received.
    pub fn queries(&self) -> Vec<DiscoveryQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl TournamentSource for FakeTournamentSource {
    fn source_name(&self) -> &'static str {
        "fake"
    }

    async fn discover_raw_tournaments(
        &self,
        query: DiscoveryQuery,
    ) -> Result<Vec<RawTournament>, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query);
        }

        if self.failing_years.contains(&query.year) {
            return Err(simulated_failure(&format!("tournaments/{}", query.year)));
        }
        Ok(self.tournaments.get(&query.year).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_match_states() {
        let played = TestDataBuilder::create_played_match("1", "170", "103", 3, 1);
        assert!(played.is_played());
        let unplayed = TestDataBuilder::create_unplayed_match("2", "170", "103");
        assert!(!unplayed.is_played());
    }

    #[tokio::test]
    async fn test_fake_sources_count_calls() {
        let matches = FakeMatchSource::new()
            .with_matches(1, vec![TestDataBuilder::create_soap_match("a", "1", "2", None)])
            .failing_for(2);

        assert_eq!(matches.fetch_raw_matches(1).await.unwrap().len(), 1);
        assert!(matches.fetch_raw_matches(2).await.is_err());
        assert!(matches.fetch_raw_matches(3).await.unwrap().is_empty());
        assert_eq!(matches.call_count(), 3);
        assert_eq!(matches.requested(), vec![1, 2, 3]);

        let tournaments = FakeTournamentSource::new()
            .with_tournaments(2024, vec![TestDataBuilder::create_raw_tournament(9, "T", 2024)]);
        let query = DiscoveryQuery {
            age_group_id: 420,
            year: 2024,
            gender: 1,
            tournament_type: 61,
        };
        assert_eq!(tournaments.discover_raw_tournaments(query).await.unwrap().len(), 1);
        assert_eq!(tournaments.call_count(), 1);
        assert_eq!(tournaments.queries(), vec![query]);
    }
}
