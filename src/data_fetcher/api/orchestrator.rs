//! Year-by-year, tournament-by-tournament retrieval loop.

use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::constants::{DEFAULT_REQUEST_DELAY_MS, gender, years};
use crate::data_fetcher::cache::{CacheKey, CacheManager, CacheStore};
use crate::data_fetcher::models::{
    AggregationResult, DiscoveryQuery, MatchRecord, Standing, Tournament,
};
use crate::data_fetcher::processors::{
    normalize_matches, normalize_record, normalize_standings, normalize_tournaments,
};
use crate::data_fetcher::sources::{MatchSource, StandingsSource, TournamentSource};
use crate::error::AppError;

/// Cache key of one discovery query answered by `source`.
pub fn tournaments_cache_key(source: &str, query: &DiscoveryQuery) -> String {
    CacheKey::new("tournaments")
        .part(source)
        .arg("age_group_id", query.age_group_id)
        .arg("year", query.year)
        .arg("tournament_type", query.tournament_type)
        .arg("gender", query.gender)
        .build()
}

/// Cache key of one tournament's normalized matches from `source`.
pub fn matches_cache_key(source: &str, tournament_id: u32) -> String {
    CacheKey::new("matches")
        .part(source)
        .arg("tournament_id", tournament_id)
        .build()
}

/// Cache key of one tournament's league table.
pub fn standings_cache_key(tournament_id: u32) -> String {
    CacheKey::new("standings")
        .arg("tournament_id", tournament_id)
        .build()
}

/// Rejects ranges that cannot describe a set of seasons.
pub fn validate_year_range(start_year: i32, end_year: i32) -> Result<(), AppError> {
    for year in [start_year, end_year] {
        if !(years::MIN_YEAR..=years::MAX_YEAR).contains(&year) {
            return Err(AppError::invalid_query(format!(
                "year {year} is outside {}..={}",
                years::MIN_YEAR,
                years::MAX_YEAR
            )));
        }
    }
    if start_year > end_year {
        return Err(AppError::invalid_query(format!(
            "start year {start_year} is after end year {end_year}"
        )));
    }
    Ok(())
}

/// Drives discovery and match retrieval, consulting the cache first.
///
/// Everything runs one awaited call at a time. Adapter failures are logged
/// and count as empty results, so a query only fails on bad arguments.
pub struct MatchFetcher<M, D, S> {
    match_source: M,
    tournament_source: D,
    cache: CacheManager<S>,
    request_delay: Duration,
    gender: u8,
}

impl<M, D, S> MatchFetcher<M, D, S>
where
    M: MatchSource,
    D: TournamentSource,
    S: CacheStore,
{
    pub fn new(match_source: M, tournament_source: D, cache: CacheManager<S>) -> Self {
        Self {
            match_source,
            tournament_source,
            cache,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            gender: gender::MALE,
        }
    }

    /// Pause after every match fetch that missed the cache.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_gender(mut self, gender: u8) -> Self {
        self.gender = gender;
        self
    }

    pub fn cache(&self) -> &CacheManager<S> {
        &self.cache
    }

    pub fn match_source(&self) -> &M {
        &self.match_source
    }

    pub fn tournament_source(&self) -> &D {
        &self.tournament_source
    }

    /// Tournaments of one age group, year and type, cached when non-empty.
    #[instrument(skip(self))]
    pub async fn discover_tournaments(
        &self,
        age_group_id: u32,
        year: i32,
        tournament_type: u32,
    ) -> Vec<Tournament> {
        let query = DiscoveryQuery {
            age_group_id,
            year,
            gender: self.gender,
            tournament_type,
        };
        let key = tournaments_cache_key(self.tournament_source.source_name(), &query);

        if let Some(cached) = self.cache.get::<Vec<Tournament>>(&key).await {
            debug!("Using {} cached tournaments for {}", cached.len(), year);
            return cached;
        }

        let raw = match self.tournament_source.discover_raw_tournaments(query).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Tournament discovery failed for age group {} in {}: {}",
                    age_group_id, year, e
                );
                return Vec::new();
            }
        };

        let tournaments = normalize_tournaments(&raw, &query);
        if tournaments.is_empty() {
            info!("No tournaments found for age group {} in {}", age_group_id, year);
        } else {
            self.cache.set(&key, &tournaments).await;
        }
        tournaments
    }

    /// Normalized matches of one tournament, cached when non-empty.
    #[instrument(skip(self, tournament), fields(tournament_id = tournament.tournament_id))]
    pub async fn fetch_tournament_matches(&self, tournament: &Tournament) -> Vec<MatchRecord> {
        let key = matches_cache_key(self.match_source.source_name(), tournament.tournament_id);

        if let Some(cached) = self.cache.get::<Vec<MatchRecord>>(&key).await {
            debug!(
                "Using {} cached matches for tournament {}",
                cached.len(),
                tournament.tournament_id
            );
            return cached.into_iter().map(normalize_record).collect();
        }

        let result = self
            .match_source
            .fetch_raw_matches(tournament.tournament_id)
            .await;

        let matches = match result {
            Ok(raw) => normalize_matches(&raw, tournament),
            Err(e) => {
                warn!(
                    "Fetching matches for tournament {} ({}) failed: {}",
                    tournament.tournament_id, tournament.name, e
                );
                Vec::new()
            }
        };

        if !matches.is_empty() {
            self.cache.set(&key, &matches).await;
        }

        self.pause().await;
        matches
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }

    /// Every match of an age group between two years, newest year first.
    ///
    /// Fails only when the year range itself is unusable.
    #[instrument(skip(self))]
    pub async fn get_matches_for_years(
        &self,
        age_group_id: u32,
        start_year: i32,
        end_year: i32,
        tournament_type: u32,
    ) -> Result<AggregationResult, AppError> {
        validate_year_range(start_year, end_year)?;

        let mut result = AggregationResult::default();

        for year in (start_year..=end_year).rev() {
            info!("Fetching tournaments for {}", year);
            let tournaments = self
                .discover_tournaments(age_group_id, year, tournament_type)
                .await;

            let mut year_matches = Vec::new();
            for tournament in &tournaments {
                info!(
                    "Fetching matches for {} ({})",
                    tournament.name, tournament.tournament_id
                );
                let matches = self.fetch_tournament_matches(tournament).await;
                result.total_matches += matches.len();
                result.all_matches.extend(matches.iter().cloned());
                year_matches.extend(matches);
            }

            info!("{} matches found for {}", year_matches.len(), year);
            result.matches_by_year.insert(year, year_matches);
            if !tournaments.is_empty() {
                result.tournaments_by_year.insert(year, tournaments);
            }
        }

        info!("Total matches found: {}", result.total_matches);
        Ok(result)
    }
}

impl<M, D, S> MatchFetcher<M, D, S>
where
    M: MatchSource + StandingsSource,
    D: TournamentSource,
    S: CacheStore,
{
    /// League table of one tournament, cached when non-empty.
    #[instrument(skip(self, tournament), fields(tournament_id = tournament.tournament_id))]
    pub async fn fetch_tournament_standings(&self, tournament: &Tournament) -> Vec<Standing> {
        let key = standings_cache_key(tournament.tournament_id);

        if let Some(cached) = self.cache.get::<Vec<Standing>>(&key).await {
            debug!(
                "Using {} cached standings for tournament {}",
                cached.len(),
                tournament.tournament_id
            );
            return cached;
        }

        let standings = match self
            .match_source
            .fetch_raw_standings(tournament.tournament_id)
            .await
        {
            Ok(raw) => normalize_standings(&raw, tournament),
            Err(e) => {
                warn!(
                    "Fetching standings for tournament {} ({}) failed: {}",
                    tournament.tournament_id, tournament.name, e
                );
                Vec::new()
            }
        };

        if !standings.is_empty() {
            self.cache.set(&key, &standings).await;
        }

        self.pause().await;
        standings
    }

    /// Every table row of an age group's tournaments between two years, by year.
    ///
    /// Fails only when the year range itself is unusable.
    #[instrument(skip(self))]
    pub async fn get_standings_for_years(
        &self,
        age_group_id: u32,
        start_year: i32,
        end_year: i32,
        tournament_type: u32,
    ) -> Result<BTreeMap<i32, Vec<Standing>>, AppError> {
        validate_year_range(start_year, end_year)?;

        let mut by_year = BTreeMap::new();
        for year in (start_year..=end_year).rev() {
            let tournaments = self
                .discover_tournaments(age_group_id, year, tournament_type)
                .await;

            let mut rows = Vec::new();
            for tournament in &tournaments {
                info!(
                    "Fetching standings for {} ({})",
                    tournament.name, tournament.tournament_id
                );
                rows.extend(self.fetch_tournament_standings(tournament).await);
            }

            info!("{} standing rows found for {}", rows.len(), year);
            by_year.insert(year, rows);
        }
        Ok(by_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::cache::MemoryStore;
    use crate::testing_utils::{FakeMatchSource, FakeTournamentSource, TestDataBuilder};

    type TestFetcher = MatchFetcher<FakeMatchSource, FakeTournamentSource, MemoryStore>;

    fn fetcher(matches: FakeMatchSource, tournaments: FakeTournamentSource) -> TestFetcher {
        let cache = CacheManager::new(MemoryStore::new(), Duration::from_secs(3600));
        MatchFetcher::new(matches, tournaments, cache).with_request_delay(Duration::ZERO)
    }

    #[test]
    fn test_validate_year_range() {
        assert!(validate_year_range(2023, 2024).is_ok());
        assert!(validate_year_range(2024, 2024).is_ok());
        assert!(matches!(
            validate_year_range(2025, 2024),
            Err(AppError::InvalidQuery(_))
        ));
        assert!(validate_year_range(1800, 2024).is_err());
        assert!(validate_year_range(2024, 3000).is_err());
    }

    #[test]
    fn test_cache_keys_are_distinct_per_query() {
        let base = DiscoveryQuery {
            age_group_id: 420,
            year: 2024,
            gender: 1,
            tournament_type: 61,
        };
        let other_year = DiscoveryQuery { year: 2023, ..base };
        let other_gender = DiscoveryQuery { gender: 2, ..base };
        let key = |query: &DiscoveryQuery| tournaments_cache_key("html", query);
        assert_eq!(key(&base), key(&base));
        assert_ne!(key(&base), key(&other_year));
        assert_ne!(key(&base), key(&other_gender));
        assert_ne!(key(&base), tournaments_cache_key("soap", &base));
        assert_ne!(matches_cache_key("soap", 1), matches_cache_key("html", 1));
        assert_ne!(standings_cache_key(1), matches_cache_key("soap", 1));
    }

    #[tokio::test]
    async fn test_discovery_is_cached_per_parameters() {
        let tournaments = FakeTournamentSource::new()
            .with_tournaments(2024, vec![TestDataBuilder::create_raw_tournament(1, "A", 2024)])
            .with_tournaments(2023, vec![TestDataBuilder::create_raw_tournament(2, "B", 2023)]);
        let f = fetcher(FakeMatchSource::new(), tournaments);

        let first = f.discover_tournaments(420, 2024, 61).await;
        let second = f.discover_tournaments(420, 2024, 61).await;
        assert_eq!(first, second);
        assert_eq!(f.tournament_source().call_count(), 1);

        f.discover_tournaments(420, 2023, 61).await;
        assert_eq!(f.tournament_source().call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_discovery_is_not_cached() {
        let f = fetcher(FakeMatchSource::new(), FakeTournamentSource::new());
        assert!(f.discover_tournaments(420, 2024, 61).await.is_empty());
        assert!(f.discover_tournaments(420, 2024, 61).await.is_empty());
        assert_eq!(f.tournament_source().call_count(), 2);
    }

    #[tokio::test]
    async fn test_discovery_failure_is_empty() {
        let f = fetcher(
            FakeMatchSource::new(),
            FakeTournamentSource::new().failing_for_year(2024),
        );
        assert!(f.discover_tournaments(420, 2024, 61).await.is_empty());
    }

    #[tokio::test]
    async fn test_match_fetch_cached_and_normalized() {
        let matches = FakeMatchSource::new().with_matches(
            7,
            vec![
                TestDataBuilder::create_soap_match("1", "170", "103", Some((3, 1))),
                TestDataBuilder::create_soap_match("2", "103", "170", None),
            ],
        );
        let f = fetcher(matches, FakeTournamentSource::new());
        let tournament = TestDataBuilder::create_tournament(7, "T", 2024);

        let first = f.fetch_tournament_matches(&tournament).await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].tournament_id, 7);
        assert!(first[0].is_played());
        assert!(!first[1].is_played());

        let second = f.fetch_tournament_matches(&tournament).await;
        assert_eq!(first, second);
        assert_eq!(f.match_source().call_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_tournament_does_not_abort_query() {
        let tournaments = FakeTournamentSource::new().with_tournaments(
            2024,
            vec![
                TestDataBuilder::create_raw_tournament(1, "Broken", 2024),
                TestDataBuilder::create_raw_tournament(2, "Fine", 2024),
            ],
        );
        let matches = FakeMatchSource::new().failing_for(1).with_matches(
            2,
            vec![TestDataBuilder::create_soap_match("9", "170", "200", Some((1, 1)))],
        );
        let f = fetcher(matches, tournaments);

        let result = f.get_matches_for_years(420, 2024, 2024, 61).await.unwrap();
        assert_eq!(result.total_matches, 1);
        assert_eq!(result.all_matches[0].tournament_id, 2);
        assert_eq!(f.match_source().requested(), vec![1, 2]);

        // The failure was not cached, the next run asks again
        f.get_matches_for_years(420, 2024, 2024, 61).await.unwrap();
        assert_eq!(f.match_source().requested(), vec![1, 2, 1]);
    }

    #[tokio::test]
    async fn test_years_fetched_newest_first() {
        let f = fetcher(FakeMatchSource::new(), FakeTournamentSource::new());
        let result = f.get_matches_for_years(420, 2021, 2023, 61).await.unwrap();

        let years: Vec<i32> = f.tournament_source().queries().iter().map(|q| q.year).collect();
        assert_eq!(years, vec![2023, 2022, 2021]);
        assert_eq!(result.matches_by_year.len(), 3);
        assert!(result.tournaments_by_year.is_empty());
        assert_eq!(result.total_matches, 0);
    }

    #[tokio::test]
    async fn test_invalid_range_is_reported() {
        let f = fetcher(FakeMatchSource::new(), FakeTournamentSource::new());
        let err = f.get_matches_for_years(420, 2024, 2023, 61).await.unwrap_err();
        assert!(err.is_usage_error());
        assert_eq!(f.tournament_source().call_count(), 0);
    }

    #[tokio::test]
    async fn test_delay_only_after_uncached_fetches() {
        let matches = FakeMatchSource::new().with_matches(
            1,
            vec![TestDataBuilder::create_soap_match("1", "170", "103", Some((2, 0)))],
        );
        let cache = CacheManager::new(MemoryStore::new(), Duration::from_secs(3600));
        let f = MatchFetcher::new(matches, FakeTournamentSource::new(), cache)
            .with_request_delay(Duration::from_millis(50));
        let tournament = TestDataBuilder::create_tournament(1, "T", 2024);

        let start = std::time::Instant::now();
        f.fetch_tournament_matches(&tournament).await;
        assert!(start.elapsed() >= Duration::from_millis(50));

        let cached_start = std::time::Instant::now();
        f.fetch_tournament_matches(&tournament).await;
        assert!(cached_start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_standings_cached_and_grouped_by_year() {
        let tournaments = FakeTournamentSource::new()
            .with_tournaments(
                2024,
                vec![
                    TestDataBuilder::create_raw_tournament(1, "A", 2024),
                    TestDataBuilder::create_raw_tournament(2, "B", 2024),
                ],
            )
            .with_tournaments(2023, vec![TestDataBuilder::create_raw_tournament(3, "C", 2023)]);
        let matches = FakeMatchSource::new()
            .with_standings(
                1,
                vec![
                    TestDataBuilder::create_soap_standing("170", (3, 1, 0), (12, 4)),
                    TestDataBuilder::create_soap_standing("103", (1, 1, 2), (5, 9)),
                ],
            )
            .failing_for(2)
            .with_standings(3, vec![TestDataBuilder::create_soap_standing("170", (0, 0, 2), (1, 6))]);
        let f = fetcher(matches, tournaments);

        let by_year = f.get_standings_for_years(420, 2023, 2024, 61).await.unwrap();
        assert_eq!(by_year.len(), 2);
        assert_eq!(by_year[&2024].len(), 2);
        assert_eq!(by_year[&2024][0].tournament_id, 1);
        assert_eq!(by_year[&2023][0].losses, 2);
        assert_eq!(f.match_source().requested(), vec![1, 2, 3]);

        // Tables are cached, the failed tournament is asked again
        f.get_standings_for_years(420, 2023, 2024, 61).await.unwrap();
        assert_eq!(f.match_source().requested(), vec![1, 2, 3, 2]);
    }

    #[tokio::test]
    async fn test_standings_invalid_range_is_reported() {
        let f = fetcher(FakeMatchSource::new(), FakeTournamentSource::new());
        assert!(f.get_standings_for_years(420, 2030, 2020, 61).await.is_err());
        assert_eq!(f.tournament_source().call_count(), 0);
    }
}
