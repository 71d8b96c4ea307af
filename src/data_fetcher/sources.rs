//! Capabilities the orchestrator needs from upstream.
//!
//! Every trait hands back raw, source-specific rows. Turning those into
//! canonical records is the normalizer's job.

use std::future::Future;

use crate::data_fetcher::models::{DiscoveryQuery, RawMatch, RawTournament, SoapStanding};
use crate::error::AppError;

/// Fetches the raw matches of one tournament.
pub trait MatchSource {
    /// Short name used in log lines and cache keys.
    fn source_name(&self) -> &'static str;

    fn fetch_raw_matches(
        &self,
        tournament_id: u32,
    ) -> impl Future<Output = Result<Vec<RawMatch>, AppError>> + Send;
}

/// Lists the tournaments of one age group, year, gender and tournament type.
pub trait TournamentSource {
    /// Short name used in log lines and cache keys.
    fn source_name(&self) -> &'static str;

    fn discover_raw_tournaments(
        &self,
        query: DiscoveryQuery,
    ) -> impl Future<Output = Result<Vec<RawTournament>, AppError>> + Send;
}

/// Fetches the league table of one tournament.
pub trait StandingsSource {
    fn fetch_raw_standings(
        &self,
        tournament_id: u32,
    ) -> impl Future<Output = Result<Vec<SoapStanding>, AppError>> + Send;
}
