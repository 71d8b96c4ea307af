pub mod api;
pub mod cache;
pub mod models;
pub mod processors;
pub mod sources;

pub use api::{KsiSoapClient, KsiWebScraper, MatchFetcher};
pub use models::{AggregationResult, MatchRecord, Standing, Tournament};
pub use sources::{MatchSource, StandingsSource, TournamentSource};
