//! KSÍ youth football match history.
//!
//! Discovers tournaments of an age group on ksi.is, fetches their match lists
//! from the KSÍ SOAP service or the website, normalizes and caches the
//! results, and computes per-team outcome and fairness statistics.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ksi_stats::data_fetcher::api::create_http_client_with_timeout;
//! use ksi_stats::data_fetcher::cache::{CacheManager, MemoryStore};
//! use ksi_stats::data_fetcher::{KsiSoapClient, KsiWebScraper, MatchFetcher};
//! use ksi_stats::error::AppError;
//! use ksi_stats::stats::outcome_stats;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let client = create_http_client_with_timeout(30)?;
//!     let fetcher = MatchFetcher::new(
//!         KsiSoapClient::new(client.clone(), "https://www2.ksi.is/vefthjonustur/mot.asmx"),
//!         KsiWebScraper::new(client, "https://www.ksi.is"),
//!         CacheManager::new(MemoryStore::new(), Duration::from_secs(86_400)),
//!     );
//!
//!     let result = fetcher.get_matches_for_years(420, 2023, 2024, 61).await?;
//!     println!("{}", outcome_stats(&result.all_matches, "170"));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod error;
pub mod report;
pub mod stats;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use config::Config;
pub use data_fetcher::{AggregationResult, MatchFetcher, MatchRecord, Standing, Tournament};
pub use error::AppError;
pub use stats::{AggregateStats, FairnessStats, OutcomeStats, TeamSummary};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
