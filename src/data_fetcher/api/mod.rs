pub mod http_client;
pub mod orchestrator;
pub mod soap_client;
pub mod soap_xml;
pub mod urls;
pub mod web_scraper;
mod fetch_utils;

// Re-export URL utilities
pub use urls::*;
// Re-export HTTP client utilities
pub use http_client::create_http_client_with_timeout;
// Re-export the concrete adapters
pub use soap_client::KsiSoapClient;
pub use web_scraper::KsiWebScraper;
// Re-export the retrieval loop
pub use orchestrator::{
    MatchFetcher, matches_cache_key, standings_cache_key, tournaments_cache_key,
    validate_year_range,
};
