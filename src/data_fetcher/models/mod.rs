pub mod aggregation;
pub mod match_record;
pub mod raw;
pub mod standing;
pub mod tournament;

// Re-export all public types
pub use aggregation::AggregationResult;
pub use match_record::{MatchRecord, ids_equal};
pub use raw::{RawMatch, RawTournament, ScrapedMatch, SoapMatch, SoapStanding, SoapTournament};
pub use standing::Standing;
pub use tournament::{DiscoveryQuery, Tournament};
