pub mod normalizer;

pub use normalizer::{
    normalize_match, normalize_matches, normalize_record, normalize_standing, normalize_standings,
    normalize_tournament, normalize_tournaments, parse_date, parse_goals, parse_score,
    parse_soap_date,
};
