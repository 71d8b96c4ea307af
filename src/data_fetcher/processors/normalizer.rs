//! Maps raw rows from either source onto [`MatchRecord`], [`Tournament`]
//! and [`Standing`].
//!
//! Nothing here returns an error. Malformed input degrades to `None` fields,
//! or for tournaments and standings to the row being dropped.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, warn};

use crate::data_fetcher::models::{
    DiscoveryQuery, MatchRecord, RawMatch, RawTournament, ScrapedMatch, SoapMatch, SoapStanding,
    Standing, Tournament,
};

/// Formats accepted on page text, tried in order.
const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";
const DATE_ONLY_FORMAT: &str = "%d.%m.%Y";

/// Formats the SOAP service emits for `LeikDagur`.
const ISO_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

/// Parses `day.month.year hour:minute` or `day.month.year`.
///
/// Returns `None` for anything else, including impossible calendar dates
/// such as `31.2.2024`.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT) {
        return Some(dt);
    }

    NaiveDate::parse_from_str(text, DATE_ONLY_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a SOAP date: ISO-8601 first, then the page formats.
///
/// Fractional seconds are dropped, records carry whole seconds only.
pub fn parse_soap_date(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    ISO_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .and_then(truncate_to_seconds)
        .or_else(|| parse_date(trimmed))
}

fn truncate_to_seconds(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    dt.with_nanosecond(0)
}

/// Splits `"home-away"` score text.
///
/// Exactly one `-` with a non-negative integer on each side, surrounding
/// whitespace allowed. Any other shape gives `(None, None)`.
pub fn parse_score(text: &str) -> (Option<u32>, Option<u32>) {
    let parts: Vec<&str> = text.trim().split('-').collect();
    if parts.len() != 2 {
        return (None, None);
    }

    match (parse_goals(parts[0]), parse_goals(parts[1])) {
        (Some(home), Some(away)) => (Some(home), Some(away)),
        _ => (None, None),
    }
}

/// Parses one goal count. Empty, signed or non-numeric text is `None`.
pub fn parse_goals(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Normalizes one raw match of either source into a canonical record.
pub fn normalize_match(raw: &RawMatch, tournament: &Tournament) -> MatchRecord {
    let record = match raw {
        RawMatch::Soap(soap) => from_soap(soap, tournament),
        RawMatch::Scraped(scraped) => from_scraped(scraped, tournament),
    };
    normalize_record(record)
}

/// Normalizes a whole tournament's worth of raw matches.
pub fn normalize_matches(raw: &[RawMatch], tournament: &Tournament) -> Vec<MatchRecord> {
    raw.iter().map(|m| normalize_match(m, tournament)).collect()
}

fn from_soap(soap: &SoapMatch, tournament: &Tournament) -> MatchRecord {
    MatchRecord {
        match_id: soap.match_number.clone(),
        date: soap.match_date.as_deref().and_then(parse_soap_date),
        home_team_id: soap.home_club_id.clone(),
        away_team_id: soap.away_club_id.clone(),
        home_team_name: soap.home_club_name.clone(),
        away_team_name: soap.away_club_name.clone(),
        home_score: soap.home_result.as_deref().and_then(parse_goals),
        away_score: soap.away_result.as_deref().and_then(parse_goals),
        venue: soap.venue_name.clone(),
        tournament_id: tournament.tournament_id,
        tournament_name: tournament.name.clone(),
    }
}

fn from_scraped(scraped: &ScrapedMatch, tournament: &Tournament) -> MatchRecord {
    let (home_score, away_score) = scraped
        .score_text
        .as_deref()
        .map(parse_score)
        .unwrap_or((None, None));

    MatchRecord {
        match_id: scraped.match_id.clone(),
        date: scraped.date_text.as_deref().and_then(parse_date),
        home_team_id: scraped.home_team_id.clone(),
        away_team_id: scraped.away_team_id.clone(),
        home_team_name: scraped.home_team_name.clone(),
        away_team_name: scraped.away_team_name.clone(),
        home_score,
        away_score,
        venue: scraped.venue.clone(),
        tournament_id: tournament.tournament_id,
        tournament_name: tournament.name.clone(),
    }
}

/// Brings a record into canonical form. Applying it twice changes nothing.
///
/// Text fields are trimmed with blanks dropped, and a record carrying only
/// one score loses both.
pub fn normalize_record(record: MatchRecord) -> MatchRecord {
    let (home_score, away_score) = match (record.home_score, record.away_score) {
        (Some(home), Some(away)) => (Some(home), Some(away)),
        (None, None) => (None, None),
        (home, away) => {
            debug!(
                "Match {:?} has a single score ({:?}-{:?}), treating as not played",
                record.match_id, home, away
            );
            (None, None)
        }
    };

    MatchRecord {
        match_id: clean_text(record.match_id),
        date: record.date.and_then(truncate_to_seconds),
        home_team_id: clean_text(record.home_team_id),
        away_team_id: clean_text(record.away_team_id),
        home_team_name: clean_text(record.home_team_name),
        away_team_name: clean_text(record.away_team_name),
        home_score,
        away_score,
        venue: clean_text(record.venue),
        tournament_id: record.tournament_id,
        tournament_name: record.tournament_name.trim().to_string(),
    }
}

fn clean_text(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Turns a discovered row into a [`Tournament`].
///
/// Rows without a numeric id are dropped. The year falls back to the
/// queried one when the row doesn't carry a parseable year.
pub fn normalize_tournament(raw: &RawTournament, query: &DiscoveryQuery) -> Option<Tournament> {
    let Some(tournament_id) = raw
        .tournament_id
        .as_deref()
        .and_then(|id| id.trim().parse::<u32>().ok())
    else {
        warn!(
            "Dropping tournament '{}' with missing or non-numeric id {:?}",
            raw.name, raw.tournament_id
        );
        return None;
    };

    let year = raw
        .year
        .as_deref()
        .and_then(|y| y.trim().parse::<i32>().ok())
        .unwrap_or(query.year);

    Some(Tournament {
        tournament_id,
        name: raw.name.trim().to_string(),
        year,
        age_group_id: query.age_group_id,
        tournament_type: query.tournament_type,
        status: clean_text(raw.status.clone()),
        category: clean_text(raw.category.clone()),
        gender: clean_text(raw.gender.clone()),
    })
}

/// Normalizes every discovered row, skipping the unusable ones.
pub fn normalize_tournaments(raw: &[RawTournament], query: &DiscoveryQuery) -> Vec<Tournament> {
    raw.iter()
        .filter_map(|t| normalize_tournament(t, query))
        .collect()
}

fn table_count(value: Option<&str>, column: &str, club: &str) -> u32 {
    let Some(text) = value.map(str::trim).filter(|t| !t.is_empty()) else {
        return 0;
    };
    parse_goals(text).unwrap_or_else(|| {
        warn!("Standing for club {} has non-numeric {}: {:?}", club, column, text);
        0
    })
}

/// Turns a `MotStada` row into a [`Standing`].
///
/// Rows without a club id are dropped. Missing counts are zero, as are
/// counts that aren't non-negative integers.
pub fn normalize_standing(raw: &SoapStanding, tournament: &Tournament) -> Option<Standing> {
    let Some(team_id) = clean_text(raw.club_id.clone()) else {
        warn!(
            "Dropping standing of {:?} in tournament {} without a club id",
            raw.club_name, tournament.tournament_id
        );
        return None;
    };
    let count = |value: &Option<String>, column: &str| table_count(value.as_deref(), column, &team_id);

    Some(Standing {
        tournament_id: tournament.tournament_id,
        tournament_name: tournament.name.clone(),
        team_name: clean_text(raw.club_name.clone()),
        played: count(&raw.played, "LeikirAlls"),
        wins: count(&raw.won, "LeikirUnnir"),
        draws: count(&raw.drawn, "LeikirJafnt"),
        losses: count(&raw.lost, "LeikirTap"),
        goals_for: count(&raw.goals_scored, "MorkSkorud"),
        goals_against: count(&raw.goals_conceded, "MorkFenginASig"),
        points: raw.points.as_deref().and_then(parse_goals),
        team_id,
    })
}

/// Normalizes a tournament table, skipping the unusable rows.
pub fn normalize_standings(raw: &[SoapStanding], tournament: &Tournament) -> Vec<Standing> {
    raw.iter()
        .filter_map(|s| normalize_standing(s, tournament))
        .collect()
}
