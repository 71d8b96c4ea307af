use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One fixture in source-independent form.
///
/// Identifiers are kept as the upstream text. Anything comparing them goes
/// through [`ids_equal`] so numeric and string ids from different sources
/// line up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    /// `None` together with `away_score` when the match has not been played.
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub venue: Option<String>,
    pub tournament_id: u32,
    pub tournament_name: String,
}

impl MatchRecord {
    /// True iff both scores are present. Always derived, never stored.
    pub fn is_played(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    /// Both scores as `(home, away)` when the match has been played.
    pub fn scores(&self) -> Option<(u32, u32)> {
        match (self.home_score, self.away_score) {
            (Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }

    /// Whether `team_id` is the home side (string comparison).
    pub fn is_home_team(&self, team_id: &str) -> bool {
        ids_equal(self.home_team_id.as_deref(), team_id)
    }

    /// Whether `team_id` is the away side (string comparison).
    pub fn is_away_team(&self, team_id: &str) -> bool {
        ids_equal(self.away_team_id.as_deref(), team_id)
    }

    pub fn involves_team(&self, team_id: &str) -> bool {
        self.is_home_team(team_id) || self.is_away_team(team_id)
    }

    /// Date part for display, `"Unknown date"` when missing.
    pub fn display_date(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown date".to_string())
    }

    /// Score for display, `"Not played"` when missing.
    pub fn display_score(&self) -> String {
        match self.scores() {
            Some((home, away)) => format!("{home}-{away}"),
            None => "Not played".to_string(),
        }
    }
}

/// Compares an upstream identifier with a caller-supplied one as strings.
///
/// Sources disagree on whether ids are numbers or text, so both sides are
/// trimmed and compared textually. A missing id never matches.
pub fn ids_equal(upstream: Option<&str>, other: &str) -> bool {
    match upstream {
        Some(id) => id.trim() == other.trim(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(home: Option<u32>, away: Option<u32>) -> MatchRecord {
        MatchRecord {
            match_id: Some("555".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 5, 12).and_then(|d| d.and_hms_opt(17, 0, 0)),
            home_team_id: Some("170".to_string()),
            away_team_id: Some("103".to_string()),
            home_team_name: Some("Grótta".to_string()),
            away_team_name: Some("KR".to_string()),
            home_score: home,
            away_score: away,
            venue: Some("Vivaldivöllurinn".to_string()),
            tournament_id: 47844,
            tournament_name: "Íslandsmót 5. flokkur karla A".to_string(),
        }
    }

    #[test]
    fn test_is_played_requires_both_scores() {
        assert!(record(Some(3), Some(1)).is_played());
        assert!(record(Some(0), Some(0)).is_played());
        assert!(!record(None, None).is_played());
        assert!(!record(Some(2), None).is_played());
        assert!(!record(None, Some(2)).is_played());
    }

    #[test]
    fn test_team_sides_compare_as_strings() {
        let m = record(Some(1), Some(1));
        assert!(m.is_home_team("170"));
        assert!(m.is_home_team(&170.to_string()));
        assert!(m.is_away_team(" 103 "));
        assert!(!m.involves_team("999"));
    }

    #[test]
    fn test_missing_id_never_matches() {
        assert!(!ids_equal(None, ""));
        assert!(!ids_equal(None, "170"));
    }

    #[test]
    fn test_display_helpers() {
        let played = record(Some(3), Some(1));
        assert_eq!(played.display_date(), "2024-05-12");
        assert_eq!(played.display_score(), "3-1");

        let mut unplayed = record(None, None);
        unplayed.date = None;
        assert_eq!(unplayed.display_date(), "Unknown date");
        assert_eq!(unplayed.display_score(), "Not played");
    }

    #[test]
    fn test_serde_uses_iso_dates() {
        let json = serde_json::to_string(&record(Some(3), Some(1))).unwrap();
        assert!(json.contains("\"date\":\"2024-05-12T17:00:00\""));
        let back: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record(Some(3), Some(1)));
    }
}
