//! Source-specific shapes, exactly as the adapters hand them over.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Builds a SOAP row from leaf element names and their text. Unknown names are ignored.
fn from_soap_fields<T: DeserializeOwned>(
    fields: &HashMap<String, String>,
) -> Result<T, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(fields)?)
}

/// One `MotLeikur` element from the SOAP `MotLeikir` action.
/// Every field is the raw element text; absent or nil elements are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapMatch {
    #[serde(rename = "LeikurNumer", default)]
    pub match_number: Option<String>,
    #[serde(rename = "LeikDagur", default)]
    pub match_date: Option<String>,
    #[serde(rename = "FelagHeimaNumer", default)]
    pub home_club_id: Option<String>,
    #[serde(rename = "FelagUtiNumer", default)]
    pub away_club_id: Option<String>,
    #[serde(rename = "FelagHeimaNafn", default)]
    pub home_club_name: Option<String>,
    #[serde(rename = "FelagUtiNafn", default)]
    pub away_club_name: Option<String>,
    #[serde(rename = "UrslitHeima", default)]
    pub home_result: Option<String>,
    #[serde(rename = "UrslitUti", default)]
    pub away_result: Option<String>,
    #[serde(rename = "VollurNafn", default)]
    pub venue_name: Option<String>,
}

impl SoapMatch {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, serde_json::Error> {
        from_soap_fields(fields)
    }
}

/// One `MotAflog` element: a tournament listed for an age group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapTournament {
    #[serde(rename = "MotNumer", default)]
    pub tournament_number: Option<String>,
    #[serde(rename = "MotNafn", default)]
    pub name: Option<String>,
    #[serde(rename = "MotAr", default)]
    pub year: Option<String>,
}

impl SoapTournament {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, serde_json::Error> {
        from_soap_fields(fields)
    }
}

/// One `MotStada` element: a team's line in a tournament table.
/// Counts are left as element text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoapStanding {
    #[serde(rename = "FelagNumer", default)]
    pub club_id: Option<String>,
    #[serde(rename = "FelagNafn", default)]
    pub club_name: Option<String>,
    #[serde(rename = "LeikirAlls", default)]
    pub played: Option<String>,
    #[serde(rename = "LeikirUnnir", default)]
    pub won: Option<String>,
    #[serde(rename = "LeikirJafnt", default)]
    pub drawn: Option<String>,
    #[serde(rename = "LeikirTap", default)]
    pub lost: Option<String>,
    #[serde(rename = "MorkSkorud", default)]
    pub goals_scored: Option<String>,
    #[serde(rename = "MorkFenginASig", default)]
    pub goals_conceded: Option<String>,
    #[serde(rename = "Stig", default)]
    pub points: Option<String>,
}

impl SoapStanding {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, serde_json::Error> {
        from_soap_fields(fields)
    }
}

/// One row of the HTML match table. Date and score are left as page text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedMatch {
    pub match_id: Option<String>,
    pub date_text: Option<String>,
    pub home_team_id: Option<String>,
    pub away_team_id: Option<String>,
    pub home_team_name: Option<String>,
    pub away_team_name: Option<String>,
    pub score_text: Option<String>,
    pub venue: Option<String>,
}

/// A raw match from either source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawMatch {
    Soap(SoapMatch),
    Scraped(ScrapedMatch),
}

/// One row of the HTML tournament listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTournament {
    pub tournament_id: Option<String>,
    pub name: String,
    pub url: String,
    pub year: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub age_group: Option<String>,
    pub gender: Option<String>,
}
