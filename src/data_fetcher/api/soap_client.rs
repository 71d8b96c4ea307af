//! Retrieval over the KSÍ SOAP web service (`mot.asmx`).
//!
//! Matches come from `MotLeikir`, tournaments of an age group from
//! `MotAflog` and league tables from `MotStada`.

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, instrument, warn};

use super::fetch_utils::fetch_text;
use super::soap_xml::{Fields, collect_records, fault_message};
use super::urls::{
    MATCH_LIST_ACTION, STANDINGS_ACTION, TOURNAMENT_LIST_ACTION, build_match_list_envelope,
    build_soap_action, build_standings_envelope, build_tournament_list_envelope,
};
use crate::data_fetcher::models::{
    DiscoveryQuery, RawMatch, RawTournament, SoapMatch, SoapStanding, SoapTournament,
};
use crate::data_fetcher::sources::{MatchSource, StandingsSource, TournamentSource};
use crate::error::AppError;

/// Client for the authoritative match source.
#[derive(Debug, Clone)]
pub struct KsiSoapClient {
    client: Client,
    soap_url: String,
}

impl KsiSoapClient {
    pub fn new(client: Client, soap_url: impl Into<String>) -> Self {
        Self {
            client,
            soap_url: soap_url.into(),
        }
    }

    pub fn soap_url(&self) -> &str {
        &self.soap_url
    }

    /// Calls one SOAP action and returns the raw XML response.
    #[instrument(skip(self, envelope))]
    async fn call(&self, action: &str, envelope: String) -> Result<String, AppError> {
        let request = self
            .client
            .post(&self.soap_url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", build_soap_action(action))
            .body(envelope);

        fetch_text(request, &self.soap_url).await
    }
}

impl MatchSource for KsiSoapClient {
    fn source_name(&self) -> &'static str {
        "soap"
    }

    #[instrument(skip(self))]
    async fn fetch_raw_matches(&self, tournament_id: u32) -> Result<Vec<RawMatch>, AppError> {
        info!("Fetching matches for tournament {} over SOAP", tournament_id);

        let xml = self
            .call(MATCH_LIST_ACTION, build_match_list_envelope(tournament_id))
            .await?;
        let matches = parse_match_list_response(&xml, &self.soap_url)?;

        info!(
            "SOAP returned {} matches for tournament {}",
            matches.len(),
            tournament_id
        );
        Ok(matches.into_iter().map(RawMatch::Soap).collect())
    }
}

/// `MotAflog` only takes the age group. Rows that name another season
/// than the queried one are left out, rows without a season are kept.
impl TournamentSource for KsiSoapClient {
    fn source_name(&self) -> &'static str {
        "soap"
    }

    #[instrument(skip(self))]
    async fn discover_raw_tournaments(
        &self,
        query: DiscoveryQuery,
    ) -> Result<Vec<RawTournament>, AppError> {
        let xml = self
            .call(
                TOURNAMENT_LIST_ACTION,
                build_tournament_list_envelope(query.age_group_id),
            )
            .await?;
        let listed = parse_tournament_list_response(&xml, &self.soap_url)?;
        let total = listed.len();

        let tournaments: Vec<RawTournament> = listed
            .into_iter()
            .filter(|t| listed_for_year(t, query.year))
            .map(|t| RawTournament {
                tournament_id: t.tournament_number,
                name: t.name.unwrap_or_default(),
                url: self.soap_url.clone(),
                year: t.year,
                ..RawTournament::default()
            })
            .collect();

        info!(
            "SOAP listed {} tournaments for age group {}, {} in {}",
            total,
            query.age_group_id,
            tournaments.len(),
            query.year
        );
        Ok(tournaments)
    }
}

impl StandingsSource for KsiSoapClient {
    #[instrument(skip(self))]
    async fn fetch_raw_standings(&self, tournament_id: u32) -> Result<Vec<SoapStanding>, AppError> {
        info!("Fetching standings for tournament {} over SOAP", tournament_id);

        let xml = self
            .call(STANDINGS_ACTION, build_standings_envelope(tournament_id))
            .await?;
        let standings = parse_standings_response(&xml, &self.soap_url)?;

        debug!(
            "SOAP returned {} table rows for tournament {}",
            standings.len(),
            tournament_id
        );
        Ok(standings)
    }
}

fn listed_for_year(tournament: &SoapTournament, year: i32) -> bool {
    tournament
        .year
        .as_deref()
        .and_then(|y| y.trim().parse::<i32>().ok())
        .is_none_or(|listed| listed == year)
}

/// Items of one response array, each built from its leaf fields.
///
/// A response without the array element is an empty result, a SOAP fault
/// is an error.
fn parse_array_response<T>(
    xml: &str,
    url: &str,
    array: &str,
    item: &str,
    from_fields: fn(&Fields) -> Result<T, serde_json::Error>,
) -> Result<Vec<T>, AppError> {
    if let Some(message) = fault_message(xml) {
        warn!("SOAP fault from {}: {}", url, message);
        return Err(AppError::api_unexpected_structure(message, url));
    }

    let Some(records) = collect_records(xml, array, item) else {
        debug!("No {} element in response from {}", array, url);
        return Ok(Vec::new());
    };

    records
        .iter()
        .map(|fields| {
            from_fields(fields).map_err(|e| AppError::api_unexpected_structure(e.to_string(), url))
        })
        .collect()
}

/// Extracts every `MotLeikur` from a `MotLeikir` response.
pub fn parse_match_list_response(xml: &str, url: &str) -> Result<Vec<SoapMatch>, AppError> {
    parse_array_response(xml, url, "ArrayMotLeikir", "MotLeikur", SoapMatch::from_fields)
}

/// Extracts every `MotAflog` from a `MotAflog` response.
pub fn parse_tournament_list_response(
    xml: &str,
    url: &str,
) -> Result<Vec<SoapTournament>, AppError> {
    parse_array_response(xml, url, "ArrayMotAflog", "MotAflog", SoapTournament::from_fields)
}

/// Extracts every `MotStada` from a `MotStada` response.
pub fn parse_standings_response(xml: &str, url: &str) -> Result<Vec<SoapStanding>, AppError> {
    parse_array_response(xml, url, "ArrayMotStada", "MotStada", SoapStanding::from_fields)
}
