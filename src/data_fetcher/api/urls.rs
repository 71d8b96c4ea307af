//! URL and request-body builders for the KSÍ services.

use crate::constants::SOAP_NAMESPACE;
use crate::data_fetcher::models::DiscoveryQuery;

const TOURNAMENT_LIST_PATH: &str = "/mot/leikir-og-mot/oll-mot/";
const MATCH_LIST_PATH: &str = "/mot/leikir-og-mot/leiksedill/";

/// SOAP action name that lists the matches of one tournament.
pub const MATCH_LIST_ACTION: &str = "MotLeikir";
/// SOAP action name that lists the tournaments of one age group.
pub const TOURNAMENT_LIST_ACTION: &str = "MotAflog";
/// SOAP action name that returns the league table of one tournament.
pub const STANDINGS_ACTION: &str = "MotStada";

/// Value of the `SOAPAction` header for `action`, quoted as SOAP 1.1 expects.
pub fn build_soap_action(action: &str) -> String {
    format!("\"{SOAP_NAMESPACE}{action}\"")
}

/// Wraps an action body in a SOAP 1.1 envelope.
pub fn build_soap_envelope(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
               xmlns:xsd="http://www.w3.org/2001/XMLSchema"
               xmlns:tns="{SOAP_NAMESPACE}">
    <soap:Body>
        {body}
    </soap:Body>
</soap:Envelope>"#
    )
}

fn build_single_argument_envelope(action: &str, argument: &str, value: u32) -> String {
    build_soap_envelope(&format!(
        "<tns:{action}><tns:{argument}>{value}</tns:{argument}></tns:{action}>"
    ))
}

/// Envelope for the `MotLeikir` call.
pub fn build_match_list_envelope(tournament_id: u32) -> String {
    build_single_argument_envelope(MATCH_LIST_ACTION, "MotNumer", tournament_id)
}

/// Envelope for the `MotAflog` call.
pub fn build_tournament_list_envelope(age_group_id: u32) -> String {
    build_single_argument_envelope(TOURNAMENT_LIST_ACTION, "FlokkurNumer", age_group_id)
}

/// Envelope for the `MotStada` call.
pub fn build_standings_envelope(tournament_id: u32) -> String {
    build_single_argument_envelope(STANDINGS_ACTION, "MotNumer", tournament_id)
}

/// Tournament listing page for one discovery query.
pub fn build_tournament_list_url(base_url: &str, query: &DiscoveryQuery) -> String {
    format!(
        "{}{TOURNAMENT_LIST_PATH}?filter=&flokkur={}&tegund={}&ar={}&kyn={}",
        base_url.trim_end_matches('/'),
        query.age_group_id,
        query.tournament_type,
        query.year,
        query.gender
    )
}

/// Match listing page of one tournament.
pub fn build_match_list_url(base_url: &str, tournament_id: u32) -> String {
    format!(
        "{}{MATCH_LIST_PATH}?motnumer={tournament_id}",
        base_url.trim_end_matches('/')
    )
}

/// Value of `param=` in an href, up to the next `&`.
pub fn extract_query_param<'a>(href: &'a str, param: &str) -> Option<&'a str> {
    let needle = format!("{param}=");
    let start = href.find(&needle)? + needle.len();
    let value = href[start..].split('&').next().unwrap_or_default();
    (!value.is_empty()).then_some(value)
}
