//! Full pipeline runs against in-memory sources.

use ksi_stats::data_fetcher::api::create_http_client_with_timeout;
use ksi_stats::data_fetcher::cache::{CacheManager, MemoryStore};
use ksi_stats::data_fetcher::{KsiSoapClient, MatchFetcher};
use ksi_stats::error::AppError;
use ksi_stats::report::{write_report, write_standings_report};
use ksi_stats::stats::{AggregateStats, TeamSummary, filter_team_matches, outcome_stats};
use ksi_stats::testing_utils::{FakeMatchSource, FakeTournamentSource, TestDataBuilder};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

type Fetcher = MatchFetcher<FakeMatchSource, FakeTournamentSource, MemoryStore>;

fn fetcher(matches: FakeMatchSource, tournaments: FakeTournamentSource) -> Fetcher {
    let cache = CacheManager::new(MemoryStore::new(), Duration::from_secs(86_400));
    MatchFetcher::new(matches, tournaments, cache).with_request_delay(Duration::ZERO)
}

/// One 2024 tournament with a played and an unplayed match, nothing in 2023.
fn season_fixture() -> Fetcher {
    let tournaments = FakeTournamentSource::new().with_tournaments(
        2024,
        vec![TestDataBuilder::create_raw_tournament(
            100,
            "Íslandsmót 5. flokkur",
            2024,
        )],
    );
    let matches = FakeMatchSource::new().with_matches(
        100,
        vec![
            TestDataBuilder::create_soap_match("1", "170", "103", Some((3, 1))),
            TestDataBuilder::create_soap_match("2", "200", "170", None),
        ],
    );
    fetcher(matches, tournaments)
}

#[tokio::test]
async fn test_two_season_run() {
    let fetcher = season_fixture();
    let result = fetcher
        .get_matches_for_years(420, 2023, 2024, 61)
        .await
        .unwrap();

    assert_eq!(result.total_matches, 2);
    assert_eq!(result.all_matches.len(), 2);
    assert_eq!(result.matches_by_year.len(), 2);
    assert_eq!(result.matches_by_year[&2024].len(), 2);
    assert!(result.matches_by_year[&2023].is_empty());
    assert_eq!(result.tournaments_by_year.len(), 1);
    assert_eq!(result.tournaments_by_year[&2024][0].tournament_id, 100);

    let first = &result.matches_by_year[&2024][0];
    assert_eq!(first.tournament_id, 100);
    assert_eq!(first.tournament_name, "Íslandsmót 5. flokkur");
    assert_eq!(first.scores(), Some((3, 1)));
    assert!(!result.matches_by_year[&2024][1].is_played());

    let AggregateStats::Computed(stats) = outcome_stats(&result.all_matches, "170") else {
        panic!("expected computed stats");
    };
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.not_played, 1);
    assert_eq!(stats.win_pct, 100.0);

    let years: Vec<i32> = fetcher
        .tournament_source()
        .queries()
        .iter()
        .map(|q| q.year)
        .collect();
    assert_eq!(years, vec![2024, 2023]);
    assert!(
        fetcher
            .tournament_source()
            .queries()
            .iter()
            .all(|q| q.age_group_id == 420 && q.tournament_type == 61)
    );
}

#[tokio::test]
async fn test_team_view_of_run() {
    let result = season_fixture()
        .get_matches_for_years(420, 2023, 2024, 61)
        .await
        .unwrap();

    let team_matches = filter_team_matches(&result.all_matches, "103");
    assert_eq!(team_matches.len(), 1);

    let summary = TeamSummary::from_aggregation(&result, "170", 2023, 2024);
    assert_eq!(summary.team_name, "Team 170");
    assert_eq!(summary.total_matches, 1);
    assert_eq!(summary.total_wins, 1);
    assert_eq!(summary.yearly.len(), 1);
    assert_eq!(summary.yearly[0].year, 2024);
}

#[tokio::test]
async fn test_repeat_run_is_served_from_cache() {
    let fetcher = season_fixture();
    let first = fetcher
        .get_matches_for_years(420, 2023, 2024, 61)
        .await
        .unwrap();
    let second = fetcher
        .get_matches_for_years(420, 2023, 2024, 61)
        .await
        .unwrap();

    assert_eq!(first, second);
    // 2023 was empty so it is never cached and is asked again.
    assert_eq!(fetcher.tournament_source().call_count(), 3);
    assert_eq!(fetcher.match_source().call_count(), 1);

    fetcher
        .get_matches_for_years(420, 2022, 2022, 61)
        .await
        .unwrap();
    assert_eq!(fetcher.tournament_source().call_count(), 4);
}

#[tokio::test]
async fn test_failing_sources_degrade_to_empty() {
    let tournaments = FakeTournamentSource::new()
        .with_tournaments(
            2024,
            vec![
                TestDataBuilder::create_raw_tournament(100, "A", 2024),
                TestDataBuilder::create_raw_tournament(101, "B", 2024),
            ],
        )
        .failing_for_year(2023);
    let matches = FakeMatchSource::new()
        .with_matches(
            101,
            vec![TestDataBuilder::create_soap_match("9", "170", "103", Some((0, 2)))],
        )
        .failing_for(100);
    let fetcher = fetcher(matches, tournaments);

    let result = fetcher
        .get_matches_for_years(420, 2023, 2024, 61)
        .await
        .unwrap();

    assert_eq!(result.total_matches, 1);
    assert!(result.matches_by_year[&2023].is_empty());
    assert_eq!(fetcher.match_source().requested(), vec![100, 101]);
}

#[tokio::test]
async fn test_reversed_range_is_rejected_before_fetching() {
    let fetcher = season_fixture();
    let err = fetcher
        .get_matches_for_years(420, 2025, 2024, 61)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidQuery(_)));
    assert!(err.is_usage_error());
    assert_eq!(fetcher.tournament_source().call_count(), 0);
}

#[tokio::test]
async fn test_report_for_pipeline_result() {
    let result = season_fixture()
        .get_matches_for_years(420, 2023, 2024, 61)
        .await
        .unwrap();

    let mut buffer = Vec::new();
    write_report(&mut buffer, &result, "170", 2023, 2024).unwrap();
    let report = String::from_utf8(buffer).unwrap();

    assert!(report.contains("Total matches found: 2"));
    assert!(report.contains("Matches involving Team 170: 2"));
    assert!(report.contains("  2024-05-12: Team 170 vs Team 103 (3-1)"));
    assert!(report.contains("  2024-05-12: Team 200 vs Team 170 (Not played)"));
    assert!(report.contains("  Outcome: (W: 100.0% / D: 0.0% / L: 0.0%)"));
}

const MOT_AFLOG: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <MotAflogResponse xmlns="http://www2.ksi.is/vefthjonustur/mot/">
      <MotAflogSvar>
        <ArrayMotAflog>
          <MotAflog><MotNumer>47844</MotNumer><MotNafn>Íslandsmót 5. fl. karla A</MotNafn><MotAr>2024</MotAr></MotAflog>
          <MotAflog><MotNumer>47845</MotNumer><MotNafn>Íslandsmót 5. fl. karla B</MotNafn><MotAr>2024</MotAr></MotAflog>
        </ArrayMotAflog>
      </MotAflogSvar>
    </MotAflogResponse>
  </soap:Body>
</soap:Envelope>"#;

fn mot_stada(rows: &[(&str, &str, u32, u32, u32, u32, u32)]) -> String {
    let rows: String = rows
        .iter()
        .map(|(id, name, w, d, l, gf, ga)| {
            format!(
                "<MotStada><FelagNumer>{id}</FelagNumer><FelagNafn>{name}</FelagNafn>\
                 <LeikirAlls>{}</LeikirAlls><LeikirUnnir>{w}</LeikirUnnir>\
                 <LeikirJafnt>{d}</LeikirJafnt><LeikirTap>{l}</LeikirTap>\
                 <MorkSkorud>{gf}</MorkSkorud><MorkFenginASig>{ga}</MorkFenginASig>\
                 <Stig>{}</Stig></MotStada>",
                w + d + l,
                w * 3 + d
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body><MotStadaResponse><MotStadaSvar><ArrayMotStada>{rows}</ArrayMotStada></MotStadaSvar></MotStadaResponse></soap:Body>
</soap:Envelope>"#
    )
}

#[tokio::test]
async fn test_standings_run_over_soap() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("<tns:MotAflog>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOT_AFLOG))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("<tns:MotNumer>47844</tns:MotNumer>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(mot_stada(&[
            ("170", "Grótta", 6, 2, 2, 31, 14),
            ("103", "KR", 5, 1, 4, 20, 18),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("<tns:MotNumer>47845</tns:MotNumer>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(mot_stada(&[(
            "170", "Grótta", 1, 0, 3, 4, 9,
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let soap = KsiSoapClient::new(create_http_client_with_timeout(5).unwrap(), server.uri());
    let cache = CacheManager::new(MemoryStore::new(), Duration::from_secs(86_400));
    let fetcher =
        MatchFetcher::new(soap.clone(), soap, cache).with_request_delay(Duration::ZERO);

    let standings = fetcher
        .get_standings_for_years(420, 2024, 2024, 61)
        .await
        .unwrap();
    assert_eq!(standings[&2024].len(), 3);

    // Second run is served from the cache, the mocks expect one call each
    let again = fetcher
        .get_standings_for_years(420, 2024, 2024, 61)
        .await
        .unwrap();
    assert_eq!(standings, again);

    let summary = TeamSummary::from_standings(&standings, "170", 2024, 2024);
    assert_eq!(summary.team_name, "Grótta");
    assert_eq!(summary.total_matches, 14);
    assert_eq!(summary.total_wins, 7);
    assert_eq!(summary.total_goals_for, 35);
    assert_eq!(summary.total_goals_against, 23);

    let mut buffer = Vec::new();
    write_standings_report(&mut buffer, &standings, "170", 2024, 2024).unwrap();
    let report = String::from_utf8(buffer).unwrap();
    assert!(report.contains("  Íslandsmót 5. fl. karla A: 10 played, 6W 2D 2L, goals 31-14, 20 pts"));
    assert!(report.contains("  Íslandsmót 5. fl. karla B: 4 played, 1W 0D 3L, goals 4-9, 3 pts"));
}
