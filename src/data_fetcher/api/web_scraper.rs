//! Tournament discovery and fallback match retrieval from the ksi.is pages.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, instrument, warn};

use super::fetch_utils::fetch_text;
use super::urls::{build_match_list_url, build_tournament_list_url, extract_query_param};
use crate::data_fetcher::models::{DiscoveryQuery, RawMatch, RawTournament, ScrapedMatch};
use crate::data_fetcher::sources::{MatchSource, TournamentSource};
use crate::error::AppError;

static TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("table selector is valid"));
static HEADER_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("th selector is valid"));
static ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("tr selector is valid"));
static CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td, th").expect("cell selector is valid"));
static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("link selector is valid"));

/// Header keyword of the tournament listing table.
const TOURNAMENT_TABLE_MARKER: &str = "mót";
/// Header keyword of the match listing table.
const MATCH_TABLE_MARKER: &str = "leikur";
/// Match rows need link, date, home, score and away cells.
const MIN_MATCH_CELLS: usize = 5;

/// Scraper for the public ksi.is result pages.
#[derive(Debug, Clone)]
pub struct KsiWebScraper {
    client: Client,
    base_url: String,
}

impl KsiWebScraper {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page(&self, url: &str) -> Result<String, AppError> {
        fetch_text(self.client.get(url), url).await
    }
}

impl TournamentSource for KsiWebScraper {
    fn source_name(&self) -> &'static str {
        "html"
    }

    #[instrument(skip(self))]
    async fn discover_raw_tournaments(
        &self,
        query: DiscoveryQuery,
    ) -> Result<Vec<RawTournament>, AppError> {
        let url = build_tournament_list_url(&self.base_url, &query);
        info!("Fetching tournaments from: {}", url);

        let html = self.fetch_page(&url).await?;
        let tournaments = parse_tournament_table(&html);

        info!(
            "Found {} tournaments for age group {} in {}",
            tournaments.len(),
            query.age_group_id,
            query.year
        );
        Ok(tournaments)
    }
}

impl MatchSource for KsiWebScraper {
    fn source_name(&self) -> &'static str {
        "html"
    }

    #[instrument(skip(self))]
    async fn fetch_raw_matches(&self, tournament_id: u32) -> Result<Vec<RawMatch>, AppError> {
        let url = build_match_list_url(&self.base_url, tournament_id);
        info!("Fetching matches from: {}", url);

        let html = self.fetch_page(&url).await?;
        let matches = parse_match_table(&html);

        info!("Found {} matches in tournament {}", matches.len(), tournament_id);
        Ok(matches.into_iter().map(RawMatch::Scraped).collect())
    }
}

/// First table whose header cells mention `marker` (case-insensitive).
fn find_table<'a>(document: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    let tables: Vec<ElementRef<'a>> = document.select(&TABLE).collect();
    debug!("Found {} tables on the page", tables.len());

    tables.into_iter().find(|table| {
        table
            .select(&HEADER_CELL)
            .any(|th| cell_text(th).to_lowercase().contains(marker))
    })
}

fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

fn first_link(cell: ElementRef<'_>) -> Option<ElementRef<'_>> {
    cell.select(&LINK).next()
}

/// Data rows of `table`, header row skipped.
fn data_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = Vec<ElementRef<'a>>> {
    table
        .select(&ROW)
        .skip(1)
        .map(|row| row.select(&CELL).collect::<Vec<_>>())
}

/// Parses the tournament listing page. Rows without a link are skipped.
pub fn parse_tournament_table(html: &str) -> Vec<RawTournament> {
    let document = Html::parse_document(html);
    let Some(table) = find_table(&document, TOURNAMENT_TABLE_MARKER) else {
        warn!("Could not find tournament table in the page");
        return Vec::new();
    };

    data_rows(table)
        .filter_map(|cells| {
            let link = first_link(*cells.first()?)?;
            let url = link.value().attr("href").unwrap_or_default().to_string();
            let text_at = |i: usize| cells.get(i).map(|c| cell_text(*c)).and_then(non_empty);

            Some(RawTournament {
                tournament_id: extract_query_param(&url, "motnumer").map(str::to_string),
                name: cell_text(link),
                year: text_at(1),
                status: text_at(2),
                category: text_at(3),
                age_group: text_at(4),
                gender: text_at(5),
                url,
            })
        })
        .collect()
}

/// Parses a tournament's match page.
///
/// Cells are `[match link, date, home, score, away, venue]`. Rows with fewer
/// than five cells are skipped.
pub fn parse_match_table(html: &str) -> Vec<ScrapedMatch> {
    let document = Html::parse_document(html);
    let Some(table) = find_table(&document, MATCH_TABLE_MARKER) else {
        warn!("Could not find matches table in the page");
        return Vec::new();
    };

    data_rows(table)
        .filter_map(|cells| {
            if cells.len() < MIN_MATCH_CELLS {
                debug!("Skipping row with insufficient cells: {}", cells.len());
                return None;
            }

            let match_id = first_link(cells[0])
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| extract_query_param(href, "leikur"))
                .map(str::to_string);

            let (home_team_id, home_team_name) = team_cell(cells[2]);
            let (away_team_id, away_team_name) = team_cell(cells[4]);

            Some(ScrapedMatch {
                match_id,
                date_text: non_empty(cell_text(cells[1])),
                home_team_id,
                away_team_id,
                home_team_name,
                away_team_name,
                score_text: non_empty(cell_text(cells[3])),
                venue: cells.get(5).map(|c| cell_text(*c)).and_then(non_empty),
            })
        })
        .collect()
}

/// Team id from the `felag=` link and the display name, link text preferred.
fn team_cell(cell: ElementRef<'_>) -> (Option<String>, Option<String>) {
    match first_link(cell) {
        Some(link) => {
            let id = link
                .value()
                .attr("href")
                .and_then(|href| extract_query_param(href, "felag"))
                .map(str::to_string);
            (id, non_empty(cell_text(link)))
        }
        None => (None, non_empty(cell_text(cell))),
    }
}
