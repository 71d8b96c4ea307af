use crate::cli::Args;
use crossterm::{execute, terminal::SetTitle};
use ksi_stats::config::Config;
use ksi_stats::data_fetcher::api::{create_http_client_with_timeout, validate_year_range};
use ksi_stats::data_fetcher::cache::{CacheManager, FileStore};
use ksi_stats::data_fetcher::{
    KsiSoapClient, KsiWebScraper, MatchFetcher, MatchSource, StandingsSource, TournamentSource,
};
use ksi_stats::error::AppError;
use ksi_stats::report::{write_report, write_standings_report};
use std::io::stdout;
use tracing::info;

const TERMINAL_TITLE: &str = "KSÍ stats";

fn file_cache(config: &Config) -> CacheManager<FileStore> {
    CacheManager::new(
        FileStore::new(config.effective_cache_dir()),
        config.cache_ttl(),
    )
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    execute!(stdout(), SetTitle(TERMINAL_TITLE))?;
    Config::display().await
}

/// Handles --clear-cache by deleting every cached response.
pub async fn handle_clear_cache_command() -> Result<(), AppError> {
    let config = Config::load().await?;
    let cache = file_cache(&config);
    let removed = cache.clear().await?;
    info!("Cleared {} cache entries", removed);
    println!(
        "Removed {removed} cached entries from {}",
        config.effective_cache_dir()
    );
    Ok(())
}

/// Handles --clear-expired by deleting expired and unreadable cache files.
pub async fn handle_clear_expired_command() -> Result<(), AppError> {
    let config = Config::load().await?;
    let cache = file_cache(&config);
    let removed = cache.clear_expired().await?;
    let stats = cache.stats().await?;
    info!("Cleared {} expired cache entries", removed);
    println!(
        "Removed {removed} expired entries, {} still cached",
        stats.live_entries()
    );
    Ok(())
}

/// Fetches the requested seasons and prints the report for the chosen team.
///
/// Tournaments are discovered on the website unless `--soap-tournaments` is
/// given. Match lists come from the SOAP service unless `--html-matches` is
/// given. `--standings` reports from the SOAP tournament tables instead.
pub async fn handle_report_command(args: &Args) -> Result<(), AppError> {
    let (start_year, end_year) = args.year_range();
    validate_year_range(start_year, end_year)?;

    let config = Config::load().await?;
    let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
    let scraper = KsiWebScraper::new(client.clone(), config.web_base_url.clone());
    let soap = KsiSoapClient::new(client, config.soap_url.clone());
    let years = (start_year, end_year);

    execute!(stdout(), SetTitle(TERMINAL_TITLE))?;

    match (args.standings, args.html_matches, args.soap_tournaments) {
        (true, _, true) => run_standings_report(soap.clone(), soap, &config, args, years).await,
        (true, _, false) => run_standings_report(soap, scraper, &config, args, years).await,
        (false, true, true) => run_report(scraper, soap, &config, args, years).await,
        (false, true, false) => run_report(scraper.clone(), scraper, &config, args, years).await,
        (false, false, true) => run_report(soap.clone(), soap, &config, args, years).await,
        (false, false, false) => run_report(soap, scraper, &config, args, years).await,
    }
}

fn fetcher<M: MatchSource, D: TournamentSource>(
    match_source: M,
    tournament_source: D,
    config: &Config,
) -> MatchFetcher<M, D, FileStore> {
    info!(
        "Using {} match source and {} tournament source, caching in {}",
        match_source.source_name(),
        tournament_source.source_name(),
        config.effective_cache_dir()
    );
    MatchFetcher::new(match_source, tournament_source, file_cache(config))
        .with_request_delay(config.request_delay())
}

async fn run_report<M: MatchSource, D: TournamentSource>(
    match_source: M,
    tournament_source: D,
    config: &Config,
    args: &Args,
    (start_year, end_year): (i32, i32),
) -> Result<(), AppError> {
    let result = fetcher(match_source, tournament_source, config)
        .get_matches_for_years(args.age_group, start_year, end_year, args.tournament_type)
        .await?;

    let team_id = args.team.to_string();
    let mut out = stdout().lock();
    write_report(&mut out, &result, &team_id, start_year, end_year)
}

async fn run_standings_report<M, D>(
    match_source: M,
    tournament_source: D,
    config: &Config,
    args: &Args,
    (start_year, end_year): (i32, i32),
) -> Result<(), AppError>
where
    M: MatchSource + StandingsSource,
    D: TournamentSource,
{
    let standings = fetcher(match_source, tournament_source, config)
        .get_standings_for_years(args.age_group, start_year, end_year, args.tournament_type)
        .await?;

    let team_id = args.team.to_string();
    let mut out = stdout().lock();
    write_standings_report(&mut out, &standings, &team_id, start_year, end_year)
}
