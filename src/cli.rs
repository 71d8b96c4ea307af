use chrono::{Datelike, Local};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use ksi_stats::constants::{age_group, team, tournament_type};

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// KSÍ youth football match history
///
/// Fetches every tournament of an age group for a range of seasons from the
/// Football Association of Iceland, then prints each season's matches for one
/// team with win/draw/loss and goal difference statistics.
///
/// Responses are cached on disk, so repeated runs over the same seasons do not
/// hit KSÍ again until the cache expires.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(styles = get_styles())]
pub struct Args {
    /// First season to fetch. Defaults to the current year.
    #[arg(value_name = "START_YEAR")]
    pub start_year: Option<i32>,

    /// Last season to fetch. Defaults to the current year.
    #[arg(value_name = "END_YEAR")]
    pub end_year: Option<i32>,

    /// KSÍ age group id (420 is 5. flokkur).
    #[arg(long = "age-group", short = 'a', default_value_t = age_group::FIFTH_FLOKKUR, help_heading = "Query")]
    pub age_group: u32,

    /// KSÍ club id of the team to report on (170 is Grótta).
    #[arg(long = "team", short = 't', default_value_t = team::GROTTA, help_heading = "Query")]
    pub team: u32,

    /// KSÍ tournament type id (61 is Íslandsmót).
    #[arg(long = "tournament-type", default_value_t = tournament_type::ISLANDSMOT, help_heading = "Query")]
    pub tournament_type: u32,

    /// Read match lists from the ksi.is website instead of the SOAP service.
    #[arg(long = "html-matches", help_heading = "Query")]
    pub html_matches: bool,

    /// Discover tournaments over the SOAP service instead of the ksi.is website.
    #[arg(long = "soap-tournaments", help_heading = "Query")]
    pub soap_tournaments: bool,

    /// Report from the tournament tables instead of individual matches.
    #[arg(long = "standings", conflicts_with = "html_matches", help_heading = "Query")]
    pub standings: bool,

    /// Remove every cached response and exit.
    #[arg(long = "clear-cache", help_heading = "Cache")]
    pub clear_cache: bool,

    /// Remove expired cached responses and exit.
    #[arg(long = "clear-expired", help_heading = "Cache")]
    pub clear_expired: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Also print log lines to the terminal.
    #[arg(long = "debug", help_heading = "Debug")]
    pub debug: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Debug")]
    pub log_file: Option<String>,
}

impl Args {
    /// Season range to query. Missing years default to the current one.
    pub fn year_range(&self) -> (i32, i32) {
        let current = Local::now().year();
        (
            self.start_year.unwrap_or(current),
            self.end_year.unwrap_or(current),
        )
    }
}
