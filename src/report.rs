//! Plain-text reports for one team, from matches or from tournament tables.
//!
//! Line formatting is done by pure functions; [`write_report`] and
//! [`write_standings_report`] only add terminal styling to headings and
//! write everything to the given sink.

use crossterm::style::{Attribute, Color, Stylize, style};
use std::collections::BTreeMap;
use std::io::Write;

use crate::data_fetcher::models::{AggregationResult, MatchRecord, Standing};
use crate::error::AppError;
use crate::stats::{
    AggregateStats, TeamSeasonStats, TeamSummary, fairness_stats, filter_team_matches,
    group_by_tournament, outcome_stats, team_display_name,
};

const RULE: &str = "────────────────────────────────────────";

/// `  2024-05-12: Grótta vs KR (3-1)`
pub fn format_match_line(record: &MatchRecord) -> String {
    let home = record.home_team_name.as_deref().unwrap_or("Unknown");
    let away = record.away_team_name.as_deref().unwrap_or("Unknown");
    format!(
        "  {}: {} vs {} ({})",
        record.display_date(),
        home,
        away,
        record.display_score()
    )
}

pub fn format_outcome_line(stats: &AggregateStats<crate::stats::OutcomeStats>) -> String {
    format!("  Outcome: {stats}")
}

pub fn format_fairness_line(stats: &AggregateStats<crate::stats::FairnessStats>) -> String {
    format!("  Fairness: {stats}")
}

fn percent(ratio: f64) -> f64 {
    ratio * 100.0
}

pub fn format_season_line(season: &TeamSeasonStats) -> String {
    format!(
        "  {}: {} played, {}W {}D {}L, goals {}-{} ({:+}), win rate {:.1}%",
        season.year,
        season.matches_played,
        season.wins,
        season.draws,
        season.losses,
        season.goals_for,
        season.goals_against,
        season.goal_difference(),
        percent(season.win_ratio())
    )
}

/// `  Íslandsmót 5. fl. karla A: 10 played, 6W 2D 2L, goals 31-14, 20 pts`
pub fn format_standing_line(standing: &Standing) -> String {
    let points = standing
        .points
        .map(|p| format!(", {p} pts"))
        .unwrap_or_default();
    format!(
        "  {}: {} played, {}W {}D {}L, goals {}-{}{}",
        standing.tournament_name,
        standing.played,
        standing.wins,
        standing.draws,
        standing.losses,
        standing.goals_for,
        standing.goals_against,
        points
    )
}

/// Summary lines without the heading.
pub fn format_summary_lines(summary: &TeamSummary) -> Vec<String> {
    if summary.total_matches == 0 {
        return vec!["  No matches played in this period".to_string()];
    }

    let mut lines = vec![
        format!("  Matches played: {}", summary.total_matches),
        format!(
            "  Record: {}W {}D {}L",
            summary.total_wins, summary.total_draws, summary.total_losses
        ),
        format!(
            "  Goals: {}-{}",
            summary.total_goals_for, summary.total_goals_against
        ),
        format!(
            "  (W: {:.1}% / D: {:.1}% / L: {:.1}%)",
            percent(summary.overall_win_ratio()),
            percent(summary.overall_draw_ratio()),
            percent(summary.overall_loss_ratio())
        ),
    ];
    lines.extend(summary.yearly.iter().map(format_season_line));
    lines
}

fn heading(out: &mut impl Write, text: &str, color: Color) -> Result<(), AppError> {
    writeln!(out, "{}", style(text).with(color).attribute(Attribute::Bold))?;
    Ok(())
}

/// Writes the full report for `team_id` over `start_year..=end_year`.
pub fn write_report<W: Write>(
    out: &mut W,
    result: &AggregationResult,
    team_id: &str,
    start_year: i32,
    end_year: i32,
) -> Result<(), AppError> {
    let team_name = team_display_name(&result.all_matches, team_id);

    writeln!(out, "Total matches found: {}", result.total_matches)?;

    for (year, matches) in result.years_descending() {
        let team_matches = filter_team_matches(matches, team_id);

        writeln!(out)?;
        heading(out, &format!("=== {year} ==="), Color::Cyan)?;
        writeln!(out, "Total matches: {}", matches.len())?;
        writeln!(out, "Matches involving {team_name}: {}", team_matches.len())?;

        for group in group_by_tournament(&team_matches) {
            writeln!(out)?;
            heading(out, &group.tournament_name, Color::Yellow)?;
            for record in group.sorted_by_date() {
                writeln!(out, "{}", format_match_line(record))?;
            }
            writeln!(
                out,
                "{}",
                format_outcome_line(&outcome_stats(&group.matches, team_id))
            )?;
            writeln!(
                out,
                "{}",
                format_fairness_line(&fairness_stats(&group.matches))
            )?;
        }
    }

    let summary = TeamSummary::from_aggregation(result, team_id, start_year, end_year);
    write_summary(out, &summary, start_year, end_year)
}

fn write_summary<W: Write>(
    out: &mut W,
    summary: &TeamSummary,
    start_year: i32,
    end_year: i32,
) -> Result<(), AppError> {
    writeln!(out)?;
    writeln!(out, "{RULE}")?;
    heading(
        out,
        &format!("{} {start_year}-{end_year}", summary.team_name),
        Color::Green,
    )?;
    for line in format_summary_lines(summary) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `team_id`'s tournament table lines per season, then the summary
/// built from those tables.
pub fn write_standings_report<W: Write>(
    out: &mut W,
    standings_by_year: &BTreeMap<i32, Vec<Standing>>,
    team_id: &str,
    start_year: i32,
    end_year: i32,
) -> Result<(), AppError> {
    let total: usize = standings_by_year.values().map(Vec::len).sum();
    writeln!(out, "Total table rows found: {total}")?;

    for (year, rows) in standings_by_year.iter().rev() {
        writeln!(out)?;
        heading(out, &format!("=== {year} ==="), Color::Cyan)?;
        let team_rows: Vec<&Standing> = rows.iter().filter(|s| s.is_team(team_id)).collect();
        if team_rows.is_empty() {
            writeln!(out, "  Not in any table")?;
        }
        for standing in team_rows {
            writeln!(out, "{}", format_standing_line(standing))?;
        }
    }

    let summary = TeamSummary::from_standings(standings_by_year, team_id, start_year, end_year);
    write_summary(out, &summary, start_year, end_year)
}
