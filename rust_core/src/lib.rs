//! CFB Analytics Core - betting and statistics analytics for college football data.
//!
//! This crate provides:
//! - Per-game outcome calculation (ATS, over/under, straight-up)
//! - Record aggregation, spread/total range breakdowns and scenario filtering
//! - Head-to-head, recent-trend and slate-wide betting analysis
//! - ELO and moneyline edge detection against market lines
//! - Game statistics, team performance splits and poll ranking analytics
//! - GraphQL response ingestion
//! - Optional Python bindings (`python` feature) with JSON in and JSON out
//!
//! All analyses are pure functions over borrowed game slices. The
//! [`Analyzer`] facade adds configuration and panic isolation, and renders
//! failures as `{"error": "<message>"}` through [`Analyzer::respond`].

pub mod analyzer;
pub mod betting;
pub mod config;
pub mod error;
pub mod game_stats;
pub mod ingest;
pub mod models;
pub mod rankings;
pub mod team_performance;
pub mod telemetry;
pub mod utils;

#[cfg(feature = "python")]
use pyo3::prelude::*;

use serde::Serialize;

pub use analyzer::Analyzer;
pub use config::AnalyticsConfig;
pub use error::{to_response, AnalysisError, AnalysisResult};
pub use models::{BettingLine, Game, RankingEntry, TeamInfo, TeamSide};

/// Parse `games_json`, run `f` and render the result as a JSON string.
fn with_games<T, F>(games_json: &str, f: F) -> String
where
    T: Serialize,
    F: FnOnce(&Analyzer, &[Game]) -> AnalysisResult<T>,
{
    let analyzer = Analyzer::default();
    let result = ingest::parse_games_str(games_json).and_then(|games| f(&analyzer, &games));
    Analyzer::respond(result).to_string()
}

/// Parse a rankings payload into weekly lists, oldest first.
fn ranking_history(history_json: &str) -> AnalysisResult<Vec<Vec<RankingEntry>>> {
    let value: serde_json::Value = serde_json::from_str(history_json)?;
    Ok(ingest::parse_rankings_by_week(&value)?
        .into_iter()
        .map(|week| week.entries)
        .collect())
}

// ============================================================================
// Betting
// ============================================================================

/// ATS, O/U and straight-up record for `team`.
#[cfg_attr(feature = "python", pyfunction)]
pub fn betting_record_json(games_json: &str, team: &str) -> String {
    with_games(games_json, |a, games| a.betting_record(games, team))
}

/// Betting record restricted to a scenario such as `road_underdog`.
#[cfg_attr(feature = "python", pyfunction)]
pub fn scenario_record_json(games_json: &str, team: &str, scenario: Option<&str>) -> String {
    with_games(games_json, |a, games| a.scenario_record(games, team, scenario))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn spread_ranges_json(games_json: &str, team: &str) -> String {
    with_games(games_json, |a, games| a.spread_ranges(games, team))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn over_under_ranges_json(games_json: &str) -> String {
    with_games(games_json, |a, games| a.over_under_ranges(games))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn head_to_head_json(games_json: &str, team1: &str, team2: &str) -> String {
    with_games(games_json, |a, games| a.head_to_head(games, team1, team2))
}

/// Recent-form trends; games must be ordered most recent first.
#[cfg_attr(feature = "python", pyfunction)]
pub fn trends_json(games_json: &str, team: &str, last_n: Option<usize>) -> String {
    with_games(games_json, |a, games| a.trends(games, team, last_n))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn game_edges_json(games_json: &str) -> String {
    with_games(games_json, |a, games| a.game_edges(games))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn game_log_json(games_json: &str, team: &str) -> String {
    with_games(games_json, |a, games| a.game_log(games, team))
}

/// Betting records for several teams, computed in parallel.
#[cfg_attr(feature = "python", pyfunction)]
pub fn batch_betting_records_json(games_json: &str, teams: Vec<String>) -> String {
    with_games(games_json, |a, games| {
        let records: std::collections::BTreeMap<String, serde_json::Value> = a
            .batch_betting_records(games, &teams)
            .into_iter()
            .map(|(team, record)| (team, Analyzer::respond(record)))
            .collect();
        Ok(records)
    })
}

// ============================================================================
// Game statistics and team performance
// ============================================================================

/// Slate overview: scoring, upsets, notable games, totals and betting trends.
#[cfg_attr(feature = "python", pyfunction)]
pub fn weekly_trends_json(games_json: &str) -> String {
    with_games(games_json, |a, games| a.weekly_game_trends(games))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn season_summary_json(games_json: &str, team: &str) -> String {
    with_games(games_json, |a, games| a.season_summary(games, team))
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn strength_of_schedule_json(games_json: &str, team: &str) -> String {
    with_games(games_json, |a, games| a.strength_of_schedule(games, team))
}

// ============================================================================
// Rankings
// ============================================================================

#[cfg_attr(feature = "python", pyfunction)]
pub fn ranking_movement_json(current_json: &str, previous_json: Option<&str>) -> String {
    let analyzer = Analyzer::default();
    let result = ingest::parse_rankings_str(current_json).and_then(|current| {
        let previous = previous_json.map(ingest::parse_rankings_str).transpose()?;
        analyzer.ranking_movement(&current, previous.as_deref())
    });
    Analyzer::respond(result).to_string()
}

/// Volatility over a multi-week poll payload.
#[cfg_attr(feature = "python", pyfunction)]
pub fn ranking_volatility_json(history_json: &str) -> String {
    let analyzer = Analyzer::default();
    let result = ranking_history(history_json).and_then(|h| analyzer.ranking_volatility(&h));
    Analyzer::respond(result).to_string()
}

/// Rising/falling teams over a multi-week poll payload.
#[cfg_attr(feature = "python", pyfunction)]
pub fn ranking_trends_json(history_json: &str) -> String {
    let analyzer = Analyzer::default();
    let result = ranking_history(history_json).and_then(|h| analyzer.ranking_trends(&h));
    Analyzer::respond(result).to_string()
}

#[cfg_attr(feature = "python", pyfunction)]
pub fn poll_consensus_json(rankings_json: &str) -> String {
    let analyzer = Analyzer::default();
    let result = ingest::parse_rankings_str(rankings_json).and_then(|r| analyzer.poll_consensus(&r));
    Analyzer::respond(result).to_string()
}

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn cfb_analytics_core(_py: Python, m: &PyModule) -> PyResult<()> {
    // ============================================================================
    // Betting
    // ============================================================================
    m.add_function(wrap_pyfunction!(betting_record_json, m)?)?;
    m.add_function(wrap_pyfunction!(scenario_record_json, m)?)?;
    m.add_function(wrap_pyfunction!(spread_ranges_json, m)?)?;
    m.add_function(wrap_pyfunction!(over_under_ranges_json, m)?)?;
    m.add_function(wrap_pyfunction!(head_to_head_json, m)?)?;
    m.add_function(wrap_pyfunction!(trends_json, m)?)?;
    m.add_function(wrap_pyfunction!(game_edges_json, m)?)?;
    m.add_function(wrap_pyfunction!(game_log_json, m)?)?;
    m.add_function(wrap_pyfunction!(batch_betting_records_json, m)?)?;

    // ============================================================================
    // Game statistics and team performance
    // ============================================================================
    m.add_function(wrap_pyfunction!(weekly_trends_json, m)?)?;
    m.add_function(wrap_pyfunction!(season_summary_json, m)?)?;
    m.add_function(wrap_pyfunction!(strength_of_schedule_json, m)?)?;

    // ============================================================================
    // Rankings
    // ============================================================================
    m.add_function(wrap_pyfunction!(ranking_movement_json, m)?)?;
    m.add_function(wrap_pyfunction!(ranking_volatility_json, m)?)?;
    m.add_function(wrap_pyfunction!(ranking_trends_json, m)?)?;
    m.add_function(wrap_pyfunction!(poll_consensus_json, m)?)?;

    Ok(())
}
