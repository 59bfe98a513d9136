//! Recent-form betting trends for a team, and slate-wide betting trends.

use serde::Serialize;
use std::collections::BTreeMap;

use super::outcomes::{ats_result, went_over, AtsResult};
use super::record::{aggregate, BettingRecord};
use super::scenario::{effective_spread, filter_by_scenario, Scenario};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Game, TeamSide};
use crate::utils::stats::{mean, percentage, round_to};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeAwaySplit {
    pub home_games: usize,
    pub home_record: BettingRecord,
    pub away_games: usize,
    pub away_record: BettingRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioTrend {
    pub games: usize,
    #[serde(flatten)]
    pub record: BettingRecord,
    /// Mean effective spread, 1 decimal
    pub avg_spread: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    /// `"Last N games"`
    pub analysis_period: String,
    pub overall_trends: BettingRecord,
    pub home_vs_away: HomeAwaySplit,
    /// Only scenarios with at least one game
    pub scenario_performance: BTreeMap<Scenario, ScenarioTrend>,
}

/// Trends over the first `last_n` games. Input must be ordered most recent first.
pub fn trends(games: &[Game], team: &str, last_n: usize) -> AnalysisResult<TrendReport> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("trend analysis"));
    }
    if last_n == 0 {
        return Err(AnalysisError::InvalidInput(
            "last_n must be at least 1".to_string(),
        ));
    }

    let window = &games[..last_n.min(games.len())];

    // Home/away split needs scores and at least one line
    let (home, away): (Vec<&Game>, Vec<&Game>) = window
        .iter()
        .filter(|g| g.has_scores() && !g.lines.is_empty())
        .partition(|g| g.side_of(team) == TeamSide::Home);

    let mut scenario_performance = BTreeMap::new();
    for scenario in Scenario::ALL {
        let matched = filter_by_scenario(window, team, Some(scenario));
        if matched.is_empty() {
            continue;
        }
        let spreads: Vec<f64> = matched
            .iter()
            .filter_map(|g| effective_spread(g, team).map(|(_, eff)| eff))
            .collect();
        scenario_performance.insert(
            scenario,
            ScenarioTrend {
                games: matched.len(),
                record: aggregate(matched.iter().copied(), team),
                avg_spread: mean(&spreads).map_or(0.0, |m| round_to(m, 1)),
            },
        );
    }

    Ok(TrendReport {
        analysis_period: format!("Last {} games", window.len()),
        overall_trends: aggregate(window, team),
        home_vs_away: HomeAwaySplit {
            home_games: home.len(),
            home_record: aggregate(home.iter().copied(), team),
            away_games: away.len(),
            away_record: aggregate(away.iter().copied(), team),
        },
        scenario_performance,
    })
}

// ============================================================================
// Slate-wide trends
// ============================================================================

/// How favorites and totals fared across a slate of games
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyBettingTrends {
    /// Games with both scores and a spread
    pub total_games: usize,
    /// Games with a favorite (spread != 0)
    pub favorite_games: usize,
    pub pick_em_games: usize,
    pub favorites_covered: usize,
    pub favorites_pushed: usize,
    pub favorites_percentage: f64,
    /// Games with a usable O/U line
    pub games_with_totals: usize,
    pub overs_hit: usize,
    pub overs_percentage: f64,
    pub unders_hit: usize,
    pub unders_percentage: f64,
}

/// Favorite cover rate and O/U split over a slate.
pub fn weekly_betting_trends(games: &[Game]) -> WeeklyBettingTrends {
    let mut total = 0usize;
    let mut favorite_games = 0usize;
    let mut pick_em_games = 0usize;
    let mut covered = 0usize;
    let mut pushed = 0usize;
    let mut with_totals = 0usize;
    let mut overs = 0usize;

    for result in games.iter().filter_map(Game::lined_result) {
        total += 1;

        if result.spread == 0.0 {
            pick_em_games += 1;
        } else {
            favorite_games += 1;
            let favorite = if result.spread < 0.0 {
                TeamSide::Home
            } else {
                TeamSide::Away
            };
            match ats_result(result.home_points, result.away_points, result.spread, favorite) {
                AtsResult::Covered => covered += 1,
                AtsResult::Push => pushed += 1,
                AtsResult::NotCovered => {}
            }
        }

        if let Some(ou) = result.over_under {
            with_totals += 1;
            if went_over(result.home_points, result.away_points, ou) {
                overs += 1;
            }
        }
    }

    WeeklyBettingTrends {
        total_games: total,
        favorite_games,
        pick_em_games,
        favorites_covered: covered,
        favorites_pushed: pushed,
        favorites_percentage: percentage(covered, favorite_games),
        games_with_totals: with_totals,
        overs_hit: overs,
        overs_percentage: percentage(overs, with_totals),
        unders_hit: with_totals - overs,
        unders_percentage: percentage(with_totals - overs, with_totals),
    }
}
