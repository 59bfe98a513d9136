//! Public analysis facade.
//!
//! [`Analyzer`] carries the runtime configuration and exposes one method per
//! analysis. Every method runs under [`guarded`], so a panic inside an
//! analyzer surfaces as [`AnalysisError::Internal`] rather than unwinding into
//! the caller.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info};

use crate::betting::{
    self, BettingRecord, GameEdges, GameLog, HeadToHead, OverUnderRangeReport, SpreadRangeReport,
    TrendReport, WeeklyBettingTrends,
};
use crate::config::AnalyticsConfig;
use crate::error::{guarded, to_response, AnalysisError, AnalysisResult};
use crate::game_stats::{self, NotableGames, ScoringTrends, UpsetAnalysis, WeeklyGameTrends};
use crate::models::{Game, RankingEntry, TeamInfo};
use crate::rankings::{self, PollConsensus, RankingMovement, RankingTrends, RankingVolatility};
use crate::team_performance::{
    self, PerformanceSplits, SeasonSummary, StreakAnalysis, StrengthOfSchedule,
};
use crate::utils::matching::{resolve_team, TeamMatch};

/// Entry point for every analysis
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyticsConfig,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

fn run<T>(label: &str, f: impl FnOnce() -> AnalysisResult<T>) -> AnalysisResult<T> {
    guarded(label, AssertUnwindSafe(f))
}

fn require_games(games: &[Game], label: &'static str) -> AnalysisResult<()> {
    if games.is_empty() {
        Err(AnalysisError::NoGames(label))
    } else {
        Ok(())
    }
}

impl Analyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Render any analysis result as the success structure or `{"error": ...}`.
    pub fn respond<T: Serialize>(result: AnalysisResult<T>) -> serde_json::Value {
        to_response(result)
    }

    // ========================================================================
    // Betting
    // ========================================================================

    pub fn betting_record(&self, games: &[Game], team: &str) -> AnalysisResult<BettingRecord> {
        run("betting record", || Ok(betting::aggregate(games, team)))
    }

    /// Betting record restricted to one scenario. Unknown or absent scenario
    /// names apply no filter.
    pub fn scenario_record(
        &self,
        games: &[Game],
        team: &str,
        scenario: Option<&str>,
    ) -> AnalysisResult<BettingRecord> {
        run("scenario record", || {
            let filtered = betting::filter_by_scenario_name(games, team, scenario);
            debug!(team, ?scenario, matched = filtered.len(), "Scenario filter applied");
            Ok(betting::aggregate(filtered, team))
        })
    }

    pub fn filter_by_scenario<'a>(
        &self,
        games: &'a [Game],
        team: &str,
        scenario: Option<&str>,
    ) -> AnalysisResult<Vec<&'a Game>> {
        run("scenario filter", || {
            Ok(betting::filter_by_scenario_name(games, team, scenario))
        })
    }

    pub fn spread_ranges(&self, games: &[Game], team: &str) -> AnalysisResult<SpreadRangeReport> {
        run("spread ranges", || Ok(betting::analyze_spread_ranges(games, team)))
    }

    pub fn over_under_ranges(&self, games: &[Game]) -> AnalysisResult<OverUnderRangeReport> {
        run("over/under ranges", || Ok(betting::analyze_over_under_ranges(games)))
    }

    /// Head-to-head with the configured recent window.
    pub fn head_to_head(&self, games: &[Game], team1: &str, team2: &str) -> AnalysisResult<HeadToHead> {
        run("head-to-head", || {
            Ok(betting::head_to_head_with_window(
                games,
                team1,
                team2,
                self.config.head_to_head_recent_window,
            ))
        })
    }

    /// Trends over the first `last_n` games (most recent first); `None` uses
    /// the configured window.
    pub fn trends(&self, games: &[Game], team: &str, last_n: Option<usize>) -> AnalysisResult<TrendReport> {
        let window = last_n.unwrap_or(self.config.trend_window);
        run("trend analysis", || betting::trends(games, team, window))
    }

    pub fn game_edges(&self, games: &[Game]) -> AnalysisResult<Vec<GameEdges>> {
        run("edge analysis", || {
            require_games(games, "edge analysis")?;
            Ok(betting::game_edges(games))
        })
    }

    pub fn game_log(&self, games: &[Game], team: &str) -> AnalysisResult<GameLog> {
        run("game log", || Ok(betting::game_log(games, team)))
    }

    pub fn weekly_betting_trends(&self, games: &[Game]) -> AnalysisResult<WeeklyBettingTrends> {
        run("weekly betting trends", || {
            require_games(games, "weekly betting trends")?;
            Ok(betting::weekly_betting_trends(games))
        })
    }

    /// Betting records for many teams over one collection, in parallel.
    pub fn batch_betting_records(
        &self,
        games: &[Game],
        teams: &[String],
    ) -> BTreeMap<String, AnalysisResult<BettingRecord>> {
        teams
            .par_iter()
            .map(|team| (team.clone(), self.betting_record(games, team)))
            .collect()
    }

    /// Spread-range reports for many teams over one collection, in parallel.
    pub fn batch_spread_ranges(
        &self,
        games: &[Game],
        teams: &[String],
    ) -> BTreeMap<String, AnalysisResult<SpreadRangeReport>> {
        teams
            .par_iter()
            .map(|team| (team.clone(), self.spread_ranges(games, team)))
            .collect()
    }

    // ========================================================================
    // Game statistics
    // ========================================================================

    pub fn scoring_trends(&self, games: &[Game]) -> AnalysisResult<ScoringTrends> {
        run("scoring trends", || game_stats::scoring_trends(games))
    }

    pub fn upset_analysis(&self, games: &[Game]) -> AnalysisResult<UpsetAnalysis> {
        run("upset analysis", || game_stats::upset_analysis(games, self.config.top_n))
    }

    pub fn notable_games(&self, games: &[Game]) -> AnalysisResult<NotableGames> {
        run("notable games", || game_stats::notable_games(games, self.config.top_n))
    }

    pub fn weekly_game_trends(&self, games: &[Game]) -> AnalysisResult<WeeklyGameTrends> {
        run("weekly game trends", || {
            game_stats::weekly_game_trends(games, self.config.top_n)
        })
    }

    // ========================================================================
    // Team performance
    // ========================================================================

    pub fn performance_splits(&self, games: &[Game], team: &str) -> AnalysisResult<PerformanceSplits> {
        run("performance splits", || team_performance::performance_splits(games, team))
    }

    pub fn streak_analysis(&self, games: &[Game], team: &str) -> AnalysisResult<StreakAnalysis> {
        run("streak analysis", || team_performance::streak_analysis(games, team))
    }

    pub fn season_summary(&self, games: &[Game], team: &str) -> AnalysisResult<SeasonSummary> {
        run("season summary", || team_performance::season_summary(games, team))
    }

    pub fn strength_of_schedule(&self, games: &[Game], team: &str) -> AnalysisResult<StrengthOfSchedule> {
        run("strength of schedule", || {
            team_performance::strength_of_schedule(games, team)
        })
    }

    // ========================================================================
    // Rankings
    // ========================================================================

    pub fn ranking_movement(
        &self,
        current: &[RankingEntry],
        previous: Option<&[RankingEntry]>,
    ) -> AnalysisResult<RankingMovement> {
        run("ranking movement", || rankings::ranking_movement(current, previous))
    }

    pub fn ranking_volatility(&self, history: &[Vec<RankingEntry>]) -> AnalysisResult<RankingVolatility> {
        run("ranking volatility", || {
            rankings::ranking_volatility(history, self.config.top_n)
        })
    }

    pub fn ranking_trends(&self, history: &[Vec<RankingEntry>]) -> AnalysisResult<RankingTrends> {
        run("ranking trends", || rankings::ranking_trends(history, self.config.top_n))
    }

    pub fn poll_consensus(&self, rankings: &[RankingEntry]) -> AnalysisResult<PollConsensus> {
        run("poll consensus", || rankings::poll_consensus(rankings, self.config.top_n))
    }

    // ========================================================================
    // Teams
    // ========================================================================

    pub fn resolve_team<'a>(&self, identifier: &str, teams: &'a [TeamInfo]) -> AnalysisResult<TeamMatch<'a>> {
        let resolved = run("team resolution", || resolve_team(identifier, teams))?;
        info!(
            identifier,
            school = resolved.team.school.as_deref().unwrap_or_default(),
            confidence = ?resolved.confidence,
            "Resolved team"
        );
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BettingLine;

    fn analyzer() -> Analyzer {
        Analyzer::new(AnalyticsConfig {
            top_n: 2,
            ..AnalyticsConfig::defaults()
        })
    }

    fn game(home: &str, away: &str, hp: i64, ap: i64, spread: f64) -> Game {
        Game {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: Some(hp),
            away_points: Some(ap),
            lines: vec![BettingLine {
                spread: Some(spread),
                over_under: Some(50.5),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn slate() -> Vec<Game> {
        vec![
            game("Alabama", "Auburn", 27, 24, -6.5),
            game("LSU", "Alabama", 20, 42, 3.0),
            game("Alabama", "Tennessee", 34, 20, -9.5),
        ]
    }

    #[test]
    fn test_betting_methods() {
        let analyzer = analyzer();
        let games = slate();

        let record = analyzer.betting_record(&games, "Alabama").unwrap();
        assert_eq!(record.total_games, 3);
        assert_eq!(record.su.wins, 3);

        // LSU +3 at home makes Alabama the road favorite
        let road_fav = analyzer
            .scenario_record(&games, "Alabama", Some("road_favorite"))
            .unwrap();
        assert_eq!(road_fav.total_games, 1);
        let road_dog = analyzer
            .scenario_record(&games, "Alabama", Some("road_underdog"))
            .unwrap();
        assert_eq!(road_dog.total_games, 0);

        let unfiltered = analyzer.filter_by_scenario(&games, "Alabama", Some("bogus")).unwrap();
        assert_eq!(unfiltered.len(), games.len());

        let ranges = analyzer.spread_ranges(&games, "Alabama").unwrap();
        assert!(!ranges.is_empty());
    }

    #[test]
    fn test_trend_window_defaults_to_config() {
        let analyzer = Analyzer::new(AnalyticsConfig {
            trend_window: 2,
            ..AnalyticsConfig::defaults()
        });
        let report = analyzer.trends(&slate(), "Alabama", None).unwrap();
        assert_eq!(report.overall_trends.total_games, 2);

        let wider = analyzer.trends(&slate(), "Alabama", Some(10)).unwrap();
        assert_eq!(wider.overall_trends.total_games, 3);
    }

    #[test]
    fn test_empty_inputs_are_errors() {
        let analyzer = analyzer();
        let none: Vec<Game> = Vec::new();
        assert!(analyzer.game_edges(&none).is_err());
        assert!(analyzer.weekly_betting_trends(&none).is_err());
        assert!(analyzer.scoring_trends(&none).is_err());

        let response = Analyzer::respond(analyzer.trends(&none, "Alabama", None));
        assert_eq!(
            response,
            serde_json::json!({ "error": "No games provided for trend analysis" })
        );
    }

    #[test]
    fn test_top_n_from_config() {
        let analyzer = analyzer();
        let mut games = slate();
        games.push(game("Georgia", "Auburn", 17, 20, -14.0));
        games.push(game("Texas", "Kansas", 24, 27, -3.5));
        games.push(game("Oregon", "Utah", 20, 31, -2.5));
        let upsets = analyzer.upset_analysis(&games).unwrap();
        assert_eq!(upsets.upsets.total_upsets, 3);
        assert_eq!(upsets.upsets.upset_details.len(), 2);
    }

    #[test]
    fn test_batch_records() {
        let analyzer = analyzer();
        let teams = vec!["Alabama".to_string(), "Auburn".to_string()];
        let records = analyzer.batch_betting_records(&slate(), &teams);
        assert_eq!(records.len(), 2);
        let alabama = records["Alabama"].as_ref().unwrap();
        assert_eq!(alabama, &analyzer.betting_record(&slate(), "Alabama").unwrap());
        assert_eq!(alabama.su.wins, 3);

        let ranges = analyzer.batch_spread_ranges(&slate(), &teams);
        assert_eq!(ranges.len(), 2);
        assert!(!ranges["Alabama"].as_ref().unwrap().is_empty());
    }

    #[test]
    fn test_resolve_team() {
        let teams = vec![TeamInfo {
            team_id: Some(333),
            school: Some("Alabama".to_string()),
            abbreviation: Some("ALA".to_string()),
            conference: Some("SEC".to_string()),
        }];
        let analyzer = analyzer();
        assert_eq!(
            analyzer.resolve_team("ala", &teams).unwrap().team.team_id,
            Some(333)
        );
        assert!(analyzer.resolve_team("Oregon", &teams).is_err());
    }
}
