//! Slate-level game statistics: scoring, upsets, notable games.
//!
//! Only final games count (both scores present, status absent or `completed`).

use serde::Serialize;
use tracing::debug;

use crate::betting::outcomes::{ats_result, went_over, AtsResult};
use crate::betting::record::Record;
use crate::betting::trends::{weekly_betting_trends, WeeklyBettingTrends};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Game, TeamSide};
use crate::utils::stats::{mean, median, percentage, round_to};

/// Margin at or above which a game counts as a blowout in scoring trends
pub const SCORING_BLOWOUT_MARGIN: i64 = 20;
/// Margin at or below which a game is a one-score game
pub const ONE_SCORE_MARGIN: i64 = 7;
/// Points above/below the mean total for high/low scoring games
pub const NOTABLE_TOTAL_DEVIATION: f64 = 20.0;
/// Margin at or below which a game is "close" in notable games
pub const CLOSE_GAME_MARGIN: i64 = 3;
/// Margin at or above which a game is a blowout in notable games
pub const NOTABLE_BLOWOUT_MARGIN: i64 = 28;

/// A sub-analysis that may have failed, rendered inline as `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ready(T),
    Unavailable { error: String },
}

impl<T> From<AnalysisResult<T>> for Section<T> {
    fn from(result: AnalysisResult<T>) -> Self {
        match result {
            Ok(value) => Section::Ready(value),
            Err(e) => Section::Unavailable { error: e.to_string() },
        }
    }
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(value) => Some(value),
            Section::Unavailable { .. } => None,
        }
    }
}

fn final_scores(games: &[Game]) -> impl Iterator<Item = (&Game, i64, i64)> {
    games.iter().filter(|g| g.is_final()).filter_map(|g| {
        let (home, away) = g.scores()?;
        Some((g, home, away))
    })
}

fn as_f64(values: &[i64]) -> Vec<f64> {
    values.iter().map(|v| *v as f64).collect()
}

// ============================================================================
// Scoring trends
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalPoints {
    pub average: f64,
    pub median: f64,
    pub highest: i64,
    pub lowest: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideScoring {
    pub average: f64,
    pub median: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginStats {
    pub average_margin: f64,
    pub median_margin: f64,
    pub blowouts_20plus: usize,
    pub one_score_games: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringTrends {
    pub games_analyzed: usize,
    pub total_points: TotalPoints,
    pub home_team_scoring: SideScoring,
    pub away_team_scoring: SideScoring,
    pub margins: MarginStats,
}

fn side_scoring(points: &[i64]) -> SideScoring {
    let values = as_f64(points);
    SideScoring {
        average: mean(&values).map_or(0.0, |m| round_to(m, 1)),
        median: median(&values).unwrap_or(0.0),
    }
}

pub fn scoring_trends(games: &[Game]) -> AnalysisResult<ScoringTrends> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("scoring trends"));
    }

    let mut totals = Vec::new();
    let mut home = Vec::new();
    let mut away = Vec::new();
    let mut margins = Vec::new();
    for (_, h, a) in final_scores(games) {
        totals.push(h + a);
        home.push(h);
        away.push(a);
        margins.push((h - a).abs());
    }

    if totals.is_empty() {
        return Err(AnalysisError::InsufficientData("No completed games found".to_string()));
    }

    let total_values = as_f64(&totals);
    let margin_values = as_f64(&margins);

    Ok(ScoringTrends {
        games_analyzed: totals.len(),
        total_points: TotalPoints {
            average: mean(&total_values).map_or(0.0, |m| round_to(m, 1)),
            median: median(&total_values).unwrap_or(0.0),
            highest: totals.iter().copied().max().unwrap_or(0),
            lowest: totals.iter().copied().min().unwrap_or(0),
        },
        home_team_scoring: side_scoring(&home),
        away_team_scoring: side_scoring(&away),
        margins: MarginStats {
            average_margin: mean(&margin_values).map_or(0.0, |m| round_to(m, 1)),
            median_margin: median(&margin_values).unwrap_or(0.0),
            blowouts_20plus: margins.iter().filter(|m| **m >= SCORING_BLOWOUT_MARGIN).count(),
            one_score_games: margins.iter().filter(|m| **m <= ONE_SCORE_MARGIN).count(),
        },
    })
}

// ============================================================================
// Upsets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Upset {
    pub favorite: String,
    pub underdog: String,
    /// Home-quoted spread as listed
    pub spread: f64,
    pub final_score: String,
    pub upset_margin: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsetSummary {
    pub total_upsets: usize,
    /// First `top_n` upsets in input order
    pub upset_details: Vec<Upset>,
    pub upset_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FavoritesPerformance {
    pub won_straight_up: Record,
    pub covered_spread: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpsetAnalysis {
    /// Final games with a non-zero spread
    pub games_analyzed: usize,
    pub pick_em_games: usize,
    pub upsets: UpsetSummary,
    pub favorites_performance: FavoritesPerformance,
}

/// Favorite performance and upsets. Pick'em games have no favorite and are skipped.
pub fn upset_analysis(games: &[Game], top_n: usize) -> AnalysisResult<UpsetAnalysis> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("upset analysis"));
    }

    let mut analyzed = 0usize;
    let mut pick_em = 0usize;
    let mut favorites_won = 0usize;
    let mut favorites_covered = 0usize;
    let mut upsets = Vec::new();

    for game in games.iter().filter(|g| g.is_final()) {
        let Some(result) = game.lined_result() else {
            continue;
        };
        if result.spread == 0.0 {
            pick_em += 1;
            continue;
        }
        analyzed += 1;

        let favorite = if result.spread < 0.0 { TeamSide::Home } else { TeamSide::Away };
        let margin = result.margin();
        let favorite_margin = match favorite {
            TeamSide::Home => margin,
            TeamSide::Away => -margin,
        };

        if ats_result(result.home_points, result.away_points, result.spread, favorite)
            == AtsResult::Covered
        {
            favorites_covered += 1;
        }
        if favorite_margin > 0 {
            favorites_won += 1;
        } else {
            upsets.push(Upset {
                favorite: game.team_name(favorite).to_string(),
                underdog: game.team_name(favorite.opposite()).to_string(),
                spread: result.spread,
                final_score: format!(
                    "{} {}, {} {}",
                    game.home_team, result.home_points, game.away_team, result.away_points
                ),
                upset_margin: margin.abs(),
            });
        }
    }

    if analyzed == 0 {
        return Err(AnalysisError::InsufficientData(
            "No games with betting lines found".to_string(),
        ));
    }

    debug!(analyzed, upsets = upsets.len(), "Upset analysis complete");

    let total_upsets = upsets.len();
    upsets.truncate(top_n);

    Ok(UpsetAnalysis {
        games_analyzed: analyzed,
        pick_em_games: pick_em,
        upsets: UpsetSummary {
            total_upsets,
            upset_details: upsets,
            upset_rate: percentage(total_upsets, analyzed),
        },
        favorites_performance: FavoritesPerformance {
            won_straight_up: Record::from_counts(favorites_won, analyzed),
            covered_spread: Record::from_counts(favorites_covered, analyzed),
        },
    })
}

// ============================================================================
// Notable games
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    /// `"Away @ Home"`
    pub matchup: String,
    /// `"away-home"`
    pub score: String,
    pub total_points: i64,
    pub margin: i64,
    pub week: Option<i64>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct NotableGames {
    pub high_scoring: Vec<GameSummary>,
    pub low_scoring: Vec<GameSummary>,
    pub close_games: Vec<GameSummary>,
    pub blowouts: Vec<GameSummary>,
    pub overtime_games: Vec<GameSummary>,
}

fn is_overtime(game: &Game) -> bool {
    game.notes.as_deref().map_or(false, |n| n.contains("OT"))
}

pub fn notable_games(games: &[Game], top_n: usize) -> AnalysisResult<NotableGames> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("notable games"));
    }

    let finals: Vec<(&Game, i64, i64)> = final_scores(games).collect();
    let totals: Vec<f64> = finals.iter().map(|(_, h, a)| (h + a) as f64).collect();
    let Some(avg_total) = mean(&totals) else {
        return Err(AnalysisError::InsufficientData("No completed games found".to_string()));
    };
    let high_threshold = avg_total + NOTABLE_TOTAL_DEVIATION;
    let low_threshold = avg_total - NOTABLE_TOTAL_DEVIATION;

    let mut notable = NotableGames::default();
    for (game, home, away) in finals {
        let total = home + away;
        let margin = (home - away).abs();
        let summary = GameSummary {
            matchup: format!("{} @ {}", game.away_team, game.home_team),
            score: format!("{}-{}", away, home),
            total_points: total,
            margin,
            week: game.week,
            date: game.start_date.clone(),
        };

        if total as f64 >= high_threshold {
            notable.high_scoring.push(summary.clone());
        } else if total as f64 <= low_threshold {
            notable.low_scoring.push(summary.clone());
        }

        if margin <= CLOSE_GAME_MARGIN {
            notable.close_games.push(summary.clone());
        } else if margin >= NOTABLE_BLOWOUT_MARGIN {
            notable.blowouts.push(summary.clone());
        }

        if is_overtime(game) {
            notable.overtime_games.push(summary);
        }
    }

    notable.high_scoring.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    notable.close_games.sort_by_key(|g| g.margin);
    for list in [
        &mut notable.high_scoring,
        &mut notable.low_scoring,
        &mut notable.close_games,
        &mut notable.blowouts,
        &mut notable.overtime_games,
    ] {
        list.truncate(top_n);
    }

    Ok(notable)
}

// ============================================================================
// Weekly overview
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekOverview {
    pub total_games: usize,
    pub completed_games: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverUnderSummary {
    pub games_with_totals: usize,
    pub overs_hit: usize,
    pub unders_hit: usize,
    pub over_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyGameTrends {
    pub week_overview: WeekOverview,
    pub scoring: Section<ScoringTrends>,
    pub upsets: Section<UpsetAnalysis>,
    pub notable_games: Section<NotableGames>,
    pub over_under: OverUnderSummary,
    pub betting: WeeklyBettingTrends,
}

/// Over/under split across final games with a usable O/U line.
pub fn over_under_summary(games: &[Game]) -> OverUnderSummary {
    let mut with_totals = 0usize;
    let mut overs = 0usize;
    for (game, home, away) in final_scores(games) {
        if let Some(line) = game.over_under() {
            with_totals += 1;
            if went_over(home, away, line) {
                overs += 1;
            }
        }
    }
    OverUnderSummary {
        games_with_totals: with_totals,
        overs_hit: overs,
        unders_hit: with_totals - overs,
        over_percentage: percentage(overs, with_totals),
    }
}

/// Everything above for one slate of games.
pub fn weekly_game_trends(games: &[Game], top_n: usize) -> AnalysisResult<WeeklyGameTrends> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("weekly trends"));
    }

    let scoring: Section<ScoringTrends> = scoring_trends(games).into();
    let completed = scoring.ready().map_or(0, |s| s.games_analyzed);

    Ok(WeeklyGameTrends {
        week_overview: WeekOverview {
            total_games: games.len(),
            completed_games: completed,
        },
        scoring,
        upsets: upset_analysis(games, top_n).into(),
        notable_games: notable_games(games, top_n).into(),
        over_under: over_under_summary(games),
        betting: weekly_betting_trends(games),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BettingLine;

    fn game(home: &str, away: &str, hp: i64, ap: i64, spread: Option<f64>, total: Option<f64>) -> Game {
        Game {
            week: Some(5),
            status: Some("completed".to_string()),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: Some(hp),
            away_points: Some(ap),
            lines: vec![BettingLine {
                spread,
                over_under: total,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn slate() -> Vec<Game> {
        vec![
            game("Oklahoma", "Kansas", 52, 49, Some(-10.0), Some(65.5)), // fav wins, no cover, over
            game("Iowa", "Minnesota", 10, 12, Some(-3.5), Some(33.0)),   // upset, under
            game("Georgia", "Vanderbilt", 56, 7, Some(-31.5), Some(58.0)), // fav covers
            game("Duke", "Wake Forest", 24, 21, Some(2.5), Some(45.0)),  // away fav upset, over
            game("Army", "Navy", 17, 11, Some(0.0), None),               // pick'em
            Game {
                status: Some("scheduled".to_string()),
                ..game("Utah", "BYU", 0, 0, Some(-7.0), Some(40.0))
            },
        ]
    }

    #[test]
    fn test_scoring_trends() {
        let trends = scoring_trends(&slate()).unwrap();
        assert_eq!(trends.games_analyzed, 5);
        // totals: 101, 22, 63, 45, 28
        assert_eq!(trends.total_points.highest, 101);
        assert_eq!(trends.total_points.lowest, 22);
        assert_eq!(trends.total_points.median, 45.0);
        assert_eq!(trends.total_points.average, 51.8);
        // margins: 3, 2, 49, 3, 6
        assert_eq!(trends.margins.blowouts_20plus, 1);
        assert_eq!(trends.margins.one_score_games, 4);
        assert_eq!(trends.margins.median_margin, 3.0);
    }

    #[test]
    fn test_scoring_trends_errors() {
        assert_eq!(scoring_trends(&[]), Err(AnalysisError::NoGames("scoring trends")));
        let pending = vec![Game {
            home_team: "A".to_string(),
            away_team: "B".to_string(),
            ..Default::default()
        }];
        assert!(matches!(
            scoring_trends(&pending),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_upset_analysis() {
        let analysis = upset_analysis(&slate(), 5).unwrap();
        assert_eq!(analysis.games_analyzed, 4);
        assert_eq!(analysis.pick_em_games, 1);
        assert_eq!(analysis.upsets.total_upsets, 2);
        assert_eq!(analysis.upsets.upset_rate, 50.0);
        assert_eq!(analysis.favorites_performance.won_straight_up.formatted, "2-2");
        assert_eq!(analysis.favorites_performance.covered_spread.formatted, "1-3");

        let first = &analysis.upsets.upset_details[0];
        assert_eq!(first.favorite, "Iowa");
        assert_eq!(first.underdog, "Minnesota");
        assert_eq!(first.final_score, "Iowa 10, Minnesota 12");
        assert_eq!(first.upset_margin, 2);

        let second = &analysis.upsets.upset_details[1];
        assert_eq!(second.favorite, "Wake Forest");

        let truncated = upset_analysis(&slate(), 1).unwrap();
        assert_eq!(truncated.upsets.upset_details.len(), 1);
        assert_eq!(truncated.upsets.total_upsets, 2);
    }

    #[test]
    fn test_notable_games() {
        let mut games = slate();
        games[3].notes = Some("2OT".to_string());
        let notable = notable_games(&games, 5).unwrap();

        // mean total 51.8: high >= 71.8, low <= 31.8
        assert_eq!(notable.high_scoring.len(), 1);
        assert_eq!(notable.high_scoring[0].total_points, 101);
        assert_eq!(notable.low_scoring.len(), 2);
        assert_eq!(notable.close_games.len(), 3);
        assert_eq!(notable.close_games[0].margin, 2);
        assert_eq!(notable.blowouts.len(), 1);
        assert_eq!(notable.blowouts[0].matchup, "Vanderbilt @ Georgia");
        assert_eq!(notable.blowouts[0].score, "7-56");
        assert_eq!(notable.overtime_games.len(), 1);
    }

    #[test]
    fn test_weekly_game_trends() {
        let weekly = weekly_game_trends(&slate(), 5).unwrap();
        assert_eq!(weekly.week_overview.total_games, 6);
        assert_eq!(weekly.week_overview.completed_games, 5);
        assert_eq!(weekly.over_under.games_with_totals, 4);
        assert_eq!(weekly.over_under.overs_hit, 2);
        assert!(weekly.upsets.ready().is_some());

        let value = serde_json::to_value(&weekly).unwrap();
        assert_eq!(value["scoring"]["games_analyzed"], 5);
    }

    #[test]
    fn test_weekly_trends_inline_errors() {
        let games = vec![game("A", "B", 21, 14, None, Some(40.0))];
        let weekly = weekly_game_trends(&games, 5).unwrap();
        let value = serde_json::to_value(&weekly).unwrap();
        assert_eq!(value["upsets"]["error"], "Insufficient data: No games with betting lines found");
    }
}
