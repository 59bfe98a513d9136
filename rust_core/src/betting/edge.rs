//! Model-vs-market edge detection.
//!
//! Two heuristics, both advisory:
//! - ELO-implied spread vs the market spread
//! - Model win probability vs moneyline-implied probability
//!
//! Thresholds are fixed constants.

use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Game, TeamSide};
use crate::utils::stats::round_to;

// ============================================================================
// Constants
// ============================================================================

/// Football points per ELO rating point
pub const ELO_POINTS_FACTOR: f64 = 0.03;
/// Home-field advantage added to the ELO-implied spread, in points
pub const HOME_FIELD_ADVANTAGE: f64 = 3.0;
/// Minimum spread disagreement (points) for a recommendation
pub const SPREAD_EDGE_MIN: f64 = 3.0;
/// Spread disagreement (points) for high confidence
pub const SPREAD_EDGE_HIGH: f64 = 5.0;
/// Minimum probability edge for a recommendation
pub const MONEYLINE_EDGE_MIN: f64 = 0.05;
/// Probability edge for high confidence
pub const MONEYLINE_EDGE_HIGH: f64 = 0.10;
/// Tolerance for float noise in threshold comparisons
pub const THRESHOLD_EPSILON: f64 = 1e-9;

/// `value >= threshold`, absorbing float noise only.
#[inline]
fn reaches(value: f64, threshold: f64) -> bool {
    value >= threshold - THRESHOLD_EPSILON
}

/// Recommendation confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Implied win probability of American odds. Odds of zero are invalid.
pub fn american_odds_to_probability(odds: i64) -> AnalysisResult<f64> {
    if odds == 0 {
        return Err(AnalysisError::InvalidInput(
            "American odds cannot be 0".to_string(),
        ));
    }
    let odds = odds as f64;
    Ok(if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        odds.abs() / (odds.abs() + 100.0)
    })
}

fn required(value: Option<f64>, name: &str) -> AnalysisResult<f64> {
    match value {
        Some(v) if v != 0.0 && v.is_finite() => Ok(v),
        _ => Err(AnalysisError::MissingInput(name.to_string())),
    }
}

// ============================================================================
// ELO vs spread
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EloSpreadEdge {
    pub home_elo: f64,
    pub away_elo: f64,
    pub market_spread: f64,
    /// Expected home margin from ELO (positive = home better)
    pub elo_implied_spread: f64,
    /// Implied home margin minus market home margin
    pub spread_difference: f64,
    /// Side the market undervalues; `None` below the threshold
    pub value_side: Option<TeamSide>,
    pub recommendation: String,
    pub confidence: Confidence,
}

/// Compare ELO ratings to the market spread.
///
/// All three inputs must be present and non-zero, so a pick'em spread of
/// exactly 0 is rejected.
pub fn elo_spread_edge(
    home_elo: Option<f64>,
    away_elo: Option<f64>,
    spread: Option<f64>,
) -> AnalysisResult<EloSpreadEdge> {
    let home_elo = required(home_elo, "home_elo")?;
    let away_elo = required(away_elo, "away_elo")?;
    let spread = required(spread, "spread")?;

    // Unrounded; only the reported fields are rounded
    let implied = (home_elo - away_elo) * ELO_POINTS_FACTOR + HOME_FIELD_ADVANTAGE;
    let difference = implied - (-spread);

    let (value_side, recommendation, confidence) = if reaches(difference.abs(), SPREAD_EDGE_MIN) {
        let side = if difference > 0.0 { TeamSide::Home } else { TeamSide::Away };
        let confidence = if reaches(difference.abs(), SPREAD_EDGE_HIGH) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (
            Some(side),
            format!(
                "Value on {} team: ELO implies {:+.1}, market implies {:+.1}",
                side.as_str(),
                implied,
                -spread
            ),
            confidence,
        )
    } else {
        (None, "No strong lean".to_string(), Confidence::Low)
    };

    Ok(EloSpreadEdge {
        home_elo,
        away_elo,
        market_spread: spread,
        elo_implied_spread: round_to(implied, 1),
        spread_difference: round_to(difference, 1),
        value_side,
        recommendation,
        confidence,
    })
}

// ============================================================================
// Win probability vs moneyline
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoneylineEdge {
    pub home_win_prob: f64,
    pub away_win_prob: f64,
    pub home_implied_prob: f64,
    pub away_implied_prob: f64,
    pub home_edge: f64,
    pub away_edge: f64,
    /// Larger of the two edges
    pub max_edge: f64,
    pub value_side: Option<TeamSide>,
    pub recommendation: String,
    pub confidence: Confidence,
}

fn probability(value: Option<f64>, name: &str) -> AnalysisResult<f64> {
    let p = value.ok_or_else(|| AnalysisError::MissingInput(name.to_string()))?;
    if !(0.0..=1.0).contains(&p) {
        return Err(AnalysisError::InvalidInput(format!(
            "{} must be between 0 and 1, got {}",
            name, p
        )));
    }
    Ok(p)
}

/// Compare model win probabilities to moneyline-implied probabilities.
pub fn moneyline_edge(
    home_win_prob: Option<f64>,
    away_win_prob: Option<f64>,
    moneyline_home: Option<i64>,
    moneyline_away: Option<i64>,
) -> AnalysisResult<MoneylineEdge> {
    let home_win_prob = probability(home_win_prob, "home_win_prob")?;
    let away_win_prob = probability(away_win_prob, "away_win_prob")?;
    let ml_home = moneyline_home.ok_or_else(|| AnalysisError::MissingInput("moneyline_home".to_string()))?;
    let ml_away = moneyline_away.ok_or_else(|| AnalysisError::MissingInput("moneyline_away".to_string()))?;

    let home_implied = american_odds_to_probability(ml_home)?;
    let away_implied = american_odds_to_probability(ml_away)?;

    let home_edge = home_win_prob - home_implied;
    let away_edge = away_win_prob - away_implied;
    let (best_side, best_edge) = if home_edge >= away_edge {
        (TeamSide::Home, home_edge)
    } else {
        (TeamSide::Away, away_edge)
    };

    let (value_side, recommendation, confidence) = if reaches(best_edge, MONEYLINE_EDGE_MIN) {
        let confidence = if reaches(best_edge, MONEYLINE_EDGE_HIGH) {
            Confidence::High
        } else {
            Confidence::Medium
        };
        (
            Some(best_side),
            format!(
                "Value on {} moneyline: {:.1}% edge",
                best_side.as_str(),
                best_edge * 100.0
            ),
            confidence,
        )
    } else {
        (None, "No strong lean".to_string(), Confidence::Low)
    };

    Ok(MoneylineEdge {
        home_win_prob,
        away_win_prob,
        home_implied_prob: round_to(home_implied, 3),
        away_implied_prob: round_to(away_implied, 3),
        home_edge: round_to(home_edge, 3),
        away_edge: round_to(away_edge, 3),
        max_edge: round_to(best_edge, 3),
        value_side,
        recommendation,
        confidence,
    })
}

// ============================================================================
// Per-game
// ============================================================================

/// Both edges for one game, where the data allows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameEdges {
    pub id: Option<i64>,
    pub week: Option<i64>,
    pub home_team: String,
    pub away_team: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elo: Option<EloSpreadEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moneyline: Option<MoneylineEdge>,
}

/// ELO edge from the game's start ELOs and first-line spread.
pub fn elo_edge_for_game(game: &Game) -> AnalysisResult<EloSpreadEdge> {
    elo_spread_edge(game.home_start_elo, game.away_start_elo, game.spread())
}

/// Moneyline edge from the game's win probabilities and first-line moneylines.
pub fn moneyline_edge_for_game(game: &Game) -> AnalysisResult<MoneylineEdge> {
    let line = game.first_line();
    moneyline_edge(
        game.home_postgame_win_prob,
        game.away_postgame_win_prob,
        line.and_then(|l| l.moneyline_home),
        line.and_then(|l| l.moneyline_away),
    )
}

/// Edges for every game that supports at least one of them.
pub fn game_edges(games: &[Game]) -> Vec<GameEdges> {
    games
        .iter()
        .filter_map(|game| {
            let elo = elo_edge_for_game(game).ok();
            let moneyline = moneyline_edge_for_game(game).ok();
            if elo.is_none() && moneyline.is_none() {
                return None;
            }
            Some(GameEdges {
                id: game.id,
                week: game.week,
                home_team: game.home_team.clone(),
                away_team: game.away_team.clone(),
                elo,
                moneyline,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BettingLine;

    #[test]
    fn test_american_odds() {
        assert!((american_odds_to_probability(-150).unwrap() - 0.6).abs() < 1e-9);
        assert!((american_odds_to_probability(150).unwrap() - 0.4).abs() < 1e-9);
        assert!((american_odds_to_probability(-100).unwrap() - 0.5).abs() < 1e-9);
        assert!(american_odds_to_probability(0).is_err());
    }

    #[test]
    fn test_elo_edge_home_value() {
        // Implied: 200 * 0.03 + 3 = 9; market home -3 means home by 3; difference 6
        let edge = elo_spread_edge(Some(1700.0), Some(1500.0), Some(-3.0)).unwrap();
        assert_eq!(edge.elo_implied_spread, 9.0);
        assert_eq!(edge.spread_difference, 6.0);
        assert_eq!(edge.value_side, Some(TeamSide::Home));
        assert_eq!(edge.confidence, Confidence::High);
    }

    #[test]
    fn test_elo_edge_thresholds() {
        // Implied 3 + 3 = 6, market home by 2 -> difference 4: medium
        let medium = elo_spread_edge(Some(1600.0), Some(1500.0), Some(-2.0)).unwrap();
        assert_eq!(medium.confidence, Confidence::Medium);

        // Exactly 3 points: still a recommendation
        let edge = elo_spread_edge(Some(1600.0), Some(1500.0), Some(-3.0)).unwrap();
        assert_eq!(edge.spread_difference, 3.0);
        assert_eq!(edge.confidence, Confidence::Medium);

        // Implied 6, market home by 7 -> difference -1: no lean
        let none = elo_spread_edge(Some(1600.0), Some(1500.0), Some(-7.0)).unwrap();
        assert_eq!(none.value_side, None);
        assert_eq!(none.recommendation, "No strong lean");
        assert_eq!(none.confidence, Confidence::Low);
    }

    #[test]
    fn test_elo_edge_just_under_thresholds() {
        // ELO implies home by 5.9961, market home by 3: difference 2.9961
        let under_min = elo_spread_edge(Some(1599.87), Some(1500.0), Some(-3.0)).unwrap();
        assert_eq!(under_min.value_side, None);
        assert_eq!(under_min.recommendation, "No strong lean");
        assert_eq!(under_min.confidence, Confidence::Low);
        // Reported value is still rounded
        assert_eq!(under_min.spread_difference, 3.0);

        // Difference 4.9961: medium, not high
        let under_high = elo_spread_edge(Some(1599.87), Some(1500.0), Some(-1.0)).unwrap();
        assert_eq!(under_high.value_side, Some(TeamSide::Home));
        assert_eq!(under_high.confidence, Confidence::Medium);
    }

    #[test]
    fn test_elo_edge_away_value() {
        // Equal ELO: implied home by 3; market home by 10 -> difference -7
        let edge = elo_spread_edge(Some(1500.0), Some(1500.0), Some(-10.0)).unwrap();
        assert_eq!(edge.value_side, Some(TeamSide::Away));
        assert_eq!(edge.confidence, Confidence::High);
    }

    #[test]
    fn test_elo_edge_requires_all_inputs() {
        assert_eq!(
            elo_spread_edge(None, Some(1500.0), Some(-3.0)),
            Err(AnalysisError::MissingInput("home_elo".to_string()))
        );
        assert!(elo_spread_edge(Some(1500.0), Some(0.0), Some(-3.0)).is_err());
        assert_eq!(
            elo_spread_edge(Some(1500.0), Some(1400.0), Some(0.0)),
            Err(AnalysisError::MissingInput("spread".to_string()))
        );
    }

    #[test]
    fn test_moneyline_edge() {
        // Home -150 implies 0.60; model says 0.72 -> 0.12 edge
        let edge = moneyline_edge(Some(0.72), Some(0.28), Some(-150), Some(130)).unwrap();
        assert_eq!(edge.value_side, Some(TeamSide::Home));
        assert_eq!(edge.confidence, Confidence::High);
        assert_eq!(edge.home_edge, 0.12);

        // Away +200 implies 0.333; model 0.40 -> 0.067 edge
        let away = moneyline_edge(Some(0.60), Some(0.40), Some(-250), Some(200)).unwrap();
        assert_eq!(away.value_side, Some(TeamSide::Away));
        assert_eq!(away.confidence, Confidence::Medium);
    }

    #[test]
    fn test_moneyline_edge_boundary_and_no_lean() {
        // 0.65 - 0.60 = 0.05 exactly: medium
        let boundary = moneyline_edge(Some(0.65), Some(0.35), Some(-150), Some(150)).unwrap();
        assert_eq!(boundary.confidence, Confidence::Medium);

        let none = moneyline_edge(Some(0.62), Some(0.38), Some(-150), Some(150)).unwrap();
        assert_eq!(none.value_side, None);
        assert_eq!(none.confidence, Confidence::Low);
        assert_eq!(none.max_edge, 0.02);
    }

    #[test]
    fn test_moneyline_edge_just_under_thresholds() {
        // 0.64996 - 0.60 = 0.04996
        let under_min = moneyline_edge(Some(0.64996), Some(0.35004), Some(-150), Some(150)).unwrap();
        assert_eq!(under_min.value_side, None);
        assert_eq!(under_min.confidence, Confidence::Low);
        assert_eq!(under_min.max_edge, 0.05);

        // 0.69996 - 0.60 = 0.09996: medium, not high
        let under_high = moneyline_edge(Some(0.69996), Some(0.30004), Some(-150), Some(150)).unwrap();
        assert_eq!(under_high.value_side, Some(TeamSide::Home));
        assert_eq!(under_high.confidence, Confidence::Medium);

        // 0.70 - 0.60 = 0.10 exactly: high
        let at_high = moneyline_edge(Some(0.70), Some(0.30), Some(-150), Some(150)).unwrap();
        assert_eq!(at_high.confidence, Confidence::High);
    }

    #[test]
    fn test_moneyline_edge_validation() {
        assert!(moneyline_edge(None, Some(0.4), Some(-150), Some(130)).is_err());
        assert!(moneyline_edge(Some(1.2), Some(0.4), Some(-150), Some(130)).is_err());
        assert!(moneyline_edge(Some(0.6), Some(0.4), Some(0), Some(130)).is_err());
        assert!(moneyline_edge(Some(0.6), Some(0.4), Some(-150), None).is_err());
    }

    #[test]
    fn test_game_edges_skips_games_without_data() {
        let with_data = Game {
            id: Some(1),
            home_team: "LSU".to_string(),
            away_team: "Florida State".to_string(),
            home_start_elo: Some(1750.0),
            away_start_elo: Some(1700.0),
            lines: vec![BettingLine {
                spread: Some(-2.5),
                moneyline_home: Some(-135),
                moneyline_away: Some(115),
                ..Default::default()
            }],
            ..Default::default()
        };
        let without = Game {
            id: Some(2),
            home_team: "Utah".to_string(),
            away_team: "Florida".to_string(),
            ..Default::default()
        };

        let edges = game_edges(&[with_data, without]);
        assert_eq!(edges.len(), 1);
        assert!(edges[0].elo.is_some());
        assert!(edges[0].moneyline.is_none(), "no win probabilities");

        let value = serde_json::to_value(&edges[0]).unwrap();
        assert!(value.get("moneyline").is_none());
    }
}
