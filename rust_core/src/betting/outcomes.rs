//! Per-game betting outcomes.
//!
//! Spread sign convention: the line is quoted from the home team's side,
//! negative means home is favored. With `margin = home - away`:
//! - home covers iff `margin + spread > 0`
//! - away covers iff `margin + spread < 0`
//! - `margin + spread == 0` is a push and neither side covers

use serde::{Deserialize, Serialize};

use crate::models::{Game, TeamSide};
use crate::utils::matching::resolve_side;

/// ATS result for one side of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtsResult {
    Covered,
    NotCovered,
    Push,
}

impl AtsResult {
    pub fn covered(&self) -> bool {
        matches!(self, AtsResult::Covered)
    }
}

/// ATS result for `side` given the final score and the home-quoted spread.
#[inline]
pub fn ats_result(home_points: i64, away_points: i64, spread: f64, side: TeamSide) -> AtsResult {
    let margin = home_points as f64 - away_points as f64;
    let adjusted = match side {
        TeamSide::Home => margin + spread,
        TeamSide::Away => -(margin + spread),
    };
    if adjusted > 0.0 {
        AtsResult::Covered
    } else if adjusted < 0.0 {
        AtsResult::NotCovered
    } else {
        AtsResult::Push
    }
}

/// Whether `team` covered. A push is not a cover for either side.
///
/// `team` is away whenever it does not match `home_team`, so `_away_team` is
/// accepted for call-site symmetry and never consulted.
pub fn covers_spread(
    home_points: i64,
    away_points: i64,
    spread: f64,
    team: &str,
    home_team: &str,
    _away_team: &str,
) -> bool {
    ats_result(home_points, away_points, spread, resolve_side(team, home_team)).covered()
}

/// Strictly greater than the line; a total equal to the line is not over.
#[inline]
pub fn went_over(home_points: i64, away_points: i64, over_under: f64) -> bool {
    home_points as f64 + away_points as f64 > over_under
}

/// Strictly greater; a tie is not a win.
#[inline]
pub fn won(team_points: i64, opponent_points: i64) -> bool {
    team_points > opponent_points
}

// ============================================================================
// Graded games
// ============================================================================

/// A single derived outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    AtsCovered,
    AtsNotCovered,
    Over,
    Under,
    Win,
    Loss,
}

/// Every betting outcome of one game from one team's side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradedGame {
    pub side: TeamSide,
    pub team_points: i64,
    pub opponent_points: i64,
    /// Line from the team's side (negative = team favored)
    pub team_spread: f64,
    pub ats: AtsResult,
    /// `None` when the game has no usable O/U line
    pub over: Option<bool>,
    pub won: bool,
}

impl GradedGame {
    /// Outcomes as tags. A push emits no ATS tag.
    pub fn outcomes(&self) -> Vec<Outcome> {
        let mut out = Vec::with_capacity(3);
        match self.ats {
            AtsResult::Covered => out.push(Outcome::AtsCovered),
            AtsResult::NotCovered => out.push(Outcome::AtsNotCovered),
            AtsResult::Push => {}
        }
        match self.over {
            Some(true) => out.push(Outcome::Over),
            Some(false) => out.push(Outcome::Under),
            None => {}
        }
        out.push(if self.won { Outcome::Win } else { Outcome::Loss });
        out
    }
}

/// Grade `game` for `team`. `None` when scores or the first line's spread are missing.
pub fn grade_game(game: &Game, team: &str) -> Option<GradedGame> {
    let result = game.lined_result()?;
    let side = game.side_of(team);
    let (team_points, opponent_points) = match side {
        TeamSide::Home => (result.home_points, result.away_points),
        TeamSide::Away => (result.away_points, result.home_points),
    };
    Some(GradedGame {
        side,
        team_points,
        opponent_points,
        team_spread: match side {
            TeamSide::Home => result.spread,
            TeamSide::Away => -result.spread,
        },
        ats: ats_result(result.home_points, result.away_points, result.spread, side),
        over: result
            .over_under
            .map(|ou| went_over(result.home_points, result.away_points, ou)),
        won: won(team_points, opponent_points),
    })
}
