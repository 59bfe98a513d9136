//! Per-game betting detail rows.

use serde::Serialize;

use super::outcomes::{grade_game, AtsResult};
use super::record::{aggregate, BettingRecord};
use crate::models::{Game, TeamSide};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameLogEntry {
    pub opponent: String,
    /// `"vs"` at home, `"@"` away
    pub location: &'static str,
    /// `"W 31-24"`, team score first
    pub result: String,
    /// Line from the team's side: `"+3.5"`, `"-7.0"` or `"PK"`
    pub spread: String,
    /// `"Covered"`, `"Push"` or `"Did not cover"`
    pub ats_result: &'static str,
    pub over_under: Option<f64>,
    pub ou_result: String,
    pub week: Option<i64>,
    pub season: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameLog {
    pub team: String,
    pub summary: BettingRecord,
    pub games: Vec<GameLogEntry>,
}

fn spread_text(team_spread: f64) -> String {
    if team_spread == 0.0 {
        "PK".to_string()
    } else {
        format!("{:+.1}", team_spread)
    }
}

fn ou_text(total: i64, over_under: Option<f64>) -> String {
    let Some(line) = over_under else {
        return "No line".to_string();
    };
    let total_f = total as f64;
    if total_f > line {
        format!("Over ({} > {:.1})", total, line)
    } else if total_f < line {
        format!("Under ({} < {:.1})", total, line)
    } else {
        format!("Push ({} = {:.1})", total, line)
    }
}

/// One row per game with scores and a spread, in input order.
pub fn game_log(games: &[Game], team: &str) -> GameLog {
    let entries = games
        .iter()
        .filter_map(|game| {
            let graded = grade_game(game, team)?;
            let result = if graded.won {
                "W"
            } else if graded.team_points == graded.opponent_points {
                "T"
            } else {
                "L"
            };
            Some(GameLogEntry {
                opponent: game.team_name(graded.side.opposite()).to_string(),
                location: match graded.side {
                    TeamSide::Home => "vs",
                    TeamSide::Away => "@",
                },
                result: format!("{} {}-{}", result, graded.team_points, graded.opponent_points),
                spread: spread_text(graded.team_spread),
                ats_result: match graded.ats {
                    AtsResult::Covered => "Covered",
                    AtsResult::Push => "Push",
                    AtsResult::NotCovered => "Did not cover",
                },
                over_under: game.over_under(),
                ou_result: ou_text(graded.team_points + graded.opponent_points, game.over_under()),
                week: game.week,
                season: game.season,
            })
        })
        .collect();

    GameLog {
        team: team.to_string(),
        summary: aggregate(games, team),
        games: entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BettingLine;

    fn game(home: &str, away: &str, hp: i64, ap: i64, spread: f64, total: Option<f64>, week: i64) -> Game {
        Game {
            season: Some(2023),
            week: Some(week),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: Some(hp),
            away_points: Some(ap),
            lines: vec![BettingLine {
                spread: Some(spread),
                over_under: total,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_game_log_rows() {
        let games = vec![
            game("Clemson", "Duke", 7, 28, -12.5, Some(52.5), 1),
            game("Florida State", "Clemson", 31, 24, 2.5, Some(55.0), 4),
            game("Clemson", "Miami", 31, 24, -7.0, Some(45.0), 7),
            game("Clemson", "Furman", 35, 0, 0.0, None, 2),
        ];
        let log = game_log(&games, "Clemson");
        assert_eq!(log.games.len(), 4);

        let duke = &log.games[0];
        assert_eq!(duke.opponent, "Duke");
        assert_eq!(duke.location, "vs");
        assert_eq!(duke.result, "L 7-28");
        assert_eq!(duke.spread, "-12.5");
        assert_eq!(duke.ats_result, "Did not cover");
        assert_eq!(duke.ou_result, "Under (35 < 52.5)");

        let fsu = &log.games[1];
        assert_eq!(fsu.location, "@");
        assert_eq!(fsu.spread, "-2.5");
        assert_eq!(fsu.result, "L 24-31");
        assert_eq!(fsu.ou_result, "Push (55 = 55.0)");

        let miami = &log.games[2];
        assert_eq!(miami.ats_result, "Push");
        assert_eq!(miami.spread, "-7.0");
        assert_eq!(miami.ou_result, "Over (55 > 45.0)");

        let furman = &log.games[3];
        assert_eq!(furman.spread, "PK");
        assert_eq!(furman.ats_result, "Covered");
        assert_eq!(furman.ou_result, "No line");
        assert_eq!(furman.week, Some(2));

        assert_eq!(log.summary.total_games, 4);
        assert_eq!(log.summary.ats_pushes, 1);
    }

    #[test]
    fn test_underdog_spread_text_is_signed() {
        let games = vec![game("Kansas", "Texas", 14, 40, 10.5, None, 3)];
        let log = game_log(&games, "Kansas");
        assert_eq!(log.games[0].spread, "+10.5");
    }
}
