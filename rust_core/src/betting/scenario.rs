//! Home/away x favorite/underdog scenarios.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalysisError;
use crate::models::{Game, TeamSide};

/// Betting scenario from the team of interest's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    RoadUnderdog,
    HomeFavorite,
    RoadFavorite,
    HomeUnderdog,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::RoadUnderdog,
        Scenario::HomeFavorite,
        Scenario::RoadFavorite,
        Scenario::HomeUnderdog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::RoadUnderdog => "road_underdog",
            Scenario::HomeFavorite => "home_favorite",
            Scenario::RoadFavorite => "road_favorite",
            Scenario::HomeUnderdog => "home_underdog",
        }
    }

    /// Whether a team on `side` with `effective` spread falls in this scenario.
    /// A pick'em (`effective == 0`) matches nothing.
    pub fn matches(&self, side: TeamSide, effective: f64) -> bool {
        match self {
            Scenario::RoadUnderdog => side == TeamSide::Away && effective > 0.0,
            Scenario::HomeFavorite => side == TeamSide::Home && effective < 0.0,
            Scenario::RoadFavorite => side == TeamSide::Away && effective < 0.0,
            Scenario::HomeUnderdog => side == TeamSide::Home && effective > 0.0,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalysisError::InvalidInput(format!("Unknown scenario: {}", s)))
    }
}

/// The team's side and its spread from that side (`spread` at home, `-spread` away).
///
/// `None` unless the game has both scores and a spread on the first line.
pub fn effective_spread(game: &Game, team: &str) -> Option<(TeamSide, f64)> {
    let result = game.lined_result()?;
    let side = game.side_of(team);
    Some(match side {
        TeamSide::Home => (side, result.spread),
        TeamSide::Away => (side, -result.spread),
    })
}

/// Games matching `scenario`. `None` returns every game unchanged.
pub fn filter_by_scenario<'a>(
    games: &'a [Game],
    team: &str,
    scenario: Option<Scenario>,
) -> Vec<&'a Game> {
    match scenario {
        None => games.iter().collect(),
        Some(scenario) => games
            .iter()
            .filter(|g| {
                effective_spread(g, team).map_or(false, |(side, eff)| scenario.matches(side, eff))
            })
            .collect(),
    }
}

/// String-keyed variant; an unknown or absent name applies no filter.
pub fn filter_by_scenario_name<'a>(
    games: &'a [Game],
    team: &str,
    scenario: Option<&str>,
) -> Vec<&'a Game> {
    let parsed = scenario.and_then(|s| s.parse::<Scenario>().ok());
    filter_by_scenario(games, team, parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BettingLine;

    fn game(home: &str, away: &str, spread: Option<f64>) -> Game {
        Game {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: Some(24),
            away_points: Some(17),
            lines: vec![BettingLine { spread, ..Default::default() }],
            ..Default::default()
        }
    }

    fn slate() -> Vec<Game> {
        vec![
            game("Oregon", "Utah", Some(-6.5)),      // home favorite
            game("USC", "Oregon", Some(-3.0)),       // road underdog
            game("Stanford", "Oregon", Some(14.0)),  // road favorite
            game("Oregon", "Washington", Some(2.5)), // home underdog
            game("Oregon", "UCLA", Some(0.0)),       // pick'em
            game("Oregon", "Cal", None),             // no spread
        ]
    }

    #[test]
    fn test_each_scenario_matches_one_game() {
        let games = slate();
        for scenario in Scenario::ALL {
            let matched = filter_by_scenario(&games, "Oregon", Some(scenario));
            assert_eq!(matched.len(), 1, "{} should match exactly one game", scenario);
        }
        let road_dog = filter_by_scenario(&games, "Oregon", Some(Scenario::RoadUnderdog));
        assert_eq!(road_dog[0].home_team, "USC");
    }

    #[test]
    fn test_pick_em_matches_no_scenario() {
        let games = vec![game("Oregon", "UCLA", Some(0.0))];
        for scenario in Scenario::ALL {
            assert!(filter_by_scenario(&games, "Oregon", Some(scenario)).is_empty());
        }
    }

    #[test]
    fn test_unknown_or_missing_scenario_returns_input() {
        let games = slate();
        assert_eq!(filter_by_scenario_name(&games, "Oregon", None).len(), games.len());
        assert_eq!(
            filter_by_scenario_name(&games, "Oregon", Some("neutral_site")).len(),
            games.len()
        );
        assert_eq!(filter_by_scenario_name(&games, "Oregon", Some("home_favorite")).len(), 1);
    }

    #[test]
    fn test_scenario_parse() {
        assert_eq!("road_underdog".parse::<Scenario>(), Ok(Scenario::RoadUnderdog));
        assert_eq!(" HOME_FAVORITE ".parse::<Scenario>(), Ok(Scenario::HomeFavorite));
        assert!("underdog".parse::<Scenario>().is_err());
    }
}
