//! Team performance: splits, streaks, season summary and schedule strength.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Game, TeamSide};
use crate::utils::stats::{per_game, percentage};

/// Margin at or below which a game is "close" for streak analysis
pub const CLOSE_MARGIN: i64 = 7;
/// Margin at or above which a game is a blowout for streak analysis
pub const BLOWOUT_MARGIN: i64 = 21;

const INDEPENDENT_LABELS: [&str; 2] = ["fbs independents", "independent"];

/// One final game from the team's side
#[derive(Debug, Clone, Copy)]
struct TeamGame<'a> {
    game: &'a Game,
    side: TeamSide,
    points_for: i64,
    points_against: i64,
}

impl<'a> TeamGame<'a> {
    fn won(&self) -> bool {
        self.points_for > self.points_against
    }

    fn margin(&self) -> i64 {
        self.points_for - self.points_against
    }

    fn opponent(&self) -> &'a str {
        self.game.team_name(self.side.opposite())
    }

    fn conference(&self, side: TeamSide) -> Option<&'a str> {
        self.game
            .team_info(side)
            .and_then(|info| info.conference.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    /// Both conferences known, equal, and not an independent label.
    fn is_conference_game(&self) -> bool {
        match (self.conference(self.side), self.conference(self.side.opposite())) {
            (Some(ours), Some(theirs)) => {
                let ours = ours.to_lowercase();
                ours == theirs.to_lowercase() && !INDEPENDENT_LABELS.contains(&ours.as_str())
            }
            _ => false,
        }
    }
}

fn team_games<'a>(games: &'a [Game], team: &str) -> Vec<TeamGame<'a>> {
    games
        .iter()
        .filter(|g| g.is_final())
        .filter_map(|game| {
            let side = game.side_of(team);
            let (points_for, points_against) = game.points_for(side)?;
            Some(TeamGame { game, side, points_for, points_against })
        })
        .collect()
}

// ============================================================================
// Splits
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct SplitTally {
    wins: usize,
    losses: usize,
    points_for: i64,
    points_against: i64,
}

impl SplitTally {
    fn add(&mut self, g: &TeamGame<'_>) {
        if g.won() {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.points_for += g.points_for;
        self.points_against += g.points_against;
    }

    fn stats(&self) -> SplitStats {
        let games = self.wins + self.losses;
        SplitStats {
            games,
            record: format!("{}-{}", self.wins, self.losses),
            win_percentage: percentage(self.wins, games),
            points_per_game: per_game(self.points_for as f64, games),
            points_allowed_per_game: per_game(self.points_against as f64, games),
            point_differential: per_game((self.points_for - self.points_against) as f64, games),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitStats {
    pub games: usize,
    pub record: String,
    pub win_percentage: f64,
    pub points_per_game: f64,
    pub points_allowed_per_game: f64,
    /// Per game
    pub point_differential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSplits {
    pub team: String,
    pub home_performance: SplitStats,
    pub away_performance: SplitStats,
    pub conference_performance: SplitStats,
    pub non_conference_performance: SplitStats,
}

pub fn performance_splits(games: &[Game], team: &str) -> AnalysisResult<PerformanceSplits> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("performance splits"));
    }

    let mut home = SplitTally::default();
    let mut away = SplitTally::default();
    let mut conference = SplitTally::default();
    let mut non_conference = SplitTally::default();

    for g in team_games(games, team) {
        match g.side {
            TeamSide::Home => home.add(&g),
            TeamSide::Away => away.add(&g),
        }
        if g.is_conference_game() {
            conference.add(&g);
        } else {
            non_conference.add(&g);
        }
    }

    Ok(PerformanceSplits {
        team: team.to_string(),
        home_performance: home.stats(),
        away_performance: away.stats(),
        conference_performance: conference.stats(),
        non_conference_performance: non_conference.stats(),
    })
}

// ============================================================================
// Streaks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakAnalysis {
    pub team: String,
    /// `"W3"`, `"L1"`
    pub current_streak: String,
    pub close_game_record: String,
    pub close_game_percentage: f64,
    pub blowout_record: String,
    pub blowout_percentage: f64,
    pub total_games_analyzed: usize,
}

/// Most recent first; undated games sort last, ties keep input order.
fn sort_most_recent_first(games: &mut [TeamGame<'_>]) {
    games.sort_by(|a, b| match (a.game.start_time(), b.game.start_time()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

pub fn streak_analysis(games: &[Game], team: &str) -> AnalysisResult<StreakAnalysis> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("streak analysis"));
    }

    let mut finals = team_games(games, team);
    if finals.is_empty() {
        return Err(AnalysisError::InsufficientData("No completed games found".to_string()));
    }
    sort_most_recent_first(&mut finals);

    let latest_won = finals[0].won();
    let streak = finals.iter().take_while(|g| g.won() == latest_won).count();

    let (mut close_w, mut close_l, mut blow_w, mut blow_l) = (0usize, 0usize, 0usize, 0usize);
    for g in &finals {
        let margin = g.margin().abs();
        if margin <= CLOSE_MARGIN {
            if g.won() {
                close_w += 1;
            } else {
                close_l += 1;
            }
        }
        if margin >= BLOWOUT_MARGIN {
            if g.won() {
                blow_w += 1;
            } else {
                blow_l += 1;
            }
        }
    }

    Ok(StreakAnalysis {
        team: team.to_string(),
        current_streak: format!("{}{}", if latest_won { "W" } else { "L" }, streak),
        close_game_record: format!("{}-{}", close_w, close_l),
        close_game_percentage: percentage(close_w, close_w + close_l),
        blowout_record: format!("{}-{}", blow_w, blow_l),
        blowout_percentage: percentage(blow_w, blow_w + blow_l),
        total_games_analyzed: finals.len(),
    })
}

// ============================================================================
// Season summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamGameSummary {
    pub opponent: String,
    /// Team score first
    pub score: String,
    /// `"vs"` home, `"@"` away
    pub location: &'static str,
    pub margin: i64,
    pub team_points: i64,
    pub week: Option<i64>,
    pub date: Option<String>,
}

impl TeamGameSummary {
    fn from_game(g: &TeamGame<'_>) -> Self {
        Self {
            opponent: g.opponent().to_string(),
            score: format!("{}-{}", g.points_for, g.points_against),
            location: match g.side {
                TeamSide::Home => "vs",
                TeamSide::Away => "@",
            },
            margin: g.margin(),
            team_points: g.points_for,
            week: g.game.week,
            date: g.game.start_date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonScoring {
    pub points_per_game: f64,
    pub points_allowed_per_game: f64,
    pub point_differential_per_game: f64,
    pub total_points_for: i64,
    pub total_points_against: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonNotableGames {
    pub best_win: Option<TeamGameSummary>,
    pub worst_loss: Option<TeamGameSummary>,
    pub highest_scoring: Option<TeamGameSummary>,
    pub lowest_scoring: Option<TeamGameSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonSummary {
    pub team: String,
    pub season_record: String,
    pub win_percentage: f64,
    pub games_played: usize,
    pub scoring: SeasonScoring,
    pub notable_games: SeasonNotableGames,
    pub performance_splits: PerformanceSplits,
    pub streak_analysis: StreakAnalysis,
}

/// First game wins ties in every "best/worst" pick.
fn pick<'a, F>(games: &[TeamGame<'a>], better: F) -> Option<TeamGameSummary>
where
    F: Fn(&TeamGame<'a>, &TeamGame<'a>) -> bool,
{
    let mut best: Option<&TeamGame<'a>> = None;
    for g in games {
        if best.map_or(true, |b| better(g, b)) {
            best = Some(g);
        }
    }
    best.map(TeamGameSummary::from_game)
}

pub fn season_summary(games: &[Game], team: &str) -> AnalysisResult<SeasonSummary> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("season summary"));
    }

    let finals = team_games(games, team);
    if finals.is_empty() {
        return Err(AnalysisError::InsufficientData("No completed games found".to_string()));
    }

    let played = finals.len();
    let wins = finals.iter().filter(|g| g.won()).count();
    let points_for: i64 = finals.iter().map(|g| g.points_for).sum();
    let points_against: i64 = finals.iter().map(|g| g.points_against).sum();

    let (won, lost): (Vec<TeamGame<'_>>, Vec<TeamGame<'_>>) =
        finals.iter().copied().partition(|g| g.won());

    Ok(SeasonSummary {
        team: team.to_string(),
        season_record: format!("{}-{}", wins, played - wins),
        win_percentage: percentage(wins, played),
        games_played: played,
        scoring: SeasonScoring {
            points_per_game: per_game(points_for as f64, played),
            points_allowed_per_game: per_game(points_against as f64, played),
            point_differential_per_game: per_game((points_for - points_against) as f64, played),
            total_points_for: points_for,
            total_points_against: points_against,
        },
        notable_games: SeasonNotableGames {
            best_win: pick(&won, |g, b| g.margin() > b.margin()),
            worst_loss: pick(&lost, |g, b| g.margin() < b.margin()),
            highest_scoring: pick(&finals, |g, b| g.points_for > b.points_for),
            lowest_scoring: pick(&finals, |g, b| g.points_for < b.points_for),
        },
        performance_splits: performance_splits(games, team)?,
        streak_analysis: streak_analysis(games, team)?,
    })
}

// ============================================================================
// Strength of schedule
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrengthOfSchedule {
    pub team: String,
    pub total_opponents: usize,
    pub conference_games: usize,
    pub non_conference_games: usize,
    /// Distinct known opponent conferences
    pub conferences_faced: usize,
    pub opponents: Vec<String>,
}

/// Schedule breakdown over completed games (status `completed` or absent).
pub fn strength_of_schedule(games: &[Game], team: &str) -> AnalysisResult<StrengthOfSchedule> {
    if games.is_empty() {
        return Err(AnalysisError::NoGames("strength of schedule"));
    }

    let completed: Vec<TeamGame<'_>> = games
        .iter()
        .filter(|g| {
            g.status
                .as_deref()
                .map_or(true, |s| s.eq_ignore_ascii_case("completed"))
        })
        .map(|game| {
            let side = game.side_of(team);
            let (points_for, points_against) = game.points_for(side).unwrap_or((0, 0));
            TeamGame { game, side, points_for, points_against }
        })
        .collect();

    let conference_games = completed.iter().filter(|g| g.is_conference_game()).count();
    let conferences: BTreeSet<String> = completed
        .iter()
        .filter_map(|g| g.conference(g.side.opposite()))
        .map(str::to_string)
        .collect();

    Ok(StrengthOfSchedule {
        team: team.to_string(),
        total_opponents: completed.len(),
        conference_games,
        non_conference_games: completed.len() - conference_games,
        conferences_faced: conferences.len(),
        opponents: completed.iter().map(|g| g.opponent().to_string()).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamInfo;

    fn info(school: &str, conference: &str) -> Option<TeamInfo> {
        Some(TeamInfo {
            team_id: None,
            school: Some(school.to_string()),
            abbreviation: None,
            conference: Some(conference.to_string()),
        })
    }

    fn game(date: &str, home: (&str, &str), away: (&str, &str), hp: i64, ap: i64) -> Game {
        Game {
            week: Some(1),
            start_date: Some(date.to_string()),
            status: Some("completed".to_string()),
            home_team: home.0.to_string(),
            away_team: away.0.to_string(),
            home_team_info: info(home.0, home.1),
            away_team_info: info(away.0, away.1),
            home_points: Some(hp),
            away_points: Some(ap),
            ..Default::default()
        }
    }

    // Input deliberately not in date order
    fn season() -> Vec<Game> {
        vec![
            game("2023-09-02T19:30:00Z", ("Notre Dame", "FBS Independents"), ("Navy", "American Athletic"), 42, 3),
            game("2023-10-14T23:30:00Z", ("Penn State", "Big Ten"), ("UMass", "FBS Independents"), 63, 0),
            game("2023-09-23T23:30:00Z", ("Penn State", "Big Ten"), ("Iowa", "Big Ten"), 31, 0),
            game("2023-10-21T16:00:00Z", ("Ohio State", "Big Ten"), ("Penn State", "Big Ten"), 20, 12),
            game("2023-10-28T19:30:00Z", ("Indiana", "Big Ten"), ("Penn State", "Big Ten"), 24, 33),
            game("2023-11-04T16:00:00Z", ("Penn State", "Big Ten"), ("Maryland", "Big Ten"), 51, 15),
            game("2023-09-16T19:30:00Z", ("Illinois", "Big Ten"), ("Penn State", "Big Ten"), 13, 30),
        ]
    }

    fn penn_state() -> Vec<Game> {
        season().into_iter().skip(1).collect()
    }

    #[test]
    fn test_performance_splits() {
        let splits = performance_splits(&penn_state(), "Penn State").unwrap();
        assert_eq!(splits.home_performance.record, "3-0");
        assert_eq!(splits.away_performance.record, "2-1");
        assert_eq!(splits.conference_performance.games, 5);
        assert_eq!(splits.non_conference_performance.record, "1-0");
        assert_eq!(splits.home_performance.points_per_game, 48.3);
        assert_eq!(splits.away_performance.points_allowed_per_game, 19.0);
    }

    #[test]
    fn test_independents_are_never_conference_games() {
        let games = vec![game("2023-09-02", ("Notre Dame", "FBS Independents"), ("Army", "FBS Independents"), 20, 6)];
        let splits = performance_splits(&games, "Notre Dame").unwrap();
        assert_eq!(splits.conference_performance.games, 0);
        assert_eq!(splits.non_conference_performance.games, 1);
    }

    #[test]
    fn test_streak_uses_date_order() {
        let streak = streak_analysis(&penn_state(), "Penn State").unwrap();
        // Most recent: Maryland W, Indiana W, Ohio State L
        assert_eq!(streak.current_streak, "W2");
        assert_eq!(streak.total_games_analyzed, 6);
        // Close (<= 7): none; Ohio State loss was by 8
        assert_eq!(streak.close_game_record, "0-0");
        assert_eq!(streak.close_game_percentage, 0.0);
        // Blowouts (>= 21): UMass, Iowa, Maryland
        assert_eq!(streak.blowout_record, "3-0");
    }

    #[test]
    fn test_close_and_blowout_counts_cover_all_games() {
        let games = vec![
            game("2023-11-04", ("A", "X"), ("B", "X"), 20, 14), // W by 6
            game("2023-10-28", ("C", "X"), ("A", "X"), 21, 17), // L by 4
            game("2023-10-21", ("A", "X"), ("D", "X"), 35, 10), // W by 25
        ];
        let streak = streak_analysis(&games, "A").unwrap();
        assert_eq!(streak.current_streak, "W1");
        assert_eq!(streak.close_game_record, "1-1");
        assert_eq!(streak.blowout_record, "1-0");
    }

    #[test]
    fn test_season_summary() {
        let summary = season_summary(&penn_state(), "Penn State").unwrap();
        assert_eq!(summary.season_record, "5-1");
        assert_eq!(summary.win_percentage, 83.3);
        assert_eq!(summary.scoring.total_points_for, 220);
        assert_eq!(summary.scoring.total_points_against, 72);
        assert_eq!(summary.scoring.points_per_game, 36.7);

        let notable = &summary.notable_games;
        assert_eq!(notable.best_win.as_ref().unwrap().opponent, "UMass");
        assert_eq!(notable.worst_loss.as_ref().unwrap().opponent, "Ohio State");
        assert_eq!(notable.worst_loss.as_ref().unwrap().location, "@");
        assert_eq!(notable.highest_scoring.as_ref().unwrap().team_points, 63);
        assert_eq!(notable.lowest_scoring.as_ref().unwrap().team_points, 12);
        assert_eq!(summary.streak_analysis.current_streak, "W2");
    }

    #[test]
    fn test_summary_without_completed_games() {
        let mut games = penn_state();
        for g in &mut games {
            g.status = Some("scheduled".to_string());
        }
        assert!(matches!(
            season_summary(&games, "Penn State"),
            Err(AnalysisError::InsufficientData(_))
        ));
        assert_eq!(
            season_summary(&[], "Penn State"),
            Err(AnalysisError::NoGames("season summary"))
        );
    }

    #[test]
    fn test_strength_of_schedule() {
        let sos = strength_of_schedule(&penn_state(), "Penn State").unwrap();
        assert_eq!(sos.total_opponents, 6);
        assert_eq!(sos.conference_games, 5);
        assert_eq!(sos.non_conference_games, 1);
        assert_eq!(sos.conferences_faced, 2);
        assert_eq!(sos.opponents[0], "UMass");
    }
}
