// Shared models for college football game, line and ranking data
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::coerce::{lenient_f64, lenient_i64, lenient_string, null_as_default};
use crate::utils::matching::resolve_side;

// ============================================================================
// Team Side
// ============================================================================

/// Which side of a game a team is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opposite(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }
}

// ============================================================================
// Team Info
// ============================================================================

/// Richer team identity attached to a game (`homeTeamInfo` / `awayTeamInfo`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    #[serde(default, alias = "teamId", deserialize_with = "lenient_i64")]
    pub team_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub school: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub abbreviation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conference: Option<String>,
}

// ============================================================================
// Betting Line
// ============================================================================

/// One sportsbook's line for a game.
///
/// `spread` is quoted from the home team's perspective: negative means the
/// home team is favored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BettingLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub provider: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub spread: Option<f64>,
    #[serde(default, alias = "spreadOpen", deserialize_with = "lenient_f64")]
    pub spread_open: Option<f64>,
    #[serde(default, alias = "overUnder", deserialize_with = "lenient_f64")]
    pub over_under: Option<f64>,
    #[serde(default, alias = "overUnderOpen", deserialize_with = "lenient_f64")]
    pub over_under_open: Option<f64>,
    #[serde(default, alias = "moneylineHome", deserialize_with = "lenient_i64")]
    pub moneyline_home: Option<i64>,
    #[serde(default, alias = "moneylineAway", deserialize_with = "lenient_i64")]
    pub moneyline_away: Option<i64>,
}

// ============================================================================
// Game
// ============================================================================

/// Largest single-team score accepted as real data
pub const MAX_GAME_POINTS: i64 = 500;

/// A game record as delivered by the data-fetch layer.
///
/// Field names are accepted in snake_case or GraphQL camelCase. Numeric
/// fields are coerced leniently; anything unusable becomes `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub season: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub week: Option<i64>,
    #[serde(default, alias = "startDate", deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: Option<String>,

    #[serde(default, alias = "homeTeam", deserialize_with = "null_as_default")]
    pub home_team: String,
    #[serde(default, alias = "awayTeam", deserialize_with = "null_as_default")]
    pub away_team: String,
    #[serde(default, alias = "homeTeamInfo")]
    pub home_team_info: Option<TeamInfo>,
    #[serde(default, alias = "awayTeamInfo")]
    pub away_team_info: Option<TeamInfo>,

    #[serde(default, alias = "homePoints", deserialize_with = "lenient_i64")]
    pub home_points: Option<i64>,
    #[serde(default, alias = "awayPoints", deserialize_with = "lenient_i64")]
    pub away_points: Option<i64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub lines: Vec<BettingLine>,

    #[serde(default, alias = "homeStartElo", deserialize_with = "lenient_f64")]
    pub home_start_elo: Option<f64>,
    #[serde(default, alias = "awayStartElo", deserialize_with = "lenient_f64")]
    pub away_start_elo: Option<f64>,
    #[serde(default, alias = "homePostgameWinProb", deserialize_with = "lenient_f64")]
    pub home_postgame_win_prob: Option<f64>,
    #[serde(default, alias = "awayPostgameWinProb", deserialize_with = "lenient_f64")]
    pub away_postgame_win_prob: Option<f64>,
}

/// The fields every betting calculation needs, pulled from a game once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinedResult {
    pub home_points: i64,
    pub away_points: i64,
    pub spread: f64,
    /// O/U from the first line; `None` when missing or zero
    pub over_under: Option<f64>,
}

impl LinedResult {
    /// Home points minus away points
    pub fn margin(&self) -> i64 {
        self.home_points - self.away_points
    }

    pub fn total(&self) -> i64 {
        self.home_points + self.away_points
    }
}

impl Game {
    /// First line only; no averaging across sportsbooks.
    pub fn first_line(&self) -> Option<&BettingLine> {
        self.lines.first()
    }

    pub fn spread(&self) -> Option<f64> {
        self.first_line().and_then(|l| l.spread)
    }

    /// The first line's O/U when present and non-zero.
    pub fn over_under(&self) -> Option<f64> {
        self.first_line()
            .and_then(|l| l.over_under)
            .filter(|t| *t != 0.0)
    }

    /// Both final scores, if present and within `0..=MAX_GAME_POINTS`.
    /// An out-of-range score is treated as missing.
    pub fn scores(&self) -> Option<(i64, i64)> {
        let plausible = |p: Option<i64>| p.filter(|p| (0..=MAX_GAME_POINTS).contains(p));
        Some((plausible(self.home_points)?, plausible(self.away_points)?))
    }

    pub fn has_scores(&self) -> bool {
        self.scores().is_some()
    }

    /// Scores plus the first line's spread; `None` makes the game ineligible
    /// for every betting calculation.
    pub fn lined_result(&self) -> Option<LinedResult> {
        let (home_points, away_points) = self.scores()?;
        Some(LinedResult {
            home_points,
            away_points,
            spread: self.spread()?,
            over_under: self.over_under(),
        })
    }

    /// Final: both scores present and status absent or `completed`.
    pub fn is_final(&self) -> bool {
        self.has_scores()
            && self
                .status
                .as_deref()
                .map_or(true, |s| s.eq_ignore_ascii_case("completed"))
    }

    /// Side of `team` in this game (see `utils::matching::resolve_side`).
    pub fn side_of(&self, team: &str) -> TeamSide {
        resolve_side(team, &self.home_team)
    }

    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    pub fn team_info(&self, side: TeamSide) -> Option<&TeamInfo> {
        match side {
            TeamSide::Home => self.home_team_info.as_ref(),
            TeamSide::Away => self.away_team_info.as_ref(),
        }
    }

    /// `(team points, opponent points)` from `side`'s perspective.
    pub fn points_for(&self, side: TeamSide) -> Option<(i64, i64)> {
        let (home, away) = self.scores()?;
        Some(match side {
            TeamSide::Home => (home, away),
            TeamSide::Away => (away, home),
        })
    }

    /// Parsed `start_date`. Accepts RFC 3339, naive date-times and plain dates (UTC assumed).
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.start_date.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

// ============================================================================
// Rankings
// ============================================================================

/// One team's position in one poll for one week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub poll: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rank: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub school: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub conference: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub points: Option<f64>,
    #[serde(default, alias = "firstPlaceVotes", deserialize_with = "lenient_i64")]
    pub first_place_votes: Option<i64>,
}
