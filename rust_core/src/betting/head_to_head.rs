//! Head-to-head betting history between two teams.

use serde::Serialize;
use tracing::debug;

use super::record::{aggregate, BettingRecord};
use crate::models::Game;
use crate::utils::matching::is_matchup;

/// Meetings included in the recent record unless the caller says otherwise
pub const RECENT_MEETINGS: usize = 5;

/// Record over the trailing meetings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRecord {
    /// Meetings in the window (matching games, complete or not)
    pub games: usize,
    #[serde(flatten)]
    pub record: BettingRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadToHeadReport {
    /// Every matching meeting, including ones without scores or lines
    pub total_games: usize,
    pub matchup: String,
    pub all_time_record: BettingRecord,
    pub recent_record: RecentRecord,
}

/// Head-to-head result. With no meetings only `total_games` and a note are emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeadToHead {
    NoGames { total_games: usize, note: String },
    Found(HeadToHeadReport),
}

impl HeadToHead {
    pub fn total_games(&self) -> usize {
        match self {
            HeadToHead::NoGames { total_games, .. } => *total_games,
            HeadToHead::Found(report) => report.total_games,
        }
    }

    pub fn report(&self) -> Option<&HeadToHeadReport> {
        match self {
            HeadToHead::Found(report) => Some(report),
            HeadToHead::NoGames { .. } => None,
        }
    }
}

/// Meetings between `team1` and `team2`, from `team1`'s side.
pub fn head_to_head(games: &[Game], team1: &str, team2: &str) -> HeadToHead {
    head_to_head_with_window(games, team1, team2, RECENT_MEETINGS)
}

/// As [`head_to_head`], with the recent window set to the last `recent` meetings
/// in input order. Pass games oldest first for "recent" to mean most recent.
pub fn head_to_head_with_window(
    games: &[Game],
    team1: &str,
    team2: &str,
    recent: usize,
) -> HeadToHead {
    let meetings: Vec<&Game> = games
        .iter()
        .filter(|g| is_matchup(team1, team2, &g.home_team, &g.away_team))
        .collect();

    if meetings.is_empty() {
        debug!(team1, team2, "No head-to-head games");
        return HeadToHead::NoGames {
            total_games: 0,
            note: "No head-to-head games found".to_string(),
        };
    }

    let start = meetings.len().saturating_sub(recent);
    let recent_games = &meetings[start..];

    HeadToHead::Found(HeadToHeadReport {
        total_games: meetings.len(),
        matchup: format!("{} vs {}", team1, team2),
        all_time_record: aggregate(meetings.iter().copied(), team1),
        recent_record: RecentRecord {
            games: recent_games.len(),
            record: aggregate(recent_games.iter().copied(), team1),
        },
    })
}
