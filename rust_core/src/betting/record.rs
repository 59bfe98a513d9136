//! Record aggregation: ATS, O/U and straight-up tallies over a game collection.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::outcomes::{grade_game, AtsResult};
use crate::models::Game;
use crate::utils::stats::percentage;

/// A win/loss record. `wins + losses` is always the number of games considered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub wins: usize,
    pub losses: usize,
    /// `"W-L"`
    pub formatted: String,
    /// `round(wins / total * 100, 1)`, `0.0` for an empty record
    pub percentage: f64,
}

impl Record {
    pub fn from_counts(wins: usize, total: usize) -> Self {
        let wins = wins.min(total);
        let losses = total - wins;
        Self {
            wins,
            losses,
            formatted: format!("{}-{}", wins, losses),
            percentage: percentage(wins, total),
        }
    }

    pub fn empty() -> Self {
        Self::from_counts(0, 0)
    }

    pub fn total(&self) -> usize {
        self.wins + self.losses
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::empty()
    }
}

/// ATS, O/U and SU records for one team over one game collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingRecord {
    pub ats: Record,
    /// Wins are overs; every other counted game is a loss
    pub ou: Record,
    pub su: Record,
    pub total_games: usize,
    /// Games landing exactly on the spread. Counted as ATS losses.
    pub ats_pushes: usize,
}

impl BettingRecord {
    pub fn empty() -> Self {
        Self {
            ats: Record::empty(),
            ou: Record::empty(),
            su: Record::empty(),
            total_games: 0,
            ats_pushes: 0,
        }
    }
}

impl Default for BettingRecord {
    fn default() -> Self {
        Self::empty()
    }
}

/// Fold `games` into ATS, O/U and SU records from `team`'s side.
///
/// Games without both scores or without a spread on the first line are skipped
/// entirely. A missing or zero O/U line only keeps the game out of the overs
/// count, so it lands on the losing side of the O/U record.
pub fn aggregate<'a, I>(games: I, team: &str) -> BettingRecord
where
    I: IntoIterator<Item = &'a Game>,
{
    let mut total = 0usize;
    let mut ats_wins = 0usize;
    let mut ats_pushes = 0usize;
    let mut overs = 0usize;
    let mut su_wins = 0usize;
    let mut skipped = 0usize;

    for game in games {
        let Some(graded) = grade_game(game, team) else {
            skipped += 1;
            continue;
        };
        total += 1;
        match graded.ats {
            AtsResult::Covered => ats_wins += 1,
            AtsResult::Push => ats_pushes += 1,
            AtsResult::NotCovered => {}
        }
        if graded.over == Some(true) {
            overs += 1;
        }
        if graded.won {
            su_wins += 1;
        }
    }

    if skipped > 0 {
        debug!(team, skipped, counted = total, "Skipped games without scores or spread");
    }

    BettingRecord {
        ats: Record::from_counts(ats_wins, total),
        ou: Record::from_counts(overs, total),
        su: Record::from_counts(su_wins, total),
        total_games: total,
        ats_pushes,
    }
}
