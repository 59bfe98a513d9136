//! Poll ranking analytics: week-over-week movement, volatility, multi-week
//! trends and cross-poll consensus.
//!
//! Teams are tracked per (poll, school) so that AP and Coaches ranks never mix.
//! Entries without a rank are ignored.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::RankingEntry;
use crate::utils::stats::{mean, round_to, sample_stdev};

/// Poll name used when an entry carries none
pub const UNKNOWN_POLL: &str = "Unknown";
/// Standard deviation above which a team is volatile
pub const VOLATILE_STDEV: f64 = 3.0;
/// Standard deviation below which a team is stable
pub const STABLE_STDEV: f64 = 1.0;
/// Positions gained/lost before a team counts as rising/falling
pub const TREND_POSITIONS: i64 = 2;
/// Rank spread at or below which polls agree
pub const CONSENSUS_SPREAD: i64 = 2;
/// Rank spread at or above which polls disagree
pub const CONTROVERSIAL_SPREAD: i64 = 5;
/// Length of the strong-consensus list
pub const CONSENSUS_LIST_LEN: usize = 10;

type TeamKey = (String, String);

fn poll_name(entry: &RankingEntry) -> String {
    entry
        .poll
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_POLL.to_string())
}

/// (poll, school) -> rank for one week
fn rank_table(entries: &[RankingEntry]) -> BTreeMap<TeamKey, i64> {
    entries
        .iter()
        .filter_map(|e| {
            let rank = e.rank.filter(|r| *r > 0)?;
            Some(((poll_name(e), e.school.clone()), rank))
        })
        .collect()
}

// ============================================================================
// Movement
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mover {
    pub team: String,
    pub poll: String,
    pub previous_rank: i64,
    pub current_rank: i64,
    /// Positions moved, always positive
    pub movement: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntry {
    pub team: String,
    pub poll: String,
    pub current_rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedOut {
    pub team: String,
    pub poll: String,
    pub previous_rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct BiggestMovers {
    pub up: Vec<Mover>,
    pub down: Vec<Mover>,
    pub new_entries: Vec<NewEntry>,
    pub dropped_out: Vec<DroppedOut>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct StabilityMetrics {
    pub teams_unchanged: usize,
    pub average_movement: f64,
    pub total_movement: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingMovement {
    pub total_teams: usize,
    pub biggest_movers: BiggestMovers,
    pub stability_metrics: StabilityMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Week-over-week movement. Without previous rankings the movement sections are empty.
pub fn ranking_movement(
    current: &[RankingEntry],
    previous: Option<&[RankingEntry]>,
) -> AnalysisResult<RankingMovement> {
    if current.is_empty() {
        return Err(AnalysisError::MissingInput("current rankings".to_string()));
    }

    let mut movement = RankingMovement {
        total_teams: current.len(),
        biggest_movers: BiggestMovers::default(),
        stability_metrics: StabilityMetrics::default(),
        note: None,
    };

    let previous = match previous {
        Some(p) if !p.is_empty() => p,
        _ => {
            movement.note = Some("No previous rankings available for comparison".to_string());
            return Ok(movement);
        }
    };

    let now = rank_table(current);
    let before = rank_table(previous);
    let mut moves: Vec<i64> = Vec::new();
    let movers = &mut movement.biggest_movers;

    for ((poll, team), &current_rank) in &now {
        let Some(&previous_rank) = before.get(&(poll.clone(), team.clone())) else {
            movers.new_entries.push(NewEntry {
                team: team.clone(),
                poll: poll.clone(),
                current_rank,
            });
            continue;
        };
        // Positive = moved up
        let delta = previous_rank - current_rank;
        moves.push(delta.abs());
        let mover = Mover {
            team: team.clone(),
            poll: poll.clone(),
            previous_rank,
            current_rank,
            movement: delta.abs(),
        };
        match delta {
            0 => movement.stability_metrics.teams_unchanged += 1,
            d if d > 0 => movers.up.push(mover),
            _ => movers.down.push(mover),
        }
    }

    for ((poll, team), &previous_rank) in &before {
        if !now.contains_key(&(poll.clone(), team.clone())) {
            movers.dropped_out.push(DroppedOut {
                team: team.clone(),
                poll: poll.clone(),
                previous_rank,
            });
        }
    }

    movers
        .up
        .sort_by(|a, b| b.movement.cmp(&a.movement).then(a.current_rank.cmp(&b.current_rank)));
    movers
        .down
        .sort_by(|a, b| b.movement.cmp(&a.movement).then(a.current_rank.cmp(&b.current_rank)));
    movers.new_entries.sort_by_key(|e| e.current_rank);
    movers.dropped_out.sort_by_key(|e| e.previous_rank);

    let move_values: Vec<f64> = moves.iter().map(|m| *m as f64).collect();
    movement.stability_metrics.average_movement = mean(&move_values).map_or(0.0, |m| round_to(m, 1));
    movement.stability_metrics.total_movement = moves.iter().sum();

    Ok(movement)
}

// ============================================================================
// Volatility
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamVolatility {
    pub team: String,
    pub poll: String,
    pub volatility_score: f64,
    pub average_rank: f64,
    pub weeks_ranked: usize,
    pub best_rank: i64,
    pub worst_rank: i64,
    pub rank_range: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallVolatility {
    pub average_volatility: f64,
    pub max_volatility: f64,
    pub min_volatility: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingVolatility {
    pub weeks_analyzed: usize,
    pub teams_analyzed: usize,
    pub overall_volatility: OverallVolatility,
    pub most_volatile_teams: Vec<TeamVolatility>,
    pub most_stable_teams: Vec<TeamVolatility>,
}

/// Ranked weeks per team, in week order
fn ranks_by_team(history: &[Vec<RankingEntry>]) -> BTreeMap<TeamKey, Vec<i64>> {
    let mut by_team: BTreeMap<TeamKey, Vec<i64>> = BTreeMap::new();
    for week in history {
        for (key, rank) in rank_table(week) {
            by_team.entry(key).or_default().push(rank);
        }
    }
    by_team
}

/// Rank volatility across weeks (oldest first). Needs at least two weeks.
pub fn ranking_volatility(
    history: &[Vec<RankingEntry>],
    top_n: usize,
) -> AnalysisResult<RankingVolatility> {
    if history.len() < 2 {
        return Err(AnalysisError::InsufficientData(
            "Need at least 2 weeks of rankings for volatility analysis".to_string(),
        ));
    }

    let by_team = ranks_by_team(history);
    let mut scores = Vec::new();
    let mut volatile = Vec::new();
    let mut stable = Vec::new();

    for ((poll, team), ranks) in &by_team {
        let values: Vec<f64> = ranks.iter().map(|r| *r as f64).collect();
        let Some(stdev) = sample_stdev(&values) else {
            continue;
        };
        scores.push(stdev);

        let best = ranks.iter().copied().min().unwrap_or_default();
        let worst = ranks.iter().copied().max().unwrap_or_default();
        let entry = TeamVolatility {
            team: team.clone(),
            poll: poll.clone(),
            volatility_score: round_to(stdev, 2),
            average_rank: mean(&values).map_or(0.0, |m| round_to(m, 1)),
            weeks_ranked: ranks.len(),
            best_rank: best,
            worst_rank: worst,
            rank_range: worst - best,
        };
        if stdev > VOLATILE_STDEV {
            volatile.push(entry);
        } else if stdev < STABLE_STDEV {
            stable.push(entry);
        }
    }

    volatile.sort_by(|a, b| b.volatility_score.total_cmp(&a.volatility_score));
    stable.sort_by(|a, b| a.volatility_score.total_cmp(&b.volatility_score));
    volatile.truncate(top_n);
    stable.truncate(top_n);

    Ok(RankingVolatility {
        weeks_analyzed: history.len(),
        teams_analyzed: by_team.len(),
        overall_volatility: OverallVolatility {
            average_volatility: mean(&scores).map_or(0.0, |m| round_to(m, 2)),
            max_volatility: scores.iter().copied().reduce(f64::max).map_or(0.0, |m| round_to(m, 2)),
            min_volatility: scores.iter().copied().reduce(f64::min).map_or(0.0, |m| round_to(m, 2)),
        },
        most_volatile_teams: volatile,
        most_stable_teams: stable,
    })
}

// ============================================================================
// Trends
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTrend {
    pub team: String,
    pub poll: String,
    pub first_rank: i64,
    pub last_rank: i64,
    /// First rank minus last rank; positive = improving
    pub trend_value: i64,
    pub weeks_tracked: usize,
    pub best_rank: i64,
    pub worst_rank: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub total_rising: usize,
    pub total_falling: usize,
    pub total_consistent: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingTrends {
    pub weeks_analyzed: usize,
    pub rising_teams: Vec<TeamTrend>,
    pub falling_teams: Vec<TeamTrend>,
    pub most_consistent: Vec<TeamTrend>,
    pub summary: TrendSummary,
}

/// Rising/falling teams across weeks (oldest first). Needs at least three weeks,
/// and a team needs three ranked weeks to be classified.
pub fn ranking_trends(history: &[Vec<RankingEntry>], top_n: usize) -> AnalysisResult<RankingTrends> {
    if history.len() < 3 {
        return Err(AnalysisError::InsufficientData(
            "Need at least 3 weeks of rankings for trend analysis".to_string(),
        ));
    }

    let mut rising = Vec::new();
    let mut falling = Vec::new();
    let mut consistent = Vec::new();

    for ((poll, team), ranks) in ranks_by_team(history) {
        if ranks.len() < 3 {
            continue;
        }
        let first = ranks[0];
        let last = ranks[ranks.len() - 1];
        let trend = TeamTrend {
            team,
            poll,
            first_rank: first,
            last_rank: last,
            trend_value: first - last,
            weeks_tracked: ranks.len(),
            best_rank: ranks.iter().copied().min().unwrap_or(first),
            worst_rank: ranks.iter().copied().max().unwrap_or(first),
        };
        if trend.trend_value > TREND_POSITIONS {
            rising.push(trend);
        } else if trend.trend_value < -TREND_POSITIONS {
            falling.push(trend);
        } else {
            consistent.push(trend);
        }
    }

    rising.sort_by(|a, b| b.trend_value.cmp(&a.trend_value));
    falling.sort_by_key(|t| t.trend_value);
    consistent.sort_by_key(|t| t.last_rank);

    let summary = TrendSummary {
        total_rising: rising.len(),
        total_falling: falling.len(),
        total_consistent: consistent.len(),
    };
    rising.truncate(top_n);
    falling.truncate(top_n);
    consistent.truncate(top_n);

    Ok(RankingTrends {
        weeks_analyzed: history.len(),
        rising_teams: rising,
        falling_teams: falling,
        most_consistent: consistent,
        summary,
    })
}

// ============================================================================
// Poll consensus
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamConsensus {
    pub team: String,
    pub average_rank: f64,
    pub rank_spread: i64,
    pub poll_rankings: BTreeMap<String, i64>,
    pub polls_ranked_in: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsensusAnalysis {
    pub strong_consensus: Vec<TeamConsensus>,
    pub controversial_rankings: Vec<TeamConsensus>,
    pub teams_in_multiple_polls: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollConsensus {
    /// In first-seen order
    pub polls_found: Vec<String>,
    pub poll_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consensus_analysis: Option<ConsensusAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Agreement between polls for one week's rankings.
pub fn poll_consensus(rankings: &[RankingEntry], top_n: usize) -> AnalysisResult<PollConsensus> {
    if rankings.is_empty() {
        return Err(AnalysisError::MissingInput("rankings".to_string()));
    }

    let mut polls_found: Vec<String> = Vec::new();
    for entry in rankings {
        let poll = poll_name(entry);
        if !polls_found.contains(&poll) {
            polls_found.push(poll);
        }
    }

    if polls_found.len() < 2 {
        return Ok(PollConsensus {
            poll_count: polls_found.len(),
            polls_found,
            consensus_analysis: None,
            note: Some("Need multiple polls for consensus analysis".to_string()),
        });
    }

    let mut by_team: HashMap<String, BTreeMap<String, i64>> = HashMap::new();
    for ((poll, team), rank) in rank_table(rankings) {
        by_team.entry(team).or_default().insert(poll, rank);
    }

    let mut consensus = Vec::new();
    let mut controversial = Vec::new();
    let mut multi_poll = 0usize;

    for (team, poll_rankings) in by_team {
        if poll_rankings.len() < 2 {
            continue;
        }
        multi_poll += 1;
        let ranks: Vec<f64> = poll_rankings.values().map(|r| *r as f64).collect();
        let best = poll_rankings.values().copied().min().unwrap_or_default();
        let worst = poll_rankings.values().copied().max().unwrap_or_default();
        let entry = TeamConsensus {
            team,
            average_rank: mean(&ranks).map_or(0.0, |m| round_to(m, 1)),
            rank_spread: worst - best,
            polls_ranked_in: poll_rankings.len(),
            poll_rankings,
        };
        if entry.rank_spread <= CONSENSUS_SPREAD {
            consensus.push(entry);
        } else if entry.rank_spread >= CONTROVERSIAL_SPREAD {
            controversial.push(entry);
        }
    }

    consensus.sort_by(|a, b| {
        a.average_rank
            .total_cmp(&b.average_rank)
            .then_with(|| a.team.cmp(&b.team))
    });
    controversial.sort_by(|a, b| b.rank_spread.cmp(&a.rank_spread).then_with(|| a.team.cmp(&b.team)));
    consensus.truncate(CONSENSUS_LIST_LEN);
    controversial.truncate(top_n);

    Ok(PollConsensus {
        poll_count: polls_found.len(),
        polls_found,
        consensus_analysis: Some(ConsensusAnalysis {
            strong_consensus: consensus,
            controversial_rankings: controversial,
            teams_in_multiple_polls: multi_poll,
        }),
        note: None,
    })
}
