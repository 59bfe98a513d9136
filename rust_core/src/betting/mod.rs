//! Betting analytics: per-game outcomes and everything aggregated from them.
//!
//! All functions are pure. Each takes a borrowed game slice and returns a new
//! result; nothing here touches I/O or shared state.

pub mod edge;
pub mod game_log;
pub mod head_to_head;
pub mod outcomes;
pub mod ranges;
pub mod record;
pub mod scenario;
pub mod trends;

pub use edge::{
    american_odds_to_probability, elo_edge_for_game, elo_spread_edge, game_edges, moneyline_edge,
    moneyline_edge_for_game, Confidence, EloSpreadEdge, GameEdges, MoneylineEdge,
};
pub use game_log::{game_log, GameLog, GameLogEntry};
pub use head_to_head::{head_to_head, head_to_head_with_window, HeadToHead, HeadToHeadReport};
pub use outcomes::{ats_result, covers_spread, grade_game, went_over, won, AtsResult, GradedGame, Outcome};
pub use ranges::{
    analyze_over_under_ranges, analyze_spread_ranges, OverUnderRange, OverUnderRangeReport,
    SpreadRange, SpreadRangeReport,
};
pub use record::{aggregate, BettingRecord, Record};
pub use scenario::{effective_spread, filter_by_scenario, filter_by_scenario_name, Scenario};
pub use trends::{trends, weekly_betting_trends, TrendReport, WeeklyBettingTrends};
