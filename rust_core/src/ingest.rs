//! Decoding of upstream GraphQL responses into game and ranking records.
//!
//! Accepted shapes:
//! - games: `{"data": {"game": [...]}}`, `{"game": [...]}` or a bare array
//! - rankings: `{"data": {"poll": [{"pollType": {...}, "rankings": [{"team": {...}}]}]}}`,
//!   `{"data": {"rankings": [...]}}`, or a bare array of either row kind

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{Game, RankingEntry, TeamInfo, TeamSide};
use crate::utils::coerce::{to_integer, to_number};

/// Unwrap `{"data": ...}`, turning a GraphQL error payload into [`AnalysisError::Parse`].
fn unwrap_envelope(value: &Value) -> AnalysisResult<&Value> {
    let Some(obj) = value.as_object() else {
        return Ok(value);
    };
    match obj.get("data") {
        Some(data) if !data.is_null() => Ok(data),
        _ => {
            if let Some(errors) = obj.get("errors").and_then(Value::as_array) {
                let message = errors
                    .iter()
                    .filter_map(|e| e.get("message").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("; ");
                let message = if message.is_empty() {
                    "GraphQL error".to_string()
                } else {
                    message
                };
                return Err(AnalysisError::Parse(message));
            }
            Ok(value)
        }
    }
}

/// Find the row array under one of `keys`, or accept the value itself if it is an array.
fn rows<'a>(value: &'a Value, keys: &[&str]) -> AnalysisResult<&'a Vec<Value>> {
    if let Some(array) = value.as_array() {
        return Ok(array);
    }
    for key in keys {
        match value.get(*key) {
            Some(Value::Array(array)) => return Ok(array),
            Some(Value::Null) => continue,
            Some(_) => {
                return Err(AnalysisError::Parse(format!("`{}` is not a list", key)));
            }
            None => continue,
        }
    }
    Err(AnalysisError::Parse(format!("expected a list under one of {:?}", keys)))
}

// ============================================================================
// Games
// ============================================================================

/// Decode games from a parsed response. Rows that are not objects are skipped.
pub fn parse_games_response(value: &Value) -> AnalysisResult<Vec<Game>> {
    let data = unwrap_envelope(value)?;
    let raw = rows(data, &["game", "games"])?;

    let mut games = Vec::with_capacity(raw.len());
    for (index, row) in raw.iter().enumerate() {
        match serde_json::from_value::<Game>(row.clone()) {
            Ok(game) => games.push(game),
            Err(e) => warn!(index, error = %e, "Skipping malformed game row"),
        }
    }
    debug!(parsed = games.len(), received = raw.len(), "Parsed games response");
    Ok(games)
}

/// Decode games from response text.
pub fn parse_games_str(text: &str) -> AnalysisResult<Vec<Game>> {
    let value: Value = serde_json::from_str(text)?;
    parse_games_response(&value)
}

/// School name for `team_id`, taken from the first game whose team info carries it.
pub fn resolve_team_name(games: &[Game], team_id: i64) -> Option<String> {
    games.iter().find_map(|game| {
        [TeamSide::Home, TeamSide::Away].into_iter().find_map(|side| {
            let info = game.team_info(side)?;
            if info.team_id != Some(team_id) {
                return None;
            }
            let name = game.team_name(side);
            if name.is_empty() {
                info.school.clone()
            } else {
                Some(name.to_string())
            }
        })
    })
}

/// Distinct teams seen in `games`, first appearance wins.
///
/// Teams with an id are deduplicated by id, the rest by school name. A game
/// without team info still contributes its team names.
pub fn collect_teams(games: &[Game]) -> Vec<TeamInfo> {
    let mut seen_ids = HashSet::new();
    let mut seen_schools = HashSet::new();
    let mut teams = Vec::new();

    for game in games {
        for side in [TeamSide::Home, TeamSide::Away] {
            let mut info = game.team_info(side).cloned().unwrap_or_default();
            if info.school.is_none() && !game.team_name(side).is_empty() {
                info.school = Some(game.team_name(side).to_string());
            }
            let Some(school) = info.school.clone() else {
                continue;
            };
            let fresh = match info.team_id {
                Some(id) => seen_ids.insert(id) && !seen_schools.contains(&school),
                None => !seen_schools.contains(&school),
            };
            seen_schools.insert(school);
            if fresh {
                teams.push(info);
            }
        }
    }
    teams
}

// ============================================================================
// Rankings
// ============================================================================

/// One poll week's rankings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankingWeek {
    pub season: Option<i64>,
    pub week: Option<i64>,
    pub entries: Vec<RankingEntry>,
}

fn value_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// Flatten a ranking row whose team identity sits in a nested `team` object.
fn flatten_ranking(row: &Value, poll: Option<&str>) -> Option<RankingEntry> {
    let team = row.get("team");
    let school = value_string(team.and_then(|t| t.get("school")))
        .or_else(|| value_string(row.get("school")))?;

    Some(RankingEntry {
        poll: poll
            .map(str::to_string)
            .or_else(|| value_string(row.get("poll"))),
        rank: to_integer(row.get("rank").unwrap_or(&Value::Null)),
        school,
        conference: value_string(team.and_then(|t| t.get("conference")))
            .or_else(|| value_string(row.get("conference"))),
        points: to_number(row.get("points").unwrap_or(&Value::Null)),
        first_place_votes: to_integer(
            row.get("firstPlaceVotes")
                .or_else(|| row.get("first_place_votes"))
                .unwrap_or(&Value::Null),
        ),
    })
}

fn is_poll_row(row: &Value) -> bool {
    row.get("rankings").map_or(false, Value::is_array)
}

fn poll_row_name(row: &Value) -> Option<String> {
    let poll_type = row.get("pollType").or_else(|| row.get("poll_type"));
    value_string(poll_type.and_then(|p| p.get("name")))
        .or_else(|| value_string(row.get("poll")))
}

/// Decode rankings grouped by (season, week), oldest first.
///
/// Flat rows carry no week and land in a single group.
pub fn parse_rankings_by_week(value: &Value) -> AnalysisResult<Vec<RankingWeek>> {
    let data = unwrap_envelope(value)?;
    let raw = rows(data, &["poll", "polls", "rankings"])?;

    let mut weeks: BTreeMap<(Option<i64>, Option<i64>), Vec<RankingEntry>> = BTreeMap::new();
    for row in raw {
        if is_poll_row(row) {
            let season = to_integer(row.get("season").unwrap_or(&Value::Null));
            let week = to_integer(row.get("week").unwrap_or(&Value::Null));
            let poll = poll_row_name(row);
            let entries = row
                .get("rankings")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(|r| flatten_ranking(r, poll.as_deref()));
            weeks.entry((season, week)).or_default().extend(entries);
        } else if let Some(entry) = flatten_ranking(row, None) {
            weeks.entry((None, None)).or_default().push(entry);
        } else {
            debug!("Skipping ranking row without a school");
        }
    }

    Ok(weeks
        .into_iter()
        .map(|((season, week), entries)| RankingWeek { season, week, entries })
        .collect())
}

/// Decode rankings into one flat list.
pub fn parse_rankings_response(value: &Value) -> AnalysisResult<Vec<RankingEntry>> {
    Ok(parse_rankings_by_week(value)?
        .into_iter()
        .flat_map(|week| week.entries)
        .collect())
}

/// Decode rankings from response text.
pub fn parse_rankings_str(text: &str) -> AnalysisResult<Vec<RankingEntry>> {
    let value: Value = serde_json::from_str(text)?;
    parse_rankings_response(&value)
}
