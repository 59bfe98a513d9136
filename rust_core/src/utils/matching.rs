//! Team name matching for college football data.
//!
//! Upstream sources name teams inconsistently ("Ohio State" vs "Ohio State
//! Buckeyes"), so home/away resolution uses a tolerant two-way substring test.
//! The policy lives in [`names_match`] and nowhere else.
//!
//! Known ambiguity: a short name that is a substring of several schools
//! ("Miami" in both "Miami" and "Miami (OH)") matches all of them. Nothing
//! here disambiguates; callers pass full school names when it matters.

use strsim::jaro_winkler;
use tracing::{debug, info};

use crate::error::{AnalysisError, AnalysisResult};
use crate::models::{TeamInfo, TeamSide};

/// Minimum Jaro-Winkler similarity for a fuzzy school-name match
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.90;

/// Case-insensitive substring match in either direction.
///
/// An empty name never matches anything.
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

/// `Home` if `team` matches the home team's name, otherwise `Away`.
///
/// The away name is not consulted: a team that matches neither side is
/// treated as away.
pub fn resolve_side(team: &str, home_team: &str) -> TeamSide {
    if names_match(team, home_team) {
        TeamSide::Home
    } else {
        TeamSide::Away
    }
}

/// True when `team1` and `team2` are the two participants, in either arrangement.
pub fn is_matchup(team1: &str, team2: &str, home_team: &str, away_team: &str) -> bool {
    (names_match(team1, home_team) && names_match(team2, away_team))
        || (names_match(team1, away_team) && names_match(team2, home_team))
}

// =============================================================================
// TEAM RESOLUTION
// =============================================================================

/// Match confidence level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchConfidence {
    None = 0,
    Low = 1,    // Fuzzy similarity only
    Medium = 2, // Substring match
    High = 3,   // Exact school or abbreviation
    Exact = 4,  // Numeric team id
}

/// A resolved team identifier
#[derive(Debug, Clone)]
pub struct TeamMatch<'a> {
    pub team: &'a TeamInfo,
    pub confidence: MatchConfidence,
    pub score: f64,
    pub reason: String,
}

/// Resolve a team identifier (id, school, abbreviation or partial name)
/// against a set of known teams.
///
/// Resolution order: numeric id, exact school/abbreviation, first substring
/// match (input order), best fuzzy school match at or above
/// [`FUZZY_MATCH_THRESHOLD`].
pub fn resolve_team<'a>(identifier: &str, teams: &'a [TeamInfo]) -> AnalysisResult<TeamMatch<'a>> {
    let ident = identifier.trim();
    if ident.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "Team identifier must be a non-empty string".to_string(),
        ));
    }

    if ident.chars().all(|c| c.is_ascii_digit()) {
        let id: i64 = ident
            .parse()
            .map_err(|_| AnalysisError::InvalidInput(format!("Invalid team ID: {}", ident)))?;
        if id <= 0 {
            return Err(AnalysisError::InvalidInput(format!("Invalid team ID: {}", id)));
        }
        return teams
            .iter()
            .find(|t| t.team_id == Some(id))
            .map(|team| TeamMatch {
                team,
                confidence: MatchConfidence::Exact,
                score: 1.0,
                reason: format!("Team id {}", id),
            })
            .ok_or_else(|| AnalysisError::InvalidInput(format!("No team with ID {}", id)));
    }

    let lower = ident.to_lowercase();

    let exact = teams.iter().find(|t| {
        t.school.as_deref().map(str::to_lowercase).as_deref() == Some(lower.as_str())
            || t.abbreviation.as_deref().map(str::to_lowercase).as_deref() == Some(lower.as_str())
    });
    if let Some(team) = exact {
        info!(identifier = ident, school = ?team.school, team_id = ?team.team_id, "Resolved team");
        return Ok(TeamMatch {
            team,
            confidence: MatchConfidence::High,
            score: 1.0,
            reason: "Exact school or abbreviation".to_string(),
        });
    }

    let partial = teams
        .iter()
        .find(|t| t.school.as_deref().map_or(false, |s| names_match(ident, s)));
    if let Some(team) = partial {
        info!(identifier = ident, school = ?team.school, team_id = ?team.team_id, "Resolved team");
        return Ok(TeamMatch {
            team,
            confidence: MatchConfidence::Medium,
            score: 0.85,
            reason: "Substring match".to_string(),
        });
    }

    let mut best: Option<(&TeamInfo, f64)> = None;
    for team in teams {
        if let Some(school) = team.school.as_deref() {
            let score = jaro_winkler(&lower, &school.to_lowercase());
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((team, score));
            }
        }
    }

    match best {
        Some((team, score)) if score >= FUZZY_MATCH_THRESHOLD => {
            debug!(identifier = ident, school = ?team.school, score, "Fuzzy team match");
            Ok(TeamMatch {
                team,
                confidence: MatchConfidence::Low,
                score,
                reason: format!("Fuzzy: {:.3}", score),
            })
        }
        _ => Err(AnalysisError::InvalidInput(format!(
            "No teams found matching '{}'",
            ident
        ))),
    }
}
