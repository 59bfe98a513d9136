//! Spread-range and over/under-range breakdowns.
//!
//! Reports serialize as maps keyed by bucket name, in bucket order, with
//! empty buckets left out.

use serde::{Serialize, Serializer};

use super::outcomes::went_over;
use super::record::aggregate;
use super::scenario::effective_spread;
use crate::models::Game;
use crate::utils::stats::{percentage, round_to};

// ============================================================================
// Spread ranges
// ============================================================================

/// Lower edge of the heavy underdog bucket
pub const HEAVY_UNDERDOG_MIN: f64 = 14.5;
/// Lower edge of the underdog bucket
pub const UNDERDOG_MIN: f64 = 3.5;
/// Lower edge of the slight underdog bucket
pub const SLIGHT_UNDERDOG_MIN: f64 = 0.1;
/// Pick'em covers the open interval (-0.1, 0.1)
pub const PICK_EM_HALF_WIDTH: f64 = 0.1;
/// Upper edge (exclusive) of the favorite bucket
pub const FAVORITE_MAX: f64 = -3.5;
/// Upper edge (exclusive) of the heavy favorite bucket
pub const HEAVY_FAVORITE_MAX: f64 = -14.5;

/// Bucket of a team's effective spread (positive = underdog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpreadRange {
    HeavyUnderdog,
    Underdog,
    SlightUnderdog,
    PickEm,
    SlightFavorite,
    Favorite,
    HeavyFavorite,
}

impl SpreadRange {
    pub const ALL: [SpreadRange; 7] = [
        SpreadRange::HeavyUnderdog,
        SpreadRange::Underdog,
        SpreadRange::SlightUnderdog,
        SpreadRange::PickEm,
        SpreadRange::SlightFavorite,
        SpreadRange::Favorite,
        SpreadRange::HeavyFavorite,
    ];

    /// Exactly one bucket for every finite spread.
    pub fn classify(effective: f64) -> Self {
        if effective >= HEAVY_UNDERDOG_MIN {
            SpreadRange::HeavyUnderdog
        } else if effective >= UNDERDOG_MIN {
            SpreadRange::Underdog
        } else if effective >= SLIGHT_UNDERDOG_MIN {
            SpreadRange::SlightUnderdog
        } else if effective > -PICK_EM_HALF_WIDTH {
            SpreadRange::PickEm
        } else if effective > FAVORITE_MAX {
            SpreadRange::SlightFavorite
        } else if effective > HEAVY_FAVORITE_MAX {
            SpreadRange::Favorite
        } else {
            SpreadRange::HeavyFavorite
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            SpreadRange::HeavyUnderdog => "heavy_underdog",
            SpreadRange::Underdog => "underdog",
            SpreadRange::SlightUnderdog => "slight_underdog",
            SpreadRange::PickEm => "pick_em",
            SpreadRange::SlightFavorite => "slight_favorite",
            SpreadRange::Favorite => "favorite",
            SpreadRange::HeavyFavorite => "heavy_favorite",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SpreadRange::HeavyUnderdog => "14.5+ underdog",
            SpreadRange::Underdog => "3.5-14.4 underdog",
            SpreadRange::SlightUnderdog => "0.1-3.4 underdog",
            SpreadRange::PickEm => "Pick'em",
            SpreadRange::SlightFavorite => "0.1-3.4 favorite",
            SpreadRange::Favorite => "3.5-14.4 favorite",
            SpreadRange::HeavyFavorite => "14.5+ favorite",
        }
    }
}

/// Performance within one spread bucket
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadRangeStats {
    #[serde(skip)]
    pub range: SpreadRange,
    pub display_name: &'static str,
    pub games: usize,
    pub ats_record: String,
    pub ats_percentage: f64,
    pub su_record: String,
    pub su_percentage: f64,
}

/// Non-empty spread buckets in bucket order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpreadRangeReport {
    pub ranges: Vec<SpreadRangeStats>,
}

impl SpreadRangeReport {
    pub fn get(&self, range: SpreadRange) -> Option<&SpreadRangeStats> {
        self.ranges.iter().find(|r| r.range == range)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl Serialize for SpreadRangeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.ranges.iter().map(|r| (r.range.key(), r)))
    }
}

/// ATS and SU performance per spread bucket of `team`'s effective spread.
pub fn analyze_spread_ranges(games: &[Game], team: &str) -> SpreadRangeReport {
    let mut buckets: [Vec<&Game>; 7] = Default::default();
    for game in games {
        if let Some((_, eff)) = effective_spread(game, team) {
            buckets[SpreadRange::classify(eff) as usize].push(game);
        }
    }

    let ranges = SpreadRange::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, bucket)| !bucket.is_empty())
        .map(|(range, bucket)| {
            let record = aggregate(bucket.iter().copied(), team);
            SpreadRangeStats {
                range,
                display_name: range.display_name(),
                games: bucket.len(),
                ats_record: record.ats.formatted,
                ats_percentage: record.ats.percentage,
                su_record: record.su.formatted,
                su_percentage: record.su.percentage,
            }
        })
        .collect();

    SpreadRangeReport { ranges }
}

// ============================================================================
// Over/under ranges
// ============================================================================

/// Bucket of a game's O/U line; half-open `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OverUnderRange {
    LowTotals,
    MediumLow,
    Medium,
    MediumHigh,
    HighTotals,
}

impl OverUnderRange {
    pub const ALL: [OverUnderRange; 5] = [
        OverUnderRange::LowTotals,
        OverUnderRange::MediumLow,
        OverUnderRange::Medium,
        OverUnderRange::MediumHigh,
        OverUnderRange::HighTotals,
    ];

    /// `(min, max)`; `max` is `None` for the open-ended top bucket
    pub fn bounds(&self) -> (f64, Option<f64>) {
        match self {
            OverUnderRange::LowTotals => (0.0, Some(45.0)),
            OverUnderRange::MediumLow => (45.0, Some(55.0)),
            OverUnderRange::Medium => (55.0, Some(65.0)),
            OverUnderRange::MediumHigh => (65.0, Some(75.0)),
            OverUnderRange::HighTotals => (75.0, None),
        }
    }

    /// `None` for a non-positive line.
    pub fn classify(over_under: f64) -> Option<Self> {
        if over_under <= 0.0 {
            return None;
        }
        Self::ALL.into_iter().find(|r| {
            let (min, max) = r.bounds();
            over_under >= min && max.map_or(true, |m| over_under < m)
        })
    }

    pub fn key(&self) -> &'static str {
        match self {
            OverUnderRange::LowTotals => "low_totals",
            OverUnderRange::MediumLow => "medium_low",
            OverUnderRange::Medium => "medium",
            OverUnderRange::MediumHigh => "medium_high",
            OverUnderRange::HighTotals => "high_totals",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OverUnderRange::LowTotals => "Under 45 points",
            OverUnderRange::MediumLow => "45-55 points",
            OverUnderRange::Medium => "55-65 points",
            OverUnderRange::MediumHigh => "65-75 points",
            OverUnderRange::HighTotals => "Over 75 points",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverUnderRangeStats {
    #[serde(skip)]
    pub range: OverUnderRange,
    pub display_name: &'static str,
    pub games: usize,
    /// `"O-U"`
    pub over_record: String,
    pub over_percentage: f64,
    pub under_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverUnderRangeReport {
    pub ranges: Vec<OverUnderRangeStats>,
}

impl OverUnderRangeReport {
    pub fn get(&self, range: OverUnderRange) -> Option<&OverUnderRangeStats> {
        self.ranges.iter().find(|r| r.range == range)
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl Serialize for OverUnderRangeReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.ranges.iter().map(|r| (r.range.key(), r)))
    }
}

/// Over/under results bucketed by each game's own O/U line.
///
/// Needs both scores and a positive O/U on the first line; the spread is not
/// consulted. Totals equal to the line count as unders.
pub fn analyze_over_under_ranges(games: &[Game]) -> OverUnderRangeReport {
    // (overs, unders) per bucket
    let mut tallies = [(0usize, 0usize); 5];
    for game in games {
        let (Some((home, away)), Some(over_under)) = (game.scores(), game.over_under()) else {
            continue;
        };
        let Some(range) = OverUnderRange::classify(over_under) else {
            continue;
        };
        let tally = &mut tallies[range as usize];
        if went_over(home, away, over_under) {
            tally.0 += 1;
        } else {
            tally.1 += 1;
        }
    }

    let ranges = OverUnderRange::ALL
        .into_iter()
        .zip(tallies)
        .filter(|(_, (overs, unders))| overs + unders > 0)
        .map(|(range, (overs, unders))| {
            let over_pct = percentage(overs, overs + unders);
            OverUnderRangeStats {
                range,
                display_name: range.display_name(),
                games: overs + unders,
                over_record: format!("{}-{}", overs, unders),
                over_percentage: over_pct,
                under_percentage: round_to(100.0 - over_pct, 1),
            }
        })
        .collect();

    OverUnderRangeReport { ranges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BettingLine;

    fn game(home: &str, away: &str, hp: i64, ap: i64, spread: Option<f64>, total: Option<f64>) -> Game {
        Game {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_points: Some(hp),
            away_points: Some(ap),
            lines: vec![BettingLine {
                spread,
                over_under: total,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_spread_buckets_are_exhaustive_and_disjoint() {
        let cases = [
            (20.0, SpreadRange::HeavyUnderdog),
            (14.5, SpreadRange::HeavyUnderdog),
            (14.4, SpreadRange::Underdog),
            (14.45, SpreadRange::Underdog),
            (3.5, SpreadRange::Underdog),
            (3.45, SpreadRange::SlightUnderdog),
            (0.1, SpreadRange::SlightUnderdog),
            (0.05, SpreadRange::PickEm),
            (0.0, SpreadRange::PickEm),
            (-0.0, SpreadRange::PickEm),
            (-0.1, SpreadRange::SlightFavorite),
            (-3.4, SpreadRange::SlightFavorite),
            (-3.5, SpreadRange::Favorite),
            (-14.4, SpreadRange::Favorite),
            (-14.5, SpreadRange::HeavyFavorite),
            (-30.0, SpreadRange::HeavyFavorite),
        ];
        for (spread, expected) in cases {
            assert_eq!(SpreadRange::classify(spread), expected, "spread {}", spread);
        }
    }

    #[test]
    fn test_analyze_spread_ranges_uses_effective_spread() {
        let games = vec![
            // Michigan home -21: heavy favorite, covers
            game("Michigan", "Rutgers", 42, 7, Some(-21.0), Some(48.0)),
            // Michigan away, home +7 means Michigan -7: favorite, does not cover
            game("Iowa", "Michigan", 10, 13, Some(7.0), Some(35.0)),
            // Michigan away, home -2.5 means Michigan +2.5: slight underdog, wins
            game("Ohio State", "Michigan", 23, 30, Some(-2.5), Some(47.5)),
            // No spread: excluded
            game("Michigan", "UNLV", 35, 7, None, Some(50.0)),
        ];

        let report = analyze_spread_ranges(&games, "Michigan");
        assert_eq!(report.ranges.len(), 3);

        let heavy = report.get(SpreadRange::HeavyFavorite).unwrap();
        assert_eq!(heavy.games, 1);
        assert_eq!(heavy.ats_record, "1-0");

        let fav = report.get(SpreadRange::Favorite).unwrap();
        assert_eq!(fav.ats_record, "0-1");
        assert_eq!(fav.su_record, "1-0");
        assert_eq!(fav.display_name, "3.5-14.4 favorite");

        let dog = report.get(SpreadRange::SlightUnderdog).unwrap();
        assert_eq!(dog.ats_percentage, 100.0);

        assert!(report.get(SpreadRange::PickEm).is_none());
    }

    #[test]
    fn test_spread_report_serializes_as_ordered_map() {
        let games = vec![
            game("A", "B", 30, 0, Some(-20.0), None),
            game("A", "C", 10, 14, Some(7.0), None),
        ];
        let value = serde_json::to_value(analyze_spread_ranges(&games, "A")).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("heavy_favorite"));
        assert!(obj.contains_key("underdog"));
        assert_eq!(obj.len(), 2);
        assert_eq!(value["underdog"]["display_name"], "3.5-14.4 underdog");
        assert!(value["underdog"].get("range").is_none());
    }

    #[test]
    fn test_over_under_bucket_edges() {
        assert_eq!(OverUnderRange::classify(44.5), Some(OverUnderRange::LowTotals));
        assert_eq!(OverUnderRange::classify(45.0), Some(OverUnderRange::MediumLow));
        assert_eq!(OverUnderRange::classify(64.9), Some(OverUnderRange::Medium));
        assert_eq!(OverUnderRange::classify(75.0), Some(OverUnderRange::HighTotals));
        assert_eq!(OverUnderRange::classify(0.0), None);
    }

    #[test]
    fn test_analyze_over_under_ranges() {
        let games = vec![
            game("A", "B", 30, 20, None, Some(48.5)), // over
            game("A", "C", 20, 20, None, Some(52.0)), // under
            game("A", "D", 24, 21, None, Some(45.0)), // push on total counts as under
            game("A", "E", 40, 38, Some(-3.0), Some(70.5)), // over
            game("A", "F", 10, 7, None, None),        // no line
        ];
        let report = analyze_over_under_ranges(&games);
        assert_eq!(report.ranges.len(), 2);

        let mid = report.get(OverUnderRange::MediumLow).unwrap();
        assert_eq!(mid.games, 3);
        assert_eq!(mid.over_record, "1-2");
        assert_eq!(mid.over_percentage, 33.3);
        assert_eq!(mid.under_percentage, 66.7);

        let high = report.get(OverUnderRange::MediumHigh).unwrap();
        assert_eq!(high.over_record, "1-0");
        assert_eq!(high.under_percentage, 0.0);
    }
}
