//! Ranking with tier-relative minimum-games thresholds
//!
//! A fixed global minimum would wipe out eras and divisions that played
//! short schedules, so each display tier sets its own bar as a share of its
//! busiest team's game count.

use crate::config::RatingConfig;
use crate::rating::engine::SorRow;
use crate::types::Tier;
use serde::Serialize;
use std::collections::BTreeMap;

/// A kept row and its position on the board
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub row: SorRow,
}

/// Minimum-games bar applied to one display tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierThreshold {
    pub tier: Tier,
    pub leader_games: u32,
    pub threshold: u32,
    pub listed: usize,
}

/// Best and worst listed team of a tier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierExtremes {
    pub tier: Tier,
    pub best: Option<RankedEntry>,
    pub worst: Option<RankedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<RankedEntry>,
    /// Only tiers that had at least one rated team
    pub thresholds: Vec<TierThreshold>,
    /// Rows rated but not listed
    pub excluded: usize,
}

/// `max(floor, floor(leader_games * ratio))`
pub fn games_threshold(leader_games: u32, ratio: f64, floor: u32) -> u32 {
    let scaled = (leader_games as f64 * ratio).floor() as u32;
    scaled.max(floor)
}

impl Leaderboard {
    /// Sort, filter by per-tier thresholds, then rank
    pub fn build(mut rows: Vec<SorRow>, config: &RatingConfig) -> Self {
        rows.sort_by(|a, b| b.total_score.total_cmp(&a.total_score));

        let mut leaders: BTreeMap<Tier, u32> = BTreeMap::new();
        for row in &rows {
            let leader = leaders.entry(row.display_tier).or_insert(0);
            *leader = (*leader).max(row.games_played);
        }
        let bars: BTreeMap<Tier, u32> = leaders
            .iter()
            .map(|(&tier, &games)| {
                (
                    tier,
                    games_threshold(games, config.threshold_ratio, config.min_games_floor),
                )
            })
            .collect();

        let total = rows.len();
        let entries: Vec<RankedEntry> = rows
            .into_iter()
            .filter(|row| {
                bars.get(&row.display_tier)
                    .map_or(false, |&bar| row.games_played >= bar)
            })
            .enumerate()
            .map(|(index, row)| RankedEntry {
                rank: index + 1,
                row,
            })
            .collect();

        let thresholds = leaders
            .iter()
            .map(|(&tier, &leader_games)| TierThreshold {
                tier,
                leader_games,
                threshold: bars.get(&tier).copied().unwrap_or(config.min_games_floor),
                listed: entries.iter().filter(|e| e.row.display_tier == tier).count(),
            })
            .collect();

        Self {
            excluded: total - entries.len(),
            entries,
            thresholds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn threshold_for(&self, tier: Tier) -> Option<&TierThreshold> {
        self.thresholds.iter().find(|t| t.tier == tier)
    }

    /// Best and worst listed team for every tier, strongest tier first
    pub fn tier_extremes(&self) -> Vec<TierExtremes> {
        Tier::all()
            .map(|tier| {
                let mut listed = self.entries.iter().filter(|e| e.row.display_tier == tier);
                let best = listed.next().cloned();
                let worst = listed.last().cloned().or_else(|| best.clone());
                TierExtremes { tier, best, worst }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;

    fn row(team: &str, score: f64, games: u32, tier: u8) -> SorRow {
        let tier = Tier::new(tier).unwrap();
        SorRow {
            team: team.to_string(),
            total_score: score,
            avg_sor: score,
            games_played: games,
            wins: games,
            losses: 0,
            ties: 0,
            point_diff: 0,
            calc_tier: tier,
            display_tier: tier,
            conference: None,
            classification: Classification::Unknown,
            details: Vec::new(),
        }
    }

    #[test]
    fn test_games_threshold() {
        assert_eq!(games_threshold(10, 0.6, 4), 6);
        assert_eq!(games_threshold(5, 0.6, 4), 4);
        assert_eq!(games_threshold(13, 0.6, 4), 7);
        assert_eq!(games_threshold(0, 0.6, 4), 4);
    }

    #[test]
    fn test_per_tier_thresholds_filter_independently() {
        let rows = vec![
            row("Big", 90.0, 100, 1),
            row("Thin", 95.0, 50, 1),
            row("Small", 40.0, 8, 7),
            row("Tiny", 30.0, 5, 7),
        ];
        let board = Leaderboard::build(rows, &RatingConfig::default());

        let teams: Vec<&str> = board.entries.iter().map(|e| e.row.team.as_str()).collect();
        assert_eq!(teams, vec!["Big", "Small", "Tiny"]);
        assert_eq!(board.entries[0].rank, 1);
        assert_eq!(board.entries[2].rank, 3);
        assert_eq!(board.excluded, 1);

        let top = board.threshold_for(Tier::STRONGEST).unwrap();
        assert_eq!(top.leader_games, 100);
        assert_eq!(top.threshold, 60);
        assert_eq!(top.listed, 1);
        assert_eq!(board.threshold_for(Tier::new(7).unwrap()).unwrap().threshold, 4);
    }

    #[test]
    fn test_stable_sort_on_equal_scores() {
        let rows = vec![row("First", 50.0, 10, 2), row("Second", 50.0, 10, 2)];
        let board = Leaderboard::build(rows, &RatingConfig::default());
        assert_eq!(board.entries[0].row.team, "First");
        assert_eq!(board.entries[1].row.team, "Second");
    }

    #[test]
    fn test_tier_extremes() {
        let rows = vec![
            row("A", 90.0, 10, 1),
            row("B", 80.0, 10, 1),
            row("C", 70.0, 10, 1),
            row("D", 20.0, 10, 3),
        ];
        let board = Leaderboard::build(rows, &RatingConfig::default());
        let extremes = board.tier_extremes();
        assert_eq!(extremes.len(), Tier::COUNT);

        assert_eq!(extremes[0].best.as_ref().unwrap().row.team, "A");
        assert_eq!(extremes[0].worst.as_ref().unwrap().row.team, "C");
        // a single team is both best and worst
        assert_eq!(extremes[2].best.as_ref().unwrap().row.team, "D");
        assert_eq!(extremes[2].worst.as_ref().unwrap().row.team, "D");
        assert!(extremes[1].best.is_none());
    }

    #[test]
    fn test_empty_rows_empty_board() {
        let board = Leaderboard::build(Vec::new(), &RatingConfig::default());
        assert!(board.is_empty());
        assert!(board.thresholds.is_empty());
    }
}
