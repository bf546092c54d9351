//! League-wide rivalry statistics over every edge of the graph

use crate::graph::{MatchupEdge, MatchupGraph};
use crate::types::{Outcome, Record, TeamId};
use serde::Serialize;

/// Series shorter than this are too noisy to call one-sided
pub const ONE_SIDED_MIN_GAMES: usize = 20;

/// One pair's series, relative to the first listed team
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rivalry {
    pub teams: (TeamId, TeamId),
    /// All rows, scored or not
    pub games: usize,
    pub record: Record,
    pub point_diff: i64,
    /// `None` while the series is level
    pub leader: Option<TeamId>,
    /// Leader's share of decisive games
    pub dominance: f64,
}

impl Rivalry {
    fn from_edge(edge: &MatchupEdge) -> Self {
        let (first, second) = edge.teams();
        let mut record = Record::default();
        let mut point_diff = 0i64;

        for game in edge.history() {
            let Some(margin) = game.perspective(first).and_then(|view| view.margin()) else {
                continue;
            };
            point_diff += margin as i64;
            record.add(Outcome::from_margin(margin));
        }

        let leader = match record.wins.cmp(&record.losses) {
            std::cmp::Ordering::Greater => Some(first.to_string()),
            std::cmp::Ordering::Less => Some(second.to_string()),
            std::cmp::Ordering::Equal => None,
        };
        let dominance = if record.decided() > 0 {
            record.wins.max(record.losses) as f64 / record.decided() as f64
        } else {
            0.0
        };

        Self {
            teams: (first.to_string(), second.to_string()),
            games: edge.games_played(),
            record,
            point_diff,
            leader,
            dominance,
        }
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.teams.0, self.teams.1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RivalryReport {
    pub most_played: Vec<Rivalry>,
    pub most_one_sided: Vec<Rivalry>,
    pub largest_differential: Vec<Rivalry>,
}

/// Every edge as a rivalry, in edge creation order
pub fn rivalries(graph: &MatchupGraph) -> Vec<Rivalry> {
    graph.edges().map(Rivalry::from_edge).collect()
}

/// Top `limit` rivalries by games, by dominance and by cumulative margin
pub fn rivalry_report(graph: &MatchupGraph, limit: usize) -> RivalryReport {
    let all = rivalries(graph);

    let mut most_played = all.clone();
    most_played.sort_by(|a, b| b.games.cmp(&a.games));
    most_played.truncate(limit);

    let mut most_one_sided: Vec<Rivalry> = all
        .iter()
        .filter(|r| r.games >= ONE_SIDED_MIN_GAMES)
        .cloned()
        .collect();
    most_one_sided.sort_by(|a, b| b.dominance.total_cmp(&a.dominance));
    most_one_sided.truncate(limit);

    let mut largest_differential = all;
    largest_differential.sort_by(|a, b| b.point_diff.abs().cmp(&a.point_diff.abs()));
    largest_differential.truncate(limit);

    RivalryReport {
        most_played,
        most_one_sided,
        largest_differential,
    }
}
