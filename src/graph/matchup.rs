//! Matchup graph: teams as nodes, head-to-head histories as edges
//!
//! The graph is an explicit adjacency structure keyed by team identifier.
//! Node and neighbor order follow first appearance in the input so that
//! traversals are reproducible from run to run.

use crate::error::{AnalyticsError, Result};
use crate::types::{GameRecord, Season, TeamId};
use crate::utils::normalize_team_name;
use std::collections::{HashMap, HashSet};

/// Every game between one unordered pair of teams
#[derive(Debug, Clone, PartialEq)]
pub struct MatchupEdge {
    teams: (TeamId, TeamId),
    history: Vec<GameRecord>,
    last_met: Season,
}

impl MatchupEdge {
    /// The pair, in the order the first game listed them (home, away)
    pub fn teams(&self) -> (&str, &str) {
        (&self.teams.0, &self.teams.1)
    }

    /// Games in input order, not necessarily chronological
    pub fn history(&self) -> &[GameRecord] {
        &self.history
    }

    /// Latest season the pair met
    pub fn last_met(&self) -> Season {
        self.last_met
    }

    pub fn games_played(&self) -> usize {
        self.history.len()
    }

    /// The other team on this edge
    pub fn other(&self, team: &str) -> Option<&str> {
        if self.teams.0 == team {
            Some(&self.teams.1)
        } else if self.teams.1 == team {
            Some(&self.teams.0)
        } else {
            None
        }
    }
}

/// What the builder did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// Games appended to an edge
    pub accepted: usize,
    /// Games dropped because a side was outside the allow-set
    pub filtered_out: usize,
}

/// Undirected multigraph of historical matchups
#[derive(Debug, Clone, Default)]
pub struct MatchupGraph {
    nodes: Vec<TeamId>,
    index: HashMap<TeamId, usize>,
    adjacency: Vec<Vec<usize>>,
    edges: Vec<MatchupEdge>,
    edge_index: HashMap<(usize, usize), usize>,
    lookup: HashMap<String, usize>,
    summary: BuildSummary,
}

fn pair_key(a: usize, b: usize) -> (usize, usize) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl MatchupGraph {
    /// Build a graph from games in order.
    ///
    /// When `allow` is given and non-empty, a game is kept only if both teams
    /// are in it. Runs in O(games).
    pub fn build<'a, I>(games: I, allow: Option<&HashSet<TeamId>>) -> Self
    where
        I: IntoIterator<Item = &'a GameRecord>,
    {
        let allow = allow.filter(|set| !set.is_empty());
        let mut graph = Self::default();

        for game in games {
            if let Some(allowed) = allow {
                if !allowed.contains(&game.home_team) || !allowed.contains(&game.away_team) {
                    graph.summary.filtered_out += 1;
                    continue;
                }
            }
            graph.push(game.clone());
        }

        graph
    }

    fn node_for(&mut self, team: &str) -> usize {
        if let Some(&idx) = self.index.get(team) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(team.to_string());
        self.index.insert(team.to_string(), idx);
        self.adjacency.push(Vec::new());
        self.lookup.entry(normalize_team_name(team)).or_insert(idx);
        idx
    }

    fn push(&mut self, game: GameRecord) {
        let home = self.node_for(&game.home_team);
        let away = self.node_for(&game.away_team);
        let key = pair_key(home, away);
        self.summary.accepted += 1;

        match self.edge_index.get(&key) {
            Some(&edge_idx) => {
                let edge = &mut self.edges[edge_idx];
                edge.last_met = edge.last_met.max(game.season);
                edge.history.push(game);
            }
            None => {
                let edge_idx = self.edges.len();
                self.edges.push(MatchupEdge {
                    teams: (game.home_team.clone(), game.away_team.clone()),
                    last_met: game.season,
                    history: vec![game],
                });
                self.edge_index.insert(key, edge_idx);
                self.adjacency[home].push(away);
                if home != away {
                    self.adjacency[away].push(home);
                }
            }
        }
    }

    pub fn summary(&self) -> BuildSummary {
        self.summary
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Teams in first-appearance order
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }

    pub fn contains(&self, team: &str) -> bool {
        self.index.contains_key(team)
    }

    /// Edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = &MatchupEdge> {
        self.edges.iter()
    }

    /// Opponents of `team`; empty if the team is unknown
    pub fn neighbors<'a>(&'a self, team: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.index
            .get(team)
            .map(|&idx| self.adjacency[idx].as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&n| self.nodes[n].as_str())
    }

    pub fn degree(&self, team: &str) -> usize {
        self.index
            .get(team)
            .map(|&idx| self.adjacency[idx].len())
            .unwrap_or(0)
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&MatchupEdge> {
        let a = *self.index.get(a)?;
        let b = *self.index.get(b)?;
        self.edge_index
            .get(&pair_key(a, b))
            .map(|&edge_idx| &self.edges[edge_idx])
    }

    /// Shared history of a pair; empty when they never met
    pub fn history(&self, a: &str, b: &str) -> &[GameRecord] {
        self.edge(a, b).map(MatchupEdge::history).unwrap_or(&[])
    }

    /// Resolve user input to a node name, ignoring case, diacritics, spaces,
    /// apostrophes and hyphens
    pub fn resolve_team(&self, input: &str) -> Option<&str> {
        if let Some(&idx) = self.index.get(input) {
            return Some(&self.nodes[idx]);
        }
        self.lookup
            .get(&normalize_team_name(input))
            .map(|&idx| self.nodes[idx].as_str())
    }

    /// Like [`resolve_team`](Self::resolve_team) but fails with `TeamNotFound`
    pub fn require_team(&self, input: &str) -> Result<&str> {
        self.resolve_team(input)
            .ok_or_else(|| AnalyticsError::team_not_found(input).into())
    }

    pub(crate) fn node_index(&self, team: &str) -> Option<usize> {
        self.index.get(team).copied()
    }

    pub(crate) fn node_name(&self, idx: usize) -> &str {
        &self.nodes[idx]
    }

    pub(crate) fn neighbor_indices(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx]
    }
}
