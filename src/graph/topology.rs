//! Whole-graph statistics

use crate::error::Result;
use crate::graph::matchup::MatchupGraph;
use crate::graph::paths::component_indices;
use crate::types::TeamId;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphOverview {
    pub teams: usize,
    pub matchups: usize,
    pub density: f64,
    pub average_degree: f64,
    pub components: usize,
    pub largest_component: usize,
}

impl GraphOverview {
    pub fn is_connected(&self) -> bool {
        self.components <= 1
    }
}

/// Size and connectivity summary
pub fn overview(graph: &MatchupGraph) -> GraphOverview {
    let teams = graph.node_count();
    let matchups = graph.edge_count();
    let components = component_indices(graph);

    let density = if teams > 1 {
        2.0 * matchups as f64 / (teams as f64 * (teams as f64 - 1.0))
    } else {
        0.0
    };
    let average_degree = if teams > 0 {
        graph.teams().map(|team| graph.degree(team)).sum::<usize>() as f64 / teams as f64
    } else {
        0.0
    };

    GraphOverview {
        teams,
        matchups,
        density,
        average_degree,
        components: components.len(),
        largest_component: components.iter().map(Vec::len).max().unwrap_or(0),
    }
}

/// Connected components as team lists, largest first.
/// Equal sizes keep discovery order.
pub fn connected_components(graph: &MatchupGraph) -> Vec<Vec<TeamId>> {
    let mut components: Vec<Vec<TeamId>> = component_indices(graph)
        .into_iter()
        .map(|component| {
            component
                .into_iter()
                .map(|idx| graph.node_name(idx).to_string())
                .collect()
        })
        .collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()));
    components
}

/// Teams in `universe` that `team` has never faced, sorted by name.
///
/// An empty universe means every team in the graph. Universe members that
/// are not in the graph are ignored.
pub fn unplayed(graph: &MatchupGraph, team: &str, universe: &HashSet<TeamId>) -> Result<Vec<TeamId>> {
    let center = graph.require_team(team)?;
    let played: HashSet<&str> = graph.neighbors(center).chain(std::iter::once(center)).collect();

    let mut missing: Vec<TeamId> = if universe.is_empty() {
        graph
            .teams()
            .filter(|t| !played.contains(t))
            .map(str::to_string)
            .collect()
    } else {
        universe
            .iter()
            .filter(|t| graph.contains(t) && !played.contains(t.as_str()))
            .cloned()
            .collect()
    };
    missing.sort();
    Ok(missing)
}
