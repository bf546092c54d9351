//! Path analysis over the matchup graph
//!
//! Breadth-first search is enough everywhere here: edges are unweighted and
//! a "degree of separation" is one shared game. Every routine walks nodes and
//! neighbors in insertion order, so ties resolve the same way on every run.

use crate::error::{AnalyticsError, Result};
use crate::graph::matchup::MatchupGraph;
use crate::types::{AnalysisWindow, GameRecord, Outcome, TeamId};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Outcome of a shortest-connection query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Connection {
    Found { path: Vec<TeamId>, degrees: usize },
    NoPath,
}

impl Connection {
    pub fn path(&self) -> Option<&[TeamId]> {
        match self {
            Connection::Found { path, .. } => Some(path),
            Connection::NoPath => None,
        }
    }
}

/// Cooperative cancellation flag shared with a long-running sweep
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(AnalyticsError::Cancelled.into());
        }
        Ok(())
    }
}

/// Head-to-head tally of `team` against `opponent`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub team: TeamId,
    pub opponent: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub last_meeting: Option<GameRecord>,
}

impl SeriesSummary {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

impl fmt::Display for SeriesSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wins > self.losses {
            write!(f, "{} leads {}-{}-{}", self.team, self.wins, self.losses, self.ties)
        } else if self.losses > self.wins {
            write!(f, "{} leads {}-{}-{}", self.opponent, self.losses, self.wins, self.ties)
        } else {
            write!(f, "Series tied {}-{}-{}", self.wins, self.losses, self.ties)
        }
    }
}

/// Farthest reachable teams from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Eccentricity {
    pub team: TeamId,
    pub distance: usize,
    /// Teams at `distance`, in discovery order; empty when isolated
    pub farthest: Vec<TeamId>,
}

/// Longest shortest path of the (largest component of the) graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diameter {
    pub value: usize,
    pub endpoints: Option<(TeamId, TeamId)>,
    pub path: Vec<TeamId>,
    pub component_size: usize,
    /// True when the graph was disconnected and only the largest component was measured
    pub restricted: bool,
}

/// One hop of a connection path with its series over the window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainLink {
    pub from: TeamId,
    pub to: TeamId,
    pub series: SeriesSummary,
    /// False when the pair has no game inside the window
    pub in_window: bool,
}

struct Sweep {
    dist: Vec<Option<usize>>,
    parent: Vec<Option<usize>>,
    order: Vec<usize>,
}

fn bfs(graph: &MatchupGraph, source: usize) -> Sweep {
    let n = graph.node_count();
    let mut dist = vec![None; n];
    let mut parent = vec![None; n];
    let mut order = Vec::new();
    let mut queue = VecDeque::new();

    dist[source] = Some(0);
    queue.push_back(source);
    while let Some(current) = queue.pop_front() {
        order.push(current);
        let next_dist = dist[current].map_or(0, |d| d + 1);
        for &neighbor in graph.neighbor_indices(current) {
            if dist[neighbor].is_none() {
                dist[neighbor] = Some(next_dist);
                parent[neighbor] = Some(current);
                queue.push_back(neighbor);
            }
        }
    }

    Sweep {
        dist,
        parent,
        order,
    }
}

fn trace_path(graph: &MatchupGraph, parent: &[Option<usize>], target: usize) -> Vec<TeamId> {
    let mut path = vec![graph.node_name(target).to_string()];
    let mut current = target;
    while let Some(prev) = parent[current] {
        path.push(graph.node_name(prev).to_string());
        current = prev;
    }
    path.reverse();
    path
}

/// Shortest chain of opponents linking two teams
pub fn shortest_connection(graph: &MatchupGraph, a: &str, b: &str) -> Result<Connection> {
    let from = graph.require_team(a)?;
    let to = graph.require_team(b)?;
    let (Some(source), Some(target)) = (graph.node_index(from), graph.node_index(to)) else {
        return Ok(Connection::NoPath);
    };

    let sweep = bfs(graph, source);
    match sweep.dist[target] {
        Some(degrees) => Ok(Connection::Found {
            path: trace_path(graph, &sweep.parent, target),
            degrees,
        }),
        None => Ok(Connection::NoPath),
    }
}

/// W-L-T for `team` against `opponent` over `history`, which the caller may
/// have narrowed. Rows without both scores are ignored.
pub fn series_summary(team: &str, opponent: &str, history: &[GameRecord]) -> SeriesSummary {
    let mut summary = SeriesSummary {
        team: team.to_string(),
        opponent: opponent.to_string(),
        wins: 0,
        losses: 0,
        ties: 0,
        last_meeting: None,
    };
    let mut latest: Option<&GameRecord> = None;

    for game in history {
        let Some(margin) = game.perspective(team).and_then(|view| view.margin()) else {
            continue;
        };
        match Outcome::from_margin(margin) {
            Outcome::Win => summary.wins += 1,
            Outcome::Loss => summary.losses += 1,
            Outcome::Tie => summary.ties += 1,
        }
        // strictly greater keeps the first row among equal (season, week)
        if latest.map_or(true, |current| game.chronological_key() > current.chronological_key()) {
            latest = Some(game);
        }
    }

    summary.last_meeting = latest.cloned();
    summary
}

/// Series summary over the pair's whole history in `graph`
pub fn edge_series(graph: &MatchupGraph, team: &str, opponent: &str) -> SeriesSummary {
    series_summary(team, opponent, graph.history(team, opponent))
}

/// Maximum BFS distance from `team` and every team at that distance
pub fn eccentricity(graph: &MatchupGraph, team: &str) -> Result<Eccentricity> {
    eccentricity_with_cancel(graph, team, &CancellationToken::new())
}

pub fn eccentricity_with_cancel(
    graph: &MatchupGraph,
    team: &str,
    token: &CancellationToken,
) -> Result<Eccentricity> {
    let resolved = graph.require_team(team)?;
    token.check()?;
    let Some(source) = graph.node_index(resolved) else {
        return Err(AnalyticsError::team_not_found(team).into());
    };

    let sweep = bfs(graph, source);
    let distance = sweep
        .order
        .iter()
        .filter_map(|&idx| sweep.dist[idx])
        .max()
        .unwrap_or(0);
    let farthest = if distance == 0 {
        Vec::new()
    } else {
        sweep
            .order
            .iter()
            .filter(|&&idx| sweep.dist[idx] == Some(distance))
            .map(|&idx| graph.node_name(idx).to_string())
            .collect()
    };

    Ok(Eccentricity {
        team: resolved.to_string(),
        distance,
        farthest,
    })
}

/// Connected components as node index lists, in discovery order
pub(crate) fn component_indices(graph: &MatchupGraph) -> Vec<Vec<usize>> {
    let mut seen = vec![false; graph.node_count()];
    let mut components = Vec::new();

    for start in 0..graph.node_count() {
        if seen[start] {
            continue;
        }
        let sweep = bfs(graph, start);
        for &idx in &sweep.order {
            seen[idx] = true;
        }
        components.push(sweep.order);
    }
    components
}

/// Diameter of the graph, restricted to the largest connected component
pub fn diameter(graph: &MatchupGraph) -> Diameter {
    // an untriggered token never fails
    diameter_with_cancel(graph, &CancellationToken::new()).unwrap_or(Diameter {
        value: 0,
        endpoints: None,
        path: Vec::new(),
        component_size: 0,
        restricted: false,
    })
}

/// Diameter with a cancellation check before every BFS sweep
pub fn diameter_with_cancel(graph: &MatchupGraph, token: &CancellationToken) -> Result<Diameter> {
    let components = component_indices(graph);
    let restricted = components.len() > 1;

    // first discovered wins among equal sizes
    let mut largest: &[usize] = &[];
    for component in &components {
        if component.len() > largest.len() {
            largest = component;
        }
    }

    if largest.len() < 2 {
        return Ok(Diameter {
            value: 0,
            endpoints: None,
            path: largest
                .first()
                .map(|&idx| vec![graph.node_name(idx).to_string()])
                .unwrap_or_default(),
            component_size: largest.len(),
            restricted,
        });
    }

    // eccentricity sweep over every component node
    let mut eccentricities = Vec::with_capacity(largest.len());
    for &node in largest {
        token.check()?;
        let sweep = bfs(graph, node);
        let ecc = sweep
            .order
            .iter()
            .filter_map(|&idx| sweep.dist[idx])
            .max()
            .unwrap_or(0);
        eccentricities.push((node, ecc));
    }

    let value = eccentricities.iter().map(|&(_, ecc)| ecc).max().unwrap_or(0);
    let periphery: Vec<usize> = eccentricities
        .iter()
        .filter(|&&(_, ecc)| ecc == value)
        .map(|&(node, _)| node)
        .collect();
    debug!(
        "Diameter {} over {} nodes, periphery of {}",
        value,
        largest.len(),
        periphery.len()
    );

    for (i, &u) in periphery.iter().enumerate() {
        token.check()?;
        let sweep = bfs(graph, u);
        if let Some(&v) = periphery[i + 1..]
            .iter()
            .find(|&&v| sweep.dist[v] == Some(value))
        {
            return Ok(Diameter {
                value,
                endpoints: Some((graph.node_name(u).to_string(), graph.node_name(v).to_string())),
                path: trace_path(graph, &sweep.parent, v),
                component_size: largest.len(),
                restricted,
            });
        }
    }

    Ok(Diameter {
        value,
        endpoints: None,
        path: Vec::new(),
        component_size: largest.len(),
        restricted,
    })
}

/// Per-link series along a path, counting only games inside `window`
pub fn connection_chain(
    graph: &MatchupGraph,
    path: &[TeamId],
    window: &AnalysisWindow,
) -> Vec<ChainLink> {
    path.windows(2)
        .map(|pair| {
            let (from, to) = (&pair[0], &pair[1]);
            let in_window: Vec<GameRecord> = graph
                .history(from, to)
                .iter()
                .filter(|game| window.contains_season(game.season) && window.contains_week(game.week))
                .cloned()
                .collect();
            ChainLink {
                from: from.clone(),
                to: to.clone(),
                series: series_summary(from, to, &in_window),
                in_window: !in_window.is_empty(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Season;

    fn game(season: Season, home: &str, hp: i32, away: &str, ap: i32) -> GameRecord {
        GameRecord::final_score(season, 1, home, hp, away, ap)
    }

    fn path_graph() -> MatchupGraph {
        let games = vec![
            game(2000, "A", 10, "B", 7),
            game(2000, "B", 10, "C", 7),
            game(2000, "C", 10, "D", 7),
        ];
        MatchupGraph::build(&games, None)
    }

    #[test]
    fn test_shortest_connection_on_path_graph() {
        let graph = path_graph();
        let connection = shortest_connection(&graph, "a", "D").unwrap();
        assert_eq!(
            connection,
            Connection::Found {
                path: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                degrees: 3
            }
        );
    }

    #[test]
    fn test_shortest_connection_disconnected_is_no_path() {
        let games = vec![game(2000, "A", 1, "B", 0), game(2000, "C", 1, "D", 0)];
        let graph = MatchupGraph::build(&games, None);
        assert_eq!(shortest_connection(&graph, "A", "D").unwrap(), Connection::NoPath);
    }

    #[test]
    fn test_shortest_connection_unknown_team() {
        let graph = path_graph();
        let err = shortest_connection(&graph, "A", "Nowhere").unwrap_err();
        assert!(crate::error::is_team_not_found(&err));
    }

    #[test]
    fn test_self_connection_is_zero_degrees() {
        let graph = path_graph();
        let connection = shortest_connection(&graph, "B", "B").unwrap();
        assert_eq!(
            connection,
            Connection::Found {
                path: vec!["B".into()],
                degrees: 0
            }
        );
    }

    #[test]
    fn test_eccentricity_of_path_end() {
        let graph = path_graph();
        let ecc = eccentricity(&graph, "A").unwrap();
        assert_eq!(ecc.distance, 3);
        assert_eq!(ecc.farthest, vec!["D".to_string()]);

        let middle = eccentricity(&graph, "B").unwrap();
        assert_eq!(middle.distance, 2);
        assert_eq!(middle.farthest, vec!["D".to_string()]);
    }

    #[test]
    fn test_diameter_of_path_graph() {
        let graph = path_graph();
        let d = diameter(&graph);
        assert_eq!(d.value, 3);
        assert_eq!(d.endpoints, Some(("A".to_string(), "D".to_string())));
        assert_eq!(d.path.len(), 4);
        assert_eq!(d.component_size, 4);
        assert!(!d.restricted);
    }

    #[test]
    fn test_diameter_restricts_to_largest_component() {
        let games = vec![
            game(2000, "A", 1, "B", 0),
            game(2000, "X", 1, "Y", 0),
            game(2000, "Y", 1, "Z", 0),
        ];
        let graph = MatchupGraph::build(&games, None);
        let d = diameter(&graph);
        assert_eq!(d.value, 2);
        assert_eq!(d.component_size, 3);
        assert!(d.restricted);
        assert_eq!(d.path, vec!["X".to_string(), "Y".to_string(), "Z".to_string()]);
    }

    #[test]
    fn test_diameter_of_empty_graph() {
        let graph = MatchupGraph::build(&[], None);
        let d = diameter(&graph);
        assert_eq!(d.value, 0);
        assert_eq!(d.component_size, 0);
        assert!(d.endpoints.is_none());
    }

    #[test]
    fn test_cancelled_diameter() {
        let graph = path_graph();
        let token = CancellationToken::new();
        token.cancel();
        let err = diameter_with_cancel(&graph, &token).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalyticsError>(),
            Some(AnalyticsError::Cancelled)
        ));
        assert!(eccentricity_with_cancel(&graph, "A", &token).is_err());
    }

    #[test]
    fn test_series_summary_and_last_meeting() {
        let mut late = game(2003, "Navy", 20, "Army", 20);
        late.week = Some(14);
        let history = vec![
            game(2001, "Army", 14, "Navy", 7),
            late.clone(),
            game(2002, "Navy", 28, "Army", 3),
            GameRecord {
                home_points: None,
                ..game(2004, "Army", 0, "Navy", 0)
            },
        ];
        let summary = series_summary("Army", "Navy", &history);
        assert_eq!((summary.wins, summary.losses, summary.ties), (1, 1, 1));
        assert_eq!(summary.last_meeting, Some(late));
        assert_eq!(summary.to_string(), "Series tied 1-1-1");

        let navy = series_summary("Navy", "Army", &history[..1]);
        assert_eq!(navy.to_string(), "Army leads 1-0-0");
    }

    #[test]
    fn test_last_meeting_prefers_first_among_equals() {
        let first = game(2010, "A", 7, "B", 3);
        let second = game(2010, "B", 7, "A", 3);
        let summary = series_summary("A", "B", &[first.clone(), second]);
        assert_eq!(summary.last_meeting, Some(first));
    }

    #[test]
    fn test_connection_chain_flags_links_outside_window() {
        let games = vec![
            game(1950, "A", 10, "B", 7),
            game(2000, "B", 10, "C", 7),
            game(2001, "C", 3, "B", 7),
        ];
        let graph = MatchupGraph::build(&games, None);
        let path: Vec<TeamId> = vec!["A".into(), "B".into(), "C".into()];
        let chain = connection_chain(&graph, &path, &AnalysisWindow::seasons(1990, 2010));

        assert_eq!(chain.len(), 2);
        assert!(!chain[0].in_window);
        assert_eq!(chain[0].series.games(), 0);
        assert!(chain[1].in_window);
        assert_eq!(chain[1].series.wins, 2);
    }
}
