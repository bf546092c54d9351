//! Matchup graph construction and traversal

pub mod matchup;
pub mod paths;
pub mod topology;

pub use matchup::{BuildSummary, MatchupEdge, MatchupGraph};
pub use paths::{
    connection_chain, diameter, diameter_with_cancel, eccentricity, eccentricity_with_cancel,
    edge_series, series_summary, shortest_connection, CancellationToken, ChainLink, Connection,
    Diameter, Eccentricity, SeriesSummary,
};
pub use topology::{connected_components, overview, unplayed, GraphOverview};
