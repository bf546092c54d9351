//! Gridiron SOR - college football strength-of-record analytics
//!
//! This crate builds a matchup graph from historical game results, assigns
//! competitive tiers, runs the two-pass strength-of-record engine and answers
//! path, rivalry, conference and schedule-strength questions over the graph.

pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod metrics;
pub mod rating;
pub mod service;
pub mod source;
pub mod tier;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{AnalyticsError, Result};
pub use types::*;

// Re-export key components
pub use graph::MatchupGraph;
pub use rating::{Leaderboard, SorEngine, SorRow};
pub use service::AnalyticsService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
