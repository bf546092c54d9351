//! Configuration management for the gridiron-sor engine
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and the immutable rule tables passed into the tier
//! classifier and rating engine.

pub mod app;
pub mod rating;
pub mod tiers;

// Re-export commonly used types
pub use app::{validate_config, AnalysisSettings, AppConfig, DataSettings, ServiceSettings};
pub use rating::RatingConfig;
pub use tiers::{ClassificationDefaults, ConferenceTier, TierTable};
