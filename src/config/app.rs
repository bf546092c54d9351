//! Main application configuration
//!
//! This module defines the primary configuration structures for the analytics
//! engine, including TOML file and environment variable loading and validation.

use super::rating::RatingConfig;
use super::tiers::TierTable;
use crate::types::{AnalysisWindow, Classification, Season};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub data: DataSettings,
    pub analysis: AnalysisSettings,
    pub rating: RatingConfig,
    pub tiers: TierTable,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Locations of the externally produced data files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON array of game records
    pub games_path: Option<PathBuf>,
    /// JSON array of team profiles (latest conference and classification)
    pub teams_path: Option<PathBuf>,
    /// JSON array of historical conference memberships
    pub memberships_path: Option<PathBuf>,
    /// JSON object of conference aliases and lineages
    pub lineage_path: Option<PathBuf>,
}

/// Defaults applied to every analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub start_year: Season,
    pub end_year: Season,
    pub include_postseason: bool,
    pub non_conference_only: bool,
    /// Empty means all classifications
    pub classifications: Vec<Classification>,
    /// Minimum games for a team to appear on the schedule strength leaderboard
    pub sos_min_games: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "gridiron-sor".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let season = crate::utils::current_season();
        Self {
            start_year: season,
            end_year: season,
            include_postseason: false,
            non_conference_only: false,
            classifications: Vec::new(),
            sos_min_games: 10,
        }
    }
}

impl AnalysisSettings {
    /// Build the default window for a request
    pub fn window(&self) -> AnalysisWindow {
        AnalysisWindow {
            start_year: self.start_year,
            end_year: self.end_year,
            start_week: None,
            end_week: None,
            include_postseason: self.include_postseason,
            non_conference_only: self.non_conference_only,
            classifications: self.classifications.clone(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Data settings
        if let Ok(path) = env::var("GAMES_PATH") {
            self.data.games_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = env::var("TEAMS_PATH") {
            self.data.teams_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = env::var("MEMBERSHIPS_PATH") {
            self.data.memberships_path = Some(PathBuf::from(path));
        }
        if let Ok(path) = env::var("LINEAGE_PATH") {
            self.data.lineage_path = Some(PathBuf::from(path));
        }

        // Analysis settings
        if let Ok(start) = env::var("START_YEAR") {
            self.analysis.start_year = parse_env("START_YEAR", &start)?;
        }
        if let Ok(end) = env::var("END_YEAR") {
            self.analysis.end_year = parse_env("END_YEAR", &end)?;
        }
        if let Ok(postseason) = env::var("INCLUDE_POSTSEASON") {
            self.analysis.include_postseason = parse_env("INCLUDE_POSTSEASON", &postseason)?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate analysis window
    if config.analysis.start_year > config.analysis.end_year {
        return Err(anyhow!(
            "Start year {} is after end year {}",
            config.analysis.start_year,
            config.analysis.end_year
        ));
    }

    config.rating.validate()?;
    config.tiers.validate()?;

    Ok(())
}
