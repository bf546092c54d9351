//! Game record sources
//!
//! The ingestion layer that talks to the remote data provider lives outside
//! this crate; here we only read what it leaves behind (a JSON array of game
//! rows) or accept rows handed over in memory.

use crate::error::{AnalyticsError, Result};
use crate::types::GameRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Immutable, shareable cache of ingested games
pub type GameCache = Arc<[GameRecord]>;

/// Anything that can produce the full list of game records
pub trait GameSource {
    fn load_games(&self) -> Result<Vec<GameRecord>>;
}

/// Reads the cached games file written by the ingestion job
#[derive(Debug, Clone)]
pub struct JsonGameSource {
    path: PathBuf,
}

impl JsonGameSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parse a JSON array of games, dropping rows that cannot be read at all.
///
/// Rows with missing scores are kept; they are excluded later, per
/// computation. Rows without team names or a season are unusable and are
/// dropped with a warning instead of failing the whole load.
pub fn parse_games_json(raw: &str) -> Result<Vec<GameRecord>> {
    let rows: Vec<serde_json::Value> =
        serde_json::from_str(raw).map_err(|e| AnalyticsError::DataSource {
            message: format!("Games file is not a JSON array: {}", e),
        })?;

    let mut games = Vec::with_capacity(rows.len());
    let mut rejected = 0usize;
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<GameRecord>(row) {
            Ok(game) => games.push(game),
            Err(e) => {
                rejected += 1;
                debug!("Dropping unreadable game row {}: {}", index, e);
            }
        }
    }

    if rejected > 0 {
        warn!("Dropped {} unreadable game rows", rejected);
    }
    Ok(games)
}

impl GameSource for JsonGameSource {
    fn load_games(&self) -> Result<Vec<GameRecord>> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| AnalyticsError::DataSource {
            message: format!("Failed to read {}: {}", self.path.display(), e),
        })?;
        let games = parse_games_json(&raw)?;
        info!("Loaded {} games from {}", games.len(), self.path.display());
        Ok(games)
    }
}

/// Games supplied directly by the caller
#[derive(Debug, Clone, Default)]
pub struct InMemoryGameSource {
    games: Vec<GameRecord>,
}

impl InMemoryGameSource {
    pub fn new(games: Vec<GameRecord>) -> Self {
        Self { games }
    }
}

impl GameSource for InMemoryGameSource {
    fn load_games(&self) -> Result<Vec<GameRecord>> {
        Ok(self.games.clone())
    }
}

/// Load a source once into the shared read-only cache
pub fn load_cache(source: &dyn GameSource) -> Result<GameCache> {
    Ok(source.load_games()?.into())
}
