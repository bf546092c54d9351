//! External collaborators consumed by the core
//!
//! Game rows, team affiliations and conference lineages are produced by the
//! ingestion layer. This module defines the interfaces the core relies on,
//! plus file-backed and in-memory implementations.

pub mod games;
pub mod lineage;
pub mod registry;

// Re-export commonly used types
pub use games::{load_cache, parse_games_json, GameCache, GameSource, InMemoryGameSource, JsonGameSource};
pub use lineage::{ConferenceLineage, IdentityLineage, LineageEntry, LineageTable, Predecessor};
pub use registry::{InMemoryTeamRegistry, Membership, SeasonMembership, TeamProfile, TeamRegistry};
