//! Conference lineage resolution
//!
//! Historical conference labels come in many spellings ("Big 8", "Big Eight")
//! and conferences inherit from predecessors that only apply to certain
//! seasons. A lineage table folds all of them onto one canonical key.

use crate::error::{AnalyticsError, Result};
use crate::types::Season;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Trait for mapping a conference label onto its canonical key
pub trait ConferenceLineage: Send + Sync {
    /// Canonical key for `label`, if the table knows it.
    /// `season` gates predecessor names with effective year ranges.
    fn canonical(&self, label: &str, season: Option<Season>) -> Option<String>;

    /// Canonical key, or the trimmed label itself when unknown
    fn resolve(&self, label: &str, season: Option<Season>) -> String {
        self.canonical(label, season)
            .unwrap_or_else(|| label.trim().to_string())
    }
}

/// A predecessor conference folded into a canonical key
#[derive(Debug, Clone, PartialEq)]
pub struct Predecessor {
    pub name: String,
    pub start_year: Option<Season>,
    pub end_year: Option<Season>,
}

impl Predecessor {
    fn applies_to(&self, season: Option<Season>) -> bool {
        let Some(season) = season else {
            return true;
        };
        self.start_year.map_or(true, |start| season >= start)
            && self.end_year.map_or(true, |end| season <= end)
    }
}

/// All known names for one canonical conference
#[derive(Debug, Clone, PartialEq)]
pub struct LineageEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
    pub predecessors: Vec<Predecessor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPredecessor {
    Name(String),
    Dated {
        name: String,
        #[serde(default, alias = "start")]
        start_year: Option<Season>,
        #[serde(default, alias = "end")]
        end_year: Option<Season>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLineage {
    Aliases(Vec<String>),
    Detailed {
        #[serde(default)]
        aliases: Vec<String>,
        #[serde(default)]
        lineage: Vec<RawPredecessor>,
    },
}

/// Static lineage table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineageTable {
    entries: Vec<LineageEntry>,
}

impl LineageTable {
    pub fn new(entries: Vec<LineageEntry>) -> Self {
        Self { entries }
    }

    /// Parse the lineage JSON object.
    ///
    /// Each key is a canonical name; its value is either a plain list of
    /// aliases or an object with `aliases` and `lineage` lists, where lineage
    /// items are names or `{name, start_year, end_year}` objects.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, RawLineage> =
            serde_json::from_str(raw).map_err(|e| AnalyticsError::DataSource {
                message: format!("Invalid lineage JSON: {}", e),
            })?;

        let entries = parsed
            .into_iter()
            .map(|(canonical, raw)| match raw {
                RawLineage::Aliases(aliases) => LineageEntry {
                    canonical,
                    aliases,
                    predecessors: Vec::new(),
                },
                RawLineage::Detailed { aliases, lineage } => LineageEntry {
                    canonical,
                    aliases,
                    predecessors: lineage
                        .into_iter()
                        .map(|p| match p {
                            RawPredecessor::Name(name) => Predecessor {
                                name,
                                start_year: None,
                                end_year: None,
                            },
                            RawPredecessor::Dated {
                                name,
                                start_year,
                                end_year,
                            } => Predecessor {
                                name,
                                start_year,
                                end_year,
                            },
                        })
                        .collect(),
                },
            })
            .collect();

        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| AnalyticsError::DataSource {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&raw)
    }

    /// Built-in table covering the common spelling variants of the power
    /// conferences and their historical predecessors
    pub fn builtin() -> Self {
        fn entry(canonical: &str, aliases: &[&str], predecessors: &[(&str, Season, Season)]) -> LineageEntry {
            LineageEntry {
                canonical: canonical.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
                predecessors: predecessors
                    .iter()
                    .map(|(name, start, end)| Predecessor {
                        name: name.to_string(),
                        start_year: Some(*start),
                        end_year: Some(*end),
                    })
                    .collect(),
            }
        }

        Self::new(vec![
            entry(
                "Big Eight",
                &["Big 8", "Big Eight Conference"],
                &[("Big Six", 1928, 1947), ("Big 6", 1928, 1947), ("Big Seven", 1948, 1957), ("Big 7", 1948, 1957)],
            ),
            entry("Big 12", &["Big 12 Conference", "Big Twelve"], &[]),
            entry("Big Ten", &["Big Ten Conference", "Big 10"], &[("Western Conference", 1896, 1952)]),
            entry("SEC", &["Southeastern", "Southeastern Conference"], &[]),
            entry("ACC", &["Atlantic Coast", "Atlantic Coast Conference"], &[]),
            entry(
                "Pac-12",
                &["Pac-12 Conference", "Pac 12"],
                &[("Pac-10", 1978, 2010), ("Pac-8", 1968, 1977), ("AAWU", 1959, 1967), ("Pacific Coast", 1916, 1958)],
            ),
            entry("SWC", &["Southwest", "Southwest Conference"], &[]),
            entry("Mid-American", &["MAC", "Mid-American Conference"], &[]),
            entry("American Athletic", &["AAC", "American Athletic Conference"], &[]),
            entry("Conference USA", &["C-USA", "CUSA"], &[]),
        ])
    }

    pub fn entries(&self) -> &[LineageEntry] {
        &self.entries
    }
}

impl ConferenceLineage for LineageTable {
    fn canonical(&self, label: &str, season: Option<Season>) -> Option<String> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        // Exact canonical keys win outright
        if let Some(entry) = self.entries.iter().find(|e| e.canonical == label) {
            return Some(entry.canonical.clone());
        }

        self.entries
            .iter()
            .find(|entry| {
                entry.canonical.eq_ignore_ascii_case(label)
                    || entry.aliases.iter().any(|a| a.eq_ignore_ascii_case(label))
                    || entry
                        .predecessors
                        .iter()
                        .any(|p| p.name.eq_ignore_ascii_case(label) && p.applies_to(season))
            })
            .map(|entry| entry.canonical.clone())
    }
}

/// Lineage that knows nothing; every label resolves to itself
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLineage;

impl ConferenceLineage for IdentityLineage {
    fn canonical(&self, _label: &str, _season: Option<Season>) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_aliases_case_insensitive() {
        let table = LineageTable::builtin();
        assert_eq!(table.canonical("big 8", None).as_deref(), Some("Big Eight"));
        assert_eq!(
            table.canonical("Southeastern Conference", Some(1990)).as_deref(),
            Some("SEC")
        );
        assert_eq!(table.resolve("  Sun Belt ", None), "Sun Belt");
    }

    #[test]
    fn test_predecessor_honours_year_range() {
        let table = LineageTable::builtin();
        assert_eq!(table.canonical("Big Six", Some(1935)).as_deref(), Some("Big Eight"));
        assert_eq!(table.canonical("Big Six", Some(1975)), None);
        // no season given: predecessors always apply
        assert_eq!(table.canonical("Pac-8", None).as_deref(), Some("Pac-12"));
    }

    #[test]
    fn test_from_json_both_shapes() {
        let raw = r#"{
            "Mountain West": ["MWC", "Mountain West Conference"],
            "Big Sky": {
                "aliases": ["Big Sky Conference"],
                "lineage": ["Big Sky Athletic", {"name": "Rocky Mountain", "start_year": 1909, "end_year": 1962}]
            }
        }"#;
        let table = LineageTable::from_json_str(raw).unwrap();
        assert_eq!(table.entries().len(), 2);
        assert_eq!(table.canonical("mwc", None).as_deref(), Some("Mountain West"));
        assert_eq!(
            table.canonical("Big Sky Athletic", Some(2020)).as_deref(),
            Some("Big Sky")
        );
        assert_eq!(
            table.canonical("Rocky Mountain", Some(1950)).as_deref(),
            Some("Big Sky")
        );
        assert_eq!(table.canonical("Rocky Mountain", Some(1970)), None);
    }

    #[test]
    fn test_identity_lineage() {
        assert_eq!(IdentityLineage.resolve(" Ivy ", Some(1980)), "Ivy");
        assert_eq!(IdentityLineage.canonical("Ivy", None), None);
    }
}
