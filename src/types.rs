//! Common types used throughout the analytics engine

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Reads an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Canonical team identifier as supplied by the data provider
pub type TeamId = String;

/// Season (calendar year the season started in)
pub type Season = i32;

/// Week used for the lower bound when a game carries no week number
pub const MISSING_WEEK_LOWER: u32 = 0;

/// Week used for the upper bound when a game carries no week number
pub const MISSING_WEEK_UPPER: u32 = 99;

/// NCAA classification of a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Classification {
    Fbs,
    Fcs,
    DivisionII,
    DivisionIII,
    Unknown,
}

impl Classification {
    pub const ALL: [Classification; 5] = [
        Classification::Fbs,
        Classification::Fcs,
        Classification::DivisionII,
        Classification::DivisionIII,
        Classification::Unknown,
    ];

    /// Parse a provider label; anything unrecognised maps to `Unknown`
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "fbs" => Classification::Fbs,
            "fcs" => Classification::Fcs,
            "ii" | "d2" | "division ii" => Classification::DivisionII,
            "iii" | "d3" | "division iii" => Classification::DivisionIII,
            _ => Classification::Unknown,
        }
    }

    /// Short provider label
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Fbs => "fbs",
            Classification::Fcs => "fcs",
            Classification::DivisionII => "ii",
            Classification::DivisionIII => "iii",
            Classification::Unknown => "unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Classification::Unknown
    }
}

impl Default for Classification {
    fn default() -> Self {
        Classification::Unknown
    }
}

impl From<Option<String>> for Classification {
    fn from(label: Option<String>) -> Self {
        label
            .as_deref()
            .map(Classification::parse)
            .unwrap_or(Classification::Unknown)
    }
}

impl From<Classification> for String {
    fn from(classification: Classification) -> Self {
        classification.as_str().to_string()
    }
}

impl std::str::FromStr for Classification {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Classification::parse(s))
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Part of the season a game belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeasonType {
    #[default]
    Regular,
    Postseason,
}

/// Strength bucket, 1 (strongest) through 8 (weakest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Tier(u8);

impl Tier {
    pub const COUNT: usize = 8;
    pub const STRONGEST: Tier = Tier(1);
    pub const WEAKEST: Tier = Tier(8);

    pub fn new(value: u8) -> Option<Self> {
        (1..=Self::COUNT as u8).contains(&value).then_some(Tier(value))
    }

    /// All tiers from strongest to weakest
    pub fn all() -> impl Iterator<Item = Tier> {
        (1..=Self::COUNT as u8).map(Tier)
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Zero-based position for table lookups
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Signed tier distance `other - self`; positive means `other` is weaker
    pub fn diff_to(&self, other: Tier) -> i32 {
        other.0 as i32 - self.0 as i32
    }

    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "P4",
            2 => "G5",
            3 => "FCS Pwr",
            4 => "FCS Std",
            5 => "D2 Pwr",
            6 => "D2 Std",
            7 => "D3 Pwr",
            _ => "D3 Std",
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Tier::new(value).ok_or_else(|| format!("tier must be between 1 and 8, got {}", value))
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a single game from one side's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    pub fn from_margin(margin: i32) -> Self {
        match margin.cmp(&0) {
            std::cmp::Ordering::Greater => Outcome::Win,
            std::cmp::Ordering::Less => Outcome::Loss,
            std::cmp::Ordering::Equal => Outcome::Tie,
        }
    }

    pub fn letter(&self) -> char {
        match self {
            Outcome::Win => 'W',
            Outcome::Loss => 'L',
            Outcome::Tie => 'T',
        }
    }
}

/// Win-loss-tie tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Tie => self.ties += 1,
        }
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Decisive games only
    pub fn decided(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        crate::utils::win_percentage(self.wins, self.losses, self.ties)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// One played (or scheduled) contest as supplied by the ingestion layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub season: Season,
    #[serde(default)]
    pub week: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub season_type: SeasonType,
    #[serde(alias = "home")]
    pub home_team: TeamId,
    #[serde(alias = "away")]
    pub away_team: TeamId,
    #[serde(default, alias = "home_conf")]
    pub home_conference: Option<String>,
    #[serde(default, alias = "away_conf")]
    pub away_conference: Option<String>,
    #[serde(default)]
    pub home_classification: Classification,
    #[serde(default)]
    pub away_classification: Classification,
    #[serde(default, alias = "home_score")]
    pub home_points: Option<i32>,
    #[serde(default, alias = "away_score")]
    pub away_points: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conference_game: bool,
}

/// A game seen from one participant's side
#[derive(Debug, Clone, Copy)]
pub struct Perspective<'a> {
    pub is_home: bool,
    pub opponent: &'a str,
    pub own_points: Option<i32>,
    pub opponent_points: Option<i32>,
    pub own_conference: Option<&'a str>,
    pub own_classification: Classification,
}

impl Perspective<'_> {
    /// Own minus opponent score, when both are recorded
    pub fn margin(&self) -> Option<i32> {
        Some(self.own_points? - self.opponent_points?)
    }
}

impl GameRecord {
    /// Convenience constructor for a regular-season game with final scores
    pub fn final_score(
        season: Season,
        week: u32,
        home_team: impl Into<TeamId>,
        home_points: i32,
        away_team: impl Into<TeamId>,
        away_points: i32,
    ) -> Self {
        Self {
            season,
            week: Some(week),
            season_type: SeasonType::Regular,
            home_team: home_team.into(),
            away_team: away_team.into(),
            home_conference: None,
            away_conference: None,
            home_classification: Classification::Unknown,
            away_classification: Classification::Unknown,
            home_points: Some(home_points),
            away_points: Some(away_points),
            conference_game: false,
        }
    }

    pub fn has_scores(&self) -> bool {
        self.home_points.is_some() && self.away_points.is_some()
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home_team == team || self.away_team == team
    }

    /// View the game from `team`'s side; `None` if `team` did not play
    pub fn perspective(&self, team: &str) -> Option<Perspective<'_>> {
        if self.home_team == team {
            Some(Perspective {
                is_home: true,
                opponent: &self.away_team,
                own_points: self.home_points,
                opponent_points: self.away_points,
                own_conference: self.home_conference.as_deref(),
                own_classification: self.home_classification,
            })
        } else if self.away_team == team {
            Some(Perspective {
                is_home: false,
                opponent: &self.home_team,
                own_points: self.away_points,
                opponent_points: self.home_points,
                own_conference: self.away_conference.as_deref(),
                own_classification: self.away_classification,
            })
        } else {
            None
        }
    }

    /// Flagged by the provider, or both sides report the same conference
    pub fn is_conference_game(&self) -> bool {
        if self.conference_game {
            return true;
        }
        match (&self.home_conference, &self.away_conference) {
            (Some(home), Some(away)) => home.trim().eq_ignore_ascii_case(away.trim()),
            _ => false,
        }
    }

    /// Sort key placing games in chronological order within the data set
    pub fn chronological_key(&self) -> (Season, u32) {
        (self.season, self.week.unwrap_or(MISSING_WEEK_LOWER))
    }
}

/// Filter parameters for a single analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start_year: Season,
    pub end_year: Season,
    #[serde(default)]
    pub start_week: Option<u32>,
    #[serde(default)]
    pub end_week: Option<u32>,
    #[serde(default)]
    pub include_postseason: bool,
    #[serde(default)]
    pub non_conference_only: bool,
    /// Empty means every classification is admitted
    #[serde(default)]
    pub classifications: Vec<Classification>,
}

impl AnalysisWindow {
    pub fn seasons(start_year: Season, end_year: Season) -> Self {
        Self {
            start_year,
            end_year,
            start_week: None,
            end_week: None,
            include_postseason: false,
            non_conference_only: false,
            classifications: Vec::new(),
        }
    }

    pub fn with_weeks(mut self, start_week: Option<u32>, end_week: Option<u32>) -> Self {
        self.start_week = start_week;
        self.end_week = end_week;
        self
    }

    pub fn with_postseason(mut self, include: bool) -> Self {
        self.include_postseason = include;
        self
    }

    pub fn with_classifications(mut self, classifications: Vec<Classification>) -> Self {
        self.classifications = classifications;
        self
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.start_year > self.end_year {
            return Err(crate::error::AnalyticsError::InvalidWindow {
                reason: format!(
                    "start year {} is after end year {}",
                    self.start_year, self.end_year
                ),
            }
            .into());
        }
        if let (Some(start), Some(end)) = (self.start_week, self.end_week) {
            if start > end {
                return Err(crate::error::AnalyticsError::InvalidWindow {
                    reason: format!("start week {} is after end week {}", start, end),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn contains_season(&self, season: Season) -> bool {
        self.start_year <= season && season <= self.end_year
    }

    /// Week bounds; a missing week sits below any start and above any end bound
    pub fn contains_week(&self, week: Option<u32>) -> bool {
        if let Some(start) = self.start_week {
            if week.unwrap_or(MISSING_WEEK_LOWER) < start {
                return false;
            }
        }
        if let Some(end) = self.end_week {
            if week.unwrap_or(MISSING_WEEK_UPPER) > end {
                return false;
            }
        }
        true
    }

    /// Whether a game belongs in the matchup graph for this window.
    /// Week bounds are applied later, during grading.
    pub fn admits(&self, game: &GameRecord) -> bool {
        if !self.contains_season(game.season) {
            return false;
        }
        if !self.include_postseason && game.season_type != SeasonType::Regular {
            return false;
        }
        if self.non_conference_only && game.is_conference_game() {
            return false;
        }
        true
    }

    /// True when the classification list actually restricts anything
    pub fn filters_classifications(&self) -> bool {
        !self.classifications.is_empty()
            && !Classification::ALL
                .iter()
                .filter(|c| c.is_known())
                .all(|c| self.classifications.contains(c))
    }
}
