//! Test fixtures and recording implementations for integration testing

#![allow(dead_code)]

use gridiron_sor::config::AppConfig;
use gridiron_sor::metrics::MetricsCollector;
use gridiron_sor::service::AnalyticsService;
use gridiron_sor::source::{
    ConferenceLineage, InMemoryTeamRegistry, LineageTable, Membership, SeasonMembership,
    TeamProfile, TeamRegistry,
};
use gridiron_sor::types::{Classification, GameRecord, Season, SeasonType, TeamId};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// FBS game with both sides in `conference`
pub fn league_game(
    season: Season,
    week: u32,
    home: &str,
    home_points: i32,
    away: &str,
    away_points: i32,
    conference: &str,
) -> GameRecord {
    let mut game = GameRecord::final_score(season, week, home, home_points, away, away_points);
    game.home_conference = Some(conference.to_string());
    game.away_conference = Some(conference.to_string());
    game.home_classification = Classification::Fbs;
    game.away_classification = Classification::Fbs;
    game
}

pub fn unscored(season: Season, week: u32, home: &str, away: &str) -> GameRecord {
    let mut game = GameRecord::final_score(season, week, home, 0, away, 0);
    game.home_points = None;
    game.away_points = None;
    game
}

pub fn bowl(season: Season, home: &str, home_points: i32, away: &str, away_points: i32) -> GameRecord {
    let mut game = GameRecord::final_score(season, 16, home, home_points, away, away_points);
    game.season_type = SeasonType::Postseason;
    game
}

/// Path graph A - B - C - D, one game per link
pub fn path_games() -> Vec<GameRecord> {
    vec![
        GameRecord::final_score(2000, 1, "A", 21, "B", 14),
        GameRecord::final_score(2000, 2, "B", 17, "C", 10),
        GameRecord::final_score(2000, 3, "C", 24, "D", 3),
    ]
}

/// Two small leagues over two seasons.
///
/// The SEC side (tier 1) plays a round robin plus one game against each
/// Sun Belt (tier 2) team every season; one Sun Belt result is missing.
pub fn two_league_games() -> Vec<GameRecord> {
    let mut games = Vec::new();
    for season in [2019, 2020] {
        games.push(league_game(season, 1, "Alabama", 35, "Auburn", 14, "SEC"));
        games.push(league_game(season, 2, "Georgia", 27, "Alabama", 24, "SEC"));
        games.push(league_game(season, 3, "Auburn", 20, "Georgia", 20, "SEC"));
        games.push(league_game(season, 1, "Troy", 31, "Appalachian State", 28, "Sun Belt"));
        games.push(league_game(season, 2, "Appalachian State", 21, "Georgia State", 7, "Sun Belt"));
        games.push(league_game(season, 3, "Georgia State", 10, "Troy", 13, "Sun Belt"));

        let mut cross = |week, home: &str, hp, away: &str, ap| {
            let mut game = league_game(season, week, home, hp, away, ap, "SEC");
            game.away_conference = Some("Sun Belt".to_string());
            games.push(game);
        };
        cross(4, "Alabama", 42, "Troy", 10);
        cross(5, "Auburn", 17, "Appalachian State", 24);
        cross(6, "Georgia", 38, "Georgia State", 0);
    }
    games.push(unscored(2020, 7, "Troy", "Georgia State"));
    games
}

pub fn membership(team: &str, conference: &str, start: Season, end: Season) -> Membership {
    Membership {
        team: team.to_string(),
        conference: conference.to_string(),
        start_year: start,
        end_year: end,
        classification: Classification::Fbs,
    }
}

pub fn two_league_registry() -> InMemoryTeamRegistry {
    let games = two_league_games();
    InMemoryTeamRegistry::from_games(&games).with_memberships(vec![
        membership("Alabama", "SEC", 1933, 2024),
        membership("Auburn", "Southeastern Conference", 1933, 2024),
        membership("Georgia", "SEC", 1933, 2024),
        membership("Troy", "Sun Belt", 2004, 2024),
        membership("Appalachian State", "Sun Belt", 2014, 2024),
        membership("Georgia State", "Sun Belt", 2013, 2024),
    ])
}

/// Registry wrapper that records every lookup it serves
#[derive(Default)]
pub struct RecordingRegistry {
    inner: InMemoryTeamRegistry,
    calls: Arc<Mutex<Vec<String>>>,
}

impl RecordingRegistry {
    pub fn new(inner: InMemoryTeamRegistry) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    pub fn shared_calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

impl TeamRegistry for RecordingRegistry {
    fn profile(&self, team: &str) -> Option<TeamProfile> {
        self.record(format!("profile:{}", team));
        self.inner.profile(team)
    }

    fn last_regular_season_membership(
        &self,
        team: &str,
        start: Season,
        end: Season,
    ) -> Option<SeasonMembership> {
        self.record(format!("last_membership:{}", team));
        self.inner.last_regular_season_membership(team, start, end)
    }

    fn memberships(&self, start: Season, end: Season) -> Vec<Membership> {
        self.record(format!("memberships:{}-{}", start, end));
        self.inner.memberships(start, end)
    }

    fn teams_with_classification(&self, classifications: &[Classification]) -> HashSet<TeamId> {
        self.record(format!("classification:{:?}", classifications));
        self.inner.teams_with_classification(classifications)
    }
}

pub fn service_with(
    games: Vec<GameRecord>,
    registry: impl TeamRegistry + 'static,
) -> AnalyticsService {
    let lineage: Arc<dyn ConferenceLineage> = Arc::new(LineageTable::builtin());
    AnalyticsService::new(
        AppConfig::default(),
        games.into(),
        Arc::new(registry),
        lineage,
        Arc::new(MetricsCollector::new().expect("metrics collector")),
    )
}

/// Unique scratch file under the system temp directory
pub fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("gridiron-sor-{}-{}", uuid::Uuid::new_v4(), name));
    std::fs::write(&path, contents).expect("write scratch file");
    path
}
