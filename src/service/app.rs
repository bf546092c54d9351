//! Analytics service
//!
//! Wires the immutable game cache, the team registry and the conference
//! lineage to the graph, tier, rating and analysis layers. Every request
//! builds its own graph for its window; nothing is shared between requests
//! except read-only inputs.

use crate::analysis::{
    conference_members, head_to_head, opponent_profile, rivalry_report, ConferenceReport,
    ConferenceShowdown, HeadToHead, OpponentProfile, RivalryReport,
};
use crate::config::AppConfig;
use crate::error::{is_team_not_found, Result};
use crate::graph::{
    connection_chain, diameter_with_cancel, eccentricity_with_cancel, overview,
    shortest_connection, unplayed, CancellationToken, ChainLink, Connection, Diameter,
    Eccentricity, GraphOverview, MatchupGraph,
};
use crate::metrics::MetricsCollector;
use crate::rating::{Leaderboard, SorEngine, SorRow, SosCalculator, SosRank, SosReport, TieredGrader};
use crate::source::{
    load_cache, ConferenceLineage, GameCache, InMemoryTeamRegistry, JsonGameSource, LineageTable,
    TeamRegistry,
};
use crate::tier::{TierAssignments, TierClassifier};
use crate::types::{AnalysisWindow, TeamId};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Shortest connection plus the series behind each link
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub connection: Connection,
    pub chain: Vec<ChainLink>,
}

/// Direct series when the pair met, otherwise the chain between them
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchupReport {
    HeadToHead(HeadToHead),
    Chain(ConnectionReport),
    NoConnection { team: TeamId, opponent: TeamId },
}

/// Request facade over the loaded data
pub struct AnalyticsService {
    config: AppConfig,
    games: GameCache,
    registry: Arc<dyn TeamRegistry>,
    lineage: Arc<dyn ConferenceLineage>,
    grader: TieredGrader,
    metrics: Arc<MetricsCollector>,
}

impl AnalyticsService {
    pub fn new(
        config: AppConfig,
        games: GameCache,
        registry: Arc<dyn TeamRegistry>,
        lineage: Arc<dyn ConferenceLineage>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let grader = TieredGrader::new(config.rating.clone());
        Self {
            config,
            games,
            registry,
            lineage,
            grader,
            metrics,
        }
    }

    /// Load games, registry and lineage from the paths in `config`.
    ///
    /// Teams and memberships files are optional; without them the registry
    /// is derived from the game rows alone.
    pub fn from_config(config: AppConfig, metrics: Arc<MetricsCollector>) -> Result<Self> {
        info!("Initializing {} analytics service", config.service.name);

        let games_path = config.data.games_path.clone().ok_or_else(|| ServiceError::Configuration {
            message: "no games file configured (set data.games_path or GAMES_PATH)".to_string(),
        })?;
        let games = load_cache(&JsonGameSource::new(&games_path)).map_err(|e| {
            ServiceError::Initialization {
                message: format!("failed to load games from {}: {}", games_path.display(), e),
            }
        })?;
        info!("Loaded {} games from {}", games.len(), games_path.display());

        let mut registry = InMemoryTeamRegistry::from_games(&games);
        if let Some(path) = &config.data.teams_path {
            registry = registry.with_profiles(InMemoryTeamRegistry::load_profiles(path)?);
        }
        if let Some(path) = &config.data.memberships_path {
            registry = registry.with_memberships(InMemoryTeamRegistry::load_memberships(path)?);
        }
        debug!("Registry knows {} teams", registry.team_count());

        let lineage = match &config.data.lineage_path {
            Some(path) => LineageTable::load(path)?,
            None => LineageTable::builtin(),
        };

        Ok(Self::new(
            config,
            games,
            Arc::new(registry),
            Arc::new(lineage),
            metrics,
        ))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Window from the configured analysis defaults
    pub fn default_window(&self) -> AnalysisWindow {
        self.config.analysis.window()
    }

    fn instrumented<T>(&self, kind: &'static str, work: impl FnOnce() -> Result<T>) -> Result<T> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis", kind, %run_id);
        let _guard = span.enter();
        let timer = self.metrics.start_timer();

        let result = work();
        let elapsed = timer.stop();
        match &result {
            Ok(_) => debug!("{} finished in {:.2}ms", kind, elapsed.as_secs_f64() * 1000.0),
            Err(e) => {
                if is_team_not_found(e) {
                    self.metrics.record_unresolved_team();
                }
                warn!("{} failed: {}", kind, e);
            }
        }
        self.metrics.record_analysis(kind, result.is_ok(), elapsed);
        result
    }

    /// Matchup graph for one window
    pub fn build_graph(&self, window: &AnalysisWindow) -> Result<MatchupGraph> {
        window.validate()?;
        let allow: Option<HashSet<TeamId>> = window
            .filters_classifications()
            .then(|| self.registry.teams_with_classification(&window.classifications));

        let graph = MatchupGraph::build(
            self.games.iter().filter(|game| window.admits(game)),
            allow.as_ref(),
        );
        self.metrics.record_graph(&graph);
        debug!(
            "Built graph for {}-{}: {} teams, {} matchups",
            window.start_year,
            window.end_year,
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    fn rate(&self, graph: &MatchupGraph, window: &AnalysisWindow, target: Option<&str>) -> Result<Vec<SorRow>> {
        let classifier = TierClassifier::new(&self.config.tiers);
        let assignments = TierAssignments::compute(
            graph,
            window,
            &classifier,
            self.lineage.as_ref(),
            self.registry.as_ref(),
        );
        let engine = SorEngine::new(&self.config.rating, &self.grader);
        let outcome = engine.run(graph, &assignments, window, target)?;
        self.metrics.record_skipped_games(outcome.skipped_games);
        Ok(outcome.rows)
    }

    /// Full SOR leaderboard with per-tier thresholds
    pub fn leaderboard(&self, window: &AnalysisWindow) -> Result<Leaderboard> {
        self.instrumented("leaderboard", || {
            let graph = self.build_graph(window)?;
            let rows = self.rate(&graph, window, None)?;
            let board = Leaderboard::build(rows, &self.config.rating);
            info!("Leaderboard lists {} teams ({} below threshold)", board.len(), board.excluded);
            Ok(board)
        })
    }

    /// One team's SOR row with per-game details; `None` when it has no gradable game
    pub fn team_report(&self, team: &str, window: &AnalysisWindow) -> Result<Option<SorRow>> {
        self.instrumented("team", || {
            let graph = self.build_graph(window)?;
            let rows = self.rate(&graph, window, Some(team))?;
            Ok(rows.into_iter().next())
        })
    }

    pub fn connect(&self, a: &str, b: &str, window: &AnalysisWindow) -> Result<ConnectionReport> {
        self.instrumented("connect", || {
            let graph = self.build_graph(window)?;
            self.connection_report(&graph, a, b, window)
        })
    }

    fn connection_report(
        &self,
        graph: &MatchupGraph,
        a: &str,
        b: &str,
        window: &AnalysisWindow,
    ) -> Result<ConnectionReport> {
        let connection = shortest_connection(graph, a, b)?;
        let chain = match connection.path() {
            Some(path) => connection_chain(graph, path, window),
            None => Vec::new(),
        };
        Ok(ConnectionReport { connection, chain })
    }

    pub fn eccentricity(
        &self,
        team: &str,
        window: &AnalysisWindow,
        token: &CancellationToken,
    ) -> Result<Eccentricity> {
        self.instrumented("eccentricity", || {
            let graph = self.build_graph(window)?;
            eccentricity_with_cancel(&graph, team, token)
        })
    }

    pub fn diameter(&self, window: &AnalysisWindow, token: &CancellationToken) -> Result<Diameter> {
        self.instrumented("diameter", || {
            let graph = self.build_graph(window)?;
            let result = diameter_with_cancel(&graph, token)?;
            if result.restricted {
                info!(
                    "Graph is disconnected; diameter measured on the largest component ({} teams)",
                    result.component_size
                );
            }
            Ok(result)
        })
    }

    pub fn overview(&self, window: &AnalysisWindow) -> Result<GraphOverview> {
        self.instrumented("overview", || {
            let graph = self.build_graph(window)?;
            Ok(overview(&graph))
        })
    }

    /// Teams in the window's graph that `team` never played
    pub fn unplayed(&self, team: &str, window: &AnalysisWindow) -> Result<Vec<TeamId>> {
        self.instrumented("unplayed", || {
            let graph = self.build_graph(window)?;
            let universe: HashSet<TeamId> = graph.teams().map(str::to_string).collect();
            unplayed(&graph, team, &universe)
        })
    }

    /// Head-to-head when the pair met in the window, otherwise how they connect
    pub fn matchup(&self, team: &str, opponent: &str, window: &AnalysisWindow) -> Result<MatchupReport> {
        self.instrumented("matchup", || {
            let graph = self.build_graph(window)?;
            if let Some(report) = head_to_head(&graph, team, opponent)? {
                return Ok(MatchupReport::HeadToHead(report));
            }
            let report = self.connection_report(&graph, team, opponent, window)?;
            Ok(match report.connection {
                Connection::NoPath => MatchupReport::NoConnection {
                    team: team.to_string(),
                    opponent: opponent.to_string(),
                },
                _ => MatchupReport::Chain(report),
            })
        })
    }

    pub fn rivalries(&self, window: &AnalysisWindow, limit: usize) -> Result<RivalryReport> {
        self.instrumented("rivalries", || {
            let graph = self.build_graph(window)?;
            Ok(rivalry_report(&graph, limit))
        })
    }

    pub fn opponents(&self, team: &str, window: &AnalysisWindow) -> Result<OpponentProfile> {
        self.instrumented("opponents", || {
            let graph = self.build_graph(window)?;
            opponent_profile(&graph, team, window.non_conference_only, self.lineage.as_ref())
        })
    }

    /// Registry members of `conference` in the window, under their graph names
    fn members_in_graph(&self, graph: &MatchupGraph, conference: &str, window: &AnalysisWindow) -> Vec<TeamId> {
        let mut members: Vec<TeamId> = conference_members(
            self.registry.as_ref(),
            self.lineage.as_ref(),
            conference,
            window.start_year,
            window.end_year,
        )
        .iter()
        .filter_map(|team| graph.resolve_team(team).map(str::to_string))
        .collect();
        members.sort();
        members.dedup();
        members
    }

    pub fn conference_showdown(
        &self,
        first: &str,
        second: &str,
        window: &AnalysisWindow,
    ) -> Result<ConferenceShowdown> {
        self.instrumented("conference_showdown", || {
            let graph = self.build_graph(window)?;
            let first_members = self.members_in_graph(&graph, first, window);
            let second_members = self.members_in_graph(&graph, second, window);
            if first_members.is_empty() || second_members.is_empty() {
                warn!("No members found for {} or {} in the window", first, second);
            }
            Ok(ConferenceShowdown::compute(
                &graph,
                window,
                (first, &first_members),
                (second, &second_members),
            ))
        })
    }

    pub fn conference_report(&self, conference: &str, window: &AnalysisWindow) -> Result<ConferenceReport> {
        self.instrumented("conference_report", || {
            let graph = self.build_graph(window)?;
            let members = self.members_in_graph(&graph, conference, window);
            Ok(ConferenceReport::compute(&graph, window, conference, &members))
        })
    }

    /// Schedule strength for one team; `None` when no opponent has a record
    pub fn sos(&self, team: &str, window: &AnalysisWindow) -> Result<Option<SosReport>> {
        self.instrumented("sos", || {
            let graph = self.build_graph(window)?;
            let team = graph.require_team(team)?;
            let calculator = SosCalculator::new(
                &graph,
                window,
                &self.games,
                self.registry.as_ref(),
                self.lineage.as_ref(),
            );
            Ok(calculator.team(team, window.non_conference_only))
        })
    }

    /// Schedule strength for every team with at least `min_games` games,
    /// defaulting to the configured minimum
    pub fn sos_leaderboard(&self, window: &AnalysisWindow, min_games: Option<usize>) -> Result<Vec<SosRank>> {
        self.instrumented("sos_leaderboard", || {
            let graph = self.build_graph(window)?;
            let calculator = SosCalculator::new(
                &graph,
                window,
                &self.games,
                self.registry.as_ref(),
                self.lineage.as_ref(),
            );
            let min_games = min_games.unwrap_or(self.config.analysis.sos_min_games as usize);
            Ok(calculator.leaderboard(min_games, window.non_conference_only))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::source::registry::MockTeamRegistry;
    use crate::source::IdentityLineage;
    use crate::types::{Classification, GameRecord};

    fn games() -> GameCache {
        vec![
            GameRecord::final_score(2020, 1, "A", 21, "B", 14),
            GameRecord::final_score(2020, 2, "B", 28, "C", 3),
            GameRecord::final_score(2020, 3, "C", 10, "D", 7),
            GameRecord::final_score(2010, 1, "A", 7, "D", 0),
        ]
        .into()
    }

    fn service(registry: impl TeamRegistry + 'static) -> AnalyticsService {
        AnalyticsService::new(
            AppConfig::default(),
            games(),
            Arc::new(registry),
            Arc::new(IdentityLineage),
            Arc::new(MetricsCollector::new().unwrap()),
        )
    }

    #[test]
    fn test_graph_respects_window() {
        let service = service(InMemoryTeamRegistry::from_games(&games()));
        let graph = service.build_graph(&AnalysisWindow::seasons(2020, 2020)).unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.edge("A", "D").is_none());
        assert_eq!(service.metrics().graph().matchups.get(), 3);
    }

    #[test]
    fn test_matchup_falls_back_to_chain() {
        let service = service(InMemoryTeamRegistry::from_games(&games()));
        let window = AnalysisWindow::seasons(2020, 2020);

        match service.matchup("A", "B", &window).unwrap() {
            MatchupReport::HeadToHead(report) => assert_eq!(report.overall.wins, 1),
            other => panic!("expected head-to-head, got {:?}", other),
        }
        match service.matchup("A", "D", &window).unwrap() {
            MatchupReport::Chain(report) => {
                assert_eq!(report.connection.path().unwrap().len(), 4);
                assert_eq!(report.chain.len(), 3);
            }
            other => panic!("expected chain, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_team_is_counted() {
        let service = service(InMemoryTeamRegistry::from_games(&games()));
        let window = AnalysisWindow::seasons(2020, 2020);
        let err = service.opponents("Nowhere State", &window).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalyticsError>(),
            Some(AnalyticsError::TeamNotFound { .. })
        ));
        assert_eq!(service.metrics().analysis().unresolved_teams_total.get(), 1);
    }

    #[test]
    fn test_classification_filter_uses_registry() {
        let mut registry = MockTeamRegistry::new();
        registry
            .expect_teams_with_classification()
            .returning(|_| ["A", "B"].iter().map(|t| t.to_string()).collect());
        let service = service(registry);
        let window = AnalysisWindow::seasons(2020, 2020).with_classifications(vec![Classification::Fbs]);

        let graph = service.build_graph(&window).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.summary().filtered_out, 2);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let service = service(InMemoryTeamRegistry::from_games(&games()));
        let err = service.overview(&AnalysisWindow::seasons(2021, 2020)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalyticsError>(),
            Some(AnalyticsError::InvalidWindow { .. })
        ));
    }
}
