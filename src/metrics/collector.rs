//! Metrics collection using Prometheus
//!
//! Counters and histograms for analysis runs, plus gauges describing the
//! most recently built matchup graph.

use crate::graph::{BuildSummary, MatchupGraph};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the analytics service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    analysis_metrics: AnalysisMetrics,

    graph_metrics: GraphMetrics,
}

/// Per-request metrics
#[derive(Clone)]
pub struct AnalysisMetrics {
    /// Requests served, by analysis kind and status
    pub analyses_total: IntCounterVec,

    /// Wall time per analysis kind
    pub analysis_duration_seconds: HistogramVec,

    /// Games excluded from grading because a score was missing
    pub skipped_games_total: IntCounter,

    /// Game rows rejected by the window or classification filter
    pub filtered_games_total: IntCounter,

    /// Requests that named a team the graph could not resolve
    pub unresolved_teams_total: IntCounter,
}

/// Shape of the last graph built
#[derive(Clone)]
pub struct GraphMetrics {
    pub teams: IntGauge,

    pub matchups: IntGauge,

    /// Game rows accepted into the last graph
    pub games: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let analysis_metrics = AnalysisMetrics::new(&registry)?;
        let graph_metrics = GraphMetrics::new(&registry)?;

        Ok(Self {
            registry,
            analysis_metrics,
            graph_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn analysis(&self) -> &AnalysisMetrics {
        &self.analysis_metrics
    }

    pub fn graph(&self) -> &GraphMetrics {
        &self.graph_metrics
    }

    /// Record one finished analysis
    pub fn record_analysis(&self, kind: &str, success: bool, duration: Duration) {
        let status = if success { "success" } else { "error" };

        self.analysis_metrics
            .analyses_total
            .with_label_values(&[kind, status])
            .inc();

        self.analysis_metrics
            .analysis_duration_seconds
            .with_label_values(&[kind])
            .observe(duration.as_secs_f64());
    }

    pub fn record_skipped_games(&self, count: usize) {
        self.analysis_metrics
            .skipped_games_total
            .inc_by(count as u64);
    }

    pub fn record_unresolved_team(&self) {
        self.analysis_metrics.unresolved_teams_total.inc();
    }

    /// Update graph gauges and the filtered-row counter after a build
    pub fn record_graph(&self, graph: &MatchupGraph) {
        let BuildSummary {
            accepted,
            filtered_out,
        } = graph.summary();

        self.graph_metrics.teams.set(graph.node_count() as i64);
        self.graph_metrics.matchups.set(graph.edge_count() as i64);
        self.graph_metrics.games.set(accepted as i64);
        self.analysis_metrics
            .filtered_games_total
            .inc_by(filtered_out as u64);
    }

    /// Text exposition of everything registered
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl AnalysisMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let analyses_total = IntCounterVec::new(
            Opts::new("gridiron_sor_analyses_total", "Total analyses served"),
            &["kind", "status"],
        )?;
        registry.register(Box::new(analyses_total.clone()))?;

        let analysis_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "gridiron_sor_analysis_duration_seconds",
                "Analysis wall time",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["kind"],
        )?;
        registry.register(Box::new(analysis_duration_seconds.clone()))?;

        let skipped_games_total = IntCounter::new(
            "gridiron_sor_skipped_games_total",
            "Games without scores excluded from grading",
        )?;
        registry.register(Box::new(skipped_games_total.clone()))?;

        let filtered_games_total = IntCounter::new(
            "gridiron_sor_filtered_games_total",
            "Game rows rejected while building the graph",
        )?;
        registry.register(Box::new(filtered_games_total.clone()))?;

        let unresolved_teams_total = IntCounter::new(
            "gridiron_sor_unresolved_teams_total",
            "Team names that could not be resolved",
        )?;
        registry.register(Box::new(unresolved_teams_total.clone()))?;

        Ok(Self {
            analyses_total,
            analysis_duration_seconds,
            skipped_games_total,
            filtered_games_total,
            unresolved_teams_total,
        })
    }
}

impl GraphMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let teams = IntGauge::new("gridiron_sor_graph_teams", "Teams in the last graph")?;
        registry.register(Box::new(teams.clone()))?;

        let matchups = IntGauge::new(
            "gridiron_sor_graph_matchups",
            "Distinct matchups in the last graph",
        )?;
        registry.register(Box::new(matchups.clone()))?;

        let games = IntGauge::new("gridiron_sor_graph_games", "Games in the last graph")?;
        registry.register(Box::new(games.clone()))?;

        Ok(Self {
            teams,
            matchups,
            games,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameRecord;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let _analysis = collector.analysis();
        let _graph = collector.graph();
    }

    #[test]
    fn test_record_analysis_and_gather() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        collector.record_analysis("leaderboard", true, Duration::from_millis(12));
        collector.record_analysis("leaderboard", false, Duration::from_millis(3));
        collector.record_skipped_games(4);

        assert_eq!(
            collector
                .analysis()
                .analyses_total
                .with_label_values(&["leaderboard", "success"])
                .get(),
            1
        );
        assert_eq!(collector.analysis().skipped_games_total.get(), 4);

        let text = collector.gather_text().unwrap();
        assert!(text.contains("gridiron_sor_analyses_total"));
    }

    #[test]
    fn test_record_graph() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let games = vec![
            GameRecord::final_score(2000, 1, "A", 1, "B", 0),
            GameRecord::final_score(2000, 2, "B", 1, "C", 0),
        ];
        let graph = MatchupGraph::build(&games, None);
        collector.record_graph(&graph);

        assert_eq!(collector.graph().teams.get(), 3);
        assert_eq!(collector.graph().matchups.get(), 2);
        assert_eq!(collector.graph().games.get(), 2);
    }

    #[test]
    fn test_metrics_timer() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");
        let timer = collector.start_timer();

        std::thread::sleep(Duration::from_millis(10));
        let duration = timer.elapsed();
        assert!(duration >= Duration::from_millis(10));

        let final_duration = timer.stop();
        assert!(final_duration >= Duration::from_millis(10));
    }
}
