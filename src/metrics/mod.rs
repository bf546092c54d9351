//! Metrics for the analytics service
//!
//! Prometheus counters, histograms and gauges. The registry is private to
//! each collector; the binary can dump its text exposition after a run.

pub mod collector;

pub use collector::{AnalysisMetrics, GraphMetrics, MetricsCollector, MetricsTimer};
