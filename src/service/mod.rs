//! Service layer for the gridiron-sor analytics engine
//!
//! The service owns the loaded inputs and answers one analysis per call.

pub mod app;

pub use app::{AnalyticsService, ConnectionReport, MatchupReport, ServiceError};
