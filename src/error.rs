//! Error types for the analytics engine
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the crate. Callers that need to branch on a specific failure
//! (for example an unknown team name) can `downcast_ref::<AnalyticsError>()`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific analysis scenarios
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    #[error("Team not found: {input}")]
    TeamNotFound { input: String },

    #[error("Invalid analysis window: {reason}")]
    InvalidWindow { reason: String },

    #[error("Analysis cancelled before completion")]
    Cancelled,

    #[error("Data source error: {message}")]
    DataSource { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl AnalyticsError {
    /// Shorthand for the most common lookup failure
    pub fn team_not_found(input: impl Into<String>) -> Self {
        Self::TeamNotFound {
            input: input.into(),
        }
    }
}

/// Returns true when an error chain carries `AnalyticsError::TeamNotFound`
pub fn is_team_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<AnalyticsError>(),
        Some(AnalyticsError::TeamNotFound { .. })
    )
}
