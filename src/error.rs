//! Error taxonomy shared by the catalog client, the store and the core.
//!
//! Coordination signals such as "a build is already running" are not errors
//! and live in [`crate::management::StartOutcome`] and
//! [`crate::management::CacheStatus`]. Partially applied playlist updates are
//! reported through [`crate::smart::ApplyOutcome`].

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// No valid credential. Never retried internally.
    #[error("Not authenticated. Run sporltag auth first.")]
    AuthRequired,

    /// A remote catalog call failed or timed out.
    #[error("Remote catalog unavailable: {0}")]
    RemoteUnavailable(String),

    /// The playlist description carries no criteria marker.
    #[error("This playlist was not created with filter criteria")]
    NotSmart,

    /// The playlist description carries a marker whose token can't be decoded.
    #[error("Could not parse playlist criteria: {0}")]
    CriteriaCorrupt(String),

    #[error("Liked songs cache not available. Load the cache first.")]
    NoCacheAvailable,

    #[error("No songs match your criteria")]
    NoMatches,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl AppError {
    /// Classifies a failed remote response by its HTTP status.
    pub fn from_remote_status(status: StatusCode, detail: impl Into<String>) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => AppError::AuthRequired,
            StatusCode::NOT_FOUND => AppError::NotFound(detail.into()),
            _ => AppError::RemoteUnavailable(detail.into()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => AppError::from_remote_status(status, err.to_string()),
            None => AppError::RemoteUnavailable(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
