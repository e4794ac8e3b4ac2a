//! Core error types for roundbell-core.
//!
//! The timer engine itself has no fallible operations. Errors only come from
//! the edges: loading plans and configuration, recording finished sessions,
//! and announcement back-ends.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for roundbell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Plan loading errors
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Workout history errors
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Config directory could not be determined or created
    #[error("Config directory unavailable: {0}")]
    DirUnavailable(String),
}

/// Plan-specific errors.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Failed to read plan {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    #[error("Failed to parse plan: {0}")]
    ParseFailed(String),

    #[error("Unknown workout type: {0}")]
    UnknownWorkoutType(String),
}

/// Errors from the workout history collaborator.
///
/// These surface to the host ("retry / skip saving") and never re-enter the
/// timer.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Failed to open the history store
    #[error("Failed to open history at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("History database is locked")]
    Locked,

    /// The sink refused the record
    #[error("Failed to save workout: {0}")]
    Rejected(String),
}

/// Failure reported by an announcement back-end. Logged and dropped by the
/// session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Announcement failed: {0}")]
pub struct AnnounceError(pub String);

/// Failure reported by a status notifier (lock screen, tray, etc.).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Status notification failed: {0}")]
pub struct NotifyError(pub String);

impl From<rusqlite::Error> for HistoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    HistoryError::Locked
                } else {
                    HistoryError::QueryFailed(err.to_string())
                }
            }
            _ => HistoryError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_convert_into_core_error() {
        let err: CoreError = PlanError::ParseFailed("bad".into()).into();
        assert_eq!(err.to_string(), "Plan error: Failed to parse plan: bad");

        let err: CoreError = ConfigError::UnknownKey("x.y".into()).into();
        assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn sqlite_errors_map_to_query_failed() {
        let err: HistoryError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, HistoryError::QueryFailed(_)));
    }
}
