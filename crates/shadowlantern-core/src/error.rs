//! Core error types for shadowlantern-core.
//!
//! This module defines the error hierarchy using thiserror. Validation
//! errors are raised before any state is touched; interpretation errors are
//! normally absorbed by the adapter and replaced with a fallback result.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for shadowlantern-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected at the boundary
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Static configuration or config file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Interpretation adapter errors
    #[error("Interpretation error: {0}")]
    Interpret(#[from] InterpretError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// OS keyring errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace
    #[error("'{field}' must not be empty")]
    EmptyField { field: String },

    /// Numeric value outside the accepted range
    #[error("Value {value} for '{field}' is out of range ({min}..={max})")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Operation needs an active habit
    #[error("No active habit")]
    NoActiveHabit,

    /// Diagnosis session already finished
    #[error("Diagnosis session is already complete")]
    SessionComplete,

    /// Phase already holds its maximum number of responses
    #[error("Phase '{phase}' accepts at most {max} responses")]
    TooManyResponses { phase: String, max: usize },

    /// Operation not valid in the current state
    #[error("Invalid state: {message}")]
    InvalidState { message: String },
}

impl ValidationError {
    pub fn empty(field: &str) -> Self {
        ValidationError::EmptyField {
            field: field.to_string(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ValidationError::InvalidState {
            message: message.into(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Stage table without stages
    #[error("Stage table is empty")]
    EmptyStageTable,

    /// Stage thresholds must strictly increase
    #[error("Stage thresholds must strictly increase (violation at index {index})")]
    NonMonotonicStages { index: usize },

    /// First stage must start at zero
    #[error("First stage must have a minimum count of 0")]
    FirstStageNotZero,

    /// Stage levels must be 1, 2, .. n in order
    #[error("Stage at index {index} has level {level}; levels must run 1..=n")]
    NonConsecutiveLevels { index: usize, level: u8 },

    /// Diagnosis flow without phases
    #[error("Phase sequence is empty")]
    EmptyPhaseSequence,

    /// Malformed phase definition
    #[error("Invalid phase '{phase}': {message}")]
    InvalidPhase { phase: String, message: String },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key not present in the configuration
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Errors from the interpretation adapter boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpretError {
    /// Network or service failure
    #[error("Upstream service unavailable: {0}")]
    Upstream(String),

    /// Call did not finish in time
    #[error("Upstream call timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Response contained no extractable JSON object
    #[error("Response could not be parsed")]
    Unparsable { raw: String },

    /// No API key in the environment or keyring
    #[error("Generative language API key is not configured")]
    MissingApiKey,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(DatabaseError::from(err))
    }
}

impl From<reqwest::Error> for InterpretError {
    fn from(err: reqwest::Error) -> Self {
        InterpretError::Upstream(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
