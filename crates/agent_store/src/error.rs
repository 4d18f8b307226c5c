use std::path::PathBuf;

use thiserror::Error;

use crate::schema::AgentScope;

#[derive(Debug, Error)]
pub enum AgentStoreError {
    #[error("I/O error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse agent record at {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize agent record for {path}: {source}")]
    JsonSerialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid agent name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("agent '{name}' already exists at {path}")]
    AlreadyExists { name: String, path: PathBuf },

    #[error("{scope} agents are unavailable: no home directory")]
    ScopeUnavailable { scope: AgentScope },

    #[error("agent record at {path} has invalid RFC3339 timestamp in 'created_at': {value}")]
    InvalidTimestamp { path: PathBuf, value: String },

    #[error("failed to format current UTC timestamp as RFC3339: {0}")]
    ClockFormat(#[source] time::error::Format),
}

impl AgentStoreError {
    #[must_use]
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
