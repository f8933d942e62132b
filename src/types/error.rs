//! Error types for assistant operations.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From`
//! implementations. Failures are typed at the tool boundary; conversion to
//! model-readable text happens only in the dispatch adapter.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Error type for all assistant operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Database access or query execution failed
    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// HTTP transport failure talking to the model endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Model endpoint returned an error or an unusable response
    #[error("model call failed: {0}")]
    Model(String),

    /// Chart rendering failed
    #[error("visualization failed: {0}")]
    Viz(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Create a model error with context.
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a visualization error with context.
    pub fn viz(msg: impl Into<String>) -> Self {
        Self::Viz(msg.into())
    }
}
