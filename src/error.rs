//! Error types for the core components
//!
//! The core fails fast with a specific kind and no partial mutation.
//! Every message names the field, argument, or id involved so the
//! assistant-facing layer never surfaces a bare generic failure.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required Notion property was missing or malformed during mapping.
    #[error("schema error: property '{field}' {problem}")]
    Schema { field: &'static str, problem: String },

    /// Malformed review-outcome arguments (counts out of range).
    #[error("invalid review outcome: {0}")]
    InvalidOutcome(String),

    /// Malformed session/tool request arguments.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested page id does not exist in either database.
    #[error("no record found with id '{0}'")]
    NotFound(String),

    /// Notion was unreachable or returned a non-success status.
    #[error("Notion request failed: {0}")]
    Upstream(String),

    /// Startup configuration was missing or inconsistent.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn schema(field: &'static str, problem: impl Into<String>) -> Self {
        Error::Schema { field, problem: problem.into() }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Upstream(err.to_string())
    }
}
