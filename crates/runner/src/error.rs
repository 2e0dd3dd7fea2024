//! Error types for the endpoint runner

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run before any endpoint is dispatched
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Fixture not found at {}", .path.display())]
    FixtureNotFound { path: PathBuf },

    #[error("Invalid fixture {}: {reason}", .path.display())]
    FixtureParse { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// Per-test failures. The `Display` form is the message recorded for the test.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid endpoint format: {0}")]
    InvalidEndpointFormat(String),

    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection error")]
    Connection,

    #[error("Status: {status} - {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    #[error("Error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout
        } else if err.is_connect() {
            DispatchError::Connection
        } else {
            DispatchError::Transport(err.to_string())
        }
    }
}
