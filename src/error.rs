//! Custom error types for the monitor
//!
//! Every acquisition, store and transport failure is funnelled into
//! [`MonitorError`] so the scheduler loops have one type to log at their
//! failure boundary.

use thiserror::Error;

/// Top-level monitor errors
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Essential field missing: {field}")]
    MissingField { field: String },

    #[error("Could not parse {field} from '{text}'")]
    Parse { field: String, text: String },

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Store error: {0}")]
    Store(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Telegram error: {0}")]
    Telegram(String),
}

impl MonitorError {
    /// Failures that come from reading a scraped page rather than from the
    /// transport. Both abort the current attempt.
    pub fn is_essential_field_failure(&self) -> bool {
        matches!(self, MonitorError::MissingField { .. } | MonitorError::Parse { .. })
    }
}

impl From<fantoccini::error::CmdError> for MonitorError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        MonitorError::Browser(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for MonitorError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        MonitorError::Browser(format!("session setup failed: {}", err))
    }
}

impl From<serde_yaml::Error> for MonitorError {
    fn from(err: serde_yaml::Error) -> Self {
        MonitorError::Config(format!("selector file: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
