//! Error types for telemetry ingestion

use thiserror::Error;

use crate::parser::Token;

/// Errors that can occur when decoding the telemetry file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The file could not be opened or a line could not be read
    #[error("Telemetry file unreadable: {0}")]
    Unreadable(String),

    /// At least one required token never received a valid value
    #[error("Telemetry record incomplete, missing {}", Token::list(.missing))]
    Incomplete { missing: Vec<Token> },
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::Unreadable(e.to_string())
    }
}

/// Reasons the bridge cannot supply positional data right now
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemetryError {
    /// The user's home/config directory could not be determined.
    /// Fatal for the whole session.
    #[error("Cannot locate telemetry file: {0}")]
    LocatorFailure(String),

    /// The telemetry file does not exist (mod not installed, or game not started a save)
    #[error("Telemetry file not found")]
    FileAbsent,

    /// The telemetry file was last written too long ago
    #[error("Telemetry file is stale")]
    FileStale,

    /// The telemetry file exists and is fresh but could not be decoded
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl TelemetryError {
    /// Whether this error can never clear up during the current session
    pub fn is_permanent(&self) -> bool {
        matches!(self, TelemetryError::LocatorFailure(_))
    }
}
