use shared::AggregatorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Bills API returned {status}: {message}")]
    PersistenceError { status: u16, message: String },

    #[error("Could not reach the bills API: {source}")]
    TransportError {
        #[from]
        source: reqwest::Error,
    },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Bill sheet format error: {0}")]
    SheetFormatError(String),

    #[error(transparent)]
    ValidationError(#[from] AggregatorError),

    #[error("Only an admin may {0}")]
    Forbidden(String),

    #[error("The PIN you entered is incorrect. Deletion aborted.")]
    PinMismatch,

    #[error("No bill with id '{0}'")]
    BillNotFound(String),

    #[error("Nothing to save: calculate the bill first")]
    NoSummary,
}

impl EngineError {
    /// Failures talking to the bills API, as opposed to local rejections.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            EngineError::PersistenceError { .. } | EngineError::TransportError { .. }
        )
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
