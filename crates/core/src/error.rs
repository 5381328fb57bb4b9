//! Error types for the daily offering system.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the daily offering system.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument (bad split step, impossible calendar date).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Fewer values left than the calendar day requires.
    #[error("Insufficient data for {date}: {required} values required, {available} available")]
    InsufficientData {
        date: NaiveDate,
        required: usize,
        available: usize,
    },

    /// Slot length outside the enumerated set.
    #[error("Slot length must be one of the following: [3600, 1900], got {0}")]
    UnrecognizedSlotLength(i64),

    /// Entry value count differs from the slot count of its day.
    #[error("Values count should be: {expected}, but are: {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// Payload or rules validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Timezone name not known to the tz database.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(date: NaiveDate, required: usize, available: usize) -> Self {
        Error::InsufficientData {
            date,
            required,
            available,
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }
}
