//! Error types for availability-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid weekday key: {0} (expected 1-7)")]
    InvalidWeekday(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;
