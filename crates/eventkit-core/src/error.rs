//! Core domain errors.

use thiserror::Error;

/// Errors raised while interpreting EventKit values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A status name the server does not define.
    #[error("Unknown status: {0}")]
    UnknownStatus(String),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
