//! Errors raised by goal computations.

use mastery_core::FailureKind;

/// Errors that can occur while computing compound progress.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressError {
    /// Exchange rate was zero, negative or not a number
    #[error("Invalid BTC price: {0}")]
    InvalidPrice(f64),

    /// An input was NaN or infinite
    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),

    /// Budget category does not exist
    #[error("Unknown budget category: {0}")]
    UnknownCategory(String),

    /// Budget limit must be a positive, finite amount
    #[error("Invalid budget limit: {0}")]
    InvalidLimit(f64),
}

impl ProgressError {
    /// Failure class used when this surfaces next to fetch errors.
    pub fn kind(&self) -> FailureKind {
        FailureKind::ValidationError
    }
}
