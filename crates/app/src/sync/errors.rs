//! Cart synchronization errors.

use std::time::Duration;

use kart::rules::RuleError;
use thiserror::Error;

use crate::api::ApiError;

/// Failures that abort a cart operation.
///
/// Stock shortfalls and large-quantity prompts are not errors; they are
/// reported as [`IncreaseOutcome`](super::IncreaseOutcome) values.
#[derive(Debug, Error)]
pub enum CartSyncError {
    /// No valid token; the request was not sent.
    #[error("authentication required")]
    AuthRequired,

    /// The request failed before a response arrived.
    #[error("network error: {0}")]
    Network(#[source] ApiError),

    /// No response within the configured timeout.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),

    /// The server refused the operation.
    #[error("{message}")]
    Rejected {
        /// HTTP status code
        status: u16,

        /// Server message
        message: String,
    },

    /// The server answered with something the client cannot read.
    #[error("unexpected response from the cart service")]
    Protocol(#[source] ApiError),

    /// The requested quantity change is invalid.
    #[error("invalid quantity")]
    InvalidQuantity(#[from] RuleError),

    /// A stock adjustment with nothing left to add was accepted.
    #[error("no units are left to add")]
    NothingToAdjust,
}

impl CartSyncError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::TimedOut(_))
    }
}

impl From<ApiError> for CartSyncError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => Self::AuthRequired,
            ApiError::Rejected { status, message } => Self::Rejected { status, message },
            error if error.is_transient() => Self::Network(error),
            error => Self::Protocol(error),
        }
    }
}
