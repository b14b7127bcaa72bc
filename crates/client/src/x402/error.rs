//! Payment side-channel error types.

use std::sync::Arc;

/// Reasons a payment attempt did not go through.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PaymentError {
    /// The challenge names no resource to pay for.
    #[error("payment challenge has no resource")]
    MissingResource,

    /// The payment service answered with a non-success status.
    #[error("payment rejected: HTTP {status}")]
    Rejected { status: u16 },

    /// The payment service could not be reached.
    #[error("payment network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Network(Arc::new(err))
    }
}
