//! Payment executor.
//!
//! Settles a [`PaymentChallenge`] through the scraping API's payment
//! side-channel. Failures are kept typed internally and only collapse to a
//! boolean at [`PaymentExecutor::pay`].

use std::sync::Arc;

use crate::api::ScrapeApi;
use crate::x402::{PaymentChallenge, PaymentError};

/// Pays for challenged resources.
#[derive(Clone)]
pub struct PaymentExecutor {
    api: Arc<dyn ScrapeApi>,
}

impl PaymentExecutor {
    pub fn new(api: Arc<dyn ScrapeApi>) -> Self {
        Self { api }
    }

    /// Pay for the challenge's resource, reporting only whether it succeeded.
    ///
    /// Never fails: a missing resource, a rejected payment and a transport
    /// error all come back as `false`.
    pub async fn pay(&self, challenge: &PaymentChallenge) -> bool {
        match self.try_pay(challenge).await {
            Ok(()) => {
                tracing::info!(resource = challenge.resource(), "payment succeeded");
                true
            }
            Err(e) => {
                tracing::warn!(resource = challenge.resource(), error = %e, "payment failed");
                false
            }
        }
    }

    /// Pay for the challenge's resource, keeping the failure reason.
    ///
    /// Returns `PaymentError::MissingResource` without touching the network
    /// when the challenge has no chargeable resource.
    pub async fn try_pay(&self, challenge: &PaymentChallenge) -> Result<(), PaymentError> {
        let resource = challenge.resource().ok_or(PaymentError::MissingResource)?;

        tracing::info!(resource, x402_version = %challenge.version(), "initiating payment");

        self.api.do_payment(resource).await
    }
}
