//! Link discovery with transparent x402 payment.
//!
//! A challenged request is paid for and replayed at most once. If the payment
//! fails, or the replay is challenged again, the challenge is returned to the
//! caller as ordinary data.

use std::sync::Arc;

use scrapay_core::Error;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::api::ScrapeApi;
use crate::x402::{PaymentChallenge, PaymentExecutor};

/// Typed view of the `links` field. `null` or absent means no links.
#[derive(Deserialize)]
struct LinksField {
    #[serde(default)]
    links: Option<Vec<String>>,
}

/// Links discovered on a page.
///
/// Keeps the response body it was parsed from and serializes back to it
/// unchanged, whatever other fields the API sent along.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkList {
    links: Vec<String>,
    raw: Value,
}

impl LinkList {
    /// Parse a non-challenge link discovery body.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedResponse` if the body is not an object or
    /// `links` is neither `null` nor a list of strings.
    pub fn from_value(raw: Value) -> Result<Self, Error> {
        if !raw.is_object() {
            return Err(Error::UnexpectedResponse(format!("expected a links object, got {}", raw)));
        }

        let field: LinksField = serde_json::from_value(raw.clone())?;

        Ok(Self { links: field.links.unwrap_or_default(), raw })
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for LinkList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Outcome of a link discovery call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LinkResult {
    Challenge(PaymentChallenge),
    Links(LinkList),
}

impl LinkResult {
    /// Classify a link discovery response body.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedResponse` if the body is neither a challenge
    /// nor an object whose `links`, when set, is a list of strings.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match PaymentChallenge::from_value(value) {
            Ok(challenge) => Ok(Self::Challenge(challenge)),
            Err(value) => LinkList::from_value(value).map(Self::Links),
        }
    }
}

/// Calls the link discovery endpoint, paying for access when challenged.
#[derive(Clone)]
pub struct LinkFetcher {
    api: Arc<dyn ScrapeApi>,
    payments: PaymentExecutor,
}

impl LinkFetcher {
    pub fn new(api: Arc<dyn ScrapeApi>) -> Self {
        Self { payments: PaymentExecutor::new(api.clone()), api }
    }

    /// Discover links on `url`, paying and retrying once if challenged.
    pub async fn get_links(&self, url: &str) -> Result<LinkResult, Error> {
        self.get_links_with_retry(url, true).await
    }

    /// Discover links on `url`.
    ///
    /// With `retry_allowed`, a challenge triggers one payment attempt and, if
    /// it succeeds, exactly one replay whose result is returned as-is.
    ///
    /// # Errors
    ///
    /// Transport and parse failures propagate; payment failures do not.
    pub async fn get_links_with_retry(&self, url: &str, mut retry_allowed: bool) -> Result<LinkResult, Error> {
        loop {
            let result = LinkResult::from_value(self.api.links(url).await?)?;

            match result {
                LinkResult::Challenge(challenge) if retry_allowed => {
                    retry_allowed = false;

                    if !self.payments.pay(&challenge).await {
                        return Ok(LinkResult::Challenge(challenge));
                    }

                    tracing::info!(url, "payment accepted, retrying link discovery");
                }
                result => return Ok(result),
            }
        }
    }
}
