//! Batch text extraction with transparent x402 payment.
//!
//! ### Challenge Levels
//! - **Whole batch**: the API refuses the entire request. One payment, then
//!   one replay if it succeeded.
//! - **Per item**: some entries of `results` are challenges. Every challenged
//!   item is paid for independently, then the batch is replayed once no matter
//!   how many payments went through; the API reports again what is still owed.
//!
//! At most one replay happens per call. Challenges that survive it stay in the
//! returned data.

use std::sync::Arc;

use scrapay_core::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::api::ScrapeApi;
use crate::x402::{PaymentChallenge, PaymentExecutor};

/// One entry of an extraction batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemOutcome {
    Challenge(PaymentChallenge),
    /// Extracted content, usually `{url, text, ...}`, passed through untouched.
    Content(Value),
}

impl ItemOutcome {
    pub fn from_value(value: Value) -> Self {
        match PaymentChallenge::from_value(value) {
            Ok(challenge) => Self::Challenge(challenge),
            Err(value) => Self::Content(value),
        }
    }

    pub fn as_challenge(&self) -> Option<&PaymentChallenge> {
        match self {
            Self::Challenge(challenge) => Some(challenge),
            Self::Content(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for ItemOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

/// Typed view of the `results` field. `null` or absent means no results.
#[derive(Deserialize)]
struct ResultsField {
    #[serde(default)]
    results: Option<Vec<ItemOutcome>>,
}

/// Per-URL extraction outcomes.
///
/// Keeps the response body it was parsed from and serializes back to it
/// unchanged, including a `null` or absent `results` and any other fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionBatch {
    results: Option<Vec<ItemOutcome>>,
    raw: Value,
}

impl ExtractionBatch {
    /// Parse a non-challenge extraction body.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedResponse` if the body is not an object or
    /// `results` is neither `null` nor a list.
    pub fn from_value(raw: Value) -> Result<Self, Error> {
        if !raw.is_object() {
            return Err(Error::UnexpectedResponse(format!("expected an extraction object, got {}", raw)));
        }

        let field: ResultsField = serde_json::from_value(raw.clone())?;

        Ok(Self { results: field.results, raw })
    }

    /// Item outcomes, or `None` when the body carried no `results` list.
    pub fn results(&self) -> Option<&[ItemOutcome]> {
        self.results.as_deref()
    }

    /// Challenged items, in batch order.
    pub fn challenges(&self) -> impl Iterator<Item = &PaymentChallenge> {
        self.results
            .iter()
            .flatten()
            .filter_map(ItemOutcome::as_challenge)
    }

    pub fn as_value(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for ExtractionBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Outcome of a batch extraction call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionResult {
    Challenge(PaymentChallenge),
    Batch(ExtractionBatch),
}

impl ExtractionResult {
    /// Classify an extraction response body.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnexpectedResponse` if the body is neither a challenge
    /// nor an object whose `results`, when present, is `null` or a list.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        match PaymentChallenge::from_value(value) {
            Ok(challenge) => Ok(Self::Challenge(challenge)),
            Err(value) => ExtractionBatch::from_value(value).map(Self::Batch),
        }
    }
}

/// Calls the batch extraction endpoint, paying for access when challenged.
#[derive(Clone)]
pub struct TextExtractor {
    api: Arc<dyn ScrapeApi>,
    payments: PaymentExecutor,
}

impl TextExtractor {
    pub fn new(api: Arc<dyn ScrapeApi>) -> Self {
        Self { payments: PaymentExecutor::new(api.clone()), api }
    }

    /// Extract text from `urls`, paying and retrying once if challenged.
    pub async fn extract_text(&self, urls: &[String], domain: &str) -> Result<ExtractionResult, Error> {
        self.extract_text_with_retry(urls, domain, true).await
    }

    /// Extract text from `urls`.
    ///
    /// With `retry_allowed`, a whole-batch challenge is paid for and replayed
    /// if the payment succeeds. Otherwise, if any item is challenged, every
    /// challenged item is paid for and the batch is replayed once regardless
    /// of the payment outcomes. The replay's response is returned as-is.
    ///
    /// # Errors
    ///
    /// Transport and parse failures propagate; payment failures do not.
    pub async fn extract_text_with_retry(
        &self, urls: &[String], domain: &str, mut retry_allowed: bool,
    ) -> Result<ExtractionResult, Error> {
        loop {
            let result = ExtractionResult::from_value(self.api.extract_text(urls, domain).await?)?;

            if !retry_allowed {
                return Ok(result);
            }
            retry_allowed = false;

            match &result {
                ExtractionResult::Challenge(challenge) => {
                    if !self.payments.pay(challenge).await {
                        return Ok(result);
                    }

                    tracing::info!(domain, urls = urls.len(), "payment accepted, retrying extraction");
                }
                ExtractionResult::Batch(batch) => {
                    let challenged = batch.challenges().count();
                    if challenged == 0 {
                        return Ok(result);
                    }

                    let mut paid = 0usize;
                    for challenge in batch.challenges() {
                        if self.payments.pay(challenge).await {
                            paid += 1;
                        }
                    }

                    tracing::info!(domain, challenged, paid, "retrying extraction after per-item payments");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedApi;
    use crate::x402::PaymentError;
    use serde_json::json;

    fn challenge_body(resource: &str) -> Value {
        json!({ "x402Version": 1, "accepts": [{ "resource": resource }] })
    }

    fn urls() -> Vec<String> {
        vec!["https://example.com/a".to_string(), "https://example.com/b".to_string()]
    }

    #[tokio::test]
    async fn test_extract_without_challenge() {
        let body = json!({ "results": [{ "url": "a", "text": "t" }, { "url": "b", "text": "u" }] });
        let api = Arc::new(ScriptedApi::new().with_extract(body.clone()));
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
        assert_eq!(api.extract_calls(), vec![(urls(), "example.com".to_string())]);
        assert!(api.payments().is_empty());
    }

    #[tokio::test]
    async fn test_per_item_challenge_paid_and_retried_once() {
        let retried = json!({ "results": [{ "url": "a", "text": "t" }, { "url": "b", "text": "paid" }] });
        let api = Arc::new(
            ScriptedApi::new()
                .with_extract(json!({ "results": [{ "url": "a", "text": "t" }, challenge_body("b")] }))
                .with_extract(retried.clone()),
        );
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), retried);
        assert_eq!(api.payments(), vec!["b".to_string()]);
        assert_eq!(api.extract_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_every_item_paid_even_after_failure() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_extract(json!({ "results": [challenge_body("a"), challenge_body("b")] }))
                .with_extract(json!({ "results": [challenge_body("a"), { "url": "b", "text": "t" }] }))
                .with_payment(Err(PaymentError::Rejected { status: 402 })),
        );
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert_eq!(api.payments(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(api.extract_calls().len(), 2);

        let ExtractionResult::Batch(batch) = result else {
            panic!("expected a batch");
        };
        assert_eq!(batch.challenges().count(), 1);
    }

    #[tokio::test]
    async fn test_retry_fires_even_when_all_item_payments_fail() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_extract(json!({ "results": [challenge_body("a")] }))
                .with_extract(json!({ "results": [challenge_body("a")] }))
                .with_payment(Err(PaymentError::Rejected { status: 402 })),
        );
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert_eq!(api.extract_calls().len(), 2);
        assert_eq!(api.payments().len(), 1);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "results": [challenge_body("a")] }));
    }

    #[tokio::test]
    async fn test_whole_batch_challenge_paid_and_retried() {
        let retried = json!({ "results": [{ "url": "a", "text": "t" }] });
        let api = Arc::new(
            ScriptedApi::new()
                .with_extract(challenge_body("https://api.example.com/extract-text"))
                .with_extract(retried.clone()),
        );
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), retried);
        assert_eq!(api.payments(), vec!["https://api.example.com/extract-text".to_string()]);
    }

    #[tokio::test]
    async fn test_whole_batch_payment_failure_is_terminal() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_extract(challenge_body("https://api.example.com/extract-text"))
                .with_payment(Err(PaymentError::Rejected { status: 500 })),
        );
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert!(matches!(result, ExtractionResult::Challenge(_)));
        assert_eq!(api.extract_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_retried_response_is_not_inspected() {
        let api = Arc::new(
            ScriptedApi::new()
                .with_extract(challenge_body("top"))
                .with_extract(json!({ "results": [challenge_body("item")] })),
        );
        let extractor = TextExtractor::new(api.clone());

        let result = extractor.extract_text(&urls(), "example.com").await.unwrap();
        assert_eq!(api.payments(), vec!["top".to_string()]);
        assert_eq!(api.extract_calls().len(), 2);
        assert!(matches!(result, ExtractionResult::Batch(batch) if batch.challenges().count() == 1));
    }

    #[tokio::test]
    async fn test_retry_disabled_returns_item_challenges() {
        let body = json!({ "results": [challenge_body("a")] });
        let api = Arc::new(ScriptedApi::new().with_extract(body.clone()));
        let extractor = TextExtractor::new(api.clone());

        let result = extractor
            .extract_text_with_retry(&urls(), "example.com", false)
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
        assert!(api.payments().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let extractor = TextExtractor::new(Arc::new(ScriptedApi::new()));
        let result = extractor.extract_text(&urls(), "example.com").await;
        assert!(matches!(result, Err(Error::HttpError(_))));
    }

    #[test]
    fn test_batch_without_results_passes_through() {
        let body = json!({ "error": "upstream unavailable" });
        let result = ExtractionResult::from_value(body.clone()).unwrap();
        assert!(matches!(&result, ExtractionResult::Batch(batch) if batch.results().is_none()));
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[test]
    fn test_batch_null_results_passes_through() {
        let body = json!({ "error": "x", "results": null });
        let result = ExtractionResult::from_value(body.clone()).unwrap();
        assert!(matches!(&result, ExtractionResult::Batch(batch) if batch.challenges().count() == 0));
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[test]
    fn test_batch_keeps_extra_fields_and_item_order() {
        let body = json!({ "results": [{ "url": "a", "text": "t" }, challenge_body("b")], "took_ms": 12 });
        let result = ExtractionResult::from_value(body.clone()).unwrap();
        let ExtractionResult::Batch(batch) = &result else {
            panic!("expected a batch");
        };
        assert_eq!(batch.results().map(<[ItemOutcome]>::len), Some(2));
        assert_eq!(batch.as_value(), &body);
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
    }

    #[test]
    fn test_batch_rejects_non_list_results() {
        let result = ExtractionResult::from_value(json!({ "results": "none" }));
        assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
    }

    #[test]
    fn test_batch_rejects_non_object() {
        for body in [json!([]), json!("done"), json!(null)] {
            let result = ExtractionResult::from_value(body);
            assert!(matches!(result, Err(Error::UnexpectedResponse(_))));
        }
    }
}
