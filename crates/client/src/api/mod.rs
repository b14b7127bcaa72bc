//! Scraping API transport.
//!
//! ### Endpoints
//! - `GET {base}/links?url=<url>`: link discovery for one page.
//! - `POST {base}/extract-text` with `{urls, domain}`: batch text extraction.
//! - `POST {base}/do-payment` with `{url}`: pay for a challenged resource.
//!
//! ### Status Handling
//! - Link and extraction responses are parsed whatever their status: a
//!   `402 Payment Required` carries the challenge in its JSON body.
//! - Payment success is any 2xx status; the body is ignored.

use async_trait::async_trait;
use reqwest::{Client, Response};
use scrapay_core::{AppConfig, Error};
use serde::Serialize;
use serde_json::Value;

use crate::x402::PaymentError;

/// The three calls this adapter makes against the scraping API.
///
/// Components hold an `Arc<dyn ScrapeApi>` so the transport can be swapped
/// (tests use a scripted in-memory implementation).
#[async_trait]
pub trait ScrapeApi: Send + Sync {
    /// Discover links on `url`. Returns the parsed response body.
    async fn links(&self, url: &str) -> Result<Value, Error>;

    /// Extract text from every URL in `urls`. Returns the parsed response body.
    async fn extract_text(&self, urls: &[String], domain: &str) -> Result<Value, Error>;

    /// Pay for `resource` through the payment side-channel.
    async fn do_payment(&self, resource: &str) -> Result<(), PaymentError>;
}

#[derive(Debug, Serialize)]
struct ExtractTextRequest<'a> {
    urls: &'a [String],
    domain: &'a str,
}

#[derive(Debug, Serialize)]
struct PaymentRequest<'a> {
    url: &'a str,
}

/// reqwest-backed [`ScrapeApi`].
#[derive(Debug, Clone)]
pub struct HttpScrapeApi {
    http: Client,
    base_url: String,
}

impl HttpScrapeApi {
    /// Create a client for the API at `config.api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration does not validate and
    /// `Error::HttpError` if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(&config.user_agent).use_rustls_tls();

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url: config.base_url().to_string() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Read a response body as JSON regardless of its status code.
    async fn read_json(response: Response) -> Result<Value, Error> {
        let status = response.status();
        let url = response.url().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {}", e)))?;

        tracing::debug!(%url, %status, bytes = bytes.len(), "scrape API response");

        serde_json::from_slice(&bytes).map_err(|e| {
            Error::UnexpectedResponse(format!("{} returned non-JSON body (status {}): {}", url, status.as_u16(), e))
        })
    }
}

#[async_trait]
impl ScrapeApi for HttpScrapeApi {
    async fn links(&self, url: &str) -> Result<Value, Error> {
        let response = self
            .http
            .get(self.endpoint("links"))
            .query(&[("url", url)])
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("network error: {}", e)))?;

        Self::read_json(response).await
    }

    async fn extract_text(&self, urls: &[String], domain: &str) -> Result<Value, Error> {
        let response = self
            .http
            .post(self.endpoint("extract-text"))
            .json(&ExtractTextRequest { urls, domain })
            .send()
            .await
            .map_err(|e| Error::HttpError(format!("network error: {}", e)))?;

        Self::read_json(response).await
    }

    async fn do_payment(&self, resource: &str) -> Result<(), PaymentError> {
        let response = self
            .http
            .post(self.endpoint("do-payment"))
            .json(&PaymentRequest { url: resource })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(%status, "payment response");

        if status.is_success() { Ok(()) } else { Err(PaymentError::Rejected { status: status.as_u16() }) }
    }
}
