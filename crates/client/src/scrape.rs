//! Whole-site scraping: discover links, keep the internal ones, extract their text.

use std::sync::Arc;

use scrapay_core::Error;
use serde::Serialize;

use crate::api::ScrapeApi;
use crate::extract::{ExtractionResult, TextExtractor};
use crate::filter::{filter_urls, site_domain};
use crate::links::{LinkFetcher, LinkResult};
use crate::x402::PaymentChallenge;

/// Error message reported when link discovery stays behind a paywall.
pub const LINKS_PAYMENT_FAILED: &str = "Payment failed for links";

/// Message reported when no discovered link belongs to the site.
pub const NO_INTERNAL_LINKS: &str = "No internal links found";

/// Result of [`SiteScraper::scrape_website`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeReport {
    /// Link discovery is still challenged after the payment attempt.
    PaymentFailed { error: String, x402: PaymentChallenge },
    /// Links were found but none of them is internal to the site.
    NoInternalLinks { links: Vec<String>, filtered: Vec<String>, message: String },
    /// Internal links were sent for extraction. `extracted` may still hold challenges.
    Extracted { links: Vec<String>, filtered: Vec<String>, extracted: ExtractionResult },
}

/// Composes link discovery, domain filtering and text extraction.
#[derive(Clone)]
pub struct SiteScraper {
    links: LinkFetcher,
    extractor: TextExtractor,
}

impl SiteScraper {
    pub fn new(api: Arc<dyn ScrapeApi>) -> Self {
        Self { links: LinkFetcher::new(api.clone()), extractor: TextExtractor::new(api) }
    }

    pub fn link_fetcher(&self) -> &LinkFetcher {
        &self.links
    }

    pub fn text_extractor(&self) -> &TextExtractor {
        &self.extractor
    }

    /// Scrape every internal page linked from `url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `url` has no parseable host. Transport
    /// and parse failures from either endpoint propagate.
    pub async fn scrape_website(&self, url: &str) -> Result<ScrapeReport, Error> {
        let domain = site_domain(url)?;

        let links = match self.links.get_links(url).await? {
            LinkResult::Challenge(challenge) => {
                tracing::warn!(url, "link discovery still requires payment");
                return Ok(ScrapeReport::PaymentFailed { error: LINKS_PAYMENT_FAILED.into(), x402: challenge });
            }
            LinkResult::Links(list) => list.into_links(),
        };

        let filtered = filter_urls(&links, &domain);
        tracing::debug!(url, %domain, discovered = links.len(), internal = filtered.len(), "filtered links");

        if filtered.is_empty() {
            return Ok(ScrapeReport::NoInternalLinks { links, filtered, message: NO_INTERNAL_LINKS.into() });
        }

        let extracted = self.extractor.extract_text(&filtered, &domain).await?;

        Ok(ScrapeReport::Extracted { links, filtered, extracted })
    }
}
