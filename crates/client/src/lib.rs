//! Client code for scrapay.
//!
//! This crate talks to the paywalled scraping API: link discovery, batch text
//! extraction and the x402 payment side-channel, each with its own
//! pay-and-retry-once handling, plus the site scraper that composes them.

pub mod api;
pub mod extract;
pub mod filter;
pub mod links;
pub mod scrape;
pub mod x402;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{HttpScrapeApi, ScrapeApi};
pub use extract::{ExtractionBatch, ExtractionResult, ItemOutcome, TextExtractor};
pub use filter::{SOCIAL_DENYLIST, filter_urls, site_domain, strip_www};
pub use links::{LinkFetcher, LinkList, LinkResult};
pub use scrape::{ScrapeReport, SiteScraper};
pub use x402::{PaymentChallenge, PaymentError, PaymentExecutor, is_payment_required};
