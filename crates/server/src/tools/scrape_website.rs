//! scrape_website tool implementation.
//!
//! Discovers a site's links, keeps the internal ones and extracts their text.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use scrapay_client::SiteScraper;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for scrape_website tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeWebsiteParams {
    /// Absolute URL of the site's entry page.
    pub url: String,
}

/// Implementation of the scrape_website tool.
pub async fn scrape_website_impl(
    scraper: &SiteScraper, params: ScrapeWebsiteParams,
) -> Result<CallToolResult, McpError> {
    let report = scraper.scrape_website(&params.url).await?;

    json_result(&report)
}
