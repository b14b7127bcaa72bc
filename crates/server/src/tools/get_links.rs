//! get_links tool implementation.
//!
//! Discovers the links on one page through the scraping API.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use scrapay_client::LinkFetcher;
use scrapay_core::Error;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for get_links tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetLinksParams {
    /// The page to discover links on.
    pub url: String,
}

/// Implementation of the get_links tool.
///
/// Returns either `{links: [...]}` or the payment challenge that could not be settled.
pub async fn get_links_impl(fetcher: &LinkFetcher, params: GetLinksParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url cannot be empty".into()).into());
    }

    let result = fetcher.get_links(&params.url).await?;

    json_result(&result)
}
