//! extract_text tool implementation.
//!
//! Extracts text from a batch of pages through the scraping API.

use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use scrapay_client::TextExtractor;
use scrapay_core::Error;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for extract_text tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ExtractTextParams {
    /// URLs to extract text from.
    pub urls: Vec<String>,

    /// Domain the URLs belong to (e.g. "example.com").
    pub domain: String,
}

/// Implementation of the extract_text tool.
///
/// Per-page challenges that could not be settled stay in `results`.
pub async fn extract_text_impl(
    extractor: &TextExtractor, params: ExtractTextParams,
) -> Result<CallToolResult, McpError> {
    if params.urls.is_empty() {
        return Err(Error::InvalidInput("urls cannot be empty".into()).into());
    }

    let result = extractor.extract_text(&params.urls, &params.domain).await?;

    json_result(&result)
}
