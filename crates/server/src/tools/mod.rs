//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-scrapay server.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use scrapay_core::Error;
use serde::Serialize;

pub mod extract_text;
pub mod get_links;
pub mod scrape_website;

/// Wrap a tool output as a single pretty-printed JSON text item.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::UnexpectedResponse(format!("failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}
