//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    extract_text::{ExtractTextParams, extract_text_impl},
    get_links::{GetLinksParams, get_links_impl},
    scrape_website::{ScrapeWebsiteParams, scrape_website_impl},
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, ErrorCode, Implementation, ListToolsResult, PaginatedRequestParam,
        ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use scrapay_client::SiteScraper;

/// The main MCP server handler for mcp-scrapay.
#[derive(Clone)]
pub struct ScrapayServer {
    tool_router: ToolRouter<Self>,
    scraper: SiteScraper,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ScrapayServer {
    /// Create a new server handler around a configured scraper.
    pub fn new(scraper: SiteScraper) -> Self {
        Self { tool_router: Self::tool_router(), scraper }
    }

    /// Discover the links on a single page.
    #[tool(description = "Discover the links on a web page. Pays for access once if the API requires it.")]
    async fn get_links(&self, params: Parameters<GetLinksParams>) -> Result<CallToolResult, McpError> {
        get_links_impl(self.scraper.link_fetcher(), params.0).await
    }

    /// Extract text from a batch of pages.
    #[tool(description = "Extract text from URLs on one domain, paying once for the batch or its pages if required.")]
    async fn extract_text(&self, params: Parameters<ExtractTextParams>) -> Result<CallToolResult, McpError> {
        extract_text_impl(self.scraper.text_extractor(), params.0).await
    }

    /// Scrape a whole site.
    #[tool(description = "Scrape a website: find its same-domain, non-social links and extract their text.")]
    async fn scrape_website(&self, params: Parameters<ScrapeWebsiteParams>) -> Result<CallToolResult, McpError> {
        scrape_website_impl(&self.scraper, params.0).await
    }
}

impl ScrapayServer {
    /// Reject calls to tools this server does not expose.
    fn ensure_known_tool(&self, name: &str) -> Result<(), McpError> {
        if self.tool_router.list_all().iter().any(|tool| tool.name == name) {
            Ok(())
        } else {
            Err(McpError::new(ErrorCode::METHOD_NOT_FOUND, format!("tool not found: {}", name), None))
        }
    }
}

impl ServerHandler for ScrapayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-scrapay".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.ensure_known_tool(&request.name)?;

        tracing::debug!(tool = %request.name, "calling tool");

        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
