//! Core MCP server implementations.
//!
//! Two servers share one [`ToolContext`] shape: the PDF server always
//! answers with a JSON envelope, the image server reports failures as
//! tool errors.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Serialize;

use super::tools::caption::{run_caption, CaptionInput};
use super::tools::compare::{run_compare, CompareInput};
use super::tools::detect::{run_detect, DetectInput};
use super::tools::multi_image::{run_multi_image, MultiImageInput};
use super::tools::pdf::{
    run_analyze_multiple_pdfs, run_analyze_single_pdf, AnalyzePdfInput, AnalyzePdfsInput,
};
use super::tools::segment::{run_segment, SegmentInput};
use super::tools::ToolContext;

pub const PDF_SERVER_NAME: &str = "gemini-pdf";
pub const IMAGE_SERVER_NAME: &str = "img-understanding-mcp";

fn implementation(name: &str) -> Implementation {
    Implementation {
        name: name.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        title: None,
        icons: None,
        website_url: None,
    }
}

fn text_result(result: Result<String, String>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            tracing::error!(error = %e, "tool failed");
            CallToolResult::error(vec![Content::text(e)])
        }
    }
}

fn json_result<T: Serialize>(result: Result<T, String>) -> CallToolResult {
    text_result(result.and_then(|value| {
        serde_json::to_string_pretty(&value).map_err(|e| format!("Failed to serialize result: {}", e))
    }))
}

/// The PDF analysis MCP server
///
/// Downloads PDFs by URL and sends them inline to Gemini together with a
/// prompt.
#[derive(Debug, Clone)]
pub struct PdfMcpServer {
    ctx: ToolContext,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl PdfMcpServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx, tool_router: Self::tool_router() }
    }

    #[tool(
        name = "analyze_single_pdf",
        description = "Analyze a single PDF from a URL with a custom prompt. The PDF is \
                       downloaded and sent inline to Gemini. Returns a JSON envelope with \
                       success, data and error fields."
    )]
    async fn analyze_single_pdf(
        &self,
        Parameters(input): Parameters<AnalyzePdfInput>,
    ) -> Result<CallToolResult, McpError> {
        let envelope = run_analyze_single_pdf(&self.ctx, input).await;
        Ok(CallToolResult::success(vec![Content::text(envelope.to_json())]))
    }

    #[tool(
        name = "analyze_multiple_pdfs",
        description = "Analyze multiple PDFs from URLs together with a single prompt. Useful \
                       for comparing documents. Returns a JSON envelope with success, data \
                       and error fields."
    )]
    async fn analyze_multiple_pdfs(
        &self,
        Parameters(input): Parameters<AnalyzePdfsInput>,
    ) -> Result<CallToolResult, McpError> {
        let envelope = run_analyze_multiple_pdfs(&self.ctx, input).await;
        Ok(CallToolResult::success(vec![Content::text(envelope.to_json())]))
    }
}

#[tool_handler]
impl ServerHandler for PdfMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: implementation(PDF_SERVER_NAME),
            instructions: Some(
                "Gemini PDF analysis. Use analyze_single_pdf for one document and \
                 analyze_multiple_pdfs to ask one question across several."
                    .into(),
            ),
        }
    }
}

/// The image understanding MCP server
///
/// Captioning, multi-image prompting, comparison, box detection and
/// segmentation over images fetched by URL.
#[derive(Debug, Clone)]
pub struct ImageMcpServer {
    ctx: ToolContext,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ImageMcpServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx, tool_router: Self::tool_router() }
    }

    #[tool(
        name = "caption_url",
        description = "Caption or answer a question about one image at a URL."
    )]
    async fn caption_url(
        &self,
        Parameters(input): Parameters<CaptionInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(run_caption(&self.ctx, input).await))
    }

    #[tool(
        name = "multi_image_prompt_urls",
        description = "Send several images by URL plus one prompt in a single request."
    )]
    async fn multi_image_prompt_urls(
        &self,
        Parameters(input): Parameters<MultiImageInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(run_multi_image(&self.ctx, input).await))
    }

    #[tool(name = "compare_urls", description = "Describe differences between two images.")]
    async fn compare_urls(
        &self,
        Parameters(input): Parameters<CompareInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_result(run_compare(&self.ctx, input).await))
    }

    #[tool(
        name = "detect_boxes_json_url",
        description = "Ask for bounding boxes as JSON and convert them to absolute pixel \
                       coordinates [x0, y0, x1, y1]."
    )]
    async fn detect_boxes_json_url(
        &self,
        Parameters(input): Parameters<DetectInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(json_result(run_detect(&self.ctx, input).await))
    }

    #[tool(
        name = "segment_items_url",
        description = "Segment items in an image. Saves a mask PNG and an overlay PNG per \
                       item and returns their file paths with pixel boxes."
    )]
    async fn segment_items_url(
        &self,
        Parameters(input): Parameters<SegmentInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(json_result(run_segment(&self.ctx, input).await))
    }
}

#[tool_handler]
impl ServerHandler for ImageMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: implementation(IMAGE_SERVER_NAME),
            instructions: Some(
                "Gemini image understanding. caption_url, multi_image_prompt_urls and \
                 compare_urls return text; detect_boxes_json_url returns pixel boxes; \
                 segment_items_url writes mask and overlay PNGs."
                    .into(),
            ),
        }
    }
}

/// Run the PDF MCP server on stdin/stdout
pub async fn run_pdf_server(ctx: ToolContext) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(server = PDF_SERVER_NAME, "starting MCP server on stdio");
    let service = PdfMcpServer::new(ctx).serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Run the image MCP server on stdin/stdout
pub async fn run_image_server(ctx: ToolContext) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(server = IMAGE_SERVER_NAME, "starting MCP server on stdio");
    let service = ImageMcpServer::new(ctx).serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
