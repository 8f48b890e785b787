//! MCP PDF tools: analyze one or several PDFs from public URLs.
//!
//! Both tools always answer with a JSON envelope
//! `{"success", "data", "error"}` rather than a tool error.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ToolContext;
use crate::fetch::looks_like_pdf;
use crate::gemini::{GenerateRequest, Part, PDF_MIME};

/// Input parameters for the analyze_single_pdf tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzePdfInput {
    #[schemars(description = "URL of the PDF file to analyze (must be publicly accessible)")]
    pub pdf_url: String,

    #[schemars(
        description = "What you want to do with the PDF: summarize, extract key points, answer questions, translate, etc."
    )]
    pub prompt: String,
}

/// Input parameters for the analyze_multiple_pdfs tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzePdfsInput {
    #[schemars(description = "List of PDF URLs to analyze (all must be publicly accessible)")]
    pub pdf_urls: Vec<String>,

    #[schemars(
        description = "What you want to do with the PDFs: compare, find common themes, create combined summary, extract data from all, etc."
    )]
    pub prompt: String,
}

/// Successful analysis payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub result: String,
    pub note: String,
}

/// Envelope returned by both PDF tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    pub data: Option<AnalysisPayload>,
    pub error: Option<String>,
}

impl ResponseEnvelope {
    pub fn ok(payload: AnalysisPayload) -> Self {
        Self { success: true, data: Some(payload), error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success": false, "data": null, "error": "serialization failed: {}"}}"#, e)
        })
    }
}

/// Get a PDF as an inline part, downloading it only on a cache miss.
pub async fn pdf_part(ctx: &ToolContext, url: &str) -> Result<Part, String> {
    if let Some(part) = ctx.cache().get(url) {
        tracing::info!(url, "using cached PDF data");
        return Ok(part);
    }

    let fetched = ctx.fetcher().fetch(url).await.map_err(|e| format!("Failed to download PDF: {}", e))?;
    if !looks_like_pdf(url, fetched.content_type.as_deref()) {
        tracing::warn!(
            url,
            content_type = fetched.content_type.as_deref().unwrap_or(""),
            "response is not declared as PDF, proceeding anyway"
        );
    }

    let part = Part::from_bytes(&fetched.bytes, PDF_MIME);
    ctx.cache().put(url, part.clone());
    Ok(part)
}

async fn generate(ctx: &ToolContext, parts: Vec<Part>, what: &str, note: String) -> ResponseEnvelope {
    let generator = match ctx.generator() {
        Ok(g) => g,
        Err(e) => return ResponseEnvelope::err(e.to_string()),
    };

    tracing::info!(model = generator.model(), "generating content with {}", what);
    match generator.generate(GenerateRequest::new(parts)).await {
        Ok(text) if !text.is_empty() => {
            tracing::info!("{} processed successfully", what);
            ResponseEnvelope::ok(AnalysisPayload { result: text, note })
        }
        Ok(_) => ResponseEnvelope::err("No response generated from Gemini"),
        Err(e) => {
            tracing::error!(error = %e, "error generating content");
            ResponseEnvelope::err(format!("Error processing {}: {}", what, e))
        }
    }
}

/// Execute the analyze_single_pdf tool logic.
pub async fn run_analyze_single_pdf(ctx: &ToolContext, input: AnalyzePdfInput) -> ResponseEnvelope {
    tracing::info!(url = %input.pdf_url, "processing single PDF");

    if let Err(e) = ctx.generator() {
        return ResponseEnvelope::err(e.to_string());
    }

    let part = match pdf_part(ctx, &input.pdf_url).await {
        Ok(part) => part,
        Err(e) => {
            return ResponseEnvelope::err(format!("Error processing PDF ({}): {}", input.pdf_url, e))
        }
    };

    let parts = vec![part, Part::text(input.prompt)];
    generate(ctx, parts, "PDF", "Processed 1 PDF with inline data".into()).await
}

/// Execute the analyze_multiple_pdfs tool logic.
pub async fn run_analyze_multiple_pdfs(
    ctx: &ToolContext,
    input: AnalyzePdfsInput,
) -> ResponseEnvelope {
    let total = input.pdf_urls.len();
    tracing::info!("processing {} PDFs", total);

    if let Err(e) = ctx.generator() {
        return ResponseEnvelope::err(e.to_string());
    }

    let mut parts = Vec::with_capacity(total + 1);
    for (idx, url) in input.pdf_urls.iter().enumerate() {
        let idx = idx + 1;
        tracing::info!(url = %url, "processing PDF {}/{}", idx, total);
        match pdf_part(ctx, url).await {
            Ok(part) => parts.push(part),
            Err(e) => {
                return ResponseEnvelope::err(format!(
                    "Error processing PDF {} ({}): {}",
                    idx, url, e
                ))
            }
        }
    }

    let note = format!("Processed {} PDFs with inline data", parts.len());
    parts.push(Part::text(input.prompt));
    generate(ctx, parts, "PDFs", note).await
}
