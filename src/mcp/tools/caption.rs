//! MCP caption tool: describe one image from a URL.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{default_image_mime, ToolContext};
use crate::gemini::{GenerateRequest, Part};

fn default_prompt() -> String {
    "What is this image?".to_string()
}

/// Input parameters for the caption_url tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CaptionInput {
    #[schemars(description = "Public image URL")]
    pub url: String,

    #[schemars(description = "Expected image MIME type (default: image/jpeg)")]
    #[serde(default = "default_image_mime")]
    pub mime_type: String,

    #[schemars(description = "Prompt text (default: \"What is this image?\")")]
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

/// Execute the caption tool logic. Returns plain text.
pub async fn run_caption(ctx: &ToolContext, input: CaptionInput) -> Result<String, String> {
    let generator = ctx.generator().map_err(|e| e.to_string())?;
    let image = ctx.prepared_image(&input.url, &input.mime_type).await?;

    let request = GenerateRequest::new(vec![
        Part::text(input.prompt),
        Part::from_bytes(&image, input.mime_type),
    ]);
    generator.generate(request).await.map_err(|e| e.to_string())
}
