//! MCP multi-image tool: one prompt over several images in a single request.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{ToolContext, DEFAULT_IMAGE_MIME};
use crate::gemini::{GenerateRequest, Part};

fn default_prompt() -> String {
    "Describe these images.".to_string()
}

/// Input parameters for the multi_image_prompt_urls tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct MultiImageInput {
    #[schemars(description = "List of public image URLs")]
    pub urls: Vec<String>,

    #[schemars(description = "Optional list of MIME types matching urls (defaults to image/jpeg)")]
    #[serde(default)]
    pub mimes: Option<Vec<String>>,

    #[schemars(description = "Text prompt appended after the images")]
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

/// Pair every URL with its MIME type.
fn resolve_mimes(urls: &[String], mimes: Option<Vec<String>>) -> Result<Vec<String>, String> {
    let mimes = mimes.unwrap_or_else(|| vec![DEFAULT_IMAGE_MIME.to_string(); urls.len()]);
    if mimes.len() != urls.len() {
        return Err("Length of mimes must match length of urls".into());
    }
    Ok(mimes)
}

/// Execute the multi_image_prompt_urls tool logic. Returns plain text.
pub async fn run_multi_image(ctx: &ToolContext, input: MultiImageInput) -> Result<String, String> {
    let generator = ctx.generator().map_err(|e| e.to_string())?;
    let mimes = resolve_mimes(&input.urls, input.mimes)?;

    let mut parts = Vec::with_capacity(input.urls.len() + 1);
    for (url, mime) in input.urls.iter().zip(mimes) {
        let image = ctx.prepared_image(url, &mime).await?;
        parts.push(Part::from_bytes(&image, mime));
    }
    parts.push(Part::text(input.prompt));

    generator.generate(GenerateRequest::new(parts)).await.map_err(|e| e.to_string())
}
