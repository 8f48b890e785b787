//! MCP compare tool: describe differences between two images.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{default_image_mime, ToolContext};
use crate::gemini::{GenerateRequest, Part};

const COMPARE_PROMPT: &str = "What is different between these two images?";

/// Input parameters for the compare_urls tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CompareInput {
    #[schemars(description = "First public image URL")]
    pub url1: String,

    #[schemars(description = "Second public image URL")]
    pub url2: String,

    #[schemars(description = "MIME type of the first image (default: image/jpeg)")]
    #[serde(default = "default_image_mime")]
    pub mime1: String,

    #[schemars(description = "MIME type of the second image (default: image/jpeg)")]
    #[serde(default = "default_image_mime")]
    pub mime2: String,
}

/// Execute the compare_urls tool logic. Returns plain text.
pub async fn run_compare(ctx: &ToolContext, input: CompareInput) -> Result<String, String> {
    let generator = ctx.generator().map_err(|e| e.to_string())?;
    let first = ctx.prepared_image(&input.url1, &input.mime1).await?;
    let second = ctx.prepared_image(&input.url2, &input.mime2).await?;

    let request = GenerateRequest::new(vec![
        Part::text(COMPARE_PROMPT),
        Part::from_bytes(&first, input.mime1),
        Part::from_bytes(&second, input.mime2),
    ]);
    generator.generate(request).await.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tools::testing::{context, png_bytes, FakeFetcher, FakeGenerator};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_compare_order() {
        let generator = FakeGenerator::replying("The second is larger.");
        let fetcher = Arc::new(
            FakeFetcher::default()
                .with("https://x/a.png", png_bytes(2, 2), None)
                .with("https://x/b.png", png_bytes(4, 4), None),
        );
        let ctx = context(generator.clone(), fetcher);
        let input: CompareInput = serde_json::from_value(serde_json::json!({
            "url1": "https://x/a.png",
            "url2": "https://x/b.png",
            "mime2": "image/png"
        }))
        .unwrap();

        assert_eq!(run_compare(&ctx, input).await.unwrap(), "The second is larger.");
        let parts = &generator.requests()[0].parts;
        assert_eq!(parts[0], Part::text(COMPARE_PROMPT));
        assert_eq!(parts[1].mime_type(), Some("image/jpeg"));
        assert_eq!(parts[2].mime_type(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_compare_second_download_fails() {
        let fetcher = Arc::new(FakeFetcher::default().with("https://x/a.png", png_bytes(2, 2), None));
        let ctx = context(FakeGenerator::replying("x"), fetcher);
        let input = CompareInput {
            url1: "https://x/a.png".into(),
            url2: "https://x/missing.png".into(),
            mime1: "image/png".into(),
            mime2: "image/png".into(),
        };
        let err = run_compare(&ctx, input).await.unwrap_err();
        assert!(err.contains("https://x/missing.png"));
    }
}
