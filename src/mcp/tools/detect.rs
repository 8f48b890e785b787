//! MCP detection tool: bounding boxes in absolute pixel coordinates.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{default_image_mime, ToolContext};
use crate::gemini::{GenerateRequest, GenerationConfig, Part};
use crate::segment::{detect_from_response, DetectionResult};

pub const DEFAULT_DETECT_PROMPT: &str = "Detect the all of the prominent items in the image. \
     The box_2d should be [ymin, xmin, ymax, xmax] normalized to 0-1000.";

fn default_prompt() -> String {
    DEFAULT_DETECT_PROMPT.to_string()
}

/// Input parameters for the detect_boxes_json_url tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DetectInput {
    #[schemars(description = "Public image URL")]
    pub url: String,

    #[schemars(description = "Image MIME type (default: image/jpeg)")]
    #[serde(default = "default_image_mime")]
    pub mime_type: String,

    #[schemars(description = "Detection prompt; must ask for box_2d in 0-1000 [ymin, xmin, ymax, xmax]")]
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

/// Execute the detect_boxes_json_url tool logic.
pub async fn run_detect(ctx: &ToolContext, input: DetectInput) -> Result<DetectionResult, String> {
    let generator = ctx.generator().map_err(|e| e.to_string())?;
    let bytes = ctx.prepared_image(&input.url, &input.mime_type).await?;
    let image =
        image::load_from_memory(&bytes).map_err(|e| format!("Failed to decode image: {}", e))?;
    let (width, height) = (image.width(), image.height());

    let request = GenerateRequest::new(vec![
        Part::from_bytes(&bytes, input.mime_type),
        Part::text(input.prompt),
    ])
    .with_config(GenerationConfig::json());
    let text = generator.generate(request).await.map_err(|e| e.to_string())?;

    let result = detect_from_response(&text, width, height)
        .map_err(|e| format!("Failed to parse detection response: {}", e))?;
    tracing::info!(boxes = result.boxes.len(), width, height, "detection complete");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::tools::testing::{context, png_bytes, FakeFetcher, FakeGenerator};
    use crate::segment::PixelBox;
    use std::sync::Arc;

    fn ctx(reply: &str) -> (ToolContext, Arc<FakeGenerator>) {
        let generator = FakeGenerator::replying(reply);
        let fetcher = Arc::new(FakeFetcher::default().with("https://x/i.png", png_bytes(200, 100), None));
        (context(generator.clone(), fetcher), generator)
    }

    fn input() -> DetectInput {
        serde_json::from_value(serde_json::json!({"url": "https://x/i.png", "mime_type": "image/png"})).unwrap()
    }

    #[tokio::test]
    async fn test_detect_maps_boxes() {
        let (ctx, generator) = ctx(r#"[{"box_2d": [100, 200, 500, 600], "label": "cat"}]"#);
        let result = run_detect(&ctx, input()).await.unwrap();

        assert_eq!(result.image_width, 200);
        assert_eq!(result.image_height, 100);
        assert_eq!(result.boxes, vec![PixelBox::from([40, 10, 120, 50])]);

        let request = &generator.requests()[0];
        assert_eq!(request.config, GenerationConfig::json());
        assert_eq!(request.parts[1], Part::text(DEFAULT_DETECT_PROMPT));
    }

    #[tokio::test]
    async fn test_detect_uses_downscaled_size() {
        let (ctx, _) = ctx("[]");
        let ctx = ctx.with_max_image_edge(50);
        let result = run_detect(&ctx, input()).await.unwrap();
        assert_eq!((result.image_width, result.image_height), (50, 25));
        assert!(result.boxes.is_empty());
    }

    #[tokio::test]
    async fn test_detect_bad_json() {
        let (ctx, _) = ctx("sorry, no boxes");
        let err = run_detect(&ctx, input()).await.unwrap_err();
        assert!(err.starts_with("Failed to parse detection response"));
    }
}
