//! MCP segmentation tool: masks and overlays written to disk.

use schemars::JsonSchema;
use serde::Deserialize;

use super::{default_image_mime, ToolContext};
use crate::gemini::{GenerateRequest, GenerationConfig, Part};
use crate::imaging::fit_within;
use crate::segment::{parse_items, run_pipeline, ItemOutcome, SegmentationResult};

pub const DEFAULT_SEGMENT_PROMPT: &str = "Give the segmentation masks for the wooden and glass items.\n\
     Output a JSON list of segmentation masks where each entry contains the 2D \
     bounding box in the key \"box_2d\", the segmentation mask in key \"mask\", and \
     the text label in the key \"label\". Use descriptive labels.";

fn default_prompt() -> String {
    DEFAULT_SEGMENT_PROMPT.to_string()
}

/// Input parameters for the segment_items_url tool.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SegmentInput {
    #[schemars(description = "Public image URL")]
    pub url: String,

    #[schemars(description = "Image MIME type (default: image/jpeg)")]
    #[serde(default = "default_image_mime")]
    pub mime_type: String,

    #[schemars(description = "Segmentation prompt; must ask for box_2d, mask and label keys")]
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

/// Execute the segment_items_url tool logic.
pub async fn run_segment(ctx: &ToolContext, input: SegmentInput) -> Result<SegmentationResult, String> {
    let generator = ctx.generator().map_err(|e| e.to_string())?;
    let bytes = ctx.prepared_image(&input.url, &input.mime_type).await?;
    let image =
        image::load_from_memory(&bytes).map_err(|e| format!("Failed to decode image: {}", e))?;
    let image = fit_within(image, ctx.max_image_edge());

    let request = GenerateRequest::new(vec![
        Part::text(input.prompt),
        Part::from_bytes(&bytes, input.mime_type),
    ])
    .with_config(GenerationConfig::no_thinking());
    let text = generator.generate(request).await.map_err(|e| e.to_string())?;

    let items = parse_items(&text).map_err(|e| format!("Failed to parse segmentation response: {}", e))?;
    let output_dir = ctx.segment_output_dir().clone();

    let run = tokio::task::spawn_blocking(move || run_pipeline(&image, &items, &output_dir))
        .await
        .map_err(|e| format!("Segmentation task failed: {}", e))?
        .map_err(|e| format!("Segmentation failed: {}", e))?;

    for outcome in run.skipped() {
        match outcome {
            ItemOutcome::SkippedInvalidBox { index, label, pixel_box } => {
                tracing::debug!(index, label = %label, ?pixel_box, "skipped item with empty box");
            }
            ItemOutcome::SkippedBadMask { index, label, reason } => {
                tracing::debug!(index, label = %label, reason = %reason, "skipped item with bad mask");
            }
            ItemOutcome::Rendered(_) => {}
        }
    }

    let result = run.into_result();
    tracing::info!(items = result.items.len(), dir = %result.output_dir.display(), "segmentation complete");
    Ok(result)
}
