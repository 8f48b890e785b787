//! Bounding-box detection results mapped to pixel space

use serde::{Deserialize, Serialize};

use super::coords::{to_pixel_box, NormalizedBox, PixelBox};
use super::response::{strip_json_fence, DetectedItem};

/// Boxes reported for one image, in absolute pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    pub image_width: u32,
    pub image_height: u32,
    pub boxes: Vec<PixelBox>,
}

/// Map every reported box onto the image; no validity filtering.
pub fn map_boxes<I>(boxes: I, width: u32, height: u32) -> DetectionResult
where
    I: IntoIterator<Item = NormalizedBox>,
{
    DetectionResult {
        image_width: width,
        image_height: height,
        boxes: boxes.into_iter().map(|b| to_pixel_box(b, width, height)).collect(),
    }
}

/// Parse a detection response and map its boxes onto the image.
pub fn detect_from_response(
    text: &str,
    width: u32,
    height: u32,
) -> Result<DetectionResult, serde_json::Error> {
    let items: Vec<DetectedItem> = serde_json::from_str(strip_json_fence(text))?;
    Ok(map_boxes(items.into_iter().map(|i| i.box_2d), width, height))
}
