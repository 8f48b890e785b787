//! Segmentation and box-detection core
//!
//! Turns a raw model response (items carrying a 0-1000 `box_2d`, a base64
//! PNG mask and a label) into pixel boxes, resized masks and composited
//! overlays written to disk.

pub mod coords;
pub mod detect;
pub mod mask;
pub mod overlay;
pub mod pipeline;
pub mod response;

pub use coords::{to_pixel_box, NormalizedBox, PixelBox};
pub use detect::{detect_from_response, map_boxes, DetectionResult};
pub use mask::{decode_mask, DecodedMask, MaskError, MASK_DATA_URI_PREFIX};
pub use overlay::{composite, paint_mask, MASK_THRESHOLD};
pub use pipeline::{
    run_pipeline, ItemOutcome, RenderedItem, SegmentError, SegmentationResult, SegmentationRun,
};
pub use response::{parse_items, strip_json_fence, DetectedItem};
