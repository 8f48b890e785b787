//! Per-item segmentation pipeline
//!
//! Items are processed strictly in input order. Each one either renders
//! (two PNG files plus a [`RenderedItem`]) or is skipped with a reason. I/O
//! and encoding failures abort the run, as do corrupt mask images and boxes
//! too large to rasterize.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use thiserror::Error;

use super::coords::{to_pixel_box, PixelBox};
use super::mask::{decode_mask, MaskError};
use super::overlay::{composite, paint_mask, transparent_canvas};
use super::response::DetectedItem;

/// A successfully processed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedItem {
    pub label: String,
    #[serde(rename = "box")]
    pub pixel_box: PixelBox,
    pub mask_file: PathBuf,
    pub overlay_file: PathBuf,
}

/// What happened to one input item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Rendered(RenderedItem),
    /// Box had zero or negative extent after mapping
    SkippedInvalidBox { index: usize, label: String, pixel_box: PixelBox },
    /// Mask missing, without the PNG data URI prefix, or not base64
    SkippedBadMask { index: usize, label: String, reason: String },
}

impl ItemOutcome {
    pub fn rendered(&self) -> Option<&RenderedItem> {
        match self {
            ItemOutcome::Rendered(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        !matches!(self, ItemOutcome::Rendered(_))
    }
}

/// Outcome of a full pipeline run, one entry per input item.
#[derive(Debug, Clone)]
pub struct SegmentationRun {
    pub output_dir: PathBuf,
    pub outcomes: Vec<ItemOutcome>,
}

/// The result shape handed back to tool callers: rendered items only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentationResult {
    pub output_dir: PathBuf,
    pub items: Vec<RenderedItem>,
}

impl SegmentationRun {
    pub fn rendered(&self) -> impl Iterator<Item = &RenderedItem> {
        self.outcomes.iter().filter_map(ItemOutcome::rendered)
    }

    pub fn skipped(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }

    pub fn into_result(self) -> SegmentationResult {
        let items = self
            .outcomes
            .into_iter()
            .filter_map(|o| match o {
                ItemOutcome::Rendered(item) => Some(item),
                _ => None,
            })
            .collect();
        SegmentationResult { output_dir: self.output_dir, items }
    }
}

/// Unrecoverable pipeline failure
#[derive(Debug, Error)]
pub enum SegmentError {
    #[error("failed to create output directory '{}': {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("item {index}: {source}")]
    Mask { index: usize, source: MaskError },
    #[error("failed to write '{}': {source}", path.display())]
    Save { path: PathBuf, source: image::ImageError },
    #[error("item {index}: box {pixel_box:?} is too large to rasterize a mask for")]
    OversizedBox { index: usize, pixel_box: PixelBox },
}

/// A mask may span at most this many image widths (heights) per axis.
pub const MAX_BOX_TO_IMAGE_RATIO: u32 = 4;

/// Mask size for a valid box, or `None` when either extent exceeds
/// `MAX_BOX_TO_IMAGE_RATIO` times the image along that axis.
fn mask_extent(pixel_box: PixelBox, image_width: u32, image_height: u32) -> Option<(u32, u32)> {
    let bounded = |extent: i64, dimension: u32| {
        u32::try_from(extent)
            .ok()
            .filter(|&e| u64::from(e) <= u64::from(dimension) * u64::from(MAX_BOX_TO_IMAGE_RATIO))
    };
    Some((bounded(pixel_box.width(), image_width)?, bounded(pixel_box.height(), image_height)?))
}

/// File name stem for a label; path separators would escape the output dir.
fn file_stem(label: &str) -> String {
    label.chars().map(|c| if matches!(c, '/' | '\\') { '_' } else { c }).collect()
}

fn save(image: &DynamicImage, path: &Path) -> Result<(), SegmentError> {
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| SegmentError::Save { path: path.to_path_buf(), source })
}

fn process_item(
    source: &DynamicImage,
    item: &DetectedItem,
    index: usize,
    output_dir: &Path,
) -> Result<ItemOutcome, SegmentError> {
    let label = item.label_or_default(index);
    let pixel_box = to_pixel_box(item.box_2d, source.width(), source.height());

    if !pixel_box.is_valid() {
        return Ok(ItemOutcome::SkippedInvalidBox { index, label, pixel_box });
    }

    let Some(payload) = item.mask.as_deref() else {
        return Ok(ItemOutcome::SkippedBadMask { index, label, reason: "missing mask".into() });
    };

    let (width, height) = mask_extent(pixel_box, source.width(), source.height())
        .ok_or(SegmentError::OversizedBox { index, pixel_box })?;
    let mask = match decode_mask(payload, width, height) {
        Ok(mask) => mask,
        Err(e) if e.is_skippable() => {
            return Ok(ItemOutcome::SkippedBadMask { index, label, reason: e.to_string() });
        }
        Err(e) => return Err(SegmentError::Mask { index, source: e }),
    };

    let mut canvas = transparent_canvas(source.width(), source.height());
    paint_mask(&mut canvas, &mask.intensity, pixel_box);
    let overlay = DynamicImage::ImageRgba8(composite(source, &canvas));

    let stem = file_stem(&label);
    let mask_file = output_dir.join(format!("{}_{}_mask.png", stem, index));
    let overlay_file = output_dir.join(format!("{}_{}_overlay.png", stem, index));

    save(&mask.resized, &mask_file)?;
    save(&overlay, &overlay_file)?;

    Ok(ItemOutcome::Rendered(RenderedItem { label, pixel_box, mask_file, overlay_file }))
}

/// Run every item through box mapping, mask decoding, overlay and file output.
///
/// `output_dir` is created if absent. Same-named files from an earlier run
/// are overwritten.
pub fn run_pipeline(
    source: &DynamicImage,
    items: &[DetectedItem],
    output_dir: &Path,
) -> Result<SegmentationRun, SegmentError> {
    fs::create_dir_all(output_dir)
        .map_err(|source| SegmentError::CreateDir { path: output_dir.to_path_buf(), source })?;

    let outcomes = items
        .iter()
        .enumerate()
        .map(|(index, item)| process_item(source, item, index, output_dir))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SegmentationRun { output_dir: output_dir.to_path_buf(), outcomes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::coords::NormalizedBox;
    use crate::segment::mask::MASK_DATA_URI_PREFIX;
    use base64::Engine;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn white_mask_payload(w: u32, h: u32) -> String {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(w, h, Luma([255])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        format!(
            "{}{}",
            MASK_DATA_URI_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        )
    }

    fn gray_source(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([50, 50, 50])))
    }

    fn item(label: Option<&str>, b: [i64; 4], mask: Option<String>) -> DetectedItem {
        DetectedItem { box_2d: NormalizedBox::from(b), mask, label: label.map(String::from) }
    }

    #[test]
    fn test_single_item_renders() {
        let temp = TempDir::new().unwrap();
        let items = [item(Some("cup"), [100, 100, 500, 500], Some(white_mask_payload(40, 40)))];
        let run = run_pipeline(&gray_source(100, 100), &items, temp.path()).unwrap();

        let rendered: Vec<_> = run.rendered().collect();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].pixel_box, PixelBox::from([10, 10, 50, 50]));
        assert_eq!(rendered[0].mask_file, temp.path().join("cup_0_mask.png"));
        assert_eq!(rendered[0].overlay_file, temp.path().join("cup_0_overlay.png"));

        let mask = image::open(&rendered[0].mask_file).unwrap();
        assert_eq!((mask.width(), mask.height()), (40, 40));

        let overlay = image::open(&rendered[0].overlay_file).unwrap().to_rgba8();
        assert_eq!(overlay.dimensions(), (100, 100));
        assert_eq!(overlay.get_pixel(0, 0), &image::Rgba([50, 50, 50, 255]));
        let inside = overlay.get_pixel(20, 20);
        assert!(inside.0[0] > 200, "masked pixel should blend toward white");
    }

    #[test]
    fn test_degenerate_box_skipped() {
        let temp = TempDir::new().unwrap();
        let items = [item(Some("dot"), [500, 500, 500, 500], Some(white_mask_payload(4, 4)))];
        let run = run_pipeline(&gray_source(200, 200), &items, temp.path()).unwrap();

        assert_eq!(run.rendered().count(), 0);
        assert!(matches!(run.outcomes[0], ItemOutcome::SkippedInvalidBox { index: 0, .. }));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_bad_prefix_skipped_without_files() {
        let temp = TempDir::new().unwrap();
        let payload = white_mask_payload(40, 40).replace(MASK_DATA_URI_PREFIX, "");
        let items = [item(Some("cup"), [100, 100, 500, 500], Some(payload))];
        let run = run_pipeline(&gray_source(100, 100), &items, temp.path()).unwrap();

        assert_eq!(run.clone().into_result().items.len(), 0);
        assert!(matches!(&run.outcomes[0], ItemOutcome::SkippedBadMask { label, .. } if label == "cup"));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_mask_skipped() {
        let temp = TempDir::new().unwrap();
        let items = [item(None, [0, 0, 1000, 1000], None)];
        let run = run_pipeline(&gray_source(10, 10), &items, temp.path()).unwrap();
        assert!(matches!(
            &run.outcomes[0],
            ItemOutcome::SkippedBadMask { label, reason, .. }
                if label == "item_0" && reason == "missing mask"
        ));
    }

    #[test]
    fn test_default_label_and_index_in_file_names() {
        let temp = TempDir::new().unwrap();
        let items = [
            item(None, [500, 500, 500, 500], None),
            item(None, [0, 0, 1000, 1000], Some(white_mask_payload(2, 2))),
        ];
        let result =
            run_pipeline(&gray_source(8, 8), &items, temp.path()).unwrap().into_result();

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].label, "item_1");
        assert_eq!(result.items[0].mask_file, temp.path().join("item_1_1_mask.png"));
        assert!(result.items[0].overlay_file.exists());
    }

    #[test]
    fn test_corrupt_png_aborts() {
        let temp = TempDir::new().unwrap();
        let payload = format!(
            "{}{}",
            MASK_DATA_URI_PREFIX,
            base64::engine::general_purpose::STANDARD.encode(b"garbage")
        );
        let items = [item(Some("x"), [0, 0, 1000, 1000], Some(payload))];
        let err = run_pipeline(&gray_source(10, 10), &items, temp.path()).unwrap_err();
        assert!(matches!(err, SegmentError::Mask { index: 0, .. }));
    }

    #[test]
    fn test_box_beyond_u32_aborts() {
        let temp = TempDir::new().unwrap();
        let items = [item(Some("wide"), [0, 0, 1000, 4_294_967_306_000], Some(white_mask_payload(2, 2)))];
        let err = run_pipeline(&gray_source(1000, 10), &items, temp.path()).unwrap_err();
        match err {
            SegmentError::OversizedBox { index, pixel_box } => {
                assert_eq!(index, 0);
                assert_eq!(pixel_box, PixelBox::from([0, 0, 4_294_967_306_000, 10]));
            }
            other => panic!("expected oversized box, got {:?}", other),
        }
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_box_far_larger_than_image_aborts() {
        let temp = TempDir::new().unwrap();
        // 100x the image width still fits in u32
        let items = [item(Some("big"), [0, 0, 1000, 100_000], Some(white_mask_payload(2, 2)))];
        let err = run_pipeline(&gray_source(100, 100), &items, temp.path()).unwrap_err();
        assert!(matches!(err, SegmentError::OversizedBox { index: 0, .. }));
    }

    #[test]
    fn test_moderately_out_of_range_box_renders() {
        let temp = TempDir::new().unwrap();
        let items = [item(Some("edge"), [-100, 0, 1500, 2000], Some(white_mask_payload(4, 4)))];
        let run = run_pipeline(&gray_source(100, 100), &items, temp.path()).unwrap();
        let rendered: Vec<_> = run.rendered().collect();
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].pixel_box, PixelBox::from([0, -10, 200, 150]));
        let mask = image::open(&rendered[0].mask_file).unwrap();
        assert_eq!((mask.width(), mask.height()), (200, 160));
    }

    #[test]
    fn test_mask_extent_bounds() {
        assert_eq!(mask_extent(PixelBox::from([0, 0, 400, 40]), 100, 10), Some((400, 40)));
        assert_eq!(mask_extent(PixelBox::from([0, 0, 401, 40]), 100, 10), None);
        assert_eq!(mask_extent(PixelBox::from([0, 0, 10, i64::MAX]), 100, 10), None);
    }

    #[test]
    fn test_label_separators_sanitized() {
        let temp = TempDir::new().unwrap();
        let items = [item(Some("a/b"), [0, 0, 1000, 1000], Some(white_mask_payload(2, 2)))];
        let result =
            run_pipeline(&gray_source(4, 4), &items, temp.path()).unwrap().into_result();
        assert_eq!(result.items[0].label, "a/b");
        assert_eq!(result.items[0].mask_file, temp.path().join("a_b_0_mask.png"));
    }

    #[test]
    fn test_creates_output_dir() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested").join("out");
        run_pipeline(&gray_source(4, 4), &[], &out).unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_result_json_shape() {
        let result = SegmentationResult {
            output_dir: PathBuf::from("segmentation_outputs"),
            items: vec![RenderedItem {
                label: "cup".into(),
                pixel_box: PixelBox::from([10, 10, 50, 50]),
                mask_file: PathBuf::from("segmentation_outputs/cup_0_mask.png"),
                overlay_file: PathBuf::from("segmentation_outputs/cup_0_overlay.png"),
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["output_dir"], "segmentation_outputs");
        assert_eq!(json["items"][0]["box"], serde_json::json!([10, 10, 50, 50]));
        assert_eq!(json["items"][0]["mask_file"], "segmentation_outputs/cup_0_mask.png");
    }
}
