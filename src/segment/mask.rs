//! Decoding of per-item mask payloads

use base64::Engine;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use thiserror::Error;

/// Prefix every mask payload must carry.
pub const MASK_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Mask decoding failure
#[derive(Debug, Error)]
pub enum MaskError {
    /// Payload is not a base64 PNG data URI; the item is skipped
    #[error("mask is not a base64 PNG data URI")]
    UnsupportedMaskFormat,
    /// Payload body is not valid base64; the item is skipped
    #[error("mask data is not valid base64: {0}")]
    MalformedMaskData(#[from] base64::DecodeError),
    /// Bytes decoded but are not a readable image; aborts the run
    #[error("mask image could not be decoded: {0}")]
    Image(#[from] image::ImageError),
}

impl MaskError {
    /// Whether the pipeline drops the item and carries on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, MaskError::UnsupportedMaskFormat | MaskError::MalformedMaskData(_))
    }
}

/// A mask resized onto its pixel box.
#[derive(Debug, Clone)]
pub struct DecodedMask {
    /// Resized mask in its source color type, saved as-is
    pub resized: DynamicImage,
    /// Single-channel intensity of `resized`, used for thresholding
    pub intensity: GrayImage,
}

impl DecodedMask {
    pub fn dimensions(&self) -> (u32, u32) {
        self.intensity.dimensions()
    }
}

/// Strip the data URI prefix and base64-decode the payload.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, MaskError> {
    let body = payload.strip_prefix(MASK_DATA_URI_PREFIX).ok_or(MaskError::UnsupportedMaskFormat)?;
    Ok(base64::engine::general_purpose::STANDARD.decode(body)?)
}

/// Decode a mask payload and resize it to exactly `width` x `height`.
///
/// The target is always the pixel box size; the model's mask resolution is
/// unrelated to where it lands on the image.
pub fn decode_mask(payload: &str, width: u32, height: u32) -> Result<DecodedMask, MaskError> {
    let bytes = decode_payload(payload)?;
    let mask = image::load_from_memory(&bytes)?;
    let resized = mask.resize_exact(width, height, FilterType::Triangle);
    let intensity = resized.to_luma8();
    Ok(DecodedMask { resized, intensity })
}
