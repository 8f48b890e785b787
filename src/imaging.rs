//! Image preparation before upload
//!
//! Large images are downscaled so their longest edge fits `max_edge`, then
//! re-encoded in a format matching the declared MIME type.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

/// JPEG quality used when re-encoding downscaled images.
pub const JPEG_QUALITY: u8 = 88;

/// Output format chosen for a declared MIME type.
fn format_for_mime(mime_type: &str) -> ImageFormat {
    match mime_type.to_ascii_lowercase().as_str() {
        "image/png" => ImageFormat::Png,
        "image/webp" => ImageFormat::WebP,
        _ => ImageFormat::Jpeg,
    }
}

/// Shrink `image` so its longest edge is at most `max_edge`, keeping aspect ratio.
///
/// Images already within bounds are returned unchanged.
pub fn fit_within(image: DynamicImage, max_edge: u32) -> DynamicImage {
    if image.width().max(image.height()) <= max_edge {
        return image;
    }
    image.resize(max_edge, max_edge, FilterType::Lanczos3)
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
            rgb.write_with_encoder(encoder)?;
        }
        ImageFormat::WebP => {
            // The bundled WebP encoder only takes 8-bit RGB(A).
            DynamicImage::ImageRgba8(image.to_rgba8())
                .write_to(&mut Cursor::new(&mut bytes), ImageFormat::WebP)?;
        }
        other => image.write_to(&mut Cursor::new(&mut bytes), other)?,
    }
    Ok(bytes)
}

/// Downscale encoded image bytes so the longest edge is at most `max_edge`.
///
/// Returns the original bytes when the image already fits, or when it cannot
/// be decoded or re-encoded.
pub fn downscale_to_max_edge(bytes: Vec<u8>, mime_type: &str, max_edge: u32) -> Vec<u8> {
    let image = match image::load_from_memory(&bytes) {
        Ok(image) => image,
        Err(e) => {
            tracing::debug!(error = %e, "image not decodable, sending original bytes");
            return bytes;
        }
    };

    let (width, height) = (image.width(), image.height());
    if width.max(height) <= max_edge {
        return bytes;
    }

    let resized = fit_within(image, max_edge);
    match encode(&resized, format_for_mime(mime_type)) {
        Ok(encoded) => {
            tracing::info!(
                from = %format!("{}x{}", width, height),
                to = %format!("{}x{}", resized.width(), resized.height()),
                "downscaled image"
            );
            encoded
        }
        Err(e) => {
            tracing::warn!(error = %e, "re-encoding failed, sending original bytes");
            bytes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn encoded(w: u32, h: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([10, 200, 30])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_small_image_untouched() {
        let bytes = encoded(64, 32, ImageFormat::Png);
        let out = downscale_to_max_edge(bytes.clone(), "image/png", 64);
        assert_eq!(out, bytes);
    }

    #[test]
    fn test_large_png_downscaled_keeps_aspect() {
        let bytes = encoded(400, 200, ImageFormat::Png);
        let out = downscale_to_max_edge(bytes, "image/png", 100);
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (100, 50));
    }

    #[test]
    fn test_unknown_mime_reencodes_as_jpeg() {
        let bytes = encoded(300, 300, ImageFormat::Png);
        let out = downscale_to_max_edge(bytes, "image/heic", 150);
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&out).unwrap();
        assert_eq!((img.width(), img.height()), (150, 150));
    }

    #[test]
    fn test_webp_mime() {
        let bytes = encoded(120, 60, ImageFormat::Png);
        let out = downscale_to_max_edge(bytes, "IMAGE/WEBP", 60);
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::WebP);
    }

    #[test]
    fn test_undecodable_bytes_returned() {
        let bytes = b"%PDF-1.7 not an image".to_vec();
        assert_eq!(downscale_to_max_edge(bytes.clone(), "image/jpeg", 10), bytes);
    }

    #[test]
    fn test_fit_within_portrait() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(50, 200));
        let out = fit_within(img, 100);
        assert_eq!((out.width(), out.height()), (25, 100));
    }
}
