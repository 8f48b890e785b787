//! Mask painting and alpha compositing

use image::{DynamicImage, GrayImage, Rgba, RgbaImage};

use super::coords::PixelBox;

/// Mask intensities strictly above this count as "on".
pub const MASK_THRESHOLD: u8 = 128;

/// Color painted for every "on" mask pixel.
pub const OVERLAY_FILL: Rgba<u8> = Rgba([255, 255, 255, 200]);

/// Allocate a fully transparent canvas.
pub fn transparent_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]))
}

/// Paint each mask pixel above the threshold onto `canvas` at the box offset.
///
/// Pixels are painted individually so ragged mask edges survive. Positions
/// that fall outside the canvas are ignored. Returns the number of painted
/// pixels.
pub fn paint_mask(canvas: &mut RgbaImage, intensity: &GrayImage, placement: PixelBox) -> usize {
    let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let mut painted = 0;

    for (mx, my, value) in intensity.enumerate_pixels() {
        if value.0[0] <= MASK_THRESHOLD {
            continue;
        }
        let x = placement.x0 + i64::from(mx);
        let y = placement.y0 + i64::from(my);
        if x < 0 || y < 0 || x >= canvas_w || y >= canvas_h {
            continue;
        }
        canvas.put_pixel(x as u32, y as u32, OVERLAY_FILL);
        painted += 1;
    }

    painted
}

/// Alpha-composite `canvas` over `source`, returning a new RGBA image.
///
/// Fully transparent canvas pixels leave the source untouched.
pub fn composite(source: &DynamicImage, canvas: &RgbaImage) -> RgbaImage {
    let mut base = source.to_rgba8();
    image::imageops::overlay(&mut base, canvas, 0, 0);
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    #[test]
    fn test_threshold_is_strict() {
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(0, 0, Luma([128]));
        mask.put_pixel(1, 0, Luma([129]));

        let mut canvas = transparent_canvas(2, 1);
        let painted = paint_mask(&mut canvas, &mask, PixelBox::from([0, 0, 2, 1]));

        assert_eq!(painted, 1);
        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(1, 0), &OVERLAY_FILL);
    }

    #[test]
    fn test_paint_uses_offset() {
        let mask = GrayImage::from_pixel(2, 2, Luma([255]));
        let mut canvas = transparent_canvas(10, 10);
        let painted = paint_mask(&mut canvas, &mask, PixelBox::from([3, 4, 5, 6]));

        assert_eq!(painted, 4);
        assert_eq!(canvas.get_pixel(3, 4), &OVERLAY_FILL);
        assert_eq!(canvas.get_pixel(4, 5), &OVERLAY_FILL);
        assert_eq!(canvas.get_pixel(2, 4).0[3], 0);
        assert_eq!(canvas.get_pixel(5, 6).0[3], 0);
    }

    #[test]
    fn test_paint_clips_outside_canvas() {
        let mask = GrayImage::from_pixel(4, 4, Luma([255]));
        let mut canvas = transparent_canvas(5, 5);
        let painted = paint_mask(&mut canvas, &mask, PixelBox::from([3, -2, 7, 2]));
        // Only x in 3..5 and y in 0..2 land on the canvas
        assert_eq!(painted, 4);
    }

    #[test]
    fn test_ragged_edges_preserved() {
        let mut mask = GrayImage::new(3, 3);
        mask.put_pixel(0, 0, Luma([255]));
        mask.put_pixel(2, 2, Luma([255]));
        let mut canvas = transparent_canvas(3, 3);
        assert_eq!(paint_mask(&mut canvas, &mask, PixelBox::from([0, 0, 3, 3])), 2);
        assert_eq!(canvas.get_pixel(1, 1).0[3], 0);
    }

    #[test]
    fn test_composite_transparent_leaves_source() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([10, 20, 30])));
        let out = composite(&source, &transparent_canvas(4, 4));
        assert!(out.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
    }

    #[test]
    fn test_composite_blends_toward_white() {
        let source = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([0, 0, 0])));
        let mut canvas = transparent_canvas(1, 1);
        canvas.put_pixel(0, 0, OVERLAY_FILL);
        let out = composite(&source, &canvas);
        let px = out.get_pixel(0, 0);
        // 200/255 of the way from black to white, fully opaque
        for c in &px.0[..3] {
            assert!((i32::from(*c) - 200).abs() <= 1, "channel was {}", c);
        }
        assert_eq!(px.0[3], 255);
    }
}
