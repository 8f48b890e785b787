//! Normalized (0-1000) to pixel box mapping

use serde::{Deserialize, Serialize};

/// Extent of the normalized coordinate space on each axis.
pub const NORMALIZED_EXTENT: i64 = 1000;

/// A box as reported by the model: `[ymin, xmin, ymax, xmax]` in 0-1000 space.
///
/// Axis values are independent; nothing guarantees `ymin < ymax`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct NormalizedBox {
    pub ymin: i64,
    pub xmin: i64,
    pub ymax: i64,
    pub xmax: i64,
}

impl From<[i64; 4]> for NormalizedBox {
    fn from([ymin, xmin, ymax, xmax]: [i64; 4]) -> Self {
        Self { ymin, xmin, ymax, xmax }
    }
}

impl From<NormalizedBox> for [i64; 4] {
    fn from(b: NormalizedBox) -> Self {
        [b.ymin, b.xmin, b.ymax, b.xmax]
    }
}

/// A box in absolute pixel coordinates, `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i64; 4]", into = "[i64; 4]")]
pub struct PixelBox {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl From<[i64; 4]> for PixelBox {
    fn from([x0, y0, x1, y1]: [i64; 4]) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

impl From<PixelBox> for [i64; 4] {
    fn from(b: PixelBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

impl PixelBox {
    /// A box is usable only with positive extent on both axes.
    pub fn is_valid(&self) -> bool {
        self.x0 < self.x1 && self.y0 < self.y1
    }

    pub fn width(&self) -> i64 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> i64 {
        self.y1.saturating_sub(self.y0)
    }
}

/// Scale one normalized coordinate onto an axis of `dimension` pixels.
///
/// `floor(value / 1000 * dimension)`, computed in integers so exact
/// multiples never lose a pixel to float error. The product is taken in
/// `i128`, where it cannot overflow; results beyond `i64` saturate.
fn scale(value: i64, dimension: u32) -> i64 {
    let scaled = (i128::from(value) * i128::from(dimension)).div_euclid(i128::from(NORMALIZED_EXTENT));
    i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}

/// Map a normalized box onto an image of `width` x `height` pixels.
///
/// No clamping: 1000 maps to exactly `dimension`, and out-of-range inputs
/// propagate arithmetically.
pub fn to_pixel_box(normalized: NormalizedBox, width: u32, height: u32) -> PixelBox {
    PixelBox {
        x0: scale(normalized.xmin, width),
        y0: scale(normalized.ymin, height),
        x1: scale(normalized.xmax, width),
        y1: scale(normalized.ymax, height),
    }
}
