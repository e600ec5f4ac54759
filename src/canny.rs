// canny.rs — Canny edge detector.
//
//   1. Sobel gradients at the configured aperture.
//   2. Magnitude |gx| + |gy| (or the Euclidean norm with `l2_gradient`).
//   3. Non-maximum suppression along the gradient direction quantized to
//      0°, 45°, 90° or 135°, using the tan(22.5°)/tan(67.5°) ratio test.
//      Ties keep the first pixel along the direction, so a symmetric ridge
//      two pixels wide thins to one.
//   4. Hysteresis: pixels above `high_threshold` seed edges; 8-connected
//      pixels above `low_threshold` that survived suppression join them.
//
// The one-pixel frame border never carries edges. Thresholds are in the
// raw (unnormalized) Sobel gain of the chosen aperture.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::gradient::sobel_xy;
use crate::image::Image;

const TAN_22_5: f32 = 0.414_213_57;
const TAN_67_5: f32 = 2.414_213_6;

/// Canny thresholds and gradient options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Sobel aperture: 3, 5 or 7.
    pub aperture: usize,
    /// Use the Euclidean gradient norm instead of |gx| + |gy|.
    pub l2_gradient: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        EdgeConfig {
            low_threshold: 400.0,
            high_threshold: 1000.0,
            aperture: 5,
            l2_gradient: false,
        }
    }
}

impl EdgeConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.aperture, 3 | 5 | 7) {
            return Err(Error::InvalidConfig(format!(
                "edge aperture must be 3, 5 or 7, got {}",
                self.aperture
            )));
        }
        if !(self.low_threshold >= 0.0) || !(self.high_threshold >= self.low_threshold) {
            return Err(Error::InvalidConfig(format!(
                "edge thresholds must satisfy 0 <= low <= high, got {} / {}",
                self.low_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

// Per-pixel classification after suppression.
const NOT_EDGE: u8 = 0;
const WEAK: u8 = 1;
const STRONG: u8 = 2;

/// Binary edge map (0 or 255) of the same shape as `image`.
///
/// # Panics
/// Panics if `config.aperture` is not 3, 5 or 7.
pub fn detect_edges(image: &Image<u8>, config: &EdgeConfig) -> Image<u8> {
    let (w, h) = image.dims();
    let mut edges = Image::new(w, h);
    if w < 3 || h < 3 {
        return edges;
    }

    let (gx, gy) = sobel_xy(image, config.aperture);
    let mut magnitude = Image::<f32>::new(w, h);
    for (x, y, dx) in gx.pixels() {
        let dy = gy.get(x, y);
        let m = if config.l2_gradient {
            (dx * dx + dy * dy).sqrt()
        } else {
            dx.abs() + dy.abs()
        };
        magnitude.set(x, y, m);
    }

    let mut class = Image::<u8>::new(w, h);
    let mut stack = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let m = magnitude.get(x, y);
            if m <= config.low_threshold {
                continue;
            }
            let (dx, dy) = (gx.get(x, y), gy.get(x, y));
            let (ax, ay) = (dx.abs(), dy.abs());

            let (before, after) = if ay < ax * TAN_22_5 {
                ((x - 1, y), (x + 1, y))
            } else if ay > ax * TAN_67_5 {
                ((x, y - 1), (x, y + 1))
            } else if (dx < 0.0) == (dy < 0.0) {
                ((x - 1, y - 1), (x + 1, y + 1))
            } else {
                ((x + 1, y - 1), (x - 1, y + 1))
            };

            let is_max = m > magnitude[before] && m >= magnitude[after];
            if !is_max {
                continue;
            }
            if m > config.high_threshold {
                class.set(x, y, STRONG);
                stack.push((x, y));
            } else {
                class.set(x, y, WEAK);
            }
        }
    }

    let seeds = stack.len();
    let mut count = 0usize;
    while let Some((x, y)) = stack.pop() {
        if edges.get(x, y) != 0 {
            continue;
        }
        edges.set(x, y, 255);
        count += 1;
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                if class.get(nx, ny) != NOT_EDGE && edges.get(nx, ny) == 0 {
                    stack.push((nx, ny));
                }
            }
        }
    }

    trace!(seeds, edge_pixels = count, "canny");
    edges
}
