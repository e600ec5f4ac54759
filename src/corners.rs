// corners.rs — "Good features to track" corner detector.
//
// Scores every pixel from the structure tensor of its neighbourhood, then
// picks the strongest, well-separated local maxima:
//
//   1. Sobel gradients Ix, Iy (aperture 3)
//   2. Products Ix², Iy², Ix·Iy averaged over a block_size × block_size box
//   3. Score per pixel from M = [[Sxx, Sxy], [Sxy, Syy]]:
//        min-eigenvalue (Shi–Tomasi): λ_min(M)
//        Harris:                      det(M) − k·trace(M)²
//   4. Keep pixels scoring above quality_level × best score that are also
//      3×3 local maxima
//   5. Visit them strongest first, drop any closer than min_distance to one
//      already kept, stop at max_corners
//
// The quality threshold is relative to the best score in the frame, so the
// gradient scale (and aperture gain) never needs to be normalized.

use crate::convolution::{box_kernel_1d, convolve_separable};
use crate::gradient::sobel_xy;
use crate::image::{Image, Pixel};
use crate::occupancy::SpacingGrid;
use crate::point::Point2f;

/// How a pixel's structure tensor is turned into a corner score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CornerScore {
    /// Smaller eigenvalue of the structure tensor (Shi–Tomasi).
    MinEigenvalue,
    /// Harris response with sensitivity `k`.
    Harris { k: f32 },
}

/// A detected corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub position: Point2f,
    /// Corner score at this pixel; comparable only within one frame.
    pub response: f32,
}

/// Detector for strong, well-spaced corners.
#[derive(Debug, Clone)]
pub struct GoodFeatures {
    /// Upper bound on returned corners. 0 means no bound.
    pub max_corners: usize,
    /// Fraction of the best score a corner must exceed, in (0, 1].
    pub quality_level: f32,
    /// Minimum Euclidean distance between returned corners, in pixels.
    pub min_distance: f32,
    /// Side of the averaging window for the structure tensor. Must be odd.
    pub block_size: usize,
    pub score: CornerScore,
}

impl GoodFeatures {
    /// Min-eigenvalue detector with the given limits.
    pub fn new(max_corners: usize, quality_level: f32, min_distance: f32, block_size: usize) -> Self {
        GoodFeatures {
            max_corners,
            quality_level,
            min_distance,
            block_size,
            score: CornerScore::MinEigenvalue,
        }
    }

    /// Switch to Harris scoring.
    pub fn with_harris(mut self, k: f32) -> Self {
        self.score = CornerScore::Harris { k };
        self
    }

    /// Per-pixel corner score for the whole image.
    ///
    /// # Panics
    /// Panics if `block_size` is even.
    pub fn corner_response<T: Pixel>(&self, image: &Image<T>) -> Image<f32> {
        let (ix, iy) = sobel_xy(image, 3);

        let ix2 = ix.map(|g| g * g);
        let iy2 = iy.map(|g| g * g);
        let mut ixy = Image::<f32>::new(image.width(), image.height());
        for (x, y, gx) in ix.pixels() {
            ixy.set(x, y, gx * iy.get(x, y));
        }

        let window = box_kernel_1d(self.block_size);
        let sxx = convolve_separable(&ix2, &window, &window);
        let syy = convolve_separable(&iy2, &window, &window);
        let sxy = convolve_separable(&ixy, &window, &window);

        let mut response = Image::<f32>::new(image.width(), image.height());
        for (x, y, a) in sxx.pixels() {
            let c = syy.get(x, y);
            let b = sxy.get(x, y);
            let r = match self.score {
                CornerScore::MinEigenvalue => {
                    let half_trace = 0.5 * (a + c);
                    let half_diff = 0.5 * (a - c);
                    half_trace - (half_diff * half_diff + b * b).sqrt()
                }
                CornerScore::Harris { k } => {
                    let trace = a + c;
                    (a * c - b * b) - k * trace * trace
                }
            };
            response.set(x, y, r);
        }
        response
    }

    /// Detect corners, strongest first.
    pub fn detect(&self, image: &Image<u8>) -> Vec<Corner> {
        let (w, h) = image.dims();
        if w < 3 || h < 3 {
            return Vec::new();
        }

        let response = self.corner_response(image);
        let best = response
            .as_slice()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if !(best > 0.0) {
            return Vec::new();
        }
        let threshold = best * self.quality_level;

        let mut candidates = Vec::new();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let r = response.get(x, y);
                if r > threshold && is_local_max(&response, x, y, r) {
                    candidates.push(Corner {
                        position: Point2f::new(x as f32, y as f32),
                        response: r,
                    });
                }
            }
        }

        // Stable sort keeps raster order among equal scores.
        candidates.sort_by(|a, b| b.response.total_cmp(&a.response));

        let limit = if self.max_corners == 0 { usize::MAX } else { self.max_corners };
        if self.min_distance < 1.0 {
            candidates.truncate(limit);
            return candidates;
        }

        let mut grid = SpacingGrid::new(w, h, self.min_distance);
        let mut corners = Vec::new();
        for c in candidates {
            if corners.len() >= limit {
                break;
            }
            if grid.try_insert(c.position) {
                corners.push(c);
            }
        }
        corners
    }
}

/// True if `r` at (x, y) is ≥ all eight neighbours. (x, y) must not be on
/// the image border.
fn is_local_max(response: &Image<f32>, x: usize, y: usize, r: f32) -> bool {
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            if (nx, ny) != (x, y) && response.get(nx, ny) > r {
                return false;
            }
        }
    }
    true
}
