// pyramid.rs — Gaussian image pyramid for coarse-to-fine LK tracking.
//
// Level 0 is the input converted to f32. Each further level blurs the
// previous one (separable Gaussian) and keeps every other pixel in both
// dimensions. The tracker walks the levels from coarsest to finest, so a
// displacement of d pixels at level 0 only needs to be found as d / 2^L at
// level L.

use crate::convolution::{convolve_separable, gaussian_kernel_1d};
use crate::image::{Image, Pixel};

/// A Gaussian image pyramid.
///
/// `levels[0]` is the original resolution; `levels[n]` is roughly
/// `(width / 2^n, height / 2^n)`. Levels are f32 so the tracker can sample
/// them with sub-pixel bilinear interpolation.
#[derive(Debug, Clone)]
pub struct Pyramid {
    /// Pyramid levels, from finest (index 0) to coarsest.
    pub levels: Vec<Image<f32>>,
}

impl Pyramid {
    /// Build a pyramid with `num_levels` levels.
    ///
    /// # Panics
    /// Panics if `num_levels == 0`.
    pub fn build<T: Pixel>(src: &Image<T>, num_levels: usize, sigma: f32) -> Self {
        assert!(num_levels >= 1, "pyramid must have at least 1 level");

        let half_size = (3.0 * sigma).ceil().max(1.0) as usize;
        let kernel = gaussian_kernel_1d(half_size, sigma);

        let mut levels = Vec::with_capacity(num_levels);
        levels.push(src.map(Pixel::to_f32));

        for _ in 1..num_levels {
            let prev = &levels[levels.len() - 1];
            let blurred = convolve_separable(prev, &kernel, &kernel);
            levels.push(downsample_2x(&blurred));
        }

        Pyramid { levels }
    }

    /// Number of levels that keep the coarsest one at least `min_side`
    /// pixels on its shorter side, capped at `max_levels`. Always ≥ 1.
    pub fn usable_levels(width: usize, height: usize, max_levels: usize, min_side: usize) -> usize {
        let mut levels = 1;
        let mut side = width.min(height);
        while levels < max_levels && side / 2 >= min_side.max(1) {
            side /= 2;
            levels += 1;
        }
        levels
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn level(&self, level: usize) -> &Image<f32> {
        &self.levels[level]
    }

    /// `(width, height)` of the finest level.
    pub fn base_dims(&self) -> (usize, usize) {
        self.levels[0].dims()
    }
}

/// Keep every other pixel in both dimensions; odd sizes drop the last
/// row/column.
fn downsample_2x(src: &Image<f32>) -> Image<f32> {
    let new_w = src.width() / 2;
    let new_h = src.height() / 2;
    let mut dst = Image::new(new_w, new_h);

    for y in 0..new_h {
        for x in 0..new_w {
            // SAFETY: 2x < width and 2y < height since x < width/2, y < height/2.
            unsafe { dst.set_unchecked(x, y, src.get_unchecked(x * 2, y * 2)) };
        }
    }
    dst
}
