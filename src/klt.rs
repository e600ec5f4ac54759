// klt.rs — Pyramidal Lucas–Kanade sparse optical flow.
//
// For each query point the tracker estimates a pure translation d such that
// the window around p in the previous frame matches the window around p + d
// in the current frame.
//
// Per pyramid level, coarsest first:
//   1. Sample the template window around p / 2^L in the previous level and
//      its central-difference gradients; accumulate the 2×2 Hessian G once.
//   2. If G's smaller eigenvalue (per pixel, on a 0–1 intensity scale) is
//      below `min_eig_threshold` the window has no texture to lock onto:
//      the level is skipped, or the point is lost at full resolution.
//   3. Gauss–Newton: e = T − I(p + d), δ = G⁻¹ Σ ∇T·e, d += δ, until
//      |δ| < epsilon or max_iterations is reached.
//   4. Double d and descend to the next finer level.
//
// Gradients come from the template, not the warped current frame, so G is
// constant per level and only the residual is recomputed per iteration.
// Samples outside the image are clamped by `interpolate_bilinear`; the final
// position is checked against the frame bounds.

use crate::image::{interpolate_bilinear, Image, Pixel};
use crate::point::Point2f;
use crate::pyramid::Pyramid;

/// Outcome for one tracked point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// Found at a new position inside the frame.
    Tracked,
    /// The window had too little texture (degenerate Hessian).
    Lost,
    /// Started or ended outside the frame.
    OutOfBounds,
}

impl TrackStatus {
    #[inline]
    pub fn is_tracked(self) -> bool {
        self == TrackStatus::Tracked
    }
}

/// When to stop the per-level Gauss–Newton iteration: after
/// `max_iterations` steps or once a step moves less than `epsilon` pixels,
/// whichever comes first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermCriteria {
    pub max_iterations: usize,
    pub epsilon: f32,
}

impl TermCriteria {
    pub fn new(max_iterations: usize, epsilon: f32) -> Self {
        TermCriteria { max_iterations, epsilon }
    }
}

/// Tracker output for one query point, in query order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPoint {
    /// Estimated position in the current frame. Unreliable unless tracked.
    pub position: Point2f,
    pub status: TrackStatus,
    /// Mean absolute intensity difference between the template window and
    /// the matched window at full resolution. 0 for points not tracked.
    pub error: f32,
}

/// Pyramidal LK tracker configuration.
#[derive(Debug, Clone)]
pub struct PyrLkTracker {
    /// Side of the square search window in pixels. Must be odd.
    pub window_size: usize,
    /// Index of the coarsest pyramid level used; 0 tracks at full
    /// resolution only, 2 uses three levels.
    pub max_level: usize,
    pub criteria: TermCriteria,
    /// Minimum smaller Hessian eigenvalue per window pixel, with
    /// intensities scaled to [0, 1]. Below it at full resolution the point
    /// is lost; a coarser level below it is skipped.
    pub min_eig_threshold: f32,
}

/// Blur applied between pyramid levels.
const PYRAMID_SIGMA: f32 = 1.0;

impl PyrLkTracker {
    /// Create a tracker with the default texture threshold (1e-4).
    ///
    /// # Panics
    /// Panics if `window_size` is even or smaller than 3.
    pub fn new(window_size: usize, max_level: usize, criteria: TermCriteria) -> Self {
        assert!(
            window_size >= 3 && window_size % 2 == 1,
            "window_size must be odd and >= 3 (got {window_size})"
        );
        PyrLkTracker {
            window_size,
            max_level,
            criteria,
            min_eig_threshold: 1e-4,
        }
    }

    /// Build a pyramid suited to this tracker for a frame.
    ///
    /// Levels whose shorter side would drop below the window size are
    /// skipped, so small frames track with fewer levels.
    pub fn build_pyramid<T: Pixel>(&self, image: &Image<T>) -> Pyramid {
        let levels = Pyramid::usable_levels(
            image.width(),
            image.height(),
            self.max_level + 1,
            self.window_size,
        );
        Pyramid::build(image, levels, PYRAMID_SIGMA)
    }

    /// Track `points` from `prev` to `curr`, building both pyramids.
    pub fn track_images<T: Pixel>(
        &self,
        prev: &Image<T>,
        curr: &Image<T>,
        points: &[Point2f],
    ) -> Vec<FlowPoint> {
        let prev_pyr = self.build_pyramid(prev);
        let curr_pyr = self.build_pyramid(curr);
        self.track(&prev_pyr, &curr_pyr, points)
    }

    /// Track `points` between two pre-built pyramids of equal base size.
    ///
    /// Returns one `FlowPoint` per input point, in input order.
    pub fn track(&self, prev: &Pyramid, curr: &Pyramid, points: &[Point2f]) -> Vec<FlowPoint> {
        assert_eq!(
            prev.base_dims(),
            curr.base_dims(),
            "previous and current pyramids must have the same base size"
        );
        let levels = (self.max_level + 1)
            .min(prev.num_levels())
            .min(curr.num_levels());

        points
            .iter()
            .map(|&p| self.track_single(prev, curr, p, levels))
            .collect()
    }

    fn track_single(&self, prev: &Pyramid, curr: &Pyramid, p: Point2f, levels: usize) -> FlowPoint {
        let (w, h) = prev.base_dims();
        if !p.inside(w, h) {
            return FlowPoint { position: p, status: TrackStatus::OutOfBounds, error: 0.0 };
        }

        let mut d = Point2f::default();
        let mut error = 0.0;

        for level in (0..levels).rev() {
            let scale = 1.0 / (1u32 << level) as f32;
            match self.refine_level(prev.level(level), curr.level(level), p.scaled(scale), d) {
                LevelResult::Refined { displacement, residual } => {
                    d = displacement;
                    error = residual;
                }
                // Blur can flatten fine texture at coarse levels; keep the
                // current guess and refine at the next level down.
                LevelResult::Degenerate if level > 0 => {}
                LevelResult::Degenerate => {
                    return FlowPoint { position: p + d, status: TrackStatus::Lost, error: 0.0 };
                }
            }
            if level > 0 {
                d = d.scaled(2.0);
            }
        }

        let position = p + d;
        if position.inside(w, h) {
            FlowPoint { position, status: TrackStatus::Tracked, error }
        } else {
            FlowPoint { position, status: TrackStatus::OutOfBounds, error: 0.0 }
        }
    }

    /// Iterative LK at one level, starting from displacement `d`.
    fn refine_level(&self, prev: &Image<f32>, curr: &Image<f32>, p: Point2f, mut d: Point2f) -> LevelResult {
        let half = (self.window_size / 2) as isize;
        let area = self.window_size * self.window_size;

        let mut template = Vec::with_capacity(area);
        let mut grad = Vec::with_capacity(area);
        let (mut h00, mut h01, mut h11) = (0.0f32, 0.0f32, 0.0f32);

        for oy in -half..=half {
            for ox in -half..=half {
                let tx = p.x + ox as f32;
                let ty = p.y + oy as f32;
                let gx = 0.5 * (interpolate_bilinear(prev, tx + 1.0, ty) - interpolate_bilinear(prev, tx - 1.0, ty));
                let gy = 0.5 * (interpolate_bilinear(prev, tx, ty + 1.0) - interpolate_bilinear(prev, tx, ty - 1.0));
                template.push(interpolate_bilinear(prev, tx, ty));
                grad.push((gx, gy));
                h00 += gx * gx;
                h01 += gx * gy;
                h11 += gy * gy;
            }
        }

        let half_trace = 0.5 * (h00 + h11);
        let half_diff = 0.5 * (h00 - h11);
        let min_eig = half_trace - (half_diff * half_diff + h01 * h01).sqrt();
        let det = h00 * h11 - h01 * h01;
        if min_eig / (area as f32 * 255.0 * 255.0) < self.min_eig_threshold || det.abs() < 1e-6 {
            return LevelResult::Degenerate;
        }
        let inv_det = 1.0 / det;

        let eps_sq = self.criteria.epsilon * self.criteria.epsilon;
        for _ in 0..self.criteria.max_iterations {
            let (mut b0, mut b1) = (0.0f32, 0.0f32);
            let mut idx = 0;
            for oy in -half..=half {
                for ox in -half..=half {
                    let i_val = interpolate_bilinear(curr, p.x + d.x + ox as f32, p.y + d.y + oy as f32);
                    let e = template[idx] - i_val;
                    b0 += grad[idx].0 * e;
                    b1 += grad[idx].1 * e;
                    idx += 1;
                }
            }

            let step = Point2f::new(
                inv_det * (h11 * b0 - h01 * b1),
                inv_det * (h00 * b1 - h01 * b0),
            );
            d = d + step;

            if step.x * step.x + step.y * step.y < eps_sq {
                break;
            }
        }

        let mut residual = 0.0f32;
        let mut idx = 0;
        for oy in -half..=half {
            for ox in -half..=half {
                let i_val = interpolate_bilinear(curr, p.x + d.x + ox as f32, p.y + d.y + oy as f32);
                residual += (template[idx] - i_val).abs();
                idx += 1;
            }
        }

        LevelResult::Refined { displacement: d, residual: residual / area as f32 }
    }
}

enum LevelResult {
    Refined { displacement: Point2f, residual: f32 },
    Degenerate,
}
