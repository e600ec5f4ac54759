// tracking.rs — Frame-to-frame sparse point tracking with persistent trails.
//
// The cache is a two-state machine:
//
//   UNINITIALIZED ── first frame ──▶ INITIALIZED ──┐
//                                          ▲        │ every later frame
//                                          └────────┘
//
// First frame: detect corners, give corner i colour palette[i], zero the
// draw mask, keep the frame (and its pyramid). The frame is returned as is.
//
// Later frames: track the kept points into the new frame with pyramidal LK.
// Each tracked point keeps its colour and gets a trail segment (new → old
// position) drawn onto the mask; lost points are dropped for good. The
// frame, its pyramid and the surviving points then replace the previous
// ones together, and the result is frame ⊕ mask (saturating add).
//
// The mask only ever accumulates. `reset()` is the one way to clear it.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::corners::GoodFeatures;
use crate::draw::{draw_line, saturating_add};
use crate::error::{Error, Result};
use crate::image::Image;
use crate::klt::{PyrLkTracker, TermCriteria};
use crate::point::Point2f;
use crate::pyramid::Pyramid;

/// Largest accepted `max_corners`; one palette entry is allocated per corner.
pub const MAX_CORNERS_LIMIT: usize = 10_000;

/// Largest accepted trail stroke width.
pub const MAX_LINE_THICKNESS: u32 = 64;

/// Detection, tracking and drawing parameters for a tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Upper bound on seeded corners.
    pub max_corners: usize,
    /// Corners must score above this fraction of the best corner.
    pub quality_level: f32,
    /// Minimum distance between seeded corners, in pixels.
    pub min_distance: f32,
    /// Structure tensor window (odd).
    pub block_size: usize,
    /// Score corners with Harris instead of the smaller eigenvalue.
    pub use_harris: bool,
    pub harris_k: f32,
    /// LK search window side (odd).
    pub window_size: usize,
    /// Coarsest pyramid level index; 2 means three levels.
    pub max_level: usize,
    pub max_iterations: usize,
    /// Stop iterating once an update moves less than this, in pixels.
    pub epsilon: f32,
    /// Texture threshold below which a point is reported lost at full
    /// resolution.
    pub min_eig_threshold: f32,
    /// Trail stroke width in pixels.
    pub line_thickness: u32,
    /// Seed for the generated trail palette.
    pub palette_seed: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            max_corners: 100,
            quality_level: 0.3,
            min_distance: 7.0,
            block_size: 7,
            use_harris: false,
            harris_k: 0.04,
            window_size: 15,
            max_level: 2,
            max_iterations: 10,
            epsilon: 0.03,
            min_eig_threshold: 1e-4,
            line_thickness: 2,
            palette_seed: 0x5eed,
        }
    }
}

impl TrackerConfig {
    /// Reject values the detector or tracker cannot run with.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidConfig(msg));

        if self.max_corners == 0 || self.max_corners > MAX_CORNERS_LIMIT {
            return fail(format!(
                "max_corners must be in 1..={MAX_CORNERS_LIMIT}, got {}",
                self.max_corners
            ));
        }
        if !(self.quality_level > 0.0 && self.quality_level <= 1.0) {
            return fail(format!("quality_level must be in (0, 1], got {}", self.quality_level));
        }
        if !(self.min_distance >= 0.0) {
            return fail(format!("min_distance must be >= 0, got {}", self.min_distance));
        }
        if self.block_size % 2 == 0 {
            return fail(format!("block_size must be odd, got {}", self.block_size));
        }
        if self.window_size < 3 || self.window_size % 2 == 0 {
            return fail(format!("window_size must be odd and >= 3, got {}", self.window_size));
        }
        if self.max_iterations == 0 {
            return fail("max_iterations must be at least 1".into());
        }
        if !(self.epsilon >= 0.0) || !(self.min_eig_threshold >= 0.0) {
            return fail("epsilon and min_eig_threshold must be >= 0".into());
        }
        if self.line_thickness == 0 || self.line_thickness > MAX_LINE_THICKNESS {
            return fail(format!(
                "line_thickness must be in 1..={MAX_LINE_THICKNESS}, got {}",
                self.line_thickness
            ));
        }
        Ok(())
    }

    fn detector(&self) -> GoodFeatures {
        let det = GoodFeatures::new(self.max_corners, self.quality_level, self.min_distance, self.block_size);
        if self.use_harris {
            det.with_harris(self.harris_k)
        } else {
            det
        }
    }

    fn tracker(&self) -> PyrLkTracker {
        let mut tracker = PyrLkTracker::new(
            self.window_size,
            self.max_level,
            TermCriteria::new(self.max_iterations, self.epsilon),
        );
        tracker.min_eig_threshold = self.min_eig_threshold;
        tracker
    }
}

/// Fixed trail colours; seeded point `i` draws with colour `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<u8>,
}

impl Palette {
    /// `len` reproducible pseudo-random intensities. Values stay above 63 so
    /// trails remain visible on dark frames.
    pub fn random(len: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Palette {
            colors: (0..len).map(|_| rng.random_range(64..=255u8)).collect(),
        }
    }

    pub fn from_vec(colors: Vec<u8>) -> Self {
        Palette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
}

/// A point followed across frames, with the colour of its trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedPoint {
    pub position: Point2f,
    pub color: u8,
}

/// Per-call counters, refreshed by every `process_frame`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Corners seeded (first frame of a session only).
    pub seeded: usize,
    pub tracked: usize,
    pub lost: usize,
    /// Points alive after the call.
    pub total: usize,
}

/// State carried from one frame to the next once a session has started.
#[derive(Debug)]
struct Session {
    previous_frame: Image<u8>,
    previous_pyramid: Pyramid,
    draw_mask: Image<u8>,
}

/// Cross-frame state for incremental sparse point tracking.
#[derive(Debug)]
pub struct FrameTrackingCache {
    config: TrackerConfig,
    palette: Palette,
    detector: GoodFeatures,
    tracker: PyrLkTracker,
    /// `None` until the first frame arrives.
    session: Option<Session>,
    points: Vec<TrackedPoint>,
    stats: FrameStats,
}

impl FrameTrackingCache {
    /// Create an uninitialized cache.
    ///
    /// # Errors
    /// [`Error::InvalidConfig`] for a config that fails validation and
    /// [`Error::PaletteTooSmall`] if `palette` has fewer colours than
    /// `config.max_corners`.
    pub fn new(config: TrackerConfig, palette: Palette) -> Result<Self> {
        config.validate()?;
        if palette.len() < config.max_corners {
            return Err(Error::PaletteTooSmall {
                palette: palette.len(),
                max_corners: config.max_corners,
            });
        }
        Ok(FrameTrackingCache {
            detector: config.detector(),
            tracker: config.tracker(),
            config,
            palette,
            session: None,
            points: Vec::new(),
            stats: FrameStats::default(),
        })
    }

    /// Create a cache whose palette is generated from `config.palette_seed`.
    pub fn from_config(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        let palette = Palette::random(config.max_corners, config.palette_seed);
        Self::new(config, palette)
    }

    /// Process one frame and return the frame with all trails drawn so far.
    ///
    /// The first call of a session seeds points and returns a copy of
    /// `frame`.
    ///
    /// # Errors
    /// - [`Error::EmptyFrame`] for a frame without pixels.
    /// - [`Error::ShapeMismatch`] if `frame` differs in size from the
    ///   session's first frame. The cache is left untouched.
    pub fn process_frame(&mut self, frame: &Image<u8>) -> Result<Image<u8>> {
        if frame.is_empty() {
            return Err(Error::EmptyFrame);
        }

        let Some(session) = self.session.as_mut() else {
            return Ok(self.start_session(frame));
        };

        if !session.previous_frame.same_shape(frame) {
            warn!(
                expected_w = session.previous_frame.width(),
                expected_h = session.previous_frame.height(),
                actual_w = frame.width(),
                actual_h = frame.height(),
                "frame size changed mid-session, rejecting"
            );
            return Err(Error::ShapeMismatch {
                expected: session.previous_frame.dims(),
                actual: frame.dims(),
            });
        }

        let pyramid = self.tracker.build_pyramid(frame);
        let queries: Vec<Point2f> = self.points.iter().map(|p| p.position).collect();
        let flow = self.tracker.track(&session.previous_pyramid, &pyramid, &queries);

        let mut survivors = Vec::with_capacity(self.points.len());
        for (point, result) in self.points.iter().zip(&flow) {
            if !result.status.is_tracked() {
                trace!(x = point.position.x, y = point.position.y, status = ?result.status, "point dropped");
                continue;
            }
            draw_line(
                &mut session.draw_mask,
                result.position,
                point.position,
                point.color,
                self.config.line_thickness,
            );
            survivors.push(TrackedPoint { position: result.position, color: point.color });
        }

        self.stats = FrameStats {
            seeded: 0,
            tracked: survivors.len(),
            lost: self.points.len() - survivors.len(),
            total: survivors.len(),
        };
        debug!(tracked = self.stats.tracked, lost = self.stats.lost, "frame tracked");

        session.previous_frame = frame.clone();
        session.previous_pyramid = pyramid;
        self.points = survivors;

        Ok(saturating_add(frame, &session.draw_mask))
    }

    fn start_session(&mut self, frame: &Image<u8>) -> Image<u8> {
        let corners = self.detector.detect(frame);
        self.points = corners
            .iter()
            .zip(self.palette.colors())
            .map(|(c, &color)| TrackedPoint { position: c.position, color })
            .collect();

        self.session = Some(Session {
            previous_frame: frame.clone(),
            previous_pyramid: self.tracker.build_pyramid(frame),
            draw_mask: Image::new(frame.width(), frame.height()),
        });
        self.stats = FrameStats {
            seeded: self.points.len(),
            total: self.points.len(),
            ..FrameStats::default()
        };
        debug!(
            width = frame.width(),
            height = frame.height(),
            seeded = self.points.len(),
            "tracking session started"
        );

        frame.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    /// Points alive after the last call, in seeding order.
    pub fn points(&self) -> &[TrackedPoint] {
        &self.points
    }

    /// Accumulated trails; `None` before the first frame.
    pub fn draw_mask(&self) -> Option<&Image<u8>> {
        self.session.as_ref().map(|s| &s.draw_mask)
    }

    pub fn previous_frame(&self) -> Option<&Image<u8>> {
        self.session.as_ref().map(|s| &s.previous_frame)
    }

    /// Counters from the last `process_frame` call.
    pub fn last_stats(&self) -> FrameStats {
        self.stats
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// End the session: drop the previous frame, the points and the mask.
    /// The next frame seeds a fresh session.
    pub fn reset(&mut self) {
        self.session = None;
        self.points.clear();
        self.stats = FrameStats::default();
    }
}
