// point.rs — Sub-pixel 2D image coordinates.

use serde::{Deserialize, Serialize};

/// A point in image coordinates (x = column, y = row), sub-pixel precision.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2f {
    pub x: f32,
    pub y: f32,
}

impl Point2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Point2f { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_sq(self, other: Point2f) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Scale both coordinates, e.g. to move between pyramid levels.
    #[inline]
    pub fn scaled(self, s: f32) -> Point2f {
        Point2f::new(self.x * s, self.y * s)
    }

    /// Nearest integer pixel, as signed coordinates for rasterization.
    #[inline]
    pub fn round_i32(self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    /// True if the point lies inside a `width`×`height` image.
    #[inline]
    pub fn inside(self, width: usize, height: usize) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.x < width as f32 && self.y < height as f32
    }
}

impl std::ops::Add for Point2f {
    type Output = Point2f;

    fn add(self, rhs: Point2f) -> Point2f {
        Point2f::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point2f {
    type Output = Point2f;

    fn sub(self, rhs: Point2f) -> Point2f {
        Point2f::new(self.x - rhs.x, self.y - rhs.y)
    }
}
