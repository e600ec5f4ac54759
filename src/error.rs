// error.rs — Crate-wide error type.
//
// Recoverable failures at the API surface (sensor adaptation, session shape
// changes, configuration, file I/O) are reported through `Error`. Violated
// preconditions inside the numeric kernels (even kernel length, zero pyramid
// levels) still panic, the same way `Image::get` panics on an out-of-bounds
// pixel.

use thiserror::Error;

/// Errors produced by frame acquisition and the processing paths.
#[derive(Error, Debug)]
pub enum Error {
    /// The sensor frame could not be viewed as a visible-light (VLC) frame.
    #[error("sensor frame does not expose a VLC buffer")]
    UnsupportedFrame,

    /// The sensor buffer is shorter than its advertised resolution.
    #[error("sensor buffer holds {actual} bytes, resolution needs {expected}")]
    BufferTooSmall { expected: usize, actual: usize },

    /// A frame with zero width or height.
    #[error("frame has no pixels")]
    EmptyFrame,

    /// A frame whose dimensions differ from the ones the session started with.
    #[error("frame is {}x{}, session expects {}x{}", actual.0, actual.1, expected.0, expected.1)]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    /// The colour palette cannot cover every point that may be seeded.
    #[error("palette has {palette} colours but up to {max_corners} points can be seeded")]
    PaletteTooSmall { palette: usize, max_corners: usize },

    /// A configuration value outside its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
