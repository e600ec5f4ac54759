// sensor.rs — Adapter between research-mode sensor frames and `Image<u8>`.
//
// A sensor frame advertises its resolution and may or may not expose a
// visible-light (VLC) view of its pixel buffer. Querying the view returns a
// guard; whatever the sensor needs to release happens in the guard's `Drop`,
// so every exit path of `acquire_image` (success, short buffer, early
// return) gives the interface back.

use std::path::Path;

use tracing::{trace, warn};

use crate::convert::load_gray;
use crate::error::{Error, Result};
use crate::image::{strided_len, Image};

/// Frame geometry reported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
    /// Bytes between the starts of consecutive rows. Values below `width`
    /// are treated as a packed buffer.
    pub stride: usize,
}

impl Resolution {
    /// Packed resolution (`stride == width`).
    pub fn new(width: usize, height: usize) -> Self {
        Resolution { width, height, stride: width }
    }

    pub fn with_stride(width: usize, height: usize, stride: usize) -> Self {
        Resolution { width, height, stride }
    }

    /// Bytes a buffer must hold for this resolution.
    pub fn buffer_len(&self) -> usize {
        strided_len(self.width, self.height, self.stride.max(self.width))
    }
}

/// Scoped view of a sensor's 8-bit VLC pixel buffer.
///
/// Implementors release the underlying interface in `Drop`.
pub trait VlcFrame {
    fn buffer(&self) -> &[u8];
}

/// A frame delivered by a head-mounted sensor stream.
pub trait SensorFrame {
    type Vlc<'a>: VlcFrame
    where
        Self: 'a;

    fn resolution(&self) -> Resolution;

    /// The VLC view of this frame, or `None` if the frame comes from a
    /// sensor of another kind (depth, IMU).
    fn query_vlc(&self) -> Option<Self::Vlc<'_>>;
}

/// Copy a sensor frame's VLC buffer into a packed grayscale image.
///
/// # Errors
/// - [`Error::EmptyFrame`] if the resolution has no pixels.
/// - [`Error::UnsupportedFrame`] if the frame has no VLC view.
/// - [`Error::BufferTooSmall`] if the buffer is shorter than the resolution
///   requires.
pub fn acquire_image<F: SensorFrame>(frame: &F) -> Result<Image<u8>> {
    let res = frame.resolution();
    if res.width == 0 || res.height == 0 {
        return Err(Error::EmptyFrame);
    }

    let vlc = frame.query_vlc().ok_or_else(|| {
        warn!("sensor frame has no VLC view, dropping it");
        Error::UnsupportedFrame
    })?;

    let buffer = vlc.buffer();
    let expected = res.buffer_len();
    if buffer.len() < expected {
        return Err(Error::BufferTooSmall { expected, actual: buffer.len() });
    }

    trace!(width = res.width, height = res.height, stride = res.stride, "acquired VLC frame");
    Ok(Image::from_strided(res.width, res.height, res.stride.max(res.width), buffer))
}

/// In-memory sensor frame holding an owned grayscale image.
///
/// Used to replay recorded frames through the same entry points a live
/// sensor goes through.
#[derive(Debug, Clone)]
pub struct GrayFrame {
    image: Image<u8>,
}

impl GrayFrame {
    pub fn new(image: Image<u8>) -> Self {
        GrayFrame { image }
    }

    /// Load an image file and convert it to 8-bit grayscale.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(GrayFrame::new(load_gray(path)?))
    }

    pub fn image(&self) -> &Image<u8> {
        &self.image
    }
}

/// Borrowed VLC view of a [`GrayFrame`].
pub struct GrayVlc<'a> {
    data: &'a [u8],
}

impl VlcFrame for GrayVlc<'_> {
    fn buffer(&self) -> &[u8] {
        self.data
    }
}

impl SensorFrame for GrayFrame {
    type Vlc<'a> = GrayVlc<'a>;

    fn resolution(&self) -> Resolution {
        Resolution::new(self.image.width(), self.image.height())
    }

    fn query_vlc(&self) -> Option<GrayVlc<'_>> {
        Some(GrayVlc { data: self.image.as_slice() })
    }
}
