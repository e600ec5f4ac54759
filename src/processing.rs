// processing.rs — Per-path entry points taking a sensor frame.
//
// Each entry point acquires the frame's VLC buffer (the guard is dropped
// before any processing starts), then runs one processing path on the
// packed copy. Acquisition failures come back as errors instead of empty
// output.

use tracing::debug;

use crate::canny::{detect_edges, EdgeConfig};
use crate::error::Result;
use crate::image::Image;
use crate::marker::{dictionary_6x6_250, draw_detected_markers, Marker, MarkerDetector};
use crate::sensor::{acquire_image, SensorFrame};
use crate::tracking::FrameTrackingCache;

/// Intensity used to outline detected markers.
pub const MARKER_COLOR: u8 = 255;

/// Output of the marker path.
#[derive(Debug, Clone)]
pub struct MarkerFrame {
    /// The frame, with outlines when markers were found.
    pub image: Image<u8>,
    pub markers: Vec<Marker>,
}

/// Track points into this frame and return it with the accumulated trails.
pub fn process_with_optical_flow<F: SensorFrame>(
    frame: &F,
    cache: &mut FrameTrackingCache,
) -> Result<Image<u8>> {
    let image = acquire_image(frame)?;
    cache.process_frame(&image)
}

/// Binary Canny edge map of the frame.
pub fn process_with_canny<F: SensorFrame>(frame: &F, config: &EdgeConfig) -> Result<Image<u8>> {
    config.validate()?;
    let image = acquire_image(frame)?;
    Ok(detect_edges(&image, config))
}

/// Detect 6×6 dictionary markers and outline them on the frame.
pub fn process_with_markers<F: SensorFrame, D: MarkerDetector>(
    frame: &F,
    detector: &D,
) -> Result<MarkerFrame> {
    let mut image = acquire_image(frame)?;
    let markers = detector.detect(&image, dictionary_6x6_250());
    if !markers.is_empty() {
        debug!(count = markers.len(), "markers detected");
        draw_detected_markers(&mut image, &markers, MARKER_COLOR);
    }
    Ok(MarkerFrame { image, markers })
}
