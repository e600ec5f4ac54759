// marker.rs — Square fiducial marker types and overlay drawing.
//
// The processing path looks markers up in a predefined dictionary and draws
// the detections onto the frame. Decoding itself sits behind
// `MarkerDetector`; the crate ships `NoMarkers`, which reports nothing, so
// the marker path passes frames through until a real decoder is plugged in.

use std::sync::LazyLock;

use crate::draw::{draw_circle, draw_polygon};
use crate::image::Image;
use crate::point::Point2f;

/// Immutable description of a square marker family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerDictionary {
    pub name: &'static str,
    /// Data bits per side of the marker grid.
    pub marker_bits: usize,
    /// Number of distinct marker ids.
    pub size: usize,
    /// Width of the black border, in cells.
    pub border_bits: usize,
}

impl MarkerDictionary {
    /// Cells per side including the border.
    pub fn cells_per_side(&self) -> usize {
        self.marker_bits + 2 * self.border_bits
    }

    pub fn contains(&self, id: u32) -> bool {
        (id as usize) < self.size
    }
}

static DICT_6X6_250: LazyLock<MarkerDictionary> = LazyLock::new(|| MarkerDictionary {
    name: "6x6_250",
    marker_bits: 6,
    size: 250,
    border_bits: 1,
});

/// The 6×6-bit, 250-id dictionary, shared process-wide.
pub fn dictionary_6x6_250() -> &'static MarkerDictionary {
    &DICT_6X6_250
}

/// One detected marker: its id and image corners, clockwise from the
/// top-left corner of the marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: u32,
    pub corners: [Point2f; 4],
}

/// Finds markers of a dictionary in a grayscale frame.
pub trait MarkerDetector {
    fn detect(&self, image: &Image<u8>, dictionary: &MarkerDictionary) -> Vec<Marker>;
}

/// Detector that never reports a marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMarkers;

impl MarkerDetector for NoMarkers {
    fn detect(&self, _image: &Image<u8>, _dictionary: &MarkerDictionary) -> Vec<Marker> {
        Vec::new()
    }
}

/// Outline every marker and dot its first corner so orientation is visible.
pub fn draw_detected_markers(image: &mut Image<u8>, markers: &[Marker], color: u8) {
    for marker in markers {
        draw_polygon(image, &marker.corners, color, 1);
        draw_circle(image, marker.corners[0], 2, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_is_shared() {
        let a = dictionary_6x6_250();
        let b = dictionary_6x6_250();
        assert!(std::ptr::eq(a, b));
        assert_eq!(a.cells_per_side(), 8);
        assert!(a.contains(249));
        assert!(!a.contains(250));
    }

    #[test]
    fn test_no_markers_detects_nothing() {
        let img = Image::filled(20, 20, 255u8);
        assert!(NoMarkers.detect(&img, dictionary_6x6_250()).is_empty());
    }

    #[test]
    fn test_draw_outline_and_corner() {
        let mut img = Image::new(30, 30);
        let marker = Marker {
            id: 3,
            corners: [
                Point2f::new(5.0, 5.0),
                Point2f::new(20.0, 5.0),
                Point2f::new(20.0, 20.0),
                Point2f::new(5.0, 20.0),
            ],
        };
        draw_detected_markers(&mut img, &[marker], 200);
        assert_eq!(img.get(12, 5), 200);
        assert_eq!(img.get(5, 12), 200);
        assert_eq!(img.get(12, 12), 0);
        // Corner dot of radius 2 only around the first corner.
        assert_eq!(img.get(7, 5), 200);
        assert_eq!(img.get(5, 7), 200);
        assert_eq!(img.get(22, 20), 0);
    }
}
