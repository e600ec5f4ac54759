// tests/test_canny.rs — Integration tests for Canny edge detection.

use rm_vision::canny::{detect_edges, EdgeConfig};
use rm_vision::image::Image;

fn filled_square(size: usize, lo: u8, hi: u8) -> Image<u8> {
    let mut img = Image::filled(size, size, lo);
    for y in size / 4..3 * size / 4 {
        for x in size / 4..3 * size / 4 {
            img.set(x, y, hi);
        }
    }
    img
}

#[test]
fn flat_frame_has_no_edges() {
    for v in [0u8, 128, 255] {
        let edges = detect_edges(&Image::filled(64, 48, v), &EdgeConfig::default());
        assert!(edges.as_slice().iter().all(|&e| e == 0), "value {v}");
    }
}

#[test]
fn square_outline_is_closed_and_thin() {
    let img = filled_square(64, 20, 220);
    let edges = detect_edges(&img, &EdgeConfig::default());

    // Every row crossing the square has exactly two edge pixels away from
    // the corners, one on each side.
    for y in 20..44 {
        let cols: Vec<usize> = (0..64).filter(|&x| edges.get(x, y) == 255).collect();
        assert_eq!(cols.len(), 2, "row {y}: {cols:?}");
        assert!(cols[0].abs_diff(15) <= 1 && cols[1].abs_diff(48) <= 1, "row {y}: {cols:?}");
    }
    // Same along columns.
    for x in 20..44 {
        let rows: Vec<usize> = (0..64).filter(|&y| edges.get(x, y) == 255).collect();
        assert_eq!(rows.len(), 2, "column {x}: {rows:?}");
    }
    assert_eq!(edges.get(32, 32), 0);
}

#[test]
fn low_contrast_below_default_thresholds() {
    // A step of 10 gives an aperture-5 magnitude of 480 at most: above the
    // low threshold but never reaching the high one.
    let img = filled_square(64, 100, 110);
    let edges = detect_edges(&img, &EdgeConfig::default());
    assert!(edges.as_slice().iter().all(|&e| e == 0));
}

#[test]
fn smaller_aperture_needs_lower_thresholds() {
    let img = filled_square(64, 20, 170);
    let ap3 = EdgeConfig { aperture: 3, ..EdgeConfig::default() };
    // Aperture-3 magnitude of a 150 step is 600 along the sides and 900 at
    // the corners: below the default high threshold everywhere.
    assert!(detect_edges(&img, &ap3).as_slice().iter().all(|&e| e == 0));

    let tuned = EdgeConfig { low_threshold: 100.0, high_threshold: 300.0, ..ap3 };
    assert!(detect_edges(&img, &tuned).as_slice().iter().any(|&e| e == 255));
}
