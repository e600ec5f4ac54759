// tests/test_pyramid.rs — Integration tests for convolution, gradients and pyramid.

use rm_vision::convolution::{convolve_separable, gaussian_kernel_1d};
use rm_vision::gradient::{sobel_x, sobel_y};
use rm_vision::image::Image;
use rm_vision::pyramid::Pyramid;

// ===== Convolution =====

#[test]
fn separable_gaussian_preserves_mean() {
    // The kernel sums to 1; clamp borders only nudge the mean.
    let mut img: Image<u8> = Image::new(32, 32);
    for y in 0..32 {
        for x in 0..32 {
            img.set(x, y, ((x * 7 + y * 13) % 256) as u8);
        }
    }

    let n = (img.width() * img.height()) as f32;
    let mean_before: f32 = img.pixels().map(|(_, _, v)| v as f32).sum::<f32>() / n;

    let k = gaussian_kernel_1d(2, 1.0);
    let blurred = convolve_separable(&img, &k, &k);
    let mean_after: f32 = blurred.pixels().map(|(_, _, v)| v).sum::<f32>() / n;

    assert!(
        (mean_before - mean_after).abs() < 2.0,
        "mean shifted too much: {mean_before} → {mean_after}"
    );
}

#[test]
fn horizontal_ramp_survives_vertical_blur() {
    let mut img = Image::<f32>::new(20, 20);
    for y in 0..20 {
        for x in 0..20 {
            img.set(x, y, x as f32 * 10.0);
        }
    }

    let identity = [0.0, 0.0, 1.0, 0.0, 0.0];
    let gauss = gaussian_kernel_1d(2, 1.0);
    let out = convolve_separable(&img, &identity, &gauss);

    for y in 3..17 {
        for x in 3..17 {
            assert!((out.get(x, y) - img.get(x, y)).abs() < 1e-3, "ramp damaged at ({x},{y})");
        }
    }
}

// ===== Sobel =====

#[test]
fn sobel_on_linear_ramp() {
    // I = 2x + 3y. Aperture-3 gain is 2 (derivative span) × 4 (smoothing).
    let mut img = Image::<f32>::new(16, 16);
    for y in 0..16 {
        for x in 0..16 {
            img.set(x, y, 2.0 * x as f32 + 3.0 * y as f32);
        }
    }
    let ix = sobel_x(&img, 3);
    let iy = sobel_y(&img, 3);
    assert!((ix.get(8, 8) - 16.0).abs() < 1e-3);
    assert!((iy.get(8, 8) - 24.0).abs() < 1e-3);
}

// ===== Pyramid =====

#[test]
fn pyramid_from_vlc_size() {
    // Research-mode VLC cameras deliver 640×480.
    let img: Image<u8> = Image::new(640, 480);
    let pyr = Pyramid::build(&img, 3, 1.0);

    assert_eq!(pyr.num_levels(), 3);
    assert_eq!(pyr.level(0).dims(), (640, 480));
    assert_eq!(pyr.level(1).dims(), (320, 240));
    assert_eq!(pyr.level(2).dims(), (160, 120));
}

#[test]
fn pyramid_edge_gets_smoother() {
    let mut img: Image<u8> = Image::new(128, 64);
    for y in 0..64 {
        for x in 64..128 {
            img.set(x, y, 255);
        }
    }

    let pyr = Pyramid::build(&img, 4, 1.0);

    let max_adjacent_diff = |img: &Image<f32>| -> f32 {
        let mid_y = img.height() / 2;
        (1..img.width())
            .map(|x| (img.get(x, mid_y) - img.get(x - 1, mid_y)).abs())
            .fold(0.0, f32::max)
    };

    let mut prev_diff = max_adjacent_diff(pyr.level(0));
    for lvl in 1..pyr.num_levels() {
        let diff = max_adjacent_diff(pyr.level(lvl));
        assert!(
            diff <= prev_diff + 1.0,
            "edge got sharper from level {} to {lvl}: {prev_diff} → {diff}",
            lvl - 1
        );
        prev_diff = diff;
    }
}

#[test]
fn usable_levels_respects_window() {
    assert_eq!(Pyramid::usable_levels(640, 480, 3, 15), 3);
    assert_eq!(Pyramid::usable_levels(100, 100, 3, 15), 3);
    assert_eq!(Pyramid::usable_levels(50, 50, 3, 15), 2);
    assert_eq!(Pyramid::usable_levels(10, 200, 3, 15), 1);
}
