// tests/test_image.rs — Integration tests for Image<T>, drawing and file interop.

use rm_vision::convert::{from_gray_image, load_gray, save_gray, to_gray_image};
use rm_vision::draw::{draw_line, saturating_add};
use rm_vision::image::{interpolate_bilinear, Image};
use rm_vision::point::Point2f;

// ===== Construction and access =====

#[test]
fn image_set_get_consistency() {
    let mut img: Image<u8> = Image::new(8, 6);
    for y in 0..6 {
        for x in 0..8 {
            img.set(x, y, (x * 10 + y) as u8);
        }
    }
    for y in 0..6 {
        for x in 0..8 {
            assert_eq!(img.get(x, y), (x * 10 + y) as u8);
            assert_eq!(img[(x, y)], (x * 10 + y) as u8);
        }
    }
}

#[test]
fn strided_buffer_matches_packed() {
    // 640-wide rows padded to 704 bytes, as some sensors deliver them.
    let (w, h, stride) = (640, 4, 704);
    let mut buffer = vec![0xAAu8; stride * h];
    for y in 0..h {
        for x in 0..w {
            buffer[y * stride + x] = ((x + y) % 200) as u8;
        }
    }
    let img = Image::from_strided(w, h, stride, &buffer);
    assert_eq!(img.dims(), (w, h));
    for (x, y, v) in img.pixels() {
        assert_eq!(v, ((x + y) % 200) as u8);
    }
}

#[test]
fn clone_is_independent() {
    let mut img: Image<u8> = Image::new(4, 4);
    img.set(0, 0, 42);
    let img2 = img.clone();
    img.set(0, 0, 99);
    assert_eq!(img2.get(0, 0), 42);
    assert_eq!(img.get(0, 0), 99);
}

#[test]
fn empty_dimension_image() {
    let img: Image<u8> = Image::new(0, 0);
    assert!(img.is_empty());
    assert_eq!(img.pixels().count(), 0);
}

// ===== Bilinear interpolation =====

#[test]
fn bilinear_linear_gradient() {
    // Bilinear interpolation is exact on a linear ramp.
    let mut img: Image<f32> = Image::new(10, 10);
    for y in 0..10 {
        for x in 0..10 {
            img.set(x, y, x as f32 * 3.0 + y as f32 * 7.0);
        }
    }
    for (px, py) in [(0.5, 0.5), (2.3, 4.7), (7.9, 1.1), (0.0, 8.0)] {
        let expected = px * 3.0 + py * 7.0;
        let actual = interpolate_bilinear(&img, px, py);
        assert!((actual - expected).abs() < 1e-4, "bilinear({px}, {py}): {expected} vs {actual}");
    }
}

// ===== Drawing =====

#[test]
fn overlay_of_drawn_trail() {
    let frame = Image::filled(20, 20, 100u8);
    let mut mask = Image::new(20, 20);
    draw_line(&mut mask, Point2f::new(2.0, 10.0), Point2f::new(17.0, 10.0), 200, 2);

    let out = saturating_add(&frame, &mask);
    assert_eq!(out.get(10, 10), 255);
    assert_eq!(out.get(10, 9), 255);
    assert_eq!(out.get(10, 5), 100);
}

// ===== image crate interop =====

#[test]
fn gray_image_conversion_keeps_pixels() {
    let img = Image::from_vec(5, 3, (0..15u8).map(|v| v * 17).collect());
    assert_eq!(from_gray_image(to_gray_image(&img)), img);
}

#[test]
fn png_round_trip_on_disk() {
    let dir = std::env::temp_dir().join(format!("rm_vision_test_image_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("gradient.png");

    let mut img: Image<u8> = Image::new(32, 16);
    for y in 0..16 {
        for x in 0..32 {
            img.set(x, y, (x * 8) as u8);
        }
    }
    save_gray(&img, &path).unwrap();
    assert_eq!(load_gray(&path).unwrap(), img);

    std::fs::remove_dir_all(&dir).unwrap();
}
