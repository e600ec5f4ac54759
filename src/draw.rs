// draw.rs — Rasterization onto single-channel images.
//
// Lines are walked with Bresenham and every visited pixel stamps a filled
// disc of radius thickness / 2, which gives round caps and a stroke roughly
// `thickness` pixels wide. Everything clips at the image border.

use crate::image::Image;
use crate::point::Point2f;

/// Draw a line segment from `from` to `to` with the given stroke thickness.
///
/// Endpoints are rounded to the nearest pixel. A thickness of 0 or 1 draws
/// a one-pixel Bresenham line.
pub fn draw_line(image: &mut Image<u8>, from: Point2f, to: Point2f, color: u8, thickness: u32) {
    let (x0, y0) = from.round_i32();
    let (x1, y1) = to.round_i32();
    let radius = (thickness / 2) as i32;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        stamp_disc(image, x, y, radius, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Filled circle centred on `center`.
pub fn draw_circle(image: &mut Image<u8>, center: Point2f, radius: u32, color: u8) {
    let (cx, cy) = center.round_i32();
    stamp_disc(image, cx, cy, radius.min(i32::MAX as u32) as i32, color);
}

/// Closed outline through `points`, last point joined back to the first.
pub fn draw_polygon(image: &mut Image<u8>, points: &[Point2f], color: u8, thickness: u32) {
    for (i, &p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        draw_line(image, p, q, color, thickness);
    }
}

/// Per-sample saturating sum `a + b`, clamped to 255.
///
/// # Panics
/// Panics if the images differ in shape.
pub fn saturating_add(a: &Image<u8>, b: &Image<u8>) -> Image<u8> {
    assert!(
        a.same_shape(b),
        "saturating_add needs equal shapes ({}x{} vs {}x{})",
        a.width(),
        a.height(),
        b.width(),
        b.height()
    );
    let data = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&p, &q)| p.saturating_add(q))
        .collect();
    Image::from_vec(a.width(), a.height(), data)
}

fn stamp_disc(image: &mut Image<u8>, cx: i32, cy: i32, r: i32, color: u8) {
    // Only the part of the disc that overlaps the image is visited.
    let x_lo = cx.saturating_sub(r).max(0);
    let y_lo = cy.saturating_sub(r).max(0);
    let x_hi = cx.saturating_add(r).min(image.width() as i32 - 1);
    let y_hi = cy.saturating_add(r).min(image.height() as i32 - 1);
    let r_sq = i64::from(r) * i64::from(r);

    for y in y_lo..=y_hi {
        let dy = i64::from(y) - i64::from(cy);
        for x in x_lo..=x_hi {
            let dx = i64::from(x) - i64::from(cx);
            if dx * dx + dy * dy <= r_sq {
                image.set_clipped(x, y, color);
            }
        }
    }
}
