// gradient.rs — Sobel derivatives with a selectable aperture.
//
// Sobel kernels are separable into a derivative tap and a smoothing tap:
//   Ix = conv_rows(deriv) then conv_cols(smooth)
//   Iy = conv_rows(smooth) then conv_cols(deriv)
//
// Apertures 3, 5 and 7 use the usual binomial smoothing and its matching
// derivative. The corner detector runs at aperture 3; the Canny edge path
// defaults to aperture 5. Output is unnormalized; the gain grows with the
// aperture, so edge thresholds are only meaningful together with one.

use crate::convolution::convolve_separable;
use crate::image::{Image, Pixel};

const DERIV_3: [f32; 3] = [-1.0, 0.0, 1.0];
const SMOOTH_3: [f32; 3] = [1.0, 2.0, 1.0];
const DERIV_5: [f32; 5] = [-1.0, -2.0, 0.0, 2.0, 1.0];
const SMOOTH_5: [f32; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];
const DERIV_7: [f32; 7] = [-1.0, -4.0, -5.0, 0.0, 5.0, 4.0, 1.0];
const SMOOTH_7: [f32; 7] = [1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0];

/// `(derivative, smoothing)` taps for a Sobel aperture.
///
/// # Panics
/// Panics unless `aperture` is 3, 5 or 7.
pub fn sobel_kernels(aperture: usize) -> (&'static [f32], &'static [f32]) {
    match aperture {
        3 => (&DERIV_3, &SMOOTH_3),
        5 => (&DERIV_5, &SMOOTH_5),
        7 => (&DERIV_7, &SMOOTH_7),
        _ => panic!("Sobel aperture must be 3, 5 or 7 (got {aperture})"),
    }
}

/// Horizontal gradient Ix. Positive where intensity increases to the right.
pub fn sobel_x<T: Pixel>(src: &Image<T>, aperture: usize) -> Image<f32> {
    let (deriv, smooth) = sobel_kernels(aperture);
    convolve_separable(src, deriv, smooth)
}

/// Vertical gradient Iy. Positive where intensity increases downward.
pub fn sobel_y<T: Pixel>(src: &Image<T>, aperture: usize) -> Image<f32> {
    let (deriv, smooth) = sobel_kernels(aperture);
    convolve_separable(src, smooth, deriv)
}

/// Both gradients at once.
pub fn sobel_xy<T: Pixel>(src: &Image<T>, aperture: usize) -> (Image<f32>, Image<f32>) {
    (sobel_x(src, aperture), sobel_y(src, aperture))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_step(w: usize, h: usize, at: usize, hi: u8) -> Image<u8> {
        let mut img = Image::<u8>::new(w, h);
        for y in 0..h {
            for x in at..w {
                img.set(x, y, hi);
            }
        }
        img
    }

    #[test]
    fn test_step_response_aperture_3() {
        let img = vertical_step(20, 10, 10, 100);
        let ix = sobel_x(&img, 3);
        // [-1, 0, 1] across the step gives 100, smoothing gain is 4.
        assert!((ix.get(10, 5) - 400.0).abs() < 1e-3);
        assert!(ix.get(5, 5).abs() < 1e-6);
    }

    #[test]
    fn test_step_response_aperture_5() {
        let img = vertical_step(20, 10, 10, 100);
        let ix = sobel_x(&img, 5);
        // Taps at x=10,11,12 see 100: 0 + 2 + 1 = 3 → 300, smoothing gain 16.
        assert!((ix.get(10, 5) - 4800.0).abs() < 1e-2);
    }

    #[test]
    fn test_vertical_gradient_sign() {
        let mut img = Image::<u8>::new(10, 20);
        for y in 10..20 {
            for x in 0..10 {
                img.set(x, y, 100);
            }
        }
        let iy = sobel_y(&img, 3);
        assert!(iy.get(5, 10) > 50.0);
        assert!(iy.get(5, 3).abs() < 1e-6);
    }

    #[test]
    fn test_constant_image_zero_gradient() {
        let img = Image::filled(10, 10, 128u8);
        for aperture in [3, 5, 7] {
            let (ix, iy) = sobel_xy(&img, aperture);
            assert!(ix.pixels().all(|(_, _, v)| v.abs() < 1e-3));
            assert!(iy.pixels().all(|(_, _, v)| v.abs() < 1e-3));
        }
    }

    #[test]
    #[should_panic(expected = "aperture")]
    fn test_bad_aperture() {
        sobel_kernels(4);
    }
}
