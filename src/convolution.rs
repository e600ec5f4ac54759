// convolution.rs — Separable 1D convolution for Image<T>.
//
// A 2D filter K = k_col * k_row^T is applied as a horizontal pass followed
// by a vertical pass, O(2k) instead of O(k²) per pixel. Gaussian pyramid
// blur, Sobel derivatives and the corner-response box window all go through
// here.
//
// BORDER HANDLING: clamp (replicate edge pixels). Out-of-range taps read the
// nearest edge pixel. Interior pixels, where the kernel never leaves the
// image, skip the clamp and use unchecked access.

use crate::image::{Image, Pixel};

fn check_kernel(kernel: &[f32]) {
    assert!(!kernel.is_empty(), "kernel must not be empty");
    assert!(kernel.len() % 2 == 1, "kernel length must be odd (got {})", kernel.len());
}

/// Clamped source index for tap `ki` around output position `pos`.
#[inline]
fn clamped_tap(pos: usize, ki: usize, half: usize, len: usize) -> usize {
    let s = pos as isize + ki as isize - half as isize;
    s.clamp(0, len as isize - 1) as usize
}

/// Convolve each row of `src` with a centered 1D kernel (horizontal pass).
pub fn convolve_rows<T: Pixel>(src: &Image<T>, kernel: &[f32]) -> Image<f32> {
    check_kernel(kernel);

    let (w, h) = src.dims();
    let half = kernel.len() / 2;
    let mut dst = Image::<f32>::new(w, h);

    for y in 0..h {
        for x in 0..w {
            let interior = x >= half && x + half < w;
            let mut acc = 0.0f32;
            if interior {
                for (ki, &kv) in kernel.iter().enumerate() {
                    // SAFETY: x - half >= 0 and x + half < w.
                    acc += unsafe { src.get_unchecked(x + ki - half, y) }.to_f32() * kv;
                }
            } else {
                for (ki, &kv) in kernel.iter().enumerate() {
                    acc += src.get(clamped_tap(x, ki, half, w), y).to_f32() * kv;
                }
            }
            // SAFETY: x < w, y < h.
            unsafe { dst.set_unchecked(x, y, acc) };
        }
    }
    dst
}

/// Convolve each column of an f32 image with a centered 1D kernel
/// (vertical pass).
pub fn convolve_cols(src: &Image<f32>, kernel: &[f32]) -> Image<f32> {
    check_kernel(kernel);

    let (w, h) = src.dims();
    let half = kernel.len() / 2;
    let mut dst = Image::<f32>::new(w, h);

    for y in 0..h {
        let interior = y >= half && y + half < h;
        for x in 0..w {
            let mut acc = 0.0f32;
            if interior {
                for (ki, &kv) in kernel.iter().enumerate() {
                    // SAFETY: y - half >= 0 and y + half < h.
                    acc += unsafe { src.get_unchecked(x, y + ki - half) } * kv;
                }
            } else {
                for (ki, &kv) in kernel.iter().enumerate() {
                    acc += src.get(x, clamped_tap(y, ki, half, h)) * kv;
                }
            }
            unsafe { dst.set_unchecked(x, y, acc) };
        }
    }
    dst
}

/// Full separable 2D convolution: horizontal pass then vertical pass.
///
/// Always returns `Image<f32>`; accumulation happens in f32 whatever the
/// source pixel type.
///
/// # Panics
/// Panics if either kernel is empty or has even length.
pub fn convolve_separable<T: Pixel>(
    src: &Image<T>,
    kernel_row: &[f32],
    kernel_col: &[f32],
) -> Image<f32> {
    let intermediate = convolve_rows(src, kernel_row);
    convolve_cols(&intermediate, kernel_col)
}

/// 1D Gaussian kernel of length `2 * half_size + 1`, normalized to sum 1.
///
/// # Examples
/// ```
/// let k = rm_vision::convolution::gaussian_kernel_1d(2, 1.0);
/// assert_eq!(k.len(), 5);
/// assert!((k.iter().sum::<f32>() - 1.0).abs() < 1e-6);
/// ```
pub fn gaussian_kernel_1d(half_size: usize, sigma: f32) -> Vec<f32> {
    assert!(sigma > 0.0, "sigma must be positive");
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (0..=2 * half_size)
        .map(|i| {
            let x = i as f32 - half_size as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= sum);
    kernel
}

/// Normalized box kernel of odd length `size` (every tap is `1 / size`).
///
/// # Panics
/// Panics if `size` is zero or even.
pub fn box_kernel_1d(size: usize) -> Vec<f32> {
    assert!(size % 2 == 1, "box kernel size must be odd (got {size})");
    vec![1.0 / size as f32; size]
}
