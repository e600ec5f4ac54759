// convert.rs — Interop with the `image` crate.
//
// Frames recorded from the sensor are stored as 8-bit grayscale files.
// These helpers move pixels between `::image::GrayImage` and `Image<u8>`;
// colour inputs are reduced to luma by the `image` crate on load.

use std::path::Path;

use ::image::{DynamicImage, GrayImage};

use crate::error::Result;
use crate::image::Image;

/// Copy an `Image<u8>` into a `GrayImage`.
pub fn to_gray_image(src: &Image<u8>) -> GrayImage {
    let mut out = GrayImage::new(src.width() as u32, src.height() as u32);
    out.copy_from_slice(src.as_slice());
    out
}

/// Take ownership of a `GrayImage`'s pixels as an `Image<u8>`.
pub fn from_gray_image(src: GrayImage) -> Image<u8> {
    let (w, h) = src.dimensions();
    Image::from_vec(w as usize, h as usize, src.into_raw())
}

/// Convert any decoded image to 8-bit grayscale.
pub fn from_dynamic(src: DynamicImage) -> Image<u8> {
    from_gray_image(src.into_luma8())
}

/// Load an image file as 8-bit grayscale.
pub fn load_gray(path: impl AsRef<Path>) -> Result<Image<u8>> {
    Ok(from_dynamic(::image::open(path)?))
}

/// Write an `Image<u8>` to disk; the format follows the file extension.
pub fn save_gray(image: &Image<u8>, path: impl AsRef<Path>) -> Result<()> {
    to_gray_image(image).save(path)?;
    Ok(())
}
