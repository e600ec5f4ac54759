// image.rs — Runtime-sized, row-major image container generic over pixel type.
//
// Sensor frames, draw masks, edge maps and pyramid levels all share this one
// container. Frames arrive as packed 8-bit buffers; intermediate results
// (gradients, pyramid levels, corner responses) are stored as f32.
//
// Sensor buffers may carry row padding. `from_strided` copies such a buffer
// into a packed image so every downstream routine can assume
// `stride == width`.

use std::fmt;

// ---------------------------------------------------------------------------
// Pixel Trait
// ---------------------------------------------------------------------------

/// Trait for types that can serve as pixel values in an Image.
///
/// `to_f32`/`from_f32` are raw conversions (u8 42 → 42.0), not normalized,
/// because thresholds throughout the crate are expressed in raw intensity
/// units.
pub trait Pixel: Copy + Default + Send + Sync + PartialOrd + 'static {
    fn to_f32(self) -> f32;

    /// Construct a pixel from an f32 value, clamping and rounding as needed.
    fn from_f32(v: f32) -> Self;
}

impl Pixel for u8 {
    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v.clamp(0.0, 255.0).round() as u8
    }
}

impl Pixel for f32 {
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        v
    }
}

// ---------------------------------------------------------------------------
// Image<T>
// ---------------------------------------------------------------------------

/// A 2D image with runtime dimensions, generic over pixel type `T`.
///
/// Pixels are stored packed in row-major order: pixel `(x, y)` lives at
/// index `y * width + x`.
#[derive(Clone, PartialEq)]
pub struct Image<T: Pixel> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T: Pixel> Image<T> {
    /// Create a zero-initialized image.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }

    /// Create an image with every pixel set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Image {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Create an image from a packed pixel vector.
    ///
    /// # Panics
    /// Panics if `data.len() != width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            width * height,
            "data length ({}) must equal width * height ({})",
            data.len(),
            width * height,
        );
        Image { data, width, height }
    }

    /// Copy a buffer whose rows are `stride` elements apart into a packed image.
    ///
    /// The last row only needs `width` elements, so a buffer of
    /// `(height - 1) * stride + width` elements is enough.
    ///
    /// # Panics
    /// Panics if `stride < width` or the buffer is too short.
    pub fn from_strided(width: usize, height: usize, stride: usize, buffer: &[T]) -> Self {
        assert!(stride >= width, "stride ({stride}) must be >= width ({width})");
        let needed = strided_len(width, height, stride);
        assert!(
            buffer.len() >= needed,
            "buffer length ({}) too short for {width}x{height} at stride {stride} (needs {needed})",
            buffer.len(),
        );

        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let start = y * stride;
            data.extend_from_slice(&buffer[start..start + width]);
        }
        Image { data, width, height }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True if both images have the same width and height.
    #[inline]
    pub fn same_shape<U: Pixel>(&self, other: &Image<U>) -> bool {
        self.width == other.width() && self.height == other.height()
    }

    /// Get the pixel value at (x, y). x is column, y is row.
    ///
    /// # Panics
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.bounds_check(x, y);
        self.data[y * self.width + x]
    }

    /// Get pixel value without bounds checking.
    ///
    /// # Safety
    /// Caller must guarantee x < width and y < height.
    #[inline(always)]
    pub unsafe fn get_unchecked(&self, x: usize, y: usize) -> T {
        debug_assert!(
            x < self.width && y < self.height,
            "get_unchecked({x},{y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        *self.data.get_unchecked(y * self.width + x)
    }

    /// Set pixel value without bounds checking.
    ///
    /// # Safety
    /// Caller must guarantee x < width and y < height.
    #[inline(always)]
    pub unsafe fn set_unchecked(&mut self, x: usize, y: usize, value: T) {
        debug_assert!(x < self.width && y < self.height);
        *self.data.get_unchecked_mut(y * self.width + x) = value;
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.bounds_check(x, y);
        let idx = y * self.width + x;
        self.data[idx] = value;
    }

    /// Set the pixel at signed coordinates, ignoring positions outside the image.
    ///
    /// Drawing routines rasterize in `i32` and rely on this for clipping.
    #[inline]
    pub fn set_clipped(&mut self, x: i32, y: i32, value: T) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            let idx = y as usize * self.width + x as usize;
            self.data[idx] = value;
        }
    }

    /// Iterate over all pixels as `(x, y, value)` tuples, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let w = self.width;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i % w, i / w, v))
    }

    /// Apply `f` to every pixel, producing a new image of the same shape.
    pub fn map<U: Pixel>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }

    /// The packed pixel buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image, returning its packed pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn bounds_check(&self, x: usize, y: usize) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for image {}×{}",
            self.width,
            self.height,
        );
    }
}

/// Number of buffer elements a `width`×`height` image occupies at `stride`.
pub fn strided_len(width: usize, height: usize, stride: usize) -> usize {
    if height == 0 {
        0
    } else {
        (height - 1) * stride + width
    }
}

// Small images print their top-left corner; handy in assertion failures.
impl<T: Pixel + fmt::Debug> fmt::Debug for Image<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Image<{}> {{ {}×{} }}",
            std::any::type_name::<T>(),
            self.width,
            self.height,
        )?;
        for y in 0..self.height.min(8) {
            write!(f, "  row {y}: [")?;
            for x in 0..self.width.min(16) {
                if x > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.get(x, y))?;
            }
            if self.width > 16 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.height > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

impl<T: Pixel> std::ops::Index<(usize, usize)> for Image<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        self.bounds_check(x, y);
        &self.data[y * self.width + x]
    }
}

impl<T: Pixel> std::ops::IndexMut<(usize, usize)> for Image<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        self.bounds_check(x, y);
        let idx = y * self.width + x;
        &mut self.data[idx]
    }
}

// ---------------------------------------------------------------------------
// Bilinear interpolation
// ---------------------------------------------------------------------------

/// Bilinear interpolation for sub-pixel access on an f32 image.
///
/// Coordinates outside the image are clamped to the border, so samples near
/// the edge replicate the edge pixels. The LK tracker relies on this: a
/// window that slides past the border sees flat data and its Hessian
/// degenerates instead of reading out of bounds.
///
/// # Panics
/// Panics if the image is empty.
pub fn interpolate_bilinear(img: &Image<f32>, x: f32, y: f32) -> f32 {
    assert!(!img.is_empty(), "cannot interpolate on an empty image");

    let max_x = (img.width() - 1) as f32;
    let max_y = (img.height() - 1) as f32;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    // SAFETY: x and y were clamped into [0, width-1] × [0, height-1].
    unsafe { interpolate_bilinear_unchecked(img, x, y) }
}

/// Bilinear interpolation without the clamp.
///
/// # Safety
/// Caller must guarantee the image is non-empty, x is in [0, width-1] and
/// y is in [0, height-1].
#[inline(always)]
pub unsafe fn interpolate_bilinear_unchecked(img: &Image<f32>, x: f32, y: f32) -> f32 {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let x1 = (x0 + 1).min(img.width() - 1);
    let y1 = (y0 + 1).min(img.height() - 1);

    let p00 = img.get_unchecked(x0, y0);
    let p10 = img.get_unchecked(x1, y0);
    let p01 = img.get_unchecked(x0, y1);
    let p11 = img.get_unchecked(x1, y1);

    (1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11
}
