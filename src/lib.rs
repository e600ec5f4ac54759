// rm-vision: frame processing for head-mounted research-mode VLC sensors.
//
// Three paths run on grayscale sensor frames: sparse optical-flow trails
// (`tracking`), Canny edges (`canny`) and marker overlays (`marker`). The
// vision primitives under them are CPU implementations on `Image<T>`.

pub mod error;
pub mod image;
pub mod point;
pub mod convert;
pub mod convolution;
pub mod gradient;
pub mod pyramid;
pub mod occupancy;
pub mod corners;
pub mod klt;
pub mod draw;
pub mod canny;
pub mod marker;
pub mod sensor;
pub mod tracking;
pub mod processing;
pub mod config;

pub use error::{Error, Result};
