//! Conversion of real or complex intermediate grids back into 8-bit intensity images.
//!
//! This is the single place where floating point results re-enter the discrete
//! intensity domain. The real part of each cell is clamped to `[0, 255]` and
//! truncated toward zero. A value within [`INTEGER_SNAP_TOLERANCE`] of an
//! integer is first snapped to it, so round-off from an exact transform
//! round-trip (`127.99999999999997`) still lands on `128`. NaN maps to 0.

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

/// Quantized single-channel image with intensities in `[0, 255]`
pub type IntensityImage = Array2<u8>;

/// Largest distance from an integer that is treated as floating point round-off
pub const INTEGER_SNAP_TOLERANCE: f64 = 1e-6;

/// Lowest representable intensity
pub const MIN_INTENSITY: f64 = 0.0;

/// Highest representable intensity
pub const MAX_INTENSITY: f64 = 255.0;

/// Grid element that can be quantized to an intensity.
pub trait Intensity: Copy {
    /// Real-valued intensity before clamping
    fn intensity(self) -> f64;
}

impl Intensity for f64 {
    fn intensity(self) -> f64 {
        self
    }
}

impl Intensity for Complex64 {
    fn intensity(self) -> f64 {
        self.re
    }
}

/// Clamp and truncate one value.
pub fn quantize(value: f64) -> u8 {
    let nearest = value.round();
    let snapped = if (value - nearest).abs() < INTEGER_SNAP_TOLERANCE {
        nearest
    } else {
        value
    };
    // `as` saturates and maps NaN to 0
    snapped.clamp(MIN_INTENSITY, MAX_INTENSITY).trunc() as u8
}

/// Quantize every cell of a real or complex grid.
pub fn to_intensity_image<T: Intensity>(grid: &ArrayView2<T>) -> IntensityImage {
    grid.mapv(|v| quantize(v.intensity()))
}
