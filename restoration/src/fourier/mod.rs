//! Transform engine: 2D discrete Fourier transforms for the restoration pipeline.
//!
//! Every frequency-domain stage (blur simulation, Wiener inversion, spectrum
//! inspection) goes through [`forward_transform`] and [`inverse_transform`].
//! Two flags control the convention:
//!
//! - `centered`: quadrant-swap the spectrum so the zero frequency sits at
//!   `(rows/2, cols/2)`; the inverse un-swaps before summing.
//! - `normalized`: orthonormal scaling, dividing both directions by
//!   `sqrt(rows * cols)`. Without it the forward pass is unscaled and the
//!   inverse divides by `rows * cols`.
//!
//! For matching flags `inverse_transform(forward_transform(x)) == x` up to
//! floating point round-off.

pub mod fft2d;
pub mod shift;

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use rustfft::FftDirection;
use serde::{Deserialize, Serialize};
use shared::GridSize;
use thiserror::Error;

pub use shift::{center_spectrum, uncenter_spectrum};

/// Complex frequency-domain coefficients of a grid
pub type Spectrum = Array2<Complex64>;

/// Errors produced by the transform engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Cannot transform an empty grid ({0})")]
    EmptyGrid(GridSize),
    #[error("Invalid target size {0}: both dimensions must be positive")]
    EmptyTarget(GridSize),
}

/// Convention flags threaded through every transform call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Zero frequency at the grid center instead of `(0, 0)`
    pub centered: bool,
    /// Orthonormal `1/sqrt(rows*cols)` scaling on both directions
    pub normalized: bool,
}

impl TransformOptions {
    pub fn new(centered: bool, normalized: bool) -> Self {
        Self {
            centered,
            normalized,
        }
    }
}

/// Grid element that can enter the transform engine.
pub trait Sample: Copy + Send + Sync {
    fn to_complex(self) -> Complex64;
}

impl Sample for u8 {
    fn to_complex(self) -> Complex64 {
        Complex64::new(self as f64, 0.0)
    }
}

impl Sample for f64 {
    fn to_complex(self) -> Complex64 {
        Complex64::new(self, 0.0)
    }
}

impl Sample for Complex64 {
    fn to_complex(self) -> Complex64 {
        self
    }
}

/// Copy `grid` into a complex array of `size`, anchored at the top-left corner.
///
/// Cells outside `grid` are zero; cells of `grid` outside `size` are dropped.
pub fn resize_zero_filled<T: Sample>(grid: &ArrayView2<T>, size: GridSize) -> Array2<Complex64> {
    let (rows, cols) = grid.dim();
    Array2::from_shape_fn(size.to_tuple(), |(r, c)| {
        if r < rows && c < cols {
            grid[[r, c]].to_complex()
        } else {
            Complex64::new(0.0, 0.0)
        }
    })
}

fn check_sizes(grid: GridSize, target: Option<GridSize>) -> Result<GridSize, TransformError> {
    if grid.is_empty() {
        return Err(TransformError::EmptyGrid(grid));
    }
    let target = target.unwrap_or(grid);
    if target.is_empty() {
        return Err(TransformError::EmptyTarget(target));
    }
    Ok(target)
}

/// Compute the 2D DFT of `grid`.
///
/// # Arguments
/// * `grid` - Real (`u8`, `f64`) or complex input
/// * `target_size` - Transform size; the grid is zero-padded or truncated at
///   its bottom/right edges to reach it. `None` keeps the grid's own size.
/// * `options` - Centering and scaling convention
///
/// # Errors
/// `TransformError` if the grid or the target size has a zero dimension.
pub fn forward_transform<T: Sample>(
    grid: &ArrayView2<T>,
    target_size: Option<GridSize>,
    options: TransformOptions,
) -> Result<Spectrum, TransformError> {
    let size = check_sizes(GridSize::of(grid), target_size)?;

    let mut spectrum = fft2d::fft_2d(resize_zero_filled(grid, size), FftDirection::Forward);

    if options.normalized {
        let scale = 1.0 / (size.cell_count() as f64).sqrt();
        spectrum.mapv_inplace(|c| c * scale);
    }

    if options.centered {
        spectrum = center_spectrum(&spectrum.view());
    }

    Ok(spectrum)
}

/// Invert a spectrum produced by [`forward_transform`] with the same options.
///
/// If `target_size` differs from the spectrum's size, the uncentered spectrum
/// is zero-padded or truncated at its bottom/right edges before inversion.
/// The result is complex; callers that expect an image take the real part.
pub fn inverse_transform(
    spectrum: &ArrayView2<Complex64>,
    target_size: Option<GridSize>,
    options: TransformOptions,
) -> Result<Array2<Complex64>, TransformError> {
    let size = check_sizes(GridSize::of(spectrum), target_size)?;

    let uncentered = if options.centered {
        uncenter_spectrum(spectrum)
    } else {
        spectrum.to_owned()
    };

    let resized = if size == GridSize::of(&uncentered.view()) {
        uncentered
    } else {
        resize_zero_filled(&uncentered.view(), size)
    };

    let mut grid = fft2d::fft_2d(resized, FftDirection::Inverse);

    let count = size.cell_count() as f64;
    let scale = if options.normalized {
        1.0 / count.sqrt()
    } else {
        1.0 / count
    };
    grid.mapv_inplace(|c| c * scale);

    Ok(grid)
}

/// Optical transfer function of a PSF at the given size.
///
/// Always the unscaled DFT of the zero-padded kernel, whatever `options.normalized`
/// says, so that multiplying it into an image spectrum of either convention is a
/// true circular convolution. Only `options.centered` is honored.
pub fn transfer_function(
    psf: &ArrayView2<f64>,
    size: GridSize,
    options: TransformOptions,
) -> Result<Spectrum, TransformError> {
    forward_transform(
        psf,
        Some(size),
        TransformOptions {
            normalized: false,
            ..options
        },
    )
}

/// Real part of every cell
pub fn real_part(grid: &ArrayView2<Complex64>) -> Array2<f64> {
    grid.mapv(|c| c.re)
}
