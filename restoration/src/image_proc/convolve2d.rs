//! 2D spatial filtering with mirror boundary extension
//!
//! This module provides the general-purpose linear filter used for explicit
//! spatial filtering and for noise-variance estimation. Footprint cells that
//! fall outside the grid are resolved by reflecting the index about the edge
//! without duplicating the edge value (`-1 -> 1`, `n -> n - 2`).

use ndarray::{array, Array2, ArrayView2, Zip};
use thiserror::Error;

use super::quantize::{to_intensity_image, IntensityImage};

/// Errors raised by spatial filtering.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Cannot filter an empty grid")]
    EmptyGrid,
    #[error("Kernel dimensions must be odd and positive, got {rows}x{cols}")]
    InvalidKernel { rows: usize, cols: usize },
    #[error("Index ({row}, {col}) lies outside the mirror margin ({margin_rows}, {margin_cols}) of a {rows}x{cols} grid")]
    OutOfRange {
        row: isize,
        col: isize,
        rows: usize,
        cols: usize,
        margin_rows: usize,
        margin_cols: usize,
    },
}

/// Odd-sized convolution kernel whose weights sum to 1.
///
/// Weights are divided by their sum on construction, unless the sum is
/// already exactly 1 or exactly 0 (zero-sum kernels such as Laplacians are
/// kept as given).
#[derive(Debug, Clone, PartialEq)]
pub struct FilterKernel {
    weights: Array2<f64>,
}

impl FilterKernel {
    pub fn new(weights: Array2<f64>) -> Result<Self, FilterError> {
        let (rows, cols) = weights.dim();
        if rows == 0 || cols == 0 || rows % 2 == 0 || cols % 2 == 0 {
            return Err(FilterError::InvalidKernel { rows, cols });
        }

        let sum = weights.sum();
        let weights = if sum == 1.0 || sum == 0.0 {
            weights
        } else {
            weights / sum
        };

        Ok(Self { weights })
    }

    /// The 3x3 binomial smoothing kernel `[[1,2,1],[2,4,2],[1,2,1]] / 16`
    pub fn binomial_3x3() -> Self {
        Self {
            weights: array![[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]] / 16.0,
        }
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Kernel dimensions `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        self.weights.dim()
    }

    /// Cells the footprint extends past the center on each axis
    pub fn margin(&self) -> (usize, usize) {
        let (rows, cols) = self.weights.dim();
        (rows / 2, cols / 2)
    }
}

/// Reflect `index` into `0..len` without duplicating the edge.
///
/// Only valid for `-(len - 1) <= index <= 2 * (len - 1)`.
fn reflect(index: isize, len: usize) -> isize {
    let last = len as isize - 1;
    if index < 0 {
        -index
    } else if index > last {
        2 * last - index
    } else {
        index
    }
}

fn reflect_checked(index: isize, len: usize, margin: usize) -> Option<usize> {
    let margin = margin as isize;
    if index < -margin || index >= len as isize + margin {
        return None;
    }
    let reflected = reflect(index, len);
    (0..len as isize)
        .contains(&reflected)
        .then_some(reflected as usize)
}

/// Value of `grid` at a possibly out-of-bounds position, by mirror reflection.
///
/// # Arguments
/// * `grid` - Source grid
/// * `row`, `col` - Query position; may lie up to `kernel_dims / 2` cells past an edge
/// * `kernel_dims` - Dimensions of the kernel whose footprint needs the value
///
/// # Errors
/// `FilterError::OutOfRange` if the query lies beyond the kernel's margin or
/// the grid is too small to reflect into.
///
/// # Example
/// ```
/// use ndarray::Array2;
/// use restoration::image_proc::convolve2d::mirror_extend;
///
/// let grid = Array2::from_shape_fn((5, 1), |(r, _)| r as f64);
/// assert_eq!(mirror_extend(&grid.view(), -1, 0, (5, 5)).unwrap(), 1.0);
/// assert_eq!(mirror_extend(&grid.view(), 5, 0, (5, 5)).unwrap(), 3.0);
/// assert_eq!(mirror_extend(&grid.view(), 6, 0, (5, 5)).unwrap(), 2.0);
/// ```
pub fn mirror_extend<T: Copy>(
    grid: &ArrayView2<T>,
    row: isize,
    col: isize,
    kernel_dims: (usize, usize),
) -> Result<T, FilterError> {
    let (rows, cols) = grid.dim();
    let (margin_rows, margin_cols) = (kernel_dims.0 / 2, kernel_dims.1 / 2);
    let out_of_range = || FilterError::OutOfRange {
        row,
        col,
        rows,
        cols,
        margin_rows,
        margin_cols,
    };

    let r = reflect_checked(row, rows, margin_rows).ok_or_else(out_of_range)?;
    let c = reflect_checked(col, cols, margin_cols).ok_or_else(out_of_range)?;
    Ok(grid[[r, c]])
}

/// Filter `grid` with `kernel`, extending borders by mirror reflection.
///
/// The kernel's center cell is aligned with each output cell and weights are
/// applied without flipping (for the symmetric kernels used here this equals
/// convolution). Output rows are computed in parallel.
///
/// # Errors
/// * `FilterError::EmptyGrid` for a grid with a zero dimension
/// * `FilterError::OutOfRange` if the grid is not larger than the kernel margin
///   on some axis, so the reflection would leave the grid
pub fn convolve2d<T>(grid: &ArrayView2<T>, kernel: &FilterKernel) -> Result<Array2<f64>, FilterError>
where
    T: Copy + Into<f64> + Sync,
{
    let (rows, cols) = grid.dim();
    if rows == 0 || cols == 0 {
        return Err(FilterError::EmptyGrid);
    }

    let (margin_rows, margin_cols) = kernel.margin();
    if rows <= margin_rows || cols <= margin_cols {
        return Err(FilterError::OutOfRange {
            row: -(margin_rows as isize),
            col: -(margin_cols as isize),
            rows,
            cols,
            margin_rows,
            margin_cols,
        });
    }

    let weights = kernel.weights();
    let (ker_rows, ker_cols) = weights.dim();
    let mut output = Array2::<f64>::zeros((rows, cols));

    Zip::indexed(&mut output).par_for_each(|(i, j), out| {
        let mut sum = 0.0;
        for ki in 0..ker_rows {
            let r = reflect(i as isize + ki as isize - margin_rows as isize, rows) as usize;
            for kj in 0..ker_cols {
                let c = reflect(j as isize + kj as isize - margin_cols as isize, cols) as usize;
                let value: f64 = grid[[r, c]].into();
                sum += value * weights[[ki, kj]];
            }
        }
        *out = sum;
    });

    Ok(output)
}

/// [`convolve2d`] followed by quantization to an intensity image.
pub fn convolve2d_quantized<T>(
    grid: &ArrayView2<T>,
    kernel: &FilterKernel,
) -> Result<IntensityImage, FilterError>
where
    T: Copy + Into<f64> + Sync,
{
    Ok(to_intensity_image(&convolve2d(grid, kernel)?.view()))
}
