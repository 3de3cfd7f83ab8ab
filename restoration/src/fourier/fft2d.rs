//! Separable 2D FFT on `ndarray` grids.
//!
//! The transform runs a 1D FFT over every row, transposes, runs a 1D FFT over
//! every former column and transposes back. Rows are independent, so each pass
//! is spread over the rayon pool with one scratch buffer per worker.

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftDirection, FftPlanner};

/// Unscaled 2D DFT (forward) or unscaled inverse sum (inverse) of `data`.
///
/// Returns a standard-layout array of the same shape.
pub fn fft_2d(data: Array2<Complex64>, direction: FftDirection) -> Array2<Complex64> {
    let (rows, cols) = data.dim();
    let mut planner = FftPlanner::<f64>::new();
    let row_fft = planner.plan_fft(cols, direction);
    let col_fft = planner.plan_fft(rows, direction);

    let data = fft_rows(data, &*row_fft);
    // Columns become rows after the transpose; fft_rows lays them out contiguously.
    let transposed = fft_rows(data.reversed_axes(), &*col_fft);
    transposed.reversed_axes().as_standard_layout().into_owned()
}

/// In-place 1D FFT of every row.
fn fft_rows(mut data: Array2<Complex64>, fft: &dyn Fft<f64>) -> Array2<Complex64> {
    if !data.is_standard_layout() {
        data = data.as_standard_layout().into_owned();
    }

    let width = data.ncols();
    let scratch_len = fft.get_inplace_scratch_len();

    if let Some(buffer) = data.as_slice_mut() {
        buffer.par_chunks_exact_mut(width).for_each_init(
            || vec![Complex64::default(); scratch_len],
            |scratch, row| fft.process_with_scratch(row, scratch),
        );
    }

    data
}
