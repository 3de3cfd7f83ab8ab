//! Quadrant swaps that move the zero frequency to the grid center and back.
//!
//! Centering maps index `k` to `(k + n/2) mod n` on each axis, so for an odd
//! axis the extra element ends up in the second half (`[0,1,2,3,4]` becomes
//! `[3,4,0,1,2]`). Uncentering applies the opposite rotation, which makes the
//! pair an exact inverse for odd and even sizes alike.

use ndarray::{Array2, ArrayView2};

/// Swap diagonally opposite quadrants so the zero frequency lands at `(rows/2, cols/2)`.
pub fn center_spectrum<T: Clone>(grid: &ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = grid.dim();
    let (row_shift, col_shift) = (rows - rows / 2, cols - cols / 2);
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        grid[[(r + row_shift) % rows, (c + col_shift) % cols]].clone()
    })
}

/// Inverse of [`center_spectrum`]: move the zero frequency back to `(0, 0)`.
pub fn uncenter_spectrum<T: Clone>(grid: &ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = grid.dim();
    let (row_shift, col_shift) = (rows / 2, cols / 2);
    Array2::from_shape_fn((rows, cols), |(r, c)| {
        grid[[(r + row_shift) % rows, (c + col_shift) % cols]].clone()
    })
}
