//! Grid dimensions and size utilities

use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dimensions of a 2D grid in row-major order.
///
/// Every image, kernel and spectrum in the workspace is an `ndarray::Array2`
/// whose shape is `(rows, cols)`; this type names that pair so it can travel
/// through configuration files and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of rows (image height)
    pub rows: usize,
    /// Number of columns (image width)
    pub cols: usize,
}

impl GridSize {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Size of an existing array view
    pub fn of<T>(grid: &ArrayView2<T>) -> Self {
        let (rows, cols) = grid.dim();
        Self { rows, cols }
    }

    /// True if either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Convert to an ndarray shape tuple `(rows, cols)`
    pub fn to_tuple(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl From<(usize, usize)> for GridSize {
    fn from(dimensions: (usize, usize)) -> Self {
        Self::new(dimensions.0, dimensions.1)
    }
}

impl From<GridSize> for (usize, usize) {
    fn from(size: GridSize) -> Self {
        size.to_tuple()
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
