//! Shared components for the restoration workspace.
//!
//! - [`grid_size`]: row/column dimensions shared by images, kernels and spectra
//! - [`algo`]: deterministic parallel chunk processing
//! - [`image_proc`]: Gaussian noise generation

pub mod algo;
pub mod grid_size;
pub mod image_proc;

pub use grid_size::GridSize;
