//! Image processing primitives shared across the workspace.

pub mod noise;

pub use noise::{gaussian_noise_field, simple_normal_array, NoiseError};
