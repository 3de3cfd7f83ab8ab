//! Noise generation utilities for image degradation experiments.
//!
//! Provides the Gaussian noise primitives used to simulate additive sensor
//! noise on an intensity image:
//! - Deterministic normal arrays for unit tests
//! - Seeded, parallel Gaussian noise fields for the degradation stage
//!
//! # Performance
//!
//! Noise fields are filled in row chunks on the rayon pool. A fixed seed
//! reproduces the same field on any number of threads.

use crate::algo::process_array_in_parallel_chunks;
use crate::grid_size::GridSize;
use ndarray::Array2;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

/// Errors raised when a noise distribution cannot be constructed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoiseError {
    #[error("Invalid normal distribution parameters: mean {mean}, std_dev {std_dev}")]
    InvalidDistribution { mean: f64, std_dev: f64 },
}

/// `Normal(mean, std_dev)`; rejects a non-finite mean and a negative or non-finite std_dev.
fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>, NoiseError> {
    if !mean.is_finite() || !(std_dev >= 0.0 && std_dev.is_finite()) {
        return Err(NoiseError::InvalidDistribution { mean, std_dev });
    }
    Normal::new(mean, std_dev).map_err(|_| NoiseError::InvalidDistribution { mean, std_dev })
}

/// Generate a 2D array of normally distributed values for testing purposes.
///
/// Single-threaded and fully deterministic for a given seed.
///
/// # Arguments
/// * `size` - Tuple of (rows, cols) for the output array dimensions
/// * `mean` - Mean value of the normal distribution
/// * `std_dev` - Standard deviation of the normal distribution
/// * `seed` - Random seed for deterministic output
///
/// # Example
/// ```
/// use shared::image_proc::noise::simple_normal_array;
///
/// let noise = simple_normal_array((10, 10), 100.0, 10.0, 42).unwrap();
/// assert_eq!(noise.dim(), (10, 10));
/// ```
pub fn simple_normal_array(
    size: (usize, usize),
    mean: f64,
    std_dev: f64,
    seed: u64,
) -> Result<Array2<f64>, NoiseError> {
    use rand::rngs::StdRng;

    let mut rng = StdRng::seed_from_u64(seed);
    let normal_dist = normal(mean, std_dev)?;
    Ok(Array2::from_shape_fn(size, |_| normal_dist.sample(&mut rng)))
}

/// Generate an additive Gaussian noise field.
///
/// Each cell is an independent draw from `Normal(mean, std_dev)`.
///
/// # Arguments
/// * `size` - Dimensions of the field
/// * `mean` - Mean of the distribution
/// * `std_dev` - Standard deviation; zero yields a constant field equal to `mean`
/// * `rng_seed` - Optional seed for reproducibility; `None` seeds from entropy
pub fn gaussian_noise_field(
    size: GridSize,
    mean: f64,
    std_dev: f64,
    rng_seed: Option<u64>,
) -> Result<Array2<f64>, NoiseError> {
    let dist = normal(mean, std_dev)?;
    let seed = rng_seed.unwrap_or_else(rand::random::<u64>);

    log::trace!("Generating {size} Gaussian noise field (mean {mean:.3}, std {std_dev:.3})");

    Ok(process_array_in_parallel_chunks(
        Array2::<f64>::zeros(size.to_tuple()),
        seed,
        Some(64), // Process 64 rows at a time
        |chunk, rng| {
            chunk.iter_mut().for_each(|pixel| *pixel = dist.sample(rng));
        },
    ))
}
