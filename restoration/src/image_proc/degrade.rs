//! Degradation simulation: frequency-domain blur and calibrated additive noise.

use ndarray::ArrayView2;
use shared::image_proc::noise::{gaussian_noise_field, NoiseError};
use shared::GridSize;
use thiserror::Error;

use super::quantize::{to_intensity_image, IntensityImage};
use crate::fourier::{
    forward_transform, inverse_transform, transfer_function, TransformError, TransformOptions,
};
use crate::metrics::{self, MetricError};

/// Errors raised while degrading an image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegradeError {
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("Image statistics failed: {0}")]
    Metric(#[from] MetricError),
    #[error("Noise generation failed: {0}")]
    Noise(#[from] NoiseError),
    #[error("Relative noise standard deviation must be non-negative and finite, got {0}")]
    InvalidNoiseLevel(f64),
}

/// Blur `image` with `psf` via the convolution theorem.
///
/// Computes `inverse(forward(image) * H)` where `H` is the PSF's transfer
/// function zero-padded to the image size, then quantizes. The result is a
/// circular convolution: content pushed past one edge wraps to the opposite
/// edge, and the output is shifted by the PSF's own center offset (a centered
/// 5x5 kernel moves content two pixels down and right). Restoring with the same
/// PSF undoes both.
///
/// # Arguments
/// * `image` - Intensity image to blur
/// * `psf` - Point-spread function; smaller kernels are zero-padded, larger ones truncated
/// * `options` - Transform convention; the result does not depend on it beyond round-off
pub fn blur(
    image: &ArrayView2<u8>,
    psf: &ArrayView2<f64>,
    options: TransformOptions,
) -> Result<IntensityImage, DegradeError> {
    let size = GridSize::of(image);
    let image_spectrum = forward_transform(image, None, options)?;
    let otf = transfer_function(psf, size, options)?;

    let blurred_spectrum = image_spectrum * &otf;
    let blurred = inverse_transform(&blurred_spectrum.view(), None, options)?;

    log::debug!("Blurred {size} image with {:?} PSF", psf.dim());
    Ok(to_intensity_image(&blurred.view()))
}

/// Add zero-mean Gaussian noise scaled to the image's own contrast.
///
/// Noise is drawn from `Normal(mean, relative_std_dev * std_dev)` using the
/// image's mean and population standard deviation; `noise - mean` is added to
/// every pixel and the sum quantized.
///
/// # Arguments
/// * `image` - Intensity image
/// * `relative_std_dev` - Noise standard deviation as a fraction of the image's
/// * `seed` - Seed for reproducible noise; `None` draws fresh noise on every call
pub fn add_noise(
    image: &ArrayView2<u8>,
    relative_std_dev: f64,
    seed: Option<u64>,
) -> Result<IntensityImage, DegradeError> {
    if !(relative_std_dev >= 0.0 && relative_std_dev.is_finite()) {
        return Err(DegradeError::InvalidNoiseLevel(relative_std_dev));
    }

    let mean = metrics::mean(image)?;
    let noise_std = relative_std_dev * metrics::std_dev(image)?;
    let noise = gaussian_noise_field(GridSize::of(image), mean, noise_std, seed)?;

    log::debug!("Adding Gaussian noise with std {noise_std:.3} around mean {mean:.3}");

    let noisy = noise.mapv(|n| n - mean) + &image.mapv(f64::from);
    Ok(to_intensity_image(&noisy.view()))
}
