//! Regularized Wiener deconvolution.
//!
//! The restored spectrum is
//!
//! ```text
//! F(u, v) = conj(H(u, v)) / (|H(u, v)|^2 + alpha * K) * G(u, v)
//! ```
//!
//! where `G` is the degraded image's spectrum, `H` the PSF's transfer function
//! and `K` the noise-to-signal power ratio estimated from the degraded image
//! itself. `alpha` is the caller's regularization knob. Frequencies where the
//! denominator vanishes are not special-cased: with `alpha = 0` the filter is a
//! plain inverse filter and may produce huge, infinite or NaN values there,
//! which quantization then clamps.

use ndarray::ArrayView2;
use num_complex::Complex64;
use shared::GridSize;
use thiserror::Error;

use super::convolve2d::{convolve2d, FilterError, FilterKernel};
use super::quantize::{to_intensity_image, IntensityImage};
use crate::fourier::{
    forward_transform, inverse_transform, transfer_function, TransformError, TransformOptions,
};
use crate::metrics::{self, MetricError};

/// Errors raised during Wiener restoration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WienerError {
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("Noise estimation filter failed: {0}")]
    Filter(#[from] FilterError),
    #[error("Image statistics failed: {0}")]
    Metric(#[from] MetricError),
}

/// Estimate the additive noise variance of an image.
///
/// Smooths the image with the 3x3 binomial kernel (mirror borders) and returns
/// the variance of `|image - smoothed|`. The high-frequency residual left after
/// smoothing approximates the noise floor.
pub fn estimate_noise_variance(image: &ArrayView2<u8>) -> Result<f64, WienerError> {
    let smoothed = convolve2d(image, &FilterKernel::binomial_3x3())?;
    let residual = (image.mapv(f64::from) - &smoothed).mapv(f64::abs);
    Ok(metrics::variance(&residual.view())?)
}

/// Noise-to-signal power ratio `K = noise_variance / variance(image)`.
///
/// An image whose estimated noise variance is exactly zero gets `K = 0`, which
/// also covers a perfectly flat image where the quotient would be `0 / 0`.
pub fn noise_to_signal_ratio(image: &ArrayView2<u8>) -> Result<f64, WienerError> {
    let noise_variance = estimate_noise_variance(image)?;
    if noise_variance == 0.0 {
        return Ok(0.0);
    }
    let signal_variance = metrics::variance(image)?;
    Ok(noise_variance / signal_variance)
}

/// Restore a blurred, noisy image by Wiener deconvolution.
///
/// # Arguments
/// * `degraded` - Blurred (and possibly noisy) intensity image
/// * `psf` - The PSF that produced the blur, at any size up to the image size
/// * `alpha` - Regularization weight on the estimated noise-to-signal ratio.
///   Larger values suppress noise amplification at the cost of residual blur;
///   zero is a direct inverse filter.
/// * `options` - Transform convention; the result does not depend on it beyond round-off
pub fn wiener_restore(
    degraded: &ArrayView2<u8>,
    psf: &ArrayView2<f64>,
    alpha: f64,
    options: TransformOptions,
) -> Result<IntensityImage, WienerError> {
    let size = GridSize::of(degraded);
    let ratio = noise_to_signal_ratio(degraded)?;
    let regularization = alpha * ratio;

    log::debug!(
        "Wiener restore of {size} image: K = {ratio:.6e}, alpha = {alpha:e}, alpha*K = {regularization:.6e}"
    );

    let degraded_spectrum = forward_transform(degraded, None, options)?;
    let otf = transfer_function(psf, size, options)?;

    let mut restored_spectrum = degraded_spectrum;
    restored_spectrum
        .iter_mut()
        .zip(otf.iter())
        .for_each(|(g, h)| *g = wiener_gain(*h, regularization) * *g);

    let restored = inverse_transform(&restored_spectrum.view(), None, options)?;
    Ok(to_intensity_image(&restored.view()))
}

/// `conj(h) / (|h|^2 + regularization)` with no guard against a zero denominator.
fn wiener_gain(h: Complex64, regularization: f64) -> Complex64 {
    h.conj() / (h.norm_sqr() + regularization)
}
