//! End-to-end degrade-and-restore experiment.
//!
//! An ideal image is blurred by a Gaussian PSF, corrupted with calibrated
//! Gaussian noise, then restored once per regularization weight. Each
//! restoration is scored with BSNR against the blurred image and ISNR against
//! the noisy one.

use ndarray::ArrayView2;
use shared::GridSize;
use thiserror::Error;

use crate::config::{ConfigError, ExperimentConfig};
use crate::fourier::{forward_transform, inverse_transform, TransformError, TransformOptions};
use crate::image_proc::degrade::{add_noise, blur, DegradeError};
use crate::image_proc::image::spectrum_magnitude_image;
use crate::image_proc::psf::{gaussian_psf, PsfError};
use crate::image_proc::quantize::{to_intensity_image, IntensityImage};
use crate::image_proc::wiener::{estimate_noise_variance, wiener_restore, WienerError};
use crate::metrics::{self, MetricError};

/// Errors raised by any pipeline stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("PSF synthesis failed: {0}")]
    Psf(#[from] PsfError),
    #[error("Degradation failed: {0}")]
    Degrade(#[from] DegradeError),
    #[error("Restoration failed: {0}")]
    Wiener(#[from] WienerError),
    #[error("Transform failed: {0}")]
    Transform(#[from] TransformError),
    #[error("Metric failed: {0}")]
    Metric(#[from] MetricError),
}

/// One Wiener restoration and its scores.
#[derive(Debug, Clone)]
pub struct Restoration {
    pub alpha: f64,
    pub image: IntensityImage,
    /// `BSNR(blurred, restored, noise_variance)` in dB
    pub bsnr: f64,
    /// `ISNR(ideal, noisy, restored)` in dB
    pub isnr: f64,
}

/// Every intermediate image of an experiment.
#[derive(Debug, Clone)]
pub struct ExperimentReport {
    pub blurred: IntensityImage,
    pub noisy: IntensityImage,
    /// Noise variance estimated from the noisy image
    pub noise_variance: f64,
    /// One entry per configured alpha, in order
    pub restorations: Vec<Restoration>,
}

/// Run the full experiment on `ideal`.
pub fn run_experiment(
    ideal: &ArrayView2<u8>,
    config: &ExperimentConfig,
) -> Result<ExperimentReport, PipelineError> {
    config.validate()?;

    let image_size = GridSize::of(ideal);
    let psf_size = config.psf.resolve_size(image_size);
    let psf = gaussian_psf(
        psf_size,
        config.psf.sigma,
        config.psf.centered,
        config.psf.normalization,
    )?;
    log::info!(
        "Running experiment on {image_size} image: PSF {psf_size} sigma {}, noise {}",
        config.psf.sigma,
        config.relative_noise
    );

    let blurred = blur(ideal, &psf.view(), config.transform)?;
    let noisy = add_noise(&blurred.view(), config.relative_noise, config.seed)?;
    let noise_variance = estimate_noise_variance(&noisy.view())?;
    log::debug!("Estimated noise variance of degraded image: {noise_variance:.4}");

    let restorations = config
        .alphas
        .iter()
        .map(|&alpha| {
            let image = wiener_restore(&noisy.view(), &psf.view(), alpha, config.transform)?;
            let bsnr = metrics::bsnr(&blurred.view(), &image.view(), noise_variance)?;
            let isnr = metrics::isnr(ideal, &noisy.view(), &image.view())?;
            log::info!("alpha = {alpha:e}: BSNR = {bsnr:.3} dB, ISNR = {isnr:.3} dB");
            Ok::<_, PipelineError>(Restoration {
                alpha,
                image,
                bsnr,
                isnr,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExperimentReport {
        blurred,
        noisy,
        noise_variance,
        restorations,
    })
}

/// Forward then inverse transform, quantized back to an intensity image.
pub fn transform_round_trip(
    image: &ArrayView2<u8>,
    options: TransformOptions,
) -> Result<IntensityImage, PipelineError> {
    let spectrum = forward_transform(image, None, options)?;
    let restored = inverse_transform(&spectrum.view(), None, options)?;
    Ok(to_intensity_image(&restored.view()))
}

/// Centered log-magnitude spectrum of `image` as an intensity image.
pub fn spectrum_image(
    image: &ArrayView2<u8>,
    options: TransformOptions,
) -> Result<IntensityImage, PipelineError> {
    let spectrum = forward_transform(image, None, options)?;
    Ok(spectrum_magnitude_image(&spectrum, options))
}
