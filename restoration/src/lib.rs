//! Image degradation simulation and Wiener restoration.
//!
//! The crate models the classic deblurring experiment: an ideal grayscale
//! image is blurred by a Gaussian point-spread function in the frequency
//! domain, corrupted by additive Gaussian noise scaled to the image contrast,
//! then restored with a regularized Wiener filter whose noise-to-signal ratio
//! is estimated from the degraded image itself. BSNR and ISNR quantify each
//! restoration.
//!
//! - [`fourier`]: 2D DFT engine with centering and scaling conventions
//! - [`image_proc`]: PSF synthesis, blur and noise, spatial filtering,
//!   Wiener restoration, quantization and image I/O
//! - [`metrics`]: image statistics and quality metrics
//! - [`config`] and [`pipeline`]: experiment description and driver

pub mod config;
pub mod fourier;
pub mod image_proc;
pub mod metrics;
pub mod pipeline;

pub use config::{ConfigError, ExperimentConfig, PsfConfig};
pub use fourier::{forward_transform, inverse_transform, Spectrum, TransformError, TransformOptions};
pub use pipeline::{run_experiment, ExperimentReport, PipelineError, Restoration};
