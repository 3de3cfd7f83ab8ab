//! Image processing for the degradation and restoration pipeline
//!
//! This module provides PSF synthesis, frequency-domain blur and noise
//! simulation, mirror-boundary spatial filtering, Wiener restoration,
//! quantization to 8-bit intensities, and grayscale image I/O.

pub mod convolve2d;
pub mod degrade;
pub mod image;
pub mod psf;
pub mod quantize;
pub mod wiener;

// Re-export key functionality for easier access
pub use convolve2d::{convolve2d, mirror_extend, FilterError, FilterKernel};
pub use degrade::{add_noise, blur, DegradeError};
pub use self::image::{load_gray_image, save_gray_image, spectrum_magnitude_image, ImageIoError};
pub use psf::{gaussian_psf, PsfError, PsfNormalization};
pub use quantize::{quantize, to_intensity_image, IntensityImage};
pub use wiener::{estimate_noise_variance, noise_to_signal_ratio, wiener_restore, WienerError};
