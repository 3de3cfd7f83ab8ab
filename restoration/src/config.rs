//! Experiment configuration for the degrade-and-restore pipeline.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes:
//!
//! ```json
//! {
//!   "psf": { "size": { "rows": 5, "cols": 5 }, "sigma": 1.0 },
//!   "relative_noise": 0.05,
//!   "alphas": [0.001, 0.01],
//!   "seed": 7
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::GridSize;
use thiserror::Error;

use crate::fourier::TransformOptions;
use crate::image_proc::psf::PsfNormalization;

/// Errors raised while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Point-spread function parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsfConfig {
    /// Kernel window; `None` uses the full image size
    pub size: Option<GridSize>,
    /// Gaussian standard deviation in pixels
    pub sigma: f64,
    /// Peak at the window center rather than the origin
    pub centered: bool,
    pub normalization: PsfNormalization,
}

impl Default for PsfConfig {
    fn default() -> Self {
        Self {
            size: None,
            sigma: 5.0,
            centered: true,
            normalization: PsfNormalization::Sum,
        }
    }
}

impl PsfConfig {
    /// Window size to use for an image of `image_size`
    pub fn resolve_size(&self, image_size: GridSize) -> GridSize {
        self.size.unwrap_or(image_size)
    }
}

/// Full description of one degrade-and-restore experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub psf: PsfConfig,
    pub transform: TransformOptions,
    /// Noise standard deviation relative to the blurred image's own
    pub relative_noise: f64,
    /// Wiener regularization weights, one restoration each
    pub alphas: Vec<f64>,
    /// Noise seed; `None` draws fresh noise on every run
    pub seed: Option<u64>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            psf: PsfConfig::default(),
            transform: TransformOptions::default(),
            relative_noise: 0.1,
            alphas: vec![1e-5, 1e-4, 1e-3, 1e-2],
            seed: None,
        }
    }
}

impl ExperimentConfig {
    /// Load from a JSON file and validate
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save as pretty-printed JSON
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    ///
    /// Alpha values are not range checked; negative weights are accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.psf.sigma > 0.0 && self.psf.sigma.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "psf.sigma must be positive, got {}",
                self.psf.sigma
            )));
        }
        if let Some(size) = self.psf.size {
            if size.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "psf.size must have positive dimensions, got {size}"
                )));
            }
        }
        if !(self.relative_noise >= 0.0 && self.relative_noise.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "relative_noise must be non-negative, got {}",
                self.relative_noise
            )));
        }
        if self.alphas.iter().any(|a| !a.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "alphas must be finite, got {:?}",
                self.alphas
            )));
        }
        Ok(())
    }
}
