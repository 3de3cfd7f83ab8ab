//! Gaussian point-spread function synthesis.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use shared::GridSize;
use std::f64::consts::PI;
use thiserror::Error;

/// Errors raised while building a PSF.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PsfError {
    #[error("PSF sigma must be positive and finite, got {0}")]
    InvalidSigma(f64),
    #[error("PSF size must have positive dimensions, got {0}")]
    InvalidSize(GridSize),
    #[error("PSF of size {size} with sigma {sigma} has zero total energy")]
    ZeroEnergy { size: GridSize, sigma: f64 },
}

/// How the raw Gaussian samples are scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsfNormalization {
    /// Divide by the sum of all samples, so the kernel sums to 1
    #[default]
    Sum,
    /// Divide by `2 * pi * sigma^2`, the continuous Gaussian's normalization constant
    Pi,
}

/// Sample `exp(-((x - cx)^2 + (y - cy)^2) / (2 sigma^2))` over a `size` window.
///
/// # Arguments
/// * `size` - Window dimensions; may be as small as 1x1 or as large as the image
/// * `sigma` - Standard deviation in pixels
/// * `centered` - Peak at the window's geometric center `((rows-1)/2, (cols-1)/2)`
///   when true, at the origin `(0, 0)` otherwise
/// * `normalization` - See [`PsfNormalization`]
///
/// # Example
/// ```
/// use restoration::image_proc::psf::{gaussian_psf, PsfNormalization};
/// use shared::GridSize;
///
/// let psf = gaussian_psf(GridSize::new(5, 5), 1.0, true, PsfNormalization::Sum).unwrap();
/// assert!((psf.sum() - 1.0).abs() < 1e-9);
/// assert!(psf[[2, 2]] > psf[[0, 0]]);
/// ```
pub fn gaussian_psf(
    size: GridSize,
    sigma: f64,
    centered: bool,
    normalization: PsfNormalization,
) -> Result<Array2<f64>, PsfError> {
    if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(PsfError::InvalidSigma(sigma));
    }
    if size.is_empty() {
        return Err(PsfError::InvalidSize(size));
    }

    let (cy, cx) = if centered {
        (
            (size.rows as f64 - 1.0) / 2.0,
            (size.cols as f64 - 1.0) / 2.0,
        )
    } else {
        (0.0, 0.0)
    };
    let two_sigma_sq = 2.0 * sigma * sigma;

    let psf = Array2::from_shape_fn(size.to_tuple(), |(row, col)| {
        let dy = row as f64 - cy;
        let dx = col as f64 - cx;
        (-(dx * dx + dy * dy) / two_sigma_sq).exp()
    });

    let divisor = match normalization {
        PsfNormalization::Sum => psf.sum(),
        PsfNormalization::Pi => PI * two_sigma_sq,
    };
    if divisor == 0.0 {
        return Err(PsfError::ZeroEnergy { size, sigma });
    }

    Ok(psf / divisor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sum_normalization_sums_to_one() {
        for &(rows, cols) in &[(1, 1), (3, 3), (5, 5), (4, 7), (64, 48)] {
            for &sigma in &[0.3, 1.0, 2.5, 10.0] {
                let psf =
                    gaussian_psf(GridSize::new(rows, cols), sigma, true, PsfNormalization::Sum)
                        .unwrap();
                assert_relative_eq!(psf.sum(), 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_pi_normalization_matches_continuous_gaussian() {
        // A window much wider than sigma captures essentially all the mass
        let psf = gaussian_psf(GridSize::new(41, 41), 2.0, true, PsfNormalization::Pi).unwrap();
        assert_relative_eq!(psf.sum(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(psf[[20, 20]], 1.0 / (8.0 * PI), epsilon = 1e-12);
    }

    #[test]
    fn test_centered_peak_and_symmetry() {
        let psf = gaussian_psf(GridSize::new(5, 5), 1.0, true, PsfNormalization::Sum).unwrap();
        let peak = psf[[2, 2]];
        assert!(psf.iter().all(|&v| v <= peak));
        assert_relative_eq!(psf[[0, 1]], psf[[4, 3]], epsilon = 1e-15);
        assert_relative_eq!(psf[[1, 0]], psf[[0, 1]], epsilon = 1e-15);
    }

    #[test]
    fn test_even_window_center_between_cells() {
        let psf = gaussian_psf(GridSize::new(4, 4), 1.0, true, PsfNormalization::Sum).unwrap();
        assert_relative_eq!(psf[[1, 1]], psf[[2, 2]], epsilon = 1e-15);
        assert_relative_eq!(psf[[1, 2]], psf[[2, 1]], epsilon = 1e-15);
    }

    #[test]
    fn test_uncentered_peak_at_origin() {
        let psf = gaussian_psf(GridSize::new(6, 6), 1.5, false, PsfNormalization::Sum).unwrap();
        let peak = psf[[0, 0]];
        assert!(psf.iter().all(|&v| v <= peak));
        assert!(psf[[0, 1]] > psf[[0, 2]]);
    }

    #[test]
    fn test_invalid_parameters() {
        let size = GridSize::new(3, 3);
        assert_eq!(
            gaussian_psf(size, 0.0, true, PsfNormalization::Sum),
            Err(PsfError::InvalidSigma(0.0))
        );
        assert!(matches!(
            gaussian_psf(size, -1.0, true, PsfNormalization::Pi),
            Err(PsfError::InvalidSigma(_))
        ));
        assert!(matches!(
            gaussian_psf(size, f64::NAN, true, PsfNormalization::Sum),
            Err(PsfError::InvalidSigma(_))
        ));
        assert_eq!(
            gaussian_psf(GridSize::new(0, 3), 1.0, true, PsfNormalization::Sum),
            Err(PsfError::InvalidSize(GridSize::new(0, 3)))
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&PsfNormalization::Pi).unwrap(),
            r#""pi""#
        );
        let parsed: PsfNormalization = serde_json::from_str(r#""sum""#).unwrap();
        assert_eq!(parsed, PsfNormalization::Sum);
    }
}
