//! End-to-end checks of the degrade-and-restore pipeline.
//!
//! Covers transform round trips, PSF normalization, identity and uniform-field
//! blur, mirror reflection, BSNR monotonicity in the noise level, and Wiener
//! restoration quality.

use ndarray::{array, Array2};
use restoration::config::{ExperimentConfig, PsfConfig};
use restoration::fourier::{forward_transform, inverse_transform, real_part, TransformOptions};
use restoration::image_proc::convolve2d::{convolve2d_quantized, mirror_extend, FilterKernel};
use restoration::image_proc::degrade::{add_noise, blur};
use restoration::image_proc::psf::{gaussian_psf, PsfNormalization};
use restoration::image_proc::quantize::to_intensity_image;
use restoration::image_proc::wiener::{noise_to_signal_ratio, wiener_restore};
use restoration::metrics;
use restoration::pipeline::run_experiment;
use shared::image_proc::noise::simple_normal_array;
use shared::GridSize;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn all_options() -> [TransformOptions; 4] {
    [
        TransformOptions::new(false, false),
        TransformOptions::new(true, false),
        TransformOptions::new(false, true),
        TransformOptions::new(true, true),
    ]
}

/// Random-texture intensity image
fn textured_image(rows: usize, cols: usize, seed: u64) -> Array2<u8> {
    let field = simple_normal_array((rows, cols), 128.0, 50.0, seed).unwrap();
    to_intensity_image(&field.view())
}

/// Square blocks alternating between two levels
fn block_image(size: usize, block: usize, low: u8, high: u8) -> Array2<u8> {
    Array2::from_shape_fn((size, size), |(r, c)| {
        if (r / block + c / block) % 2 == 0 {
            low
        } else {
            high
        }
    })
}

fn small_psf() -> Array2<f64> {
    gaussian_psf(GridSize::new(5, 5), 1.0, true, PsfNormalization::Sum).unwrap()
}

#[test]
fn test_round_trip_within_tolerance() {
    init_logging();
    let image = textured_image(64, 64, 3);
    for options in all_options() {
        let spectrum = forward_transform(&image.view(), None, options).unwrap();
        let restored = real_part(&inverse_transform(&spectrum.view(), None, options).unwrap().view());
        let max_err = restored
            .iter()
            .zip(image.iter())
            .map(|(&r, &p)| (r - p as f64).abs())
            .fold(0.0_f64, f64::max);
        assert!(max_err < 1e-6, "{options:?}: max error {max_err}");
        assert_eq!(to_intensity_image(&restored.view()), image, "{options:?}");
    }
}

#[test]
fn test_psf_sum_normalization() {
    for size in [1, 2, 5, 9, 33] {
        for sigma in [0.5, 1.0, 5.0, 50.0] {
            let psf = gaussian_psf(GridSize::new(size, size + 1), sigma, true, PsfNormalization::Sum)
                .unwrap();
            assert!((psf.sum() - 1.0).abs() < 1e-9, "size {size} sigma {sigma}");
        }
    }
}

#[test]
fn test_identity_blur() {
    init_logging();
    let image = textured_image(50, 70, 8);
    let identity = array![[1.0]];
    for options in all_options() {
        let blurred = blur(&image.view(), &identity.view(), options).unwrap();
        assert_eq!(blurred, image, "{options:?}");
    }
}

#[test]
fn test_mirror_reflection_concrete_case() {
    let grid = Array2::from_shape_fn((5, 4), |(r, c)| (10 * r + c) as u8);
    let view = grid.view();
    assert_eq!(mirror_extend(&view, -1, 2, (5, 5)).unwrap(), 12);
    assert_eq!(mirror_extend(&view, 5, 2, (5, 5)).unwrap(), 32);
    assert_eq!(mirror_extend(&view, 6, 2, (5, 5)).unwrap(), 22);
    assert!(mirror_extend(&view, 7, 2, (5, 5)).is_err());
}

#[test]
fn test_uniform_image_end_to_end() {
    init_logging();
    let image = Array2::<u8>::from_elem((256, 256), 128);
    let psf = small_psf();

    for options in all_options() {
        let blurred = blur(&image.view(), &psf.view(), options).unwrap();
        assert!(blurred.iter().all(|&v| v == 128), "blur {options:?}");

        let restored = wiener_restore(&blurred.view(), &psf.view(), 0.001, options).unwrap();
        assert!(restored.iter().all(|&v| v == 128), "restore {options:?}");
    }
}

#[test]
fn test_bsnr_decreases_with_noise_level() {
    init_logging();
    // Bright blocks sit near the clamp so large noise is partially clipped
    let ideal = block_image(256, 16, 235, 255);
    let blurred = blur(&ideal.view(), &small_psf().view(), TransformOptions::default()).unwrap();
    let blurred_std = metrics::std_dev(&blurred.view()).unwrap();

    let levels = [0.25, 0.5, 1.0, 2.0];
    let seeds = [1_u64, 2, 3, 4, 5];
    let averages: Vec<f64> = levels
        .iter()
        .map(|&level| {
            let noise_variance = (level * blurred_std).powi(2);
            let total: f64 = seeds
                .iter()
                .map(|&seed| {
                    let noisy = add_noise(&blurred.view(), level, Some(seed)).unwrap();
                    metrics::bsnr(&blurred.view(), &noisy.view(), noise_variance).unwrap()
                })
                .sum();
            total / seeds.len() as f64
        })
        .collect();

    for pair in averages.windows(2) {
        assert!(pair[1] < pair[0], "BSNR not decreasing: {averages:?}");
    }
}

#[test]
fn test_bsnr_decreases_with_noise_level_without_clipping() {
    init_logging();
    // Mid-gray texture: the largest noise draw stays far from 0 and 255, so only
    // the truncation offset of quantization separates mse from the noise variance
    let field = simple_normal_array((256, 256), 128.0, 12.0, 77).unwrap();
    let ideal = to_intensity_image(&field.view());
    let blurred = blur(&ideal.view(), &small_psf().view(), TransformOptions::default()).unwrap();
    let blurred_std = metrics::std_dev(&blurred.view()).unwrap();
    assert!(blurred_std > 1.0 && blurred_std < 12.0, "blurred std {blurred_std}");

    let levels = [0.25, 0.5, 1.0, 2.0];
    let seeds = [11_u64, 12, 13];
    let mut averages = Vec::new();
    for &level in &levels {
        let noise_variance = (level * blurred_std).powi(2);
        let mut total = 0.0;
        for &seed in &seeds {
            let noisy = add_noise(&blurred.view(), level, Some(seed)).unwrap();
            assert!(
                noisy.iter().all(|&v| v > 0 && v < 255),
                "noise reached the clamp at level {level}"
            );
            total += metrics::bsnr(&blurred.view(), &noisy.view(), noise_variance).unwrap();
        }
        averages.push(total / seeds.len() as f64);
    }

    for pair in averages.windows(2) {
        assert!(pair[1] < pair[0], "BSNR not decreasing: {averages:?}");
    }
    // Quantization bias vanishes as the noise dominates
    assert!(averages[3].abs() < 0.1, "BSNR at largest level {}", averages[3]);
}

#[test]
fn test_wiener_improves_blurred_image() {
    init_logging();
    let ideal = block_image(128, 16, 0, 200);
    let psf = small_psf();
    let options = TransformOptions::default();
    let blurred = blur(&ideal.view(), &psf.view(), options).unwrap();

    let ratio = noise_to_signal_ratio(&blurred.view()).unwrap();
    let alpha = 1e-3 / ratio;
    let restored = wiener_restore(&blurred.view(), &psf.view(), alpha, options).unwrap();

    let isnr = metrics::isnr(&ideal.view(), &blurred.view(), &restored.view()).unwrap();
    assert!(isnr > 0.0, "ISNR {isnr} dB");
}

#[test]
fn test_spatial_and_frequency_blur_agree_in_interior() {
    let image = textured_image(40, 40, 21);
    let weights = array![[1.0, 2.0, 1.0], [2.0, 5.0, 2.0], [1.0, 2.0, 1.0]] / 17.0;

    let spatial =
        convolve2d_quantized(&image.view(), &FilterKernel::new(weights.clone()).unwrap()).unwrap();
    let spectral = blur(&image.view(), &weights.view(), TransformOptions::default()).unwrap();

    // Frequency-domain blur is circular and offset by the kernel center
    for r in 1..39 {
        for c in 1..39 {
            let diff = (spatial[[r, c]] as i16 - spectral[[r + 1, c + 1]] as i16).abs();
            assert!(diff <= 1, "({r}, {c}): {} vs {}", spatial[[r, c]], spectral[[r + 1, c + 1]]);
        }
    }
}

#[test]
fn test_metric_degenerate_case() {
    let ideal = textured_image(16, 16, 4);
    let isnr = metrics::isnr(&ideal.view(), &ideal.view(), &ideal.view()).unwrap();
    assert!(isnr.is_nan());
}

#[test]
fn test_experiment_with_small_psf() {
    init_logging();
    let ideal = block_image(64, 8, 30, 220);
    let config = ExperimentConfig {
        psf: PsfConfig {
            size: Some(GridSize::new(5, 5)),
            sigma: 1.0,
            ..PsfConfig::default()
        },
        relative_noise: 0.05,
        alphas: vec![1e-3, 1e-2, 1e-1],
        seed: Some(2024),
        ..ExperimentConfig::default()
    };

    let report = run_experiment(&ideal.view(), &config).unwrap();
    assert_eq!(report.restorations.len(), 3);
    assert_eq!(report.noisy, {
        let again = run_experiment(&ideal.view(), &config).unwrap();
        again.noisy
    });
    for restoration in &report.restorations {
        assert!(restoration.bsnr.is_finite(), "alpha {}", restoration.alpha);
        assert!(restoration.isnr.is_finite(), "alpha {}", restoration.alpha);
    }
}
