//! Image degradation and Wiener restoration tool
//!
//! Blurs and corrupts grayscale images, restores them for a sweep of
//! regularization weights, and reports BSNR/ISNR for every restoration.
//!
//! # Usage
//!
//! ```bash
//! # Full experiment with defaults (full-size PSF, sigma 5, 10% noise)
//! cargo run --release --bin restore -- run lena.png cameraman.png -o out/
//!
//! # Small PSF, fixed seed, custom alpha sweep
//! cargo run --release --bin restore -- run lena.png --psf-size 5 --sigma 1.0 \
//!     --seed 7 --alpha 0.001 --alpha 0.01
//!
//! # Experiment described by a JSON file
//! cargo run --release --bin restore -- run lena.png --config experiment.json
//!
//! # Flags win over the file; `--centered=false` turns off a centered config
//! cargo run --release --bin restore -- run lena.png --config experiment.json --centered=false
//!
//! # Forward + inverse DFT sanity check
//! cargo run --release --bin restore -- roundtrip lena.png --centered --normalized
//!
//! # Log-magnitude spectrum
//! cargo run --release --bin restore -- spectrum lena.png
//! ```
//!
//! # Commands
//!
//! ## `run` - Degrade and restore
//! - Saves `<stem>_blurred`, `<stem>_noisy_blurred` and `<stem>_wiener<i>`
//!   images next to each other in the output directory
//! - Prints BSNR and ISNR for every alpha
//!
//! ## `roundtrip` - Transform round trip
//! - Saves `<stem>_inversed_original`, which should match the input exactly
//!
//! ## `spectrum` - Spectrum view
//! - Saves `<stem>_spectrum`, the centered `ln(1 + |F|)` scaled to 0..255

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use ndarray::ArrayView2;
use restoration::config::ExperimentConfig;
use restoration::fourier::TransformOptions;
use restoration::image_proc::image::{load_gray_image, save_gray_image};
use restoration::image_proc::psf::PsfNormalization;
use restoration::pipeline::{run_experiment, spectrum_image, transform_round_trip};
use shared::GridSize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Transform convention flags. Each accepts an optional `true`/`false`
/// (`--centered` alone means `true`); an omitted flag keeps the config value.
#[derive(Args, Clone, Default)]
struct TransformArgs {
    /// Put the zero frequency at the grid center
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    centered: Option<bool>,

    /// Use orthonormal scaling on both transform directions
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    normalized: Option<bool>,
}

impl TransformArgs {
    /// `base` with every given flag applied on top
    fn apply(&self, base: TransformOptions) -> TransformOptions {
        TransformOptions::new(
            self.centered.unwrap_or(base.centered),
            self.normalized.unwrap_or(base.normalized),
        )
    }

    fn options(&self) -> TransformOptions {
        self.apply(TransformOptions::default())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Blur, add noise, and restore with a sweep of Wiener weights
    Run {
        /// Input images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// JSON experiment file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Square PSF window size in pixels (default: full image)
        #[arg(long)]
        psf_size: Option<usize>,

        /// PSF standard deviation in pixels
        #[arg(long)]
        sigma: Option<f64>,

        /// Normalize the PSF by 2*pi*sigma^2 instead of its sum
        #[arg(long)]
        pi_normalized: bool,

        /// Noise standard deviation relative to the blurred image's
        #[arg(short, long)]
        noise: Option<f64>,

        /// Wiener regularization weight; repeat for a sweep
        #[arg(short, long = "alpha")]
        alphas: Vec<f64>,

        /// Noise seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Image file extension for outputs
        #[arg(long, default_value = "png")]
        format: String,

        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Forward and inverse DFT, saving the reconstructed image
    Roundtrip {
        /// Input images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Image file extension for outputs
        #[arg(long, default_value = "png")]
        format: String,

        #[command(flatten)]
        transform: TransformArgs,
    },

    /// Save the log-magnitude spectrum of each image
    Spectrum {
        /// Input images
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Image file extension for outputs
        #[arg(long, default_value = "png")]
        format: String,
    },
}

/// Output path `<dir>/<stem>_<suffix>.<format>`
fn output_path(dir: &Path, input: &Path, suffix: &str, format: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    dir.join(format!("{stem}_{suffix}.{format}"))
}

#[derive(Default)]
struct RunOverrides {
    psf_size: Option<usize>,
    sigma: Option<f64>,
    pi_normalized: bool,
    noise: Option<f64>,
    alphas: Vec<f64>,
    seed: Option<u64>,
    transform: TransformArgs,
}

fn build_config(
    config_path: Option<&Path>,
    overrides: RunOverrides,
) -> Result<ExperimentConfig, Box<dyn Error>> {
    let mut config = match config_path {
        Some(path) => ExperimentConfig::load_from_file(path)?,
        None => ExperimentConfig::default(),
    };

    if let Some(size) = overrides.psf_size {
        config.psf.size = Some(GridSize::new(size, size));
    }
    if let Some(sigma) = overrides.sigma {
        config.psf.sigma = sigma;
    }
    if overrides.pi_normalized {
        config.psf.normalization = PsfNormalization::Pi;
    }
    if let Some(noise) = overrides.noise {
        config.relative_noise = noise;
    }
    if !overrides.alphas.is_empty() {
        config.alphas = overrides.alphas;
    }
    if overrides.seed.is_some() {
        config.seed = overrides.seed;
    }
    config.transform = overrides.transform.apply(config.transform);

    config.validate()?;
    Ok(config)
}

fn save(
    image: &ArrayView2<u8>,
    dir: &Path,
    input: &Path,
    suffix: &str,
    format: &str,
) -> Result<(), Box<dyn Error>> {
    save_gray_image(image, &output_path(dir, input, suffix, format))?;
    Ok(())
}

fn run(
    inputs: &[PathBuf],
    output_dir: &Path,
    format: &str,
    config: &ExperimentConfig,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(output_dir)?;

    for input in inputs {
        let ideal = load_gray_image(input)?;
        println!(
            "{} ({}x{})",
            input.display(),
            ideal.nrows(),
            ideal.ncols()
        );

        let report = run_experiment(&ideal.view(), config)?;
        save(&report.blurred.view(), output_dir, input, "blurred", format)?;
        save(&report.noisy.view(), output_dir, input, "noisy_blurred", format)?;

        println!("  estimated noise variance: {:.4}", report.noise_variance);
        println!("  {:>10}\t{:>10}\t{:>10}", "alpha", "BSNR [dB]", "ISNR [dB]");
        for (i, restoration) in report.restorations.iter().enumerate() {
            save(
                &restoration.image.view(),
                output_dir,
                input,
                &format!("wiener{i}"),
                format,
            )?;
            println!(
                "  {:>10.0e}\t{:>10.4}\t{:>10.4}",
                restoration.alpha, restoration.bsnr, restoration.isnr
            );
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            inputs,
            output_dir,
            config,
            psf_size,
            sigma,
            pi_normalized,
            noise,
            alphas,
            seed,
            format,
            transform,
        } => {
            let config = build_config(
                config.as_deref(),
                RunOverrides {
                    psf_size,
                    sigma,
                    pi_normalized,
                    noise,
                    alphas,
                    seed,
                    transform,
                },
            )?;
            log::debug!("Experiment config: {config:?}");
            run(&inputs, &output_dir, &format, &config)?;
        }

        Commands::Roundtrip {
            inputs,
            output_dir,
            format,
            transform,
        } => {
            std::fs::create_dir_all(&output_dir)?;
            for input in &inputs {
                let image = load_gray_image(input)?;
                let restored = transform_round_trip(&image.view(), transform.options())?;
                let mismatched = restored
                    .iter()
                    .zip(image.iter())
                    .filter(|(a, b)| a != b)
                    .count();
                println!(
                    "{}: {mismatched} of {} pixels differ after round trip",
                    input.display(),
                    image.len()
                );
                save(&restored.view(), &output_dir, input, "inversed_original", &format)?;
            }
        }

        Commands::Spectrum {
            inputs,
            output_dir,
            format,
        } => {
            std::fs::create_dir_all(&output_dir)?;
            for input in &inputs {
                let image = load_gray_image(input)?;
                let spectrum = spectrum_image(&image.view(), TransformOptions::default())?;
                save(&spectrum.view(), &output_dir, input, "spectrum", &format)?;
            }
        }
    }

    Ok(())
}
