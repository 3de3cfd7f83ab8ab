//! Image statistics and restoration quality metrics.
//!
//! All statistics are population statistics (divide by `rows * cols`).
//! BSNR and ISNR are plain ratios in decibels; degenerate inputs are not
//! special-cased:
//!
//! - `isnr(ideal, ideal, ideal)` is `0 / 0`, i.e. `NaN`
//! - `isnr(ideal, degraded, ideal)` with `degraded != ideal` is `+inf`
//! - `bsnr` with `noise_variance == 0` is `+inf` (or `NaN` if the images match)

use ndarray::ArrayView2;
use shared::GridSize;
use thiserror::Error;

/// Errors raised by metric computations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricError {
    #[error("Statistics of an empty grid are undefined")]
    EmptyGrid,
    #[error("Grid sizes differ: {0} vs {1}")]
    SizeMismatch(GridSize, GridSize),
}

fn check_nonempty<T>(grid: &ArrayView2<T>) -> Result<usize, MetricError> {
    match grid.len() {
        0 => Err(MetricError::EmptyGrid),
        n => Ok(n),
    }
}

fn check_pair<A, B>(a: &ArrayView2<A>, b: &ArrayView2<B>) -> Result<usize, MetricError> {
    let (size_a, size_b) = (GridSize::of(a), GridSize::of(b));
    if size_a != size_b {
        return Err(MetricError::SizeMismatch(size_a, size_b));
    }
    check_nonempty(a)
}

/// Arithmetic mean of all cells
pub fn mean<T: Copy + Into<f64>>(grid: &ArrayView2<T>) -> Result<f64, MetricError> {
    let n = check_nonempty(grid)?;
    let sum: f64 = grid.iter().map(|&v| Into::<f64>::into(v)).sum();
    Ok(sum / n as f64)
}

/// Population variance of all cells
pub fn variance<T: Copy + Into<f64>>(grid: &ArrayView2<T>) -> Result<f64, MetricError> {
    let mu = mean(grid)?;
    let sum_sq: f64 = grid
        .iter()
        .map(|&v| {
            let d = Into::<f64>::into(v) - mu;
            d * d
        })
        .sum();
    Ok(sum_sq / grid.len() as f64)
}

/// Population standard deviation of all cells
pub fn std_dev<T: Copy + Into<f64>>(grid: &ArrayView2<T>) -> Result<f64, MetricError> {
    Ok(variance(grid)?.sqrt())
}

/// Sum of squared differences between two equally sized grids
pub fn sum_squared_error<A, B>(a: &ArrayView2<A>, b: &ArrayView2<B>) -> Result<f64, MetricError>
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
{
    check_pair(a, b)?;
    Ok(a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = Into::<f64>::into(x) - Into::<f64>::into(y);
            d * d
        })
        .sum())
}

/// Mean of squared differences between two equally sized grids
pub fn mean_squared_error<A, B>(a: &ArrayView2<A>, b: &ArrayView2<B>) -> Result<f64, MetricError>
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
{
    let n = check_pair(a, b)?;
    Ok(sum_squared_error(a, b)? / n as f64)
}

/// Blurred-signal-to-noise ratio in dB.
///
/// `10 * log10(mse(reference, restored) / noise_variance)`
pub fn bsnr<A, B>(
    reference: &ArrayView2<A>,
    restored: &ArrayView2<B>,
    noise_variance: f64,
) -> Result<f64, MetricError>
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
{
    let mse = mean_squared_error(reference, restored)?;
    Ok(10.0 * (mse / noise_variance).log10())
}

/// Improvement in signal-to-noise ratio in dB.
///
/// `10 * log10(sse(ideal, degraded) / sse(ideal, restored))`. Positive values
/// mean the restoration is closer to the ideal image than the degraded input.
pub fn isnr<A, B, C>(
    ideal: &ArrayView2<A>,
    degraded: &ArrayView2<B>,
    restored: &ArrayView2<C>,
) -> Result<f64, MetricError>
where
    A: Copy + Into<f64>,
    B: Copy + Into<f64>,
    C: Copy + Into<f64>,
{
    let before = sum_squared_error(ideal, degraded)?;
    let after = sum_squared_error(ideal, restored)?;
    Ok(10.0 * (before / after).log10())
}
