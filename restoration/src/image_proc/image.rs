//! Grayscale image file I/O and spectrum visualization.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use ndarray::{Array2, ArrayView2};
use thiserror::Error;

use super::quantize::{quantize, IntensityImage};
use crate::fourier::{Spectrum, TransformOptions};

/// Errors raised while reading or writing image files.
#[derive(Error, Debug)]
pub enum ImageIoError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Load an image file as 8-bit grayscale.
///
/// Color images are converted to luma by the `image` crate; the returned array
/// is indexed `[row, col]`.
pub fn load_gray_image(path: &Path) -> Result<IntensityImage, ImageIoError> {
    let img = image::open(path)
        .map_err(|source| ImageIoError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();
    Ok(gray_image_to_array2(&img))
}

/// Save an intensity image; the format follows the file extension.
pub fn save_gray_image(arr: &ArrayView2<u8>, path: &Path) -> Result<(), ImageIoError> {
    array2_to_gray_image(arr)
        .save(path)
        .map_err(|source| ImageIoError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Saved {}x{} image to {}", arr.ncols(), arr.nrows(), path.display());
    Ok(())
}

/// Converts an ndarray view to an `image::GrayImage`.
///
/// Array indices `[y, x]` map to pixel coordinates `(x, y)`; array dimensions
/// are `(height, width)` while image dimensions are `(width, height)`.
pub fn array2_to_gray_image(arr: &ArrayView2<u8>) -> GrayImage {
    let (height, width) = arr.dim();
    let mut img = GrayImage::new(width as u32, height as u32);

    for ((y, x), &value) in arr.indexed_iter() {
        img.put_pixel(x as u32, y as u32, Luma([value]));
    }

    img
}

/// Converts an `image::GrayImage` to an array indexed `[row, col]`.
pub fn gray_image_to_array2(img: &GrayImage) -> IntensityImage {
    let (width, height) = img.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        img.get_pixel(x as u32, y as u32)[0]
    })
}

/// Render a spectrum's log-magnitude as an intensity image.
///
/// Computes `ln(1 + |F|)`, rescales so the largest value maps to 255, and
/// moves the zero-frequency term to the middle unless the spectrum is already
/// centered (as stated by `options`).
pub fn spectrum_magnitude_image(spectrum: &Spectrum, options: TransformOptions) -> IntensityImage {
    let centered = if options.centered {
        spectrum.clone()
    } else {
        crate::fourier::center_spectrum(&spectrum.view())
    };

    let log_magnitude = centered.mapv(|v| v.norm().ln_1p());
    let peak = log_magnitude.iter().copied().fold(0.0_f64, f64::max);
    if peak <= 0.0 {
        return Array2::zeros(log_magnitude.dim());
    }
    log_magnitude.mapv(|v| quantize(v * 255.0 / peak))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::forward_transform;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_array_image_layout() {
        let arr = array![[1u8, 2, 3], [4, 5, 6]];
        let img = array2_to_gray_image(&arr.view());
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 0)[0], 3);
        assert_eq!(img.get_pixel(0, 1)[0], 4);
        assert_eq!(gray_image_to_array2(&img), arr);
    }

    #[test]
    fn test_png_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        let arr = Array2::from_shape_fn((17, 23), |(r, c)| (r * 10 + c) as u8);

        save_gray_image(&arr.view(), &path).unwrap();
        let loaded = load_gray_image(&path).unwrap();
        assert_eq!(loaded, arr);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.png");
        match load_gray_image(&missing) {
            Err(ImageIoError::Read { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn test_spectrum_image_peak_at_center() {
        let arr = Array2::from_shape_fn((16, 16), |(r, c)| ((r * 3 + c * 5) % 7 * 20) as u8);
        let options = TransformOptions::default();
        let spectrum = forward_transform(&arr.view(), None, options).unwrap();
        let img = spectrum_magnitude_image(&spectrum, options);

        assert_eq!(img.dim(), (16, 16));
        assert_eq!(img[[8, 8]], 255);
    }

    #[test]
    fn test_spectrum_image_respects_centered_flag() {
        let arr = Array2::from_shape_fn((8, 8), |(r, c)| (r + c) as u8 * 10);
        let options = TransformOptions::new(true, false);
        let spectrum = forward_transform(&arr.view(), None, options).unwrap();
        let img = spectrum_magnitude_image(&spectrum, options);
        assert_eq!(img[[4, 4]], 255);
    }

    #[test]
    fn test_zero_spectrum_is_black() {
        let spectrum = Spectrum::zeros((4, 4));
        let img = spectrum_magnitude_image(&spectrum, TransformOptions::default());
        assert!(img.iter().all(|&v| v == 0));
    }
}
