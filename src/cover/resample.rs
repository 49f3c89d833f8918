//! Pixel resampling and thumbnail loading.
//!
//! Decoding and filtering are done by the `image` crate. Thumbnails that
//! cannot be read or decoded fall back to a flat placeholder so that the
//! album grid never shows a hole.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use rayon::prelude::*;

use super::fit::{FitError, compute_target_size};

/// Filter used for every resize (bilinear)
const FILTER: FilterType = FilterType::Triangle;

/// Placeholder fill color (mid grey, opaque)
const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([128, 128, 128, 255]);

/// Errors reading or decoding an image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Resample encoded image bytes to exactly `width x height`.
///
/// Accepts any format the `image` crate can sniff and returns PNG bytes.
/// A zero `width` or `height` is rejected before decoding.
pub fn resample(image_bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidSize { width, height });
    }

    let img = image::load_from_memory(image_bytes)?;
    let resized = img.resize_exact(width, height, FILTER);

    let mut out = Vec::new();
    resized.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}

/// Fit a decoded image into a `target` square, keeping its aspect ratio.
pub fn fit_image(img: &DynamicImage, target: u32) -> Result<DynamicImage, FitError> {
    let (width, height) = compute_target_size(img.width(), img.height(), target)?;
    Ok(img.resize_exact(width, height, FILTER))
}

/// An album icon ready for display.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    image: DynamicImage,
    placeholder: bool,
}

impl Thumbnail {
    /// Flat square used when the real cover is unavailable.
    pub fn placeholder(size: u32) -> Self {
        Self {
            image: DynamicImage::ImageRgba8(RgbaImage::from_pixel(size, size, PLACEHOLDER_COLOR)),
            placeholder: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// True if the cover could not be loaded.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Write the thumbnail as PNG.
    pub fn save_png(&self, path: &Path) -> Result<(), DecodeError> {
        self.image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

fn decode_file(path: &Path) -> Result<DynamicImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Load an image file and fit it into an `icon_size` square.
///
/// Unreadable or undecodable files yield a placeholder; only an invalid
/// `icon_size` is an error.
pub fn load_thumbnail(path: &Path, icon_size: u32) -> Result<Thumbnail, FitError> {
    // Validate the target up front so the placeholder path reports it too
    compute_target_size(1, 1, icon_size)?;

    match decode_file(path) {
        Ok(img) => Ok(Thumbnail {
            image: fit_image(&img, icon_size)?,
            placeholder: false,
        }),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Using placeholder cover");
            Ok(Thumbnail::placeholder(icon_size))
        }
    }
}

/// Load many thumbnails in parallel. Results keep the order of `paths`.
pub fn load_thumbnails(paths: &[PathBuf], icon_size: u32) -> Vec<Result<Thumbnail, FitError>> {
    paths
        .par_iter()
        .map(|path| load_thumbnail(path, icon_size))
        .collect()
}
