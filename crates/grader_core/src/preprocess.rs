//! Image preprocessing
//!
//! Classical cleanup applied to a scanned answer sheet before OCR:
//! - bounded downscale (longest side <= 1600 px)
//! - grayscale conversion
//! - median-filter denoise
//! - histogram equalization
//! - Hough-based deskew for slightly tilted scans

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::equalize_histogram;
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use imageproc::hough::{detect_lines, LineDetectionOptions};
use std::path::Path;

use crate::error::GraderError;

/// Longest allowed image side after loading
const MAX_SIDE: u32 = 1600;
/// Skew angles outside this window (degrees) are ignored
const MAX_SKEW_DEGREES: f64 = 20.0;
/// Tilts below this are not worth a rotation pass
const MIN_SKEW_DEGREES: f64 = 0.5;

/// Load an answer-sheet image and prepare it for OCR.
///
/// Fails with [`GraderError::ImageLoad`] when the file is missing or not a
/// decodable raster image; this aborts the run before any OCR or grading.
pub fn load_and_preprocess(path: &Path) -> Result<GrayImage, GraderError> {
    let img = image::open(path).map_err(|source| GraderError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(preprocess(&img))
}

/// Preprocess an already-loaded image.
pub fn preprocess(input: &DynamicImage) -> GrayImage {
    let bounded = resize_max(input, MAX_SIDE);
    let gray = bounded.to_luma8();
    let denoised = median_filter(&gray, 1, 1);
    let equalized = equalize_histogram(&denoised);
    deskew(&equalized)
}

/// Downscale keeping aspect ratio so the longest side is at most `max_side`.
/// Images already within bounds are returned unchanged.
fn resize_max(input: &DynamicImage, max_side: u32) -> DynamicImage {
    if input.width().max(input.height()) <= max_side {
        return input.clone();
    }
    input.resize(max_side, max_side, FilterType::Triangle)
}

/// Straighten a slightly tilted scan.
///
/// Estimates the text angle from near-horizontal Hough lines over a Canny
/// edge map and rotates by the median. Returns the input unchanged when no
/// usable lines are found or the tilt is below the dead band.
fn deskew(input: &GrayImage) -> GrayImage {
    let edges = canny(input, 50.0, 150.0);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: 200,
            suppression_radius: 8,
        },
    );

    // Horizontal text lines have a normal near 90 degrees
    let mut angles: Vec<f64> = lines
        .iter()
        .take(100)
        .map(|line| f64::from(line.angle_in_degrees) - 90.0)
        .filter(|angle| angle.abs() <= MAX_SKEW_DEGREES)
        .collect();

    if angles.is_empty() {
        return input.clone();
    }

    angles.sort_by(|a, b| a.total_cmp(b));
    let median = angles[angles.len() / 2];
    if median.abs() < MIN_SKEW_DEGREES {
        return input.clone();
    }

    rotate_about_center(
        input,
        (-median.to_radians()) as f32,
        Interpolation::Bilinear,
        Luma([255u8]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_preprocess_keeps_dimensions_for_small_images() {
        let img = ImageBuffer::from_pixel(120, 80, image::Rgb([200u8, 200u8, 200u8]));
        let processed = preprocess(&DynamicImage::ImageRgb8(img));
        assert_eq!(processed.dimensions(), (120, 80));
    }

    #[test]
    fn test_resize_bounds_longest_side() {
        let img = ImageBuffer::from_pixel(3200, 1600, image::Rgb([255u8, 255u8, 255u8]));
        let bounded = resize_max(&DynamicImage::ImageRgb8(img), 1600);
        assert_eq!(bounded.width(), 1600);
        assert_eq!(bounded.height(), 800);
    }

    #[test]
    fn test_deskew_noop_on_featureless_image() {
        let img: GrayImage = ImageBuffer::from_pixel(100, 100, Luma([255u8]));
        let straightened = deskew(&img);
        assert_eq!(straightened, img);
    }

    #[test]
    fn test_load_missing_image_is_image_load_error() {
        let result = load_and_preprocess(Path::new("no/such/scan.png"));
        match result {
            Err(GraderError::ImageLoad { path, .. }) => {
                assert!(path.ends_with("scan.png"));
            }
            other => panic!("expected ImageLoad, got {other:?}"),
        }
    }
}
