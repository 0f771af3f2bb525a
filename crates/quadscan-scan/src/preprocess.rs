// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing — turns a raw colour photo into a clean intensity image for
// edge detection. Never resizes, so coordinates stay in the input's space.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::equalize_histogram;
use imageproc::filter::{gaussian_blur_f32, median_filter};
use quadscan_core::{ContrastMode, Result, ScanConfig, ScanError};
use tracing::{debug, instrument};

/// Lower percentile mapped to black by the contrast stretch.
const STRETCH_LOW_PERCENTILE: f64 = 0.01;
/// Upper percentile mapped to white by the contrast stretch.
const STRETCH_HIGH_PERCENTILE: f64 = 0.99;

/// Reject images with no pixels.
pub fn ensure_non_empty(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanError::InvalidInput(format!(
            "image has zero area ({width}x{height})"
        )));
    }
    Ok(())
}

/// Grayscale, denoise, normalize contrast, then blur.
///
/// The output has exactly the input's dimensions.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn preprocess(image: &DynamicImage, config: &ScanConfig) -> Result<GrayImage> {
    ensure_non_empty(image.width(), image.height())?;

    let gray = image.to_luma8();

    let denoised = if config.denoise_radius > 0 {
        median_filter(&gray, config.denoise_radius, config.denoise_radius)
    } else {
        gray
    };

    let normalized = match config.contrast {
        ContrastMode::Stretch => stretch_contrast(&denoised),
        ContrastMode::Equalize => equalize_histogram(&denoised),
    };

    let blurred = gaussian_blur_f32(&normalized, config.blur_sigma);
    debug!(
        denoise_radius = config.denoise_radius,
        contrast = ?config.contrast,
        blur_sigma = config.blur_sigma,
        "Preprocessing complete"
    );
    Ok(blurred)
}

/// Linearly stretch the 1st..99th percentile range onto 0..255.
///
/// Flat images (no spread between the percentiles) are returned unchanged.
pub fn stretch_contrast(gray: &GrayImage) -> GrayImage {
    let histogram = histogram(gray);
    let total = gray.width() as u64 * gray.height() as u64;
    let low = percentile(&histogram, total, STRETCH_LOW_PERCENTILE);
    let high = percentile(&histogram, total, STRETCH_HIGH_PERCENTILE);
    if high <= low {
        return gray.clone();
    }

    let span = (high - low) as f32;
    let mut lut = [0u8; 256];
    for (value, slot) in lut.iter_mut().enumerate() {
        let scaled = (value as f32 - low as f32) * 255.0 / span;
        *slot = scaled.round().clamp(0.0, 255.0) as u8;
    }
    debug!(low, high, "Contrast stretch range");

    let mut output = gray.clone();
    for pixel in output.pixels_mut() {
        *pixel = Luma([lut[pixel.0[0] as usize]]);
    }
    output
}

/// 256-bin intensity histogram.
pub fn histogram(gray: &GrayImage) -> [u64; 256] {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }
    histogram
}

/// Smallest intensity whose cumulative count reaches `fraction` of `total`.
pub fn percentile(histogram: &[u64; 256], total: u64, fraction: f64) -> u8 {
    let target = ((total as f64) * fraction).ceil().max(1.0) as u64;
    let mut cumulative = 0u64;
    for (value, &count) in histogram.iter().enumerate() {
        cumulative += count;
        if cumulative >= target {
            return value as u8;
        }
    }
    255
}
