// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multi-scale edge detection.
//
// A single fixed Canny threshold fails on pages with a shadow across them or
// glare. Each scale produces its own candidate edge map with thresholds
// derived from that scale's gray-level statistics; the maps are OR-fused and
// a morphological closing bridges small gaps.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};
use quadscan_core::{Result, ScanConfig};
use tracing::{debug, instrument};

use crate::preprocess::{ensure_non_empty, histogram, percentile};
use crate::primitives::VisionPrimitives;

/// Thresholds never drop below this, so flat regions (zero gradient) are
/// never marked as edges.
const MIN_EDGE_THRESHOLD: f32 = 1.0;

/// Scaled images smaller than this on either side are skipped.
const MIN_SCALED_SIDE: u32 = 8;

/// Low/high hysteresis thresholds derived from the median intensity.
///
/// `low = (1 - sigma) * median`, `high = (1 + sigma) * median`, both clipped
/// to the 8-bit range.
pub fn adaptive_thresholds(gray: &GrayImage, sigma: f32) -> (f32, f32) {
    let total = gray.width() as u64 * gray.height() as u64;
    let median = percentile(&histogram(gray), total, 0.5) as f32;
    let high = ((1.0 + sigma) * median).clamp(MIN_EDGE_THRESHOLD, 255.0);
    let low = ((1.0 - sigma) * median).clamp(0.0, high);
    (low, high)
}

/// Edge map for one scale, returned at the source resolution.
///
/// Returns `None` if the scaled image would be too small to be useful.
pub fn detect_at_scale<P: VisionPrimitives + ?Sized>(
    primitives: &P,
    gray: &GrayImage,
    scale: f32,
    sigma: f32,
) -> Option<GrayImage> {
    let (width, height) = gray.dimensions();
    let scaled_w = ((width as f32 * scale).round() as u32).max(1);
    let scaled_h = ((height as f32 * scale).round() as u32).max(1);

    if (scaled_w, scaled_h) == (width, height) {
        let (low, high) = adaptive_thresholds(gray, sigma);
        debug!(scale, low, high, "Edge thresholds");
        return Some(primitives.detect_edges(gray, low, high));
    }

    if scaled_w < MIN_SCALED_SIDE || scaled_h < MIN_SCALED_SIDE {
        debug!(scale, scaled_w, scaled_h, "Scale too small; skipped");
        return None;
    }

    let scaled = imageops::resize(gray, scaled_w, scaled_h, FilterType::Triangle);
    let (low, high) = adaptive_thresholds(&scaled, sigma);
    debug!(scale, scaled_w, scaled_h, low, high, "Edge thresholds");
    let edges = primitives.detect_edges(&scaled, low, high);
    Some(imageops::resize(&edges, width, height, FilterType::Nearest))
}

/// Logical OR of equally sized binary maps.
pub fn fuse(width: u32, height: u32, maps: &[GrayImage]) -> GrayImage {
    let mut fused = GrayImage::new(width, height);
    for map in maps {
        for (out, src) in fused.pixels_mut().zip(map.pixels()) {
            if src.0[0] > 0 {
                *out = Luma([255]);
            }
        }
    }
    fused
}

/// Dilate then erode with the same square structuring element.
pub fn close(binary: &GrayImage, radius: u8) -> GrayImage {
    if radius == 0 {
        return binary.clone();
    }
    erode(&dilate(binary, Norm::LInf, radius), Norm::LInf, radius)
}

/// Run every configured scale, fuse, and close.
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn detect_edges<P: VisionPrimitives + ?Sized>(
    primitives: &P,
    gray: &GrayImage,
    config: &ScanConfig,
) -> Result<GrayImage> {
    let (width, height) = gray.dimensions();
    ensure_non_empty(width, height)?;

    let maps: Vec<GrayImage> = config
        .edge_scales
        .iter()
        .filter_map(|&scale| detect_at_scale(primitives, gray, scale, config.threshold_sigma))
        .collect();

    let fused = fuse(width, height, &maps);
    let closed = close(&fused, config.closing_radius);
    debug!(
        scales_used = maps.len(),
        edge_pixels = closed.pixels().filter(|p| p.0[0] > 0).count(),
        "Edge maps fused"
    );
    Ok(closed)
}
