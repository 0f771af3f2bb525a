// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction and plausibility filtering.

use image::GrayImage;
use quadscan_core::{Contour, Result, ScanConfig};
use tracing::{debug, instrument};

use crate::preprocess::ensure_non_empty;
use crate::primitives::VisionPrimitives;

/// An external contour that survived the area filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateContour {
    pub contour: Contour,
    /// Enclosed area in pixels.
    pub area: f64,
    /// `area` divided by the image area.
    pub area_ratio: f64,
}

/// Whether `ratio` lies inside the configured band. Both bounds are inclusive.
pub fn area_ratio_in_band(ratio: f64, config: &ScanConfig) -> bool {
    ratio >= config.min_area_ratio && ratio <= config.max_area_ratio
}

/// Keep contours of plausible size, largest first.
///
/// Specks of noise fall below the band; a contour hugging the whole frame
/// falls above it. An empty result means no document, not an error.
pub fn filter_contours(
    contours: Vec<Contour>,
    image_width: u32,
    image_height: u32,
    config: &ScanConfig,
) -> Vec<CandidateContour> {
    let image_area = image_width as f64 * image_height as f64;
    let traced = contours.len();

    let mut kept: Vec<CandidateContour> = contours
        .into_iter()
        .filter(|c| c.len() >= 3)
        .filter_map(|contour| {
            let area = contour.area();
            let area_ratio = area / image_area;
            area_ratio_in_band(area_ratio, config).then_some(CandidateContour {
                contour,
                area,
                area_ratio,
            })
        })
        .collect();

    // Stable: equal areas keep tracing order.
    kept.sort_by(|a, b| b.area.total_cmp(&a.area));
    debug!(traced, kept = kept.len(), "Contours filtered by area ratio");
    kept
}

/// Trace external contours in `edges` and filter them.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn extract_candidates<P: VisionPrimitives + ?Sized>(
    primitives: &P,
    edges: &GrayImage,
    config: &ScanConfig,
) -> Result<Vec<CandidateContour>> {
    let (width, height) = edges.dimensions();
    ensure_non_empty(width, height)?;
    let contours = primitives.external_contours(edges);
    Ok(filter_contours(contours, width, height, config))
}
