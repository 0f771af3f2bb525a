// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner configuration: every tunable threshold of the detection pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, ScanError};

/// How the preprocessor normalizes contrast before edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastMode {
    /// Linear stretch between the 1st and 99th intensity percentiles.
    Stretch,
    /// Global histogram equalization.
    Equalize,
}

/// Thresholds and tuning parameters for one `DocumentScanner`.
///
/// Defaults accept strongly skewed pages; tighten the angle and aspect
/// bounds to reject more false positives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Longer-side cap applied before detection. Larger inputs are
    /// downscaled for detection only; rectification samples the original.
    pub max_input_dimension: u32,
    /// Median filter radius used for denoising (0 disables it).
    pub denoise_radius: u32,
    /// Contrast normalization strategy.
    pub contrast: ContrastMode,
    /// Gaussian blur sigma applied last in preprocessing.
    pub blur_sigma: f32,
    /// Descending scale factors for multi-scale edge detection.
    pub edge_scales: Vec<f32>,
    /// Multiplier around the median for the adaptive Canny thresholds.
    pub threshold_sigma: f32,
    /// Radius of the closing structuring element (0 disables closing).
    pub closing_radius: u8,
    /// Smallest accepted contour area as a fraction of the image area.
    pub min_area_ratio: f64,
    /// Largest accepted contour area as a fraction of the image area.
    pub max_area_ratio: f64,
    /// Polygon simplification tolerance as a fraction of the perimeter.
    pub approx_epsilon_ratio: f64,
    /// Smallest acceptable interior angle, in degrees.
    pub min_corner_angle: f64,
    /// Lower bound on width / height of a candidate quadrilateral.
    pub min_aspect_ratio: f64,
    /// Upper bound on width / height of a candidate quadrilateral.
    pub max_aspect_ratio: f64,
    /// RGBA fill for output pixels that map outside the source.
    pub border_color: [u8; 4],
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_input_dimension: 2000,
            denoise_radius: 1,
            contrast: ContrastMode::Stretch,
            blur_sigma: 1.0,
            edge_scales: vec![1.0, 0.75, 0.5, 0.25],
            threshold_sigma: 0.33,
            closing_radius: 1,
            min_area_ratio: 0.10,
            max_area_ratio: 0.98,
            approx_epsilon_ratio: 0.02,
            min_corner_angle: 30.0,
            min_aspect_ratio: 0.1,
            max_aspect_ratio: 10.0,
            border_color: [255, 255, 255, 255],
        }
    }
}

impl ScanConfig {
    /// Load a JSON configuration file. Missing fields take their defaults.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(?config, "Scan configuration loaded");
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_input_dimension == 0 {
            return Err(ScanError::Config(
                "max_input_dimension must be positive".into(),
            ));
        }
        if !(self.blur_sigma > 0.0) {
            return Err(ScanError::Config("blur_sigma must be positive".into()));
        }
        if self.edge_scales.is_empty() {
            return Err(ScanError::Config("edge_scales must not be empty".into()));
        }
        if self
            .edge_scales
            .iter()
            .any(|&s| !(s > 0.0 && s <= 1.0))
        {
            return Err(ScanError::Config(
                "edge_scales must lie in (0, 1]".into(),
            ));
        }
        if self.edge_scales.windows(2).any(|w| w[1] >= w[0]) {
            return Err(ScanError::Config(
                "edge_scales must be strictly descending".into(),
            ));
        }
        if !(self.threshold_sigma >= 0.0 && self.threshold_sigma < 1.0) {
            return Err(ScanError::Config(
                "threshold_sigma must lie in [0, 1)".into(),
            ));
        }
        if !(0.0 <= self.min_area_ratio
            && self.min_area_ratio < self.max_area_ratio
            && self.max_area_ratio <= 1.0)
        {
            return Err(ScanError::Config(format!(
                "area band [{}, {}] is not a valid sub-range of [0, 1]",
                self.min_area_ratio, self.max_area_ratio
            )));
        }
        if !(self.approx_epsilon_ratio > 0.0 && self.approx_epsilon_ratio < 1.0) {
            return Err(ScanError::Config(
                "approx_epsilon_ratio must lie in (0, 1)".into(),
            ));
        }
        if !(self.min_corner_angle > 0.0 && self.min_corner_angle < 180.0) {
            return Err(ScanError::Config(
                "min_corner_angle must lie in (0, 180)".into(),
            ));
        }
        if !(self.min_aspect_ratio > 0.0 && self.min_aspect_ratio < self.max_aspect_ratio) {
            return Err(ScanError::Config(format!(
                "aspect band [{}, {}] is inverted or non-positive",
                self.min_aspect_ratio, self.max_aspect_ratio
            )));
        }
        Ok(())
    }
}
