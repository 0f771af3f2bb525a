// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One scan from file to file.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError};
use quadscan_core::{OrderedCorners, Result, ScanConfig, ScanError};
use quadscan_scan::{
    DocumentScanner, ImageprocPrimitives, ScanOutcome, draw_corners, rotate_quarter, sharpen,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::Cli;

/// What happened, for `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub detected: bool,
    pub corners: Option<OrderedCorners>,
    pub width: u32,
    pub height: u32,
}

/// Load, scan, and write the result described by `cli`.
pub fn run(cli: &Cli) -> Result<ScanReport> {
    let config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    let scanner = DocumentScanner::new(ImageprocPrimitives::new(), config)?;

    let photo = image::open(&cli.input).map_err(image_error)?;
    info!(
        path = %cli.input.display(),
        width = photo.width(),
        height = photo.height(),
        "Image loaded for scanning"
    );

    let page = match scanner.scan(&photo) {
        Ok(ScanOutcome::Rectified(page)) => page,
        Ok(ScanOutcome::NoDocument { original }) => return write_original(cli, original),
        Err(ScanError::DegenerateGeometry(detail)) => {
            warn!(%detail, "Detected outline collapsed; keeping the original");
            return write_original(cli, &photo);
        }
        Err(err) => return Err(err),
    };

    if let Some(preview) = &cli.preview {
        let outlined = DynamicImage::ImageRgba8(draw_corners(&photo, &page.corners));
        save(&outlined, preview)?;
        info!(path = %preview.display(), "Preview written");
    }

    let corners = page.corners;
    let mut result = page.into_dynamic();
    if cli.sharpen {
        result = DynamicImage::ImageLuma8(sharpen(&result));
    }
    let result = rotate_quarter(result, cli.rotate)?;
    save(&result, &cli.output)?;
    info!(path = %cli.output.display(), "Rectified page written");

    Ok(ScanReport {
        input: cli.input.clone(),
        output: cli.output.clone(),
        detected: true,
        corners: Some(corners),
        width: result.width(),
        height: result.height(),
    })
}

fn write_original(cli: &Cli, original: &DynamicImage) -> Result<ScanReport> {
    save(original, &cli.output)?;
    Ok(ScanReport {
        input: cli.input.clone(),
        output: cli.output.clone(),
        detected: false,
        corners: None,
        width: original.width(),
        height: original.height(),
    })
}

/// Save in the format implied by the extension. JPEG has no alpha channel,
/// so it gets an RGB copy.
fn save(image: &DynamicImage, path: &Path) -> Result<()> {
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));
    let saved = if is_jpeg {
        DynamicImage::ImageRgb8(image.to_rgb8()).save(path)
    } else {
        image.save(path)
    };
    saved.map_err(image_error)
}

fn image_error(err: ImageError) -> ScanError {
    match err {
        ImageError::IoError(io) => ScanError::Io(io),
        other => ScanError::ImageError(other.to_string()),
    }
}
