// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanner — runs the detection and rectification stages in order.

use std::borrow::Cow;

use image::imageops::FilterType;
use image::{DynamicImage, Rgba};
use quadscan_core::{OrderedCorners, Result, ScanConfig, ScanError};
use tracing::{debug, info, instrument};

use crate::cancel::CancelFlag;
use crate::contours::extract_candidates;
use crate::corners::order_corners;
use crate::edges::detect_edges;
use crate::preprocess::{ensure_non_empty, preprocess};
use crate::primitives::{ImageprocPrimitives, VisionPrimitives};
use crate::quad::select_document;
use crate::rectify::{RectifiedPage, rectify};

/// Result of a scan that did not fail.
#[derive(Debug)]
pub enum ScanOutcome<'a> {
    /// A page was found and rectified.
    Rectified(RectifiedPage),
    /// No page-shaped boundary was found; `original` is the caller's image,
    /// untouched, for display alongside a retry prompt.
    NoDocument { original: &'a DynamicImage },
}

impl ScanOutcome<'_> {
    pub fn is_rectified(&self) -> bool {
        matches!(self, Self::Rectified(_))
    }

    /// The rectified page, if any.
    pub fn rectified(self) -> Option<RectifiedPage> {
        match self {
            Self::Rectified(page) => Some(page),
            Self::NoDocument { .. } => None,
        }
    }

    /// Treat "no document" as `ScanError::NoDocumentDetected`.
    pub fn into_result(self) -> Result<RectifiedPage> {
        self.rectified().ok_or(ScanError::NoDocumentDetected)
    }
}

/// Finds a photographed page and produces a de-skewed image of it.
///
/// The scanner holds only its configuration and the primitives handle it was
/// constructed with; each call owns all of its intermediate images, so one
/// scanner can serve concurrent scans from several threads.
///
/// ```ignore
/// let scanner = DocumentScanner::with_defaults();
/// match scanner.scan(&photo)? {
///     ScanOutcome::Rectified(page) => page.into_dynamic().save("page.png")?,
///     ScanOutcome::NoDocument { original } => show_retry(original),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentScanner<P: VisionPrimitives = ImageprocPrimitives> {
    primitives: P,
    config: ScanConfig,
}

impl DocumentScanner<ImageprocPrimitives> {
    /// A scanner on `imageproc` with the default thresholds.
    pub fn with_defaults() -> Self {
        Self {
            primitives: ImageprocPrimitives::new(),
            config: ScanConfig::default(),
        }
    }
}

impl<P: VisionPrimitives> DocumentScanner<P> {
    /// Build a scanner from an explicit primitives handle and configuration.
    pub fn new(primitives: P, config: ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { primitives, config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn primitives(&self) -> &P {
        &self.primitives
    }

    // -- Detection ------------------------------------------------------------

    /// Locate the page corners without warping.
    ///
    /// Corners are in the coordinates of `image`. `Ok(None)` means no
    /// document was detected.
    pub fn detect(&self, image: &DynamicImage) -> Result<Option<OrderedCorners>> {
        self.detect_with_cancel(image, &CancelFlag::new())
    }

    /// [`detect`](Self::detect), polling `cancel` between stages.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_with_cancel(
        &self,
        image: &DynamicImage,
        cancel: &CancelFlag,
    ) -> Result<Option<OrderedCorners>> {
        ensure_non_empty(image.width(), image.height())?;
        cancel.check()?;

        let (working, to_source) = self.detection_view(image);

        let gray = preprocess(&working, &self.config)?;
        cancel.check()?;

        let edges = detect_edges(&self.primitives, &gray, &self.config)?;
        cancel.check()?;

        let candidates = extract_candidates(&self.primitives, &edges, &self.config)?;
        if candidates.is_empty() {
            info!("No contour within the plausible area band");
            return Ok(None);
        }
        cancel.check()?;

        let Some(document) = select_document(&self.primitives, &candidates, &self.config) else {
            info!(candidates = candidates.len(), "No candidate passed quadrilateral validation");
            return Ok(None);
        };

        let ordered = order_corners(&document);
        let corners = if to_source == 1.0 {
            ordered
        } else {
            ordered.scaled(to_source)
        };
        debug!(?corners, "Corners ordered");
        Ok(Some(corners))
    }

    /// Downscale for detection if the image exceeds the configured cap.
    ///
    /// Returns the image to detect on and the factor mapping its coordinates
    /// back to `image`.
    fn detection_view<'a>(&self, image: &'a DynamicImage) -> (Cow<'a, DynamicImage>, f64) {
        let (width, height) = (image.width(), image.height());
        let longer = width.max(height);
        let cap = self.config.max_input_dimension;
        if longer <= cap {
            return (Cow::Borrowed(image), 1.0);
        }

        let shrink = cap as f64 / longer as f64;
        let scaled_w = ((width as f64 * shrink).round() as u32).max(1);
        let scaled_h = ((height as f64 * shrink).round() as u32).max(1);
        let scaled = image.resize_exact(scaled_w, scaled_h, FilterType::Triangle);
        let to_source = longer as f64 / scaled_w.max(scaled_h) as f64;
        debug!(
            from_w = width,
            from_h = height,
            scaled_w,
            scaled_h,
            "Input downscaled for detection"
        );
        (Cow::Owned(scaled), to_source)
    }

    // -- Full scan ------------------------------------------------------------

    /// Detect the page and rectify it.
    ///
    /// `InvalidInput` and `DegenerateGeometry` are returned as errors;
    /// finding no page is the `NoDocument` outcome.
    pub fn scan<'a>(&self, image: &'a DynamicImage) -> Result<ScanOutcome<'a>> {
        self.scan_with_cancel(image, &CancelFlag::new())
    }

    /// [`scan`](Self::scan), polling `cancel` between stages.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn scan_with_cancel<'a>(
        &self,
        image: &'a DynamicImage,
        cancel: &CancelFlag,
    ) -> Result<ScanOutcome<'a>> {
        let Some(corners) = self.detect_with_cancel(image, cancel)? else {
            info!("No document detected; returning the original image");
            return Ok(ScanOutcome::NoDocument { original: image });
        };
        cancel.check()?;

        let page = rectify(
            &self.primitives,
            image,
            &corners,
            Rgba(self.config.border_color),
        )?;
        info!(
            width = page.image.width(),
            height = page.image.height(),
            "Document scanned"
        );
        Ok(ScanOutcome::Rectified(page))
    }
}
