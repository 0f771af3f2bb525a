// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rectification — maps the ordered page corners onto an axis-aligned
// rectangle sized from the observed edge lengths.

use image::{DynamicImage, Rgba, RgbaImage};
use quadscan_core::{OrderedCorners, Point, RectificationTarget, Result, ScanError};
use tracing::{info, instrument, warn};

use crate::preprocess::ensure_non_empty;
use crate::primitives::VisionPrimitives;

/// Quads enclosing less than this fraction of their target rectangle are
/// treated as collapsed.
const MIN_FILL_RATIO: f64 = 0.01;

/// The rectified page and the geometry that produced it.
#[derive(Debug, Clone)]
pub struct RectifiedPage {
    pub image: RgbaImage,
    /// Corners in source-image coordinates.
    pub corners: OrderedCorners,
    pub target: RectificationTarget,
}

impl RectifiedPage {
    pub fn into_dynamic(self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.image)
    }
}

/// Whole-pixel output dimensions for `corners`.
///
/// Fails with `DegenerateGeometry` when either side rounds to zero or the
/// corners enclose (almost) no area, e.g. nearly collinear points.
pub fn target_dimensions(corners: &OrderedCorners) -> Result<(RectificationTarget, u32, u32)> {
    let target = corners.target_size();
    let (width, height) = target.pixel_dimensions();
    if width < 1 || height < 1 {
        return Err(ScanError::DegenerateGeometry(format!(
            "target size {width}x{height} from corners {corners:?}"
        )));
    }

    let area = corners.area();
    let fill = area / (target.width * target.height);
    if !(fill >= MIN_FILL_RATIO) {
        return Err(ScanError::DegenerateGeometry(format!(
            "corners enclose {area:.1} px² of a {width}x{height} target"
        )));
    }

    let width = u32::try_from(width)
        .map_err(|_| ScanError::DegenerateGeometry(format!("target width {width} overflows")))?;
    let height = u32::try_from(height)
        .map_err(|_| ScanError::DegenerateGeometry(format!("target height {height} overflows")))?;
    Ok((target, width, height))
}

/// Warp the page bounded by `corners` in `source` into a W x H image.
#[instrument(skip_all, fields(src_w = source.width(), src_h = source.height()))]
pub fn rectify<P: VisionPrimitives + ?Sized>(
    primitives: &P,
    source: &DynamicImage,
    corners: &OrderedCorners,
    border: Rgba<u8>,
) -> Result<RectifiedPage> {
    ensure_non_empty(source.width(), source.height())?;

    let (target, width, height) = match target_dimensions(corners) {
        Ok(dims) => dims,
        Err(err) => {
            warn!(error = %err, "Rectification rejected");
            return Err(err);
        }
    };

    let (w, h) = (width as f64, height as f64);
    let destination = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];

    let rgba = source.to_rgba8();
    let image = primitives
        .warp_perspective(&rgba, corners.to_array(), destination, width, height, border)
        .ok_or_else(|| {
            warn!(?corners, "No projective transform for these corners");
            ScanError::DegenerateGeometry("no projective transform maps the corners".into())
        })?;

    info!(width, height, "Page rectified");
    Ok(RectifiedPage {
        image,
        corners: *corners,
        target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::order_corners;
    use crate::primitives::ImageprocPrimitives;
    use quadscan_core::DocumentCandidate;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn axis_aligned_page_is_cropped_to_its_size() {
        // 200x300 source, page from (20,30) to (120,230).
        let mut rgba = RgbaImage::from_pixel(200, 300, Rgba([0, 0, 0, 255]));
        for y in 30..230 {
            for x in 20..120 {
                rgba.put_pixel(x, y, Rgba([250, 250, 250, 255]));
            }
        }
        let corners = OrderedCorners::from_array([
            p(20.0, 30.0),
            p(120.0, 30.0),
            p(120.0, 230.0),
            p(20.0, 230.0),
        ]);
        let page = rectify(
            &ImageprocPrimitives::new(),
            &DynamicImage::ImageRgba8(rgba),
            &corners,
            Rgba([255, 0, 0, 255]),
        )
        .expect("rectified");
        assert_eq!(page.image.dimensions(), (100, 200));
        assert_eq!(page.image.get_pixel(50, 100), &Rgba([250, 250, 250, 255]));
    }

    /// Nearly collinear points must be refused, not turned into a sliver.
    #[test]
    fn nearly_collinear_corners_are_degenerate() {
        let ordered = order_corners(&DocumentCandidate::new([
            p(10.0, 50.0),
            p(110.0, 50.2),
            p(210.0, 50.1),
            p(310.0, 50.3),
        ]));
        let source = DynamicImage::ImageRgba8(RgbaImage::new(400, 100));
        let err = rectify(
            &ImageprocPrimitives::new(),
            &source,
            &ordered,
            Rgba([255, 255, 255, 255]),
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::DegenerateGeometry(_)), "got {err:?}");
    }

    #[test]
    fn coincident_corners_are_degenerate() {
        let corners = OrderedCorners::from_array([p(5.0, 5.0); 4]);
        assert!(matches!(
            target_dimensions(&corners),
            Err(ScanError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn non_finite_corners_are_degenerate() {
        let corners = OrderedCorners::from_array([
            p(f64::NAN, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
        ]);
        assert!(matches!(
            target_dimensions(&corners),
            Err(ScanError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn trapezoid_target_uses_longer_edges() {
        let corners = OrderedCorners::from_array([
            p(40.0, 0.0),
            p(160.0, 0.0),
            p(200.0, 100.0),
            p(0.0, 100.0),
        ]);
        let (_, w, h) = target_dimensions(&corners).expect("valid");
        assert_eq!(w, 200);
        assert_eq!(h, 108);
    }
}
