// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Post-detection helpers — corner preview overlay, sharpening of the
// rectified page, and quarter-turn rotation.

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use imageproc::filter::gaussian_blur_f32;
use quadscan_core::{OrderedCorners, Result, ScanError};
use tracing::{debug, instrument};

/// Marker colour for detected corners.
const MARKER_COLOR: Rgba<u8> = Rgba([0, 255, 0, 255]);

/// Marker radius in pixels.
const MARKER_RADIUS: i32 = 10;

/// Sigma of the blur applied before the Laplacian (a 5x5 kernel).
const SHARPEN_SIGMA: f32 = 1.1;

/// Draw the detected outline and a filled marker on each corner, on a copy
/// of `image`.
pub fn draw_corners(image: &DynamicImage, corners: &OrderedCorners) -> RgbaImage {
    let mut canvas = image.to_rgba8();
    let points = corners.to_array();
    for (i, point) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        draw_line_segment_mut(
            &mut canvas,
            point.to_f32_pair(),
            next.to_f32_pair(),
            MARKER_COLOR,
        );
    }
    for point in points {
        let center = (point.x.round() as i32, point.y.round() as i32);
        draw_filled_circle_mut(&mut canvas, center, MARKER_RADIUS, MARKER_COLOR);
    }
    canvas
}

/// Sharpen a page for legibility: `1.5 * gray - 0.5 * laplacian(blur(gray))`.
///
/// The Laplacian is saturated to 0..=255 before weighting, so only the dark
/// side of an edge is deepened. The result is grayscale.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn sharpen(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let blurred = gaussian_blur_f32(&gray, SHARPEN_SIGMA);
    let (width, height) = gray.dimensions();

    let mut output = GrayImage::new(width, height);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let edge = laplacian_at(&blurred, x, y).clamp(0, 255) as f32;
        let value = 1.5 * pixel.0[0] as f32 - 0.5 * edge;
        output.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
    }
    debug!("Sharpening complete");
    output
}

/// 4-neighbour Laplacian with edge replication.
fn laplacian_at(gray: &GrayImage, x: u32, y: u32) -> i32 {
    let (width, height) = gray.dimensions();
    let at = |x: u32, y: u32| gray.get_pixel(x, y).0[0] as i32;
    let left = at(x.saturating_sub(1), y);
    let right = at((x + 1).min(width - 1), y);
    let up = at(x, y.saturating_sub(1));
    let down = at(x, (y + 1).min(height - 1));
    left + right + up + down - 4 * at(x, y)
}

/// Rotate clockwise by 0, 90, 180, or 270 degrees.
pub fn rotate_quarter(image: DynamicImage, degrees: u32) -> Result<DynamicImage> {
    match degrees {
        0 => Ok(image),
        90 => Ok(image.rotate90()),
        180 => Ok(image.rotate180()),
        270 => Ok(image.rotate270()),
        other => Err(ScanError::InvalidInput(format!(
            "rotation must be a multiple of 90 degrees below 360, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadscan_core::Point;

    #[test]
    fn corner_markers_are_drawn() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255])));
        let corners = OrderedCorners::from_array([
            Point::new(20.0, 20.0),
            Point::new(80.0, 20.0),
            Point::new(80.0, 80.0),
            Point::new(20.0, 80.0),
        ]);
        let preview = draw_corners(&image, &corners);
        assert_eq!(preview.get_pixel(20, 20), &MARKER_COLOR);
        assert_eq!(preview.get_pixel(50, 20), &MARKER_COLOR);
        assert_eq!(preview.get_pixel(50, 50), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn sharpen_flat_image_brightens_by_half() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([100])));
        let out = sharpen(&image);
        assert!(out.pixels().all(|p| p.0[0] == 150));
    }

    /// Pixels next to a dark/light step are pulled apart more than the flat
    /// interior is.
    #[test]
    fn sharpen_darkens_near_edges() {
        let gray = GrayImage::from_fn(32, 8, |x, _| if x < 16 { Luma([60]) } else { Luma([120]) });
        let out = sharpen(&DynamicImage::ImageLuma8(gray));
        let interior = out.get_pixel(2, 4).0[0];
        let near_step = out.get_pixel(15, 4).0[0];
        assert_eq!(interior, 90);
        assert!(near_step < interior);
    }

    /// The bright side of a step has a negative Laplacian, which saturates to
    /// zero, so it is only brightened.
    #[test]
    fn sharpen_leaves_bright_side_of_edge_undarkened() {
        let gray = GrayImage::from_fn(32, 8, |x, _| if x < 16 { Luma([60]) } else { Luma([120]) });
        let out = sharpen(&DynamicImage::ImageLuma8(gray));
        assert_eq!(out.get_pixel(16, 4).0[0], 180);
        for x in 20..32 {
            assert_eq!(out.get_pixel(x, 4).0[0], 180, "bright pixel at x={x}");
        }
    }

    #[test]
    fn rotate_quarter_swaps_dimensions() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(30, 10));
        let rotated = rotate_quarter(image, 90).expect("rotation");
        assert_eq!((rotated.width(), rotated.height()), (10, 30));
    }

    #[test]
    fn rotate_quarter_rejects_odd_angles() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(3, 3));
        assert!(matches!(rotate_quarter(image, 45), Err(ScanError::InvalidInput(_))));
    }
}
