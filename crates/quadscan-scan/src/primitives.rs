// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vision primitives — the black-box operations the pipeline orchestrates.
//
// Edge detection, contour tracing, polygon simplification, and perspective
// warping sit behind `VisionPrimitives` so the staging logic can be exercised
// against synthetic implementations. `ImageprocPrimitives` is the production
// implementation on top of the `imageproc` crate.

use image::{GrayImage, Rgba, RgbaImage};
use imageproc::contours::{BorderType, find_contours};
use imageproc::edges::canny;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use quadscan_core::{Contour, Point};
use tracing::trace;

/// The image-processing capability a `DocumentScanner` is built on.
///
/// Implementations must be deterministic: identical inputs yield identical
/// outputs.
pub trait VisionPrimitives: Send + Sync {
    /// Gradient-based edge detection with a low/high hysteresis threshold pair.
    /// Returns a binary map (0 or 255) of the same size as `image`.
    fn detect_edges(&self, image: &GrayImage, low: f32, high: f32) -> GrayImage;

    /// Trace the outermost closed boundaries of the non-zero regions of
    /// `binary`. Nested (hole or inner) boundaries are not returned.
    fn external_contours(&self, binary: &GrayImage) -> Vec<Contour>;

    /// Simplify a closed contour to fewer vertices, keeping every dropped
    /// point within `epsilon` of the simplified outline.
    fn approximate_polygon(&self, contour: &Contour, epsilon: f64) -> Vec<Point>;

    /// Resample `source` through the projective transform mapping `from`
    /// onto `to`, into a new `width` x `height` image. Pixels mapping outside
    /// the source take `border`. Returns `None` if no transform exists.
    fn warp_perspective(
        &self,
        source: &RgbaImage,
        from: [Point; 4],
        to: [Point; 4],
        width: u32,
        height: u32,
        border: Rgba<u8>,
    ) -> Option<RgbaImage>;
}

/// `VisionPrimitives` backed by `imageproc`.
///
/// Holds no global state. Create one per process (or per scanner) with
/// [`ImageprocPrimitives::new`]; dropping it releases nothing beyond the value
/// itself, and every scratch buffer it allocates is owned by a single call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocPrimitives;

impl ImageprocPrimitives {
    pub fn new() -> Self {
        Self
    }
}

impl VisionPrimitives for ImageprocPrimitives {
    fn detect_edges(&self, image: &GrayImage, low: f32, high: f32) -> GrayImage {
        canny(image, low, high)
    }

    fn external_contours(&self, binary: &GrayImage) -> Vec<Contour> {
        let traced = find_contours::<i32>(binary);
        let total = traced.len();
        let external: Vec<Contour> = traced
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| {
                Contour::new(
                    c.points
                        .iter()
                        .map(|p| Point::new(p.x as f64, p.y as f64))
                        .collect(),
                )
            })
            .collect();
        trace!(total, external = external.len(), "Contours traced");
        external
    }

    fn approximate_polygon(&self, contour: &Contour, epsilon: f64) -> Vec<Point> {
        simplify_closed(&contour.points, epsilon)
    }

    fn warp_perspective(
        &self,
        source: &RgbaImage,
        from: [Point; 4],
        to: [Point; 4],
        width: u32,
        height: u32,
        border: Rgba<u8>,
    ) -> Option<RgbaImage> {
        let projection =
            Projection::from_control_points(from.map(Point::to_f32_pair), to.map(Point::to_f32_pair))?;
        let mut output = RgbaImage::new(width, height);
        warp_into(source, &projection, Interpolation::Bilinear, border, &mut output);
        Some(output)
    }
}

// -- Polygon simplification ---------------------------------------------------

/// Douglas–Peucker simplification of a closed ring.
///
/// The ring is split at two mutually distant anchor points and each half is
/// simplified as an open chain, so the result does not depend on where the
/// tracer happened to start.
pub fn simplify_closed(ring: &[Point], epsilon: f64) -> Vec<Point> {
    // Drop a repeated closing point if the tracer emitted one.
    let ring = match ring {
        [first, .., last] if ring.len() > 1 && first == last => &ring[..ring.len() - 1],
        _ => ring,
    };
    if ring.len() < 3 {
        return ring.to_vec();
    }

    let a = farthest_from(ring, &ring[0]);
    let b = farthest_from(ring, &ring[a]);
    if a == b {
        return vec![ring[a]];
    }
    let (start, end) = (a.min(b), a.max(b));

    // First half: start..=end. Second half: end..=start, wrapping around.
    let first: Vec<Point> = ring[start..=end].to_vec();
    let second: Vec<Point> = ring[end..]
        .iter()
        .chain(ring[..=start].iter())
        .copied()
        .collect();

    let mut result = simplify_open(&first, epsilon);
    let tail = simplify_open(&second, epsilon);
    // Both halves share their endpoints; keep each anchor once.
    result.pop();
    result.extend_from_slice(&tail[..tail.len() - 1]);
    result
}

/// Douglas–Peucker on an open chain. Always keeps both endpoints.
fn simplify_open(chain: &[Point], epsilon: f64) -> Vec<Point> {
    if chain.len() < 3 {
        return chain.to_vec();
    }
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0usize, last)];
    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let (mut index, mut dmax) = (lo, 0.0);
        for i in lo + 1..hi {
            let d = segment_distance(&chain[i], &chain[lo], &chain[hi]);
            if d > dmax {
                index = i;
                dmax = d;
            }
        }
        if dmax > epsilon {
            keep[index] = true;
            stack.push((lo, index));
            stack.push((index, hi));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Index of the point in `points` farthest from `from` (first one on ties).
fn farthest_from(points: &[Point], from: &Point) -> usize {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, p) in points.iter().enumerate() {
        let d = p.distance(from);
        if d > best.1 {
            best = (i, d);
        }
    }
    best.0
}

/// Distance from `p` to the segment `a`–`b`.
fn segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance(&Point::new(a.x + t * dx, a.y + t * dy))
}
