// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral validation — picks the first candidate contour that looks
// like a rectangular page seen under perspective.

use quadscan_core::{DocumentCandidate, Point, ScanConfig};
use tracing::{debug, info, instrument};

use crate::contours::CandidateContour;
use crate::primitives::VisionPrimitives;

/// Why a candidate polygon was not accepted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// The simplified polygon did not have exactly four vertices.
    VertexCount(usize),
    /// An interior angle was below the configured minimum.
    SharpCorner { vertex: usize, degrees: f64 },
    /// Width / height fell outside the configured band.
    AspectRatio(f64),
}

/// Interior angle at each vertex, in degrees (0–180).
///
/// Computed from the dot and cross products of the two edge vectors leaving
/// the vertex, so winding direction does not matter.
pub fn interior_angles(vertices: &[Point; 4]) -> [f64; 4] {
    std::array::from_fn(|i| {
        let here = vertices[i];
        let prev = vertices[(i + 3) % 4];
        let next = vertices[(i + 1) % 4];
        let (ax, ay) = (prev.x - here.x, prev.y - here.y);
        let (bx, by) = (next.x - here.x, next.y - here.y);
        let dot = ax * bx + ay * by;
        let cross = ax * by - ay * bx;
        cross.abs().atan2(dot).to_degrees()
    })
}

/// Longer width estimate over longer height estimate.
///
/// Widths are the edges v0–v1 and v2–v3; heights are v1–v2 and v3–v0.
pub fn aspect_ratio(vertices: &[Point; 4]) -> f64 {
    let width = vertices[0]
        .distance(&vertices[1])
        .max(vertices[2].distance(&vertices[3]));
    let height = vertices[1]
        .distance(&vertices[2])
        .max(vertices[3].distance(&vertices[0]));
    width / height
}

/// Check a simplified polygon against the page-shape rules.
pub fn validate_polygon(
    polygon: &[Point],
    config: &ScanConfig,
) -> Result<DocumentCandidate, Rejection> {
    let vertices: [Point; 4] = polygon
        .try_into()
        .map_err(|_| Rejection::VertexCount(polygon.len()))?;

    let angles = interior_angles(&vertices);
    if let Some((vertex, &degrees)) = angles
        .iter()
        .enumerate()
        .find(|(_, a)| !(**a >= config.min_corner_angle))
    {
        return Err(Rejection::SharpCorner { vertex, degrees });
    }

    let ratio = aspect_ratio(&vertices);
    if !(ratio >= config.min_aspect_ratio && ratio <= config.max_aspect_ratio) {
        return Err(Rejection::AspectRatio(ratio));
    }

    Ok(DocumentCandidate::new(vertices))
}

/// Validate candidates in order and return the first page-shaped one.
///
/// `None` is the "no document detected" outcome. Single pass: thresholds
/// are never relaxed and retried.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub fn select_document<P: VisionPrimitives + ?Sized>(
    primitives: &P,
    candidates: &[CandidateContour],
    config: &ScanConfig,
) -> Option<DocumentCandidate> {
    for (rank, candidate) in candidates.iter().enumerate() {
        let epsilon = config.approx_epsilon_ratio * candidate.contour.perimeter();
        let polygon = primitives.approximate_polygon(&candidate.contour, epsilon);
        match validate_polygon(&polygon, config) {
            Ok(document) => {
                info!(
                    rank,
                    area_ratio = candidate.area_ratio,
                    "Document quadrilateral accepted"
                );
                return Some(document);
            }
            Err(reason) => {
                debug!(rank, ?reason, area_ratio = candidate.area_ratio, "Candidate rejected");
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadscan_core::Contour;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// Parallelogram with 35° and 145° interior angles.
    fn slanted() -> [Point; 4] {
        let (s, c) = 35f64.to_radians().sin_cos();
        [
            p(0.0, 0.0),
            p(100.0, 0.0),
            p(100.0 + 80.0 * c, 80.0 * s),
            p(80.0 * c, 80.0 * s),
        ]
    }

    #[test]
    fn rectangle_angles_are_right() {
        let angles = interior_angles(&[p(0.0, 0.0), p(4.0, 0.0), p(4.0, 3.0), p(0.0, 3.0)]);
        for a in angles {
            assert!((a - 90.0).abs() < 1e-9);
        }
    }

    #[test]
    fn slanted_quad_with_wide_enough_angles_is_accepted() {
        let quad = slanted();
        let angles = interior_angles(&quad);
        assert!((angles[0] - 35.0).abs() < 1e-9);
        assert!((angles[1] - 145.0).abs() < 1e-9);
        let accepted = validate_polygon(&quad, &ScanConfig::default()).expect("accepted");
        assert_eq!(accepted.vertices, quad);
    }

    #[test]
    fn ten_degree_corner_is_rejected() {
        let (s, c) = 10f64.to_radians().sin_cos();
        let quad = [
            p(0.0, 0.0),
            p(200.0, 0.0),
            p(200.0, 80.0),
            p(100.0 * c, 100.0 * s),
        ];
        match validate_polygon(&quad, &ScanConfig::default()) {
            Err(Rejection::SharpCorner { vertex, degrees }) => {
                assert_eq!(vertex, 0);
                assert!((degrees - 10.0).abs() < 1e-9);
            }
            other => panic!("expected sharp-corner rejection, got {other:?}"),
        }
    }

    #[test]
    fn wrong_vertex_count_is_rejected() {
        let triangle = [p(0.0, 0.0), p(10.0, 0.0), p(5.0, 8.0)];
        assert_eq!(
            validate_polygon(&triangle, &ScanConfig::default()),
            Err(Rejection::VertexCount(3))
        );
    }

    #[test]
    fn extreme_aspect_ratio_is_rejected() {
        let sliver = [p(0.0, 0.0), p(500.0, 0.0), p(500.0, 40.0), p(0.0, 40.0)];
        assert_eq!(
            validate_polygon(&sliver, &ScanConfig::default()),
            Err(Rejection::AspectRatio(12.5))
        );
    }

    /// Primitives that hand back each contour's own points as the polygon.
    struct PassThrough;

    impl VisionPrimitives for PassThrough {
        fn detect_edges(&self, image: &image::GrayImage, _: f32, _: f32) -> image::GrayImage {
            image.clone()
        }
        fn external_contours(&self, _: &image::GrayImage) -> Vec<Contour> {
            Vec::new()
        }
        fn approximate_polygon(&self, contour: &Contour, _: f64) -> Vec<Point> {
            contour.points.clone()
        }
        fn warp_perspective(
            &self,
            _: &image::RgbaImage,
            _: [Point; 4],
            _: [Point; 4],
            _: u32,
            _: u32,
            _: image::Rgba<u8>,
        ) -> Option<image::RgbaImage> {
            None
        }
    }

    fn candidate(points: Vec<Point>) -> CandidateContour {
        let contour = Contour::new(points);
        let area = contour.area();
        CandidateContour {
            contour,
            area,
            area_ratio: area / 1e6,
        }
    }

    /// The first valid candidate wins even if a later one is also valid.
    #[test]
    fn first_valid_candidate_is_selected() {
        let pentagon = candidate(vec![
            p(0.0, 0.0),
            p(300.0, 0.0),
            p(350.0, 150.0),
            p(150.0, 300.0),
            p(0.0, 150.0),
        ]);
        let first_quad = candidate(slanted().to_vec());
        let second_quad = candidate(vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 50.0), p(0.0, 50.0)]);

        let selected = select_document(
            &PassThrough,
            &[pentagon, first_quad, second_quad],
            &ScanConfig::default(),
        )
        .expect("document");
        assert_eq!(selected.vertices, slanted());
    }

    #[test]
    fn no_valid_candidate_means_no_document() {
        let sliver = candidate(vec![p(0.0, 0.0), p(900.0, 0.0), p(900.0, 10.0), p(0.0, 10.0)]);
        assert!(select_document(&PassThrough, &[sliver], &ScanConfig::default()).is_none());
        assert!(select_document(&PassThrough, &[], &ScanConfig::default()).is_none());
    }
}
