// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering — assigns four unordered points to the top-left,
// top-right, bottom-right, and bottom-left roles.

use std::cmp::Ordering;

use quadscan_core::{DocumentCandidate, OrderedCorners, Point};
use tracing::debug;

/// Assign canonical roles to the four vertices of an accepted candidate.
///
/// - top-left minimizes `x + y` (ties: smaller `y - x`)
/// - bottom-right maximizes `x + y` (ties: larger `y - x`)
/// - of the remaining two, top-right minimizes `y - x` (ties: smaller `x + y`)
///   and bottom-left takes the other
///
/// For distinct points the keys form a total order, so every permutation of
/// the same four points yields the same assignment. Near 45° rotations the
/// sum/difference split can pair two adjacent corners as TL/BR; if the
/// resulting quadrilateral crosses itself the points are re-ordered clockwise
/// around their centroid, starting from the chosen top-left.
pub fn order_corners(candidate: &DocumentCandidate) -> OrderedCorners {
    let points = &candidate.vertices;

    let top_left = best_index(points, &[0, 1, 2, 3], |a, b| {
        a.sum()
            .total_cmp(&b.sum())
            .then(a.diff().total_cmp(&b.diff()))
    });
    let rest: Vec<usize> = (0..4).filter(|&i| i != top_left).collect();
    let bottom_right = best_index(points, &rest, |a, b| {
        b.sum()
            .total_cmp(&a.sum())
            .then(b.diff().total_cmp(&a.diff()))
    });
    let rest: Vec<usize> = rest.into_iter().filter(|&i| i != bottom_right).collect();
    let top_right = best_index(points, &rest, |a, b| {
        a.diff()
            .total_cmp(&b.diff())
            .then(a.sum().total_cmp(&b.sum()))
    });
    let bottom_left = rest[0] + rest[1] - top_right;

    let ordered = OrderedCorners {
        top_left: points[top_left],
        top_right: points[top_right],
        bottom_right: points[bottom_right],
        bottom_left: points[bottom_left],
    };

    if is_self_intersecting(&ordered) {
        debug!(?ordered, "Sum/difference ordering crosses itself; re-ordering around centroid");
        return order_around_centroid(points, top_left);
    }
    ordered
}

/// Index in `candidates` that compares least under `cmp`. Equal keys keep
/// the earlier index.
fn best_index(
    points: &[Point; 4],
    candidates: &[usize],
    cmp: impl Fn(&Point, &Point) -> Ordering,
) -> usize {
    let mut best = candidates[0];
    for &i in &candidates[1..] {
        if cmp(&points[i], &points[best]) == Ordering::Less {
            best = i;
        }
    }
    best
}

/// Whether either pair of opposite edges properly crosses.
fn is_self_intersecting(corners: &OrderedCorners) -> bool {
    let OrderedCorners {
        top_left: tl,
        top_right: tr,
        bottom_right: br,
        bottom_left: bl,
    } = *corners;
    segments_cross(&tl, &tr, &br, &bl) || segments_cross(&tr, &br, &bl, &tl)
}

/// Proper intersection of segments `a`–`b` and `c`–`d`.
fn segments_cross(a: &Point, b: &Point, c: &Point, d: &Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 * o2 < 0.0 && o3 * o4 < 0.0
}

/// Signed area of the triangle `a`, `b`, `c` (times two).
fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Clockwise (on screen, y down) order around the centroid, rotated so
/// `start` comes first.
fn order_around_centroid(points: &[Point; 4], start: usize) -> OrderedCorners {
    let cx = points.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let angle = |p: &Point| (p.y - cy).atan2(p.x - cx);

    let mut indices = [0usize, 1, 2, 3];
    indices.sort_by(|&a, &b| {
        angle(&points[a])
            .total_cmp(&angle(&points[b]))
            .then(a.cmp(&b))
    });
    let offset = indices.iter().position(|&i| i == start).unwrap_or(0);
    indices.rotate_left(offset);
    OrderedCorners::from_array(indices.map(|i| points[i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    /// All 24 orderings of `points`.
    fn permutations(points: [Point; 4]) -> Vec<[Point; 4]> {
        let mut out = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                for c in 0..4 {
                    for d in 0..4 {
                        let idx = [a, b, c, d];
                        let mut seen = [false; 4];
                        if idx.iter().all(|&i| !std::mem::replace(&mut seen[i], true)) {
                            out.push(idx.map(|i| points[i]));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn permutations_helper_yields_24() {
        assert_eq!(permutations([p(0.0, 0.0); 4]).len(), 24);
    }

    #[test]
    fn axis_aligned_rectangle_roles() {
        let ordered = order_corners(&DocumentCandidate::new([
            p(300.0, 40.0),
            p(20.0, 400.0),
            p(10.0, 30.0),
            p(310.0, 410.0),
        ]));
        assert_eq!(ordered.top_left, p(10.0, 30.0));
        assert_eq!(ordered.top_right, p(300.0, 40.0));
        assert_eq!(ordered.bottom_right, p(310.0, 410.0));
        assert_eq!(ordered.bottom_left, p(20.0, 400.0));
    }

    /// Every permutation of a perspective-skewed page gives the same roles.
    #[test]
    fn ordering_is_permutation_invariant() {
        let quad = [
            p(52.0, 61.0),
            p(411.0, 88.0),
            p(452.0, 590.0),
            p(31.0, 548.0),
        ];
        let expected = OrderedCorners::from_array(quad);
        for perm in permutations(quad) {
            assert_eq!(order_corners(&DocumentCandidate::new(perm)), expected);
        }
    }

    /// A rectangle turned exactly 45° ties on both sums and differences; the
    /// tie-break still yields one non-crossing assignment for every input
    /// order.
    #[test]
    fn exact_45_degree_ties_are_deterministic() {
        let diamond = [
            p(100.0, 0.0),
            p(200.0, 100.0),
            p(150.0, 150.0),
            p(50.0, 50.0),
        ];
        let first = order_corners(&DocumentCandidate::new(diamond));
        assert!(!is_self_intersecting(&first));
        for perm in permutations(diamond) {
            assert_eq!(order_corners(&DocumentCandidate::new(perm)), first);
        }
    }

    /// Near 45° the sum/difference split can choose adjacent TL/BR; the
    /// result is repaired into a simple quadrilateral.
    #[test]
    fn crossing_assignment_is_repaired() {
        // Sums: 99.5, 300, 300.5, 100 → TL (50.5,49) and BR (150,150.5)
        // are adjacent corners.
        let near_diamond = [
            p(50.5, 49.0),
            p(200.0, 100.0),
            p(150.0, 150.5),
            p(100.0, 0.0),
        ];
        let ordered = order_corners(&DocumentCandidate::new(near_diamond));
        assert!(!is_self_intersecting(&ordered));
        assert_eq!(ordered.top_left, p(50.5, 49.0));
        assert!((ordered.area() - 10_000.0).abs() < 200.0);
    }

    #[test]
    fn segments_cross_detects_proper_intersections() {
        assert!(segments_cross(&p(0.0, 0.0), &p(10.0, 10.0), &p(0.0, 10.0), &p(10.0, 0.0)));
        assert!(!segments_cross(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 5.0), &p(10.0, 5.0)));
    }
}
