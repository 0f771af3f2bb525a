// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometric types flowing through the Quadscan pipeline.

use serde::{Deserialize, Serialize};

/// A floating-point image coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// `x + y`, used to find the top-left and bottom-right corners.
    pub fn sum(&self) -> f64 {
        self.x + self.y
    }

    /// `y - x`, used to separate the top-right and bottom-left corners.
    pub fn diff(&self) -> f64 {
        self.y - self.x
    }

    /// Scale both coordinates by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// The point as an `(f32, f32)` pair, the form warp routines consume.
    pub fn to_f32_pair(self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

/// A closed boundary traced from a binary edge map.
///
/// The first point is not repeated at the end. A contour may be degenerate
/// (collinear or zero-area); the contour filter discards those.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area via the shoelace formula. Orientation-independent.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    /// Length of the closed boundary, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.points[i].distance(&self.points[(i + 1) % n]))
            .sum()
    }
}

/// Four unordered corners of a polygon that passed quadrilateral validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentCandidate {
    pub vertices: [Point; 4],
}

impl DocumentCandidate {
    pub fn new(vertices: [Point; 4]) -> Self {
        Self { vertices }
    }
}

/// Corners assigned to fixed semantic roles.
///
/// The rectifier relies on this ordering: destination corners are laid out
/// in the same top-left, top-right, bottom-right, bottom-left sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_right: Point,
    pub bottom_left: Point,
}

impl OrderedCorners {
    /// Corners as an array in TL, TR, BR, BL order.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Build from an array in TL, TR, BR, BL order.
    pub fn from_array(points: [Point; 4]) -> Self {
        Self {
            top_left: points[0],
            top_right: points[1],
            bottom_right: points[2],
            bottom_left: points[3],
        }
    }

    /// Scale every corner by `factor` (maps detection space to source space).
    pub fn scaled(&self, factor: f64) -> Self {
        Self::from_array(self.to_array().map(|p| p.scaled(factor)))
    }

    /// Enclosed area of the quadrilateral.
    pub fn area(&self) -> f64 {
        polygon_area(&self.to_array())
    }

    /// Dimensions of the axis-aligned rectangle the page maps onto.
    ///
    /// Each side takes the longer of its two observed edges so unevenly
    /// foreshortened content is not cropped.
    pub fn target_size(&self) -> RectificationTarget {
        let width = self
            .top_left
            .distance(&self.top_right)
            .max(self.bottom_right.distance(&self.bottom_left));
        let height = self
            .top_left
            .distance(&self.bottom_left)
            .max(self.top_right.distance(&self.bottom_right));
        RectificationTarget { width, height }
    }
}

/// Destination rectangle derived from the ordered corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectificationTarget {
    pub width: f64,
    pub height: f64,
}

impl RectificationTarget {
    /// Width and height rounded to whole pixels.
    pub fn pixel_dimensions(&self) -> (i64, i64) {
        (self.width.round() as i64, self.height.round() as i64)
    }
}

/// Shoelace area of a closed polygon given in vertex order.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            points[i].x * points[j].y - points[j].x * points[i].y
        })
        .sum();
    twice.abs() / 2.0
}
