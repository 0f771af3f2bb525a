// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quadscan-scan — Finds a photographed page and produces a flat, de-skewed
// image of it.
//
// Stages run in order: preprocessing (grayscale, denoise, contrast, blur),
// multi-scale edge detection, contour extraction, quadrilateral validation,
// corner ordering, and perspective rectification. `DocumentScanner` drives
// them; each stage is also usable on its own.

pub mod cancel;
pub mod contours;
pub mod corners;
pub mod edges;
pub mod enhance;
pub mod pipeline;
pub mod preprocess;
pub mod primitives;
pub mod quad;
pub mod rectify;

// Re-export the entry points so callers can use `quadscan_scan::DocumentScanner` etc.
pub use cancel::CancelFlag;
pub use corners::order_corners;
pub use enhance::{draw_corners, rotate_quarter, sharpen};
pub use pipeline::{DocumentScanner, ScanOutcome};
pub use primitives::{ImageprocPrimitives, VisionPrimitives};
pub use rectify::{RectifiedPage, rectify};
