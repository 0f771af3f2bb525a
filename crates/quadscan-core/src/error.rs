// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Quadscan.

use thiserror::Error;

/// Top-level error type for all Quadscan operations.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Pipeline outcomes --
    #[error("invalid input image: {0}")]
    InvalidInput(String),

    #[error("no document detected")]
    NoDocumentDetected,

    #[error("degenerate corner geometry: {0}")]
    DegenerateGeometry(String),

    #[error("scan cancelled")]
    Cancelled,

    // -- Configuration --
    #[error("invalid scan configuration: {0}")]
    Config(String),

    // -- Image codec / file handling --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanError {
    /// Whether this is an expected negative result rather than a failure.
    ///
    /// Only `NoDocumentDetected` qualifies: the caller shows the original
    /// image and offers a retry.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::NoDocumentDetected)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
