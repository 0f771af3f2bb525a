// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable notices for scan failures.
//
// Every error is mapped to plain English with a clear suggestion. The
// severity drives whether a front end shows the original image with a retry
// affordance or refuses to continue.

use crate::error::ScanError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The photo was fine but no page was found; show it and offer a retake.
    Retake,
    /// The user stopped the scan.
    Cancelled,
    /// This input or setting can never work; refuse to proceed.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a retake or retry is worthwhile.
    pub retriable: bool,
    /// Whether the original image should be displayed alongside the notice.
    pub show_original: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanError` into a `HumanError`.
pub fn humanize_error(err: &ScanError) -> HumanError {
    match err {
        // Both collapse to the same notice; the distinction only matters in logs.
        ScanError::NoDocumentDetected | ScanError::DegenerateGeometry(_) => HumanError {
            message: "Document not detected.".into(),
            suggestion: "Place the page on a contrasting surface, make sure all four corners are in the frame, and try again.".into(),
            retriable: true,
            show_original: true,
            severity: Severity::Retake,
        },

        ScanError::Cancelled => HumanError {
            message: "Scan cancelled.".into(),
            suggestion: "Start the scan again when you're ready.".into(),
            retriable: true,
            show_original: true,
            severity: Severity::Cancelled,
        },

        ScanError::InvalidInput(detail) => HumanError {
            message: "This image can't be scanned.".into(),
            suggestion: format!("The image appears to be empty or damaged. Try another photo. ({detail})"),
            retriable: false,
            show_original: false,
            severity: Severity::Permanent,
        },

        ScanError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            show_original: false,
            severity: Severity::Permanent,
        },

        ScanError::Config(detail) => HumanError {
            message: "The scanner settings are invalid.".into(),
            suggestion: format!("Fix or remove the settings file and try again. ({detail})"),
            retriable: false,
            show_original: false,
            severity: Severity::Permanent,
        },

        ScanError::Serialization(_) => HumanError {
            message: "The scanner settings file couldn't be read.".into(),
            suggestion: "Check that the settings file is valid JSON.".into(),
            retriable: false,
            show_original: false,
            severity: Severity::Permanent,
        },

        ScanError::Io(io_err) => HumanError {
            message: "A file couldn't be read or written.".into(),
            suggestion: format!("Check the file exists and that you have permission to use it. ({io_err})"),
            retriable: false,
            show_original: false,
            severity: Severity::Permanent,
        },
    }
}
