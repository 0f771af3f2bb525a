// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadscan — command-line document scanner.
//
// Entry point. Parses arguments, initialises logging, and runs one scan.

mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use quadscan_core::human_errors::humanize_error;

/// Exit status when no page was found and the original was written instead.
const EXIT_NO_DOCUMENT: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "quadscan")]
#[command(version, about = "Find a photographed page and flatten it")]
pub struct Cli {
    /// Photo to scan
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Where to write the rectified page (the original if none is found)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: PathBuf,

    /// JSON file overriding scanner thresholds
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Also write the input with the detected outline drawn on it
    #[arg(long, value_name = "FILE")]
    pub preview: Option<PathBuf>,

    /// Sharpen the rectified page (output becomes grayscale)
    #[arg(long)]
    pub sharpen: bool,

    /// Rotate the rectified page clockwise
    #[arg(long, default_value_t = 0, value_parser = parse_rotation)]
    pub rotate: u32,

    /// Print a JSON report of the scan to stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_rotation(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(degrees @ (0 | 90 | 180 | 270)) => Ok(degrees),
        _ => Err(format!("expected 0, 90, 180, or 270, got {value:?}")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(input = %cli.input.display(), "Quadscan starting");

    match run::run(&cli) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => tracing::warn!(error = %e, "Could not serialise scan report"),
                }
            }
            if report.detected {
                ExitCode::SUCCESS
            } else {
                eprintln!("Document not detected; the original image was written to the output.");
                ExitCode::from(EXIT_NO_DOCUMENT)
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "Scan failed");
            let human = humanize_error(&err);
            eprintln!("{}\n{}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "quadscan",
            "photo.jpg",
            "-o",
            "page.png",
            "--preview",
            "outline.png",
            "--sharpen",
            "--rotate",
            "270",
            "-v",
        ])
        .expect("valid arguments");
        assert_eq!(cli.input, PathBuf::from("photo.jpg"));
        assert_eq!(cli.output, PathBuf::from("page.png"));
        assert_eq!(cli.preview, Some(PathBuf::from("outline.png")));
        assert!(cli.sharpen);
        assert_eq!(cli.rotate, 270);
        assert!(cli.verbose);
        assert!(!cli.json);
        assert!(cli.config.is_none());
    }

    #[test]
    fn rotation_defaults_to_zero() {
        let cli = Cli::try_parse_from(["quadscan", "in.png", "--output", "out.png"])
            .expect("valid arguments");
        assert_eq!(cli.rotate, 0);
    }

    #[test]
    fn rejects_non_quarter_rotation() {
        assert!(Cli::try_parse_from(["quadscan", "in.png", "-o", "out.png", "--rotate", "45"]).is_err());
    }

    #[test]
    fn output_is_required() {
        assert!(Cli::try_parse_from(["quadscan", "in.png"]).is_err());
    }
}
