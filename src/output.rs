//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every image is shown by its positional index and input name first, with
//! what happened to it as indented context lines. The index is the image's
//! position on the command line (after directory expansion), so progress
//! lines can be matched to inputs even though they arrive out of order.
//!
//! # Output Format
//!
//! ## Progress
//!
//! ```text
//! 001 photos/dawn.jpg
//!     800x400 → 200x100
//! 002 photos/tall.png
//!     400x800 → 200x200
//!     Crop: 400x400 at 0,200
//! 001 photos/dawn.jpg
//!     file: 5120 bytes
//! 002 photos/tall.png
//!     Failed: Failed to resize photos/tall.png: ...
//! ```
//!
//! ## Summary
//!
//! ```text
//! Resized 1 of 2 images
//!     photos/dawn.jpg → out/image-1718000000000-k3j9x0.webp
//!     photos/tall.png failed
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::imaging::Dimensions;
use crate::process::ProcessEvent;
use crate::types::ImageReport;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 0-based slot as a 1-based, 3-digit zero-padded index.
fn format_index(slot: usize) -> String {
    format!("{:0>3}", slot + 1)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn image_line(slot: usize, name: &str) -> String {
    format!("{} {}", format_index(slot), name)
}

fn size(d: Dimensions) -> String {
    format!("{}x{}", d.width, d.height)
}

// ============================================================================
// Progress
// ============================================================================

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::ImageLoaded { index, name, plan } => {
            let mut lines = vec![
                image_line(*index, name),
                format!(
                    "{}{} \u{2192} {}",
                    indent(1),
                    size(plan.natural),
                    size(plan.target)
                ),
            ];
            if let Some(crop) = plan.crop {
                lines.push(format!(
                    "{}Crop: {}x{} at {},{}",
                    indent(1),
                    crop.width,
                    crop.height,
                    crop.x,
                    crop.y
                ));
            }
            lines
        }
        ProcessEvent::ImageResized {
            index,
            name,
            kind,
            encoded_bytes,
        } => vec![
            image_line(*index, name),
            format!("{}{}: {} bytes", indent(1), kind, encoded_bytes),
        ],
        ProcessEvent::ImageFailed { index, name, error } => vec![
            image_line(*index, name),
            format!("{}Failed: {}", indent(1), error),
        ],
    }
}

/// Print a progress event to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Print a progress event to stderr, for runs where stdout carries image data.
pub fn eprint_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Format the end-of-run summary: a count line, then one line per image.
pub fn format_summary(reports: &[ImageReport]) -> Vec<String> {
    let resized = reports.iter().filter(|r| r.error.is_none()).count();
    let noun = if reports.len() == 1 { "image" } else { "images" };
    let mut lines = vec![format!(
        "Resized {} of {} {}",
        resized,
        reports.len(),
        noun
    )];

    for report in reports {
        match (&report.destination, &report.error) {
            (_, Some(_)) => lines.push(format!("{}{} failed", indent(1), report.input)),
            (Some(dest), None) => lines.push(format!(
                "{}{} \u{2192} {}",
                indent(1),
                report.input,
                dest
            )),
            (None, None) => {}
        }
    }
    lines
}

/// Print the summary to stderr. Stdout is reserved for base64 output.
pub fn print_summary(reports: &[ImageReport]) {
    for line in format_summary(reports) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
