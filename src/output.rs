//! CLI output formatting.
//!
//! Output is **value-centric**: every report leads with the field or artifact
//! it is about, and details follow on indented lines.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Fields
//!     title: ok
//!     canonical: URL inválida (not-a-url)
//!
//! Contrast
//!     21.00:1 — Bom contraste
//!
//! 1 field with errors
//! ```
//!
//! ## Og
//!
//! ```text
//! Hello World → card.png
//!     1200x630 png, 14832 bytes
//! ```
//!
//! ## Serve
//!
//! ```text
//! MetaCraft listening on 127.0.0.1:3000
//!     Base URL: http://localhost:3000
//!     Images: 1200x630 png
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use crate::contrast::Contrast;
use crate::form::FieldError;
use crate::imaging::{OutputFormat, RenderedImage};
use crate::types::{Field, MetaConfig};
use std::collections::BTreeMap;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn format_name(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Png => "png",
        OutputFormat::Jpeg => "jpeg",
        OutputFormat::Webp => "webp",
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Per-field validation report plus the contrast of the OG colours.
pub fn format_check_report(
    values: &MetaConfig,
    errors: &BTreeMap<Field, FieldError>,
    contrast: &Contrast,
) -> Vec<String> {
    let mut lines = vec!["Fields".to_string()];
    for field in Field::ALL {
        let line = match errors.get(&field) {
            Some(err) => format!("{}{}: {} ({})", indent(1), field.key(), err, values.get(field)),
            None => format!("{}{}: ok", indent(1), field.key()),
        };
        lines.push(line);
    }
    lines.push(String::new());
    lines.push("Contrast".to_string());
    lines.push(format!("{}{}", indent(1), contrast));
    lines.push(String::new());
    if errors.is_empty() {
        lines.push("All fields valid".to_string());
    } else {
        lines.push(format!("{} with errors", plural(errors.len(), "field")));
    }
    lines
}

pub fn print_check_report(
    values: &MetaConfig,
    errors: &BTreeMap<Field, FieldError>,
    contrast: &Contrast,
) {
    for line in format_check_report(values, errors, contrast) {
        println!("{}", line);
    }
}

/// Confirmation after an OG image has been written to disk.
pub fn format_og_written(title: &str, path: &Path, image: &RenderedImage) -> Vec<String> {
    vec![
        format!("{} → {}", title, path.display()),
        format!(
            "{}{}x{} {}, {} bytes",
            indent(1),
            image.width,
            image.height,
            format_name(image.format),
            image.bytes.len()
        ),
    ]
}

pub fn print_og_written(title: &str, path: &Path, image: &RenderedImage) {
    for line in format_og_written(title, path, image) {
        println!("{}", line);
    }
}

/// Startup banner for `serve`.
pub fn format_serve_banner(
    bind: &str,
    base_url: &str,
    format: OutputFormat,
    dimensions: (u32, u32),
) -> Vec<String> {
    vec![
        format!("MetaCraft listening on {}", bind),
        format!("{}Base URL: {}", indent(1), base_url),
        format!(
            "{}Images: {}x{} {}",
            indent(1),
            dimensions.0,
            dimensions.1,
            format_name(format)
        ),
    ]
}

pub fn print_serve_banner(bind: &str, base_url: &str, format: OutputFormat, dimensions: (u32, u32)) {
    for line in format_serve_banner(bind, base_url, format, dimensions) {
        println!("{}", line);
    }
}

/// One line per applied edit in an `edit` session; errors are indented below.
pub fn format_edit_event(field: Field, value: &str, error: Option<&FieldError>) -> Vec<String> {
    let mut lines = vec![format!("{} = {}", field.key(), value)];
    if let Some(err) = error {
        lines.push(format!("{}{}", indent(1), err));
    }
    lines
}

/// Summary printed when an `edit` session ends.
pub fn format_edit_summary(location: &Path, edits: usize) -> Vec<String> {
    vec![format!(
        "{} → {}",
        plural(edits, "edit"),
        location.display()
    )]
}
