//! Rendering module for exporting linear text to various output formats.
//!
//! Every format except plain text splits the text on line boundaries,
//! drops blank lines, and renders each remaining line as one paragraph.
//!
//! # Example
//!
//! ```
//! use docweave::render::{export, ExportFormat, ExportOptions};
//!
//! let result = export("Line1\n\nLine2", ExportFormat::LightMarkup, &ExportOptions::default())?;
//! assert_eq!(result.paragraph_count, 2);
//! assert_eq!(result.as_text(), Some("# Converted document\n\nLine1\n\nLine2\n\n"));
//! # Ok::<(), docweave::Error>(())
//! ```

mod html;
mod json;
mod markdown;
mod options;
mod pdf;
mod result;
mod text;

pub use html::{render_html, SNAPSHOT_STYLESHEET};
pub use json::{to_json, JsonFormat};
pub use markdown::render_markdown;
pub use options::{ExportFormat, ExportOptions, PageGeometry};
pub use pdf::render_pdf;
pub use result::ExportResult;
pub use text::render_text;

use crate::error::Result;

/// Split text into paragraph lines, dropping lines that are blank.
///
/// Non-blank lines are kept exactly as written.
pub fn segment_lines(text: &str) -> Vec<&str> {
    text.lines().filter(|line| !line.trim().is_empty()).collect()
}

/// Render text in the given format.
pub fn export(text: &str, format: ExportFormat, options: &ExportOptions) -> Result<ExportResult> {
    let (bytes, count) = match format {
        ExportFormat::PageDoc => {
            let paragraphs = segment_lines(text);
            (render_pdf(&paragraphs, options)?, paragraphs.len())
        }
        ExportFormat::Markup => {
            let paragraphs = segment_lines(text);
            (render_html(&paragraphs, options)?.into_bytes(), paragraphs.len())
        }
        ExportFormat::LightMarkup => {
            let paragraphs = segment_lines(text);
            (render_markdown(&paragraphs, options).into_bytes(), paragraphs.len())
        }
        // No segmentation: blank lines survive and count as lines.
        ExportFormat::PlainText => (render_text(text).into_bytes(), text.lines().count()),
    };
    Ok(ExportResult::new(format, bytes, count))
}
