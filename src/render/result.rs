//! Export result.

use serde::Serialize;

use super::ExportFormat;

/// Rendered export bytes with their metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    /// Rendered bytes
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// MIME type of `bytes`
    pub mime_type: &'static str,

    /// File extension without the leading dot
    pub extension: &'static str,

    /// Paragraph units rendered (lines for the plain-text export)
    pub paragraph_count: usize,
}

impl ExportResult {
    /// Create a result for `format`.
    pub fn new(format: ExportFormat, bytes: Vec<u8>, paragraph_count: usize) -> Self {
        Self {
            bytes,
            mime_type: format.mime_type(),
            extension: format.extension(),
            paragraph_count,
        }
    }

    /// Length of the rendered output in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the rendered output is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Output as UTF-8 text, for the text-based formats.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}
