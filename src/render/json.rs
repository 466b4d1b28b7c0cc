//! JSON dump of a structured document.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{DocumentStats, StructuredBlock, StructuredDocument};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct Inspection<'a> {
    stats: DocumentStats,
    blocks: &'a [StructuredBlock],
}

/// Convert a structured document to JSON, with its statistics.
pub fn to_json(doc: &StructuredDocument, format: JsonFormat) -> Result<String> {
    let inspection = Inspection {
        stats: doc.stats(),
        blocks: &doc.blocks,
    };
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&inspection),
        JsonFormat::Compact => serde_json::to_string(&inspection),
    };

    result.map_err(|e| Error::Export(format!("JSON serialization error: {}", e)))
}
