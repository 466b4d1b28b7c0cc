//! Block types.

use serde::{Deserialize, Serialize};

/// One unit of the structured document model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredBlock {
    /// A heading (level 1 or 2 unless a wider range is configured)
    Heading {
        /// Heading level, 1-based
        level: u8,
        /// Full descendant text of the heading element
        text: String,
    },

    /// A plain paragraph
    Paragraph {
        /// Full descendant text of the paragraph element
        text: String,
    },

    /// One item of an ordered or unordered list
    ListItem {
        /// Whether the owning list is ordered
        ordered: bool,
        /// Full descendant text of the item
        text: String,
    },

    /// One row of a table. All rows of a table share the first row's
    /// column count.
    TableRow {
        /// Cell texts in column order
        cells: Vec<String>,
        /// Set on the first row of every table, so adjacent tables stay apart
        #[serde(default)]
        header: bool,
    },
}

impl StructuredBlock {
    /// Create a heading block.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        StructuredBlock::Heading {
            level,
            text: text.into(),
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>) -> Self {
        StructuredBlock::Paragraph { text: text.into() }
    }

    /// Create a list item block.
    pub fn list_item(ordered: bool, text: impl Into<String>) -> Self {
        StructuredBlock::ListItem {
            ordered,
            text: text.into(),
        }
    }

    /// Create a table row block.
    pub fn table_row(cells: Vec<String>, header: bool) -> Self {
        StructuredBlock::TableRow { cells, header }
    }

    /// Short name of the block kind.
    pub fn kind(&self) -> &'static str {
        match self {
            StructuredBlock::Heading { .. } => "heading",
            StructuredBlock::Paragraph { .. } => "paragraph",
            StructuredBlock::ListItem { .. } => "list_item",
            StructuredBlock::TableRow { .. } => "table_row",
        }
    }

    /// Check if this is a table row.
    pub fn is_table_row(&self) -> bool {
        matches!(self, StructuredBlock::TableRow { .. })
    }

    /// Plain text of the block. Table cells are separated by tabs.
    pub fn plain_text(&self) -> String {
        match self {
            StructuredBlock::Heading { text, .. }
            | StructuredBlock::Paragraph { text }
            | StructuredBlock::ListItem { text, .. } => text.clone(),
            StructuredBlock::TableRow { cells, .. } => cells.join("\t"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(StructuredBlock::heading(1, "Title").plain_text(), "Title");
        let row = StructuredBlock::table_row(vec!["a".into(), "".into(), "c".into()], false);
        assert_eq!(row.plain_text(), "a\t\tc");
        assert!(row.is_table_row());
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&StructuredBlock::list_item(true, "one")).unwrap();
        assert_eq!(json, r#"{"kind":"list_item","ordered":true,"text":"one"}"#);

        let block: StructuredBlock =
            serde_json::from_str(r#"{"kind":"table_row","cells":["x"]}"#).unwrap();
        assert_eq!(block, StructuredBlock::table_row(vec!["x".into()], false));
    }
}
