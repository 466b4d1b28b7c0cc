//! Document-level types.

use super::{DocumentStats, StructuredBlock};
use serde::{Deserialize, Serialize};

/// An ordered sequence of blocks.
///
/// Block order is the order in which the originating elements were met
/// during traversal; nothing reorders or groups them afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Blocks in document order
    pub blocks: Vec<StructuredBlock>,
}

/// A serialization unit: a single non-table block, or one table made of a
/// contiguous run of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// A heading, paragraph or list item
    Block(&'a StructuredBlock),
    /// Rows of one table, in order
    Table(Vec<&'a [String]>),
}

impl StructuredDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from blocks.
    pub fn from_blocks(blocks: Vec<StructuredBlock>) -> Self {
        Self { blocks }
    }

    /// Append a block.
    pub fn push(&mut self, block: StructuredBlock) {
        self.blocks.push(block);
    }

    /// Get the number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over blocks in order.
    pub fn iter(&self) -> std::slice::Iter<'_, StructuredBlock> {
        self.blocks.iter()
    }

    /// Number of heading blocks.
    pub fn heading_count(&self) -> usize {
        self.count_kind("heading")
    }

    /// Number of paragraph blocks.
    pub fn paragraph_count(&self) -> usize {
        self.count_kind("paragraph")
    }

    /// Number of list item blocks.
    pub fn list_item_count(&self) -> usize {
        self.count_kind("list_item")
    }

    /// Number of table row blocks.
    pub fn table_row_count(&self) -> usize {
        self.count_kind("table_row")
    }

    fn count_kind(&self, kind: &str) -> usize {
        self.blocks.iter().filter(|b| b.kind() == kind).count()
    }

    /// Group blocks into serialization units.
    ///
    /// A table ends at the first non-row block or at the next row flagged
    /// as a header, which starts a new table.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut rows: Vec<&[String]> = Vec::new();

        for block in &self.blocks {
            match block {
                StructuredBlock::TableRow { cells, header } => {
                    if *header && !rows.is_empty() {
                        segments.push(Segment::Table(std::mem::take(&mut rows)));
                    }
                    rows.push(cells.as_slice());
                }
                other => {
                    if !rows.is_empty() {
                        segments.push(Segment::Table(std::mem::take(&mut rows)));
                    }
                    segments.push(Segment::Block(other));
                }
            }
        }
        if !rows.is_empty() {
            segments.push(Segment::Table(rows));
        }

        segments
    }

    /// Collect statistics over all blocks.
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::new();
        for segment in self.segments() {
            match segment {
                Segment::Block(StructuredBlock::Heading { text, .. }) => {
                    stats.add_heading();
                    stats.count_text(text);
                }
                Segment::Block(StructuredBlock::ListItem { text, .. }) => {
                    stats.add_list_item();
                    stats.count_text(text);
                }
                Segment::Block(block) => {
                    stats.add_paragraph();
                    stats.count_text(&block.plain_text());
                }
                Segment::Table(rows) => {
                    stats.add_table();
                    for cells in rows {
                        stats.add_table_row();
                        for cell in cells {
                            stats.count_text(cell);
                        }
                    }
                }
            }
        }
        stats
    }

    /// Plain text of the document, one block per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a StructuredDocument {
    type Item = &'a StructuredBlock;
    type IntoIter = std::slice::Iter<'a, StructuredBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str], header: bool) -> StructuredBlock {
        StructuredBlock::table_row(cells.iter().map(|c| c.to_string()).collect(), header)
    }

    #[test]
    fn test_counts() {
        let doc = StructuredDocument::from_blocks(vec![
            StructuredBlock::heading(1, "Title"),
            StructuredBlock::paragraph("Body"),
            StructuredBlock::list_item(false, "a"),
            StructuredBlock::list_item(false, "b"),
            row(&["A", "B"], true),
            row(&["1", "2"], false),
        ]);
        assert_eq!(doc.heading_count(), 1);
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.list_item_count(), 2);
        assert_eq!(doc.table_row_count(), 2);
    }

    #[test]
    fn test_segments_split_tables_on_header_rows() {
        let doc = StructuredDocument::from_blocks(vec![
            row(&["A"], true),
            row(&["1"], false),
            row(&["B"], true),
            StructuredBlock::paragraph("between"),
            row(&["2"], false),
        ]);
        let segments = doc.segments();
        assert_eq!(segments.len(), 4);
        assert!(matches!(&segments[0], Segment::Table(rows) if rows.len() == 2));
        assert!(matches!(&segments[1], Segment::Table(rows) if rows.len() == 1));
        assert!(matches!(segments[2], Segment::Block(_)));
        assert!(matches!(&segments[3], Segment::Table(rows) if rows.len() == 1));
    }

    #[test]
    fn test_stats() {
        let doc = StructuredDocument::from_blocks(vec![
            StructuredBlock::heading(2, "Two words"),
            row(&["A", "B"], true),
            row(&["x", ""], false),
        ]);
        let stats = doc.stats();
        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.table_row_count, 2);
        assert_eq!(stats.word_count, 5);
    }

    #[test]
    fn test_plain_text() {
        let doc = StructuredDocument::from_blocks(vec![
            StructuredBlock::paragraph("one"),
            row(&["a", "b"], true),
        ]);
        assert_eq!(doc.plain_text(), "one\na\tb");
    }
}
