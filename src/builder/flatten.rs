//! Markup tree to structured document.
//!
//! In the default [`TraversalMode::Flattened`] mode every element of the
//! tree is visited in document order, wherever it is nested, and dispatched
//! on its tag:
//!
//! - `h1`..`h6` become headings up to the configured level; deeper
//!   headings are dropped.
//! - `p` becomes a paragraph.
//! - `ul`/`ol` emit one list item for every `li` anywhere below them.
//! - `table` emits one row for every `tr` anywhere below it.
//! - everything else emits nothing by itself.
//!
//! Because the list and table searches cover the whole subtree, a list
//! nested in a list yields its items once for itself and once more for
//! each enclosing list. The same holds for nested tables.

use super::options::{BuildOptions, TraversalMode};
use crate::markup::ParsedNode;
use crate::model::{StructuredBlock, StructuredDocument};

/// Recognized block kinds, computed once per visited element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    /// `h1`..`h6`
    Heading(u8),
    /// `p`
    Paragraph,
    /// `ul` or `ol`
    List {
        /// True for `ol`
        ordered: bool,
    },
    /// `table`
    Table,
    /// Anything else
    Other,
}

impl BlockTag {
    /// Classify a node by its tag name.
    pub fn classify(node: &ParsedNode) -> Self {
        match node.tag_name() {
            Some("h1") => BlockTag::Heading(1),
            Some("h2") => BlockTag::Heading(2),
            Some("h3") => BlockTag::Heading(3),
            Some("h4") => BlockTag::Heading(4),
            Some("h5") => BlockTag::Heading(5),
            Some("h6") => BlockTag::Heading(6),
            Some("p") => BlockTag::Paragraph,
            Some("ul") => BlockTag::List { ordered: false },
            Some("ol") => BlockTag::List { ordered: true },
            Some("table") => BlockTag::Table,
            _ => BlockTag::Other,
        }
    }
}

/// Build a structured document from a parsed markup tree.
///
/// # Example
///
/// ```
/// use docweave::builder::{build, BuildOptions};
/// use docweave::markup::parse_markup;
///
/// let tree = parse_markup("<h1>Title</h1><h3>Dropped</h3><p>Body</p>").unwrap();
/// let doc = build(&tree, &BuildOptions::default());
/// assert_eq!(doc.heading_count(), 1);
/// assert_eq!(doc.paragraph_count(), 1);
/// ```
pub fn build(tree: &ParsedNode, options: &BuildOptions) -> StructuredDocument {
    let mut doc = StructuredDocument::new();

    for (node, tag) in flatten(tree, options.traversal) {
        match tag {
            BlockTag::Heading(level) if level <= options.max_heading_level => {
                doc.push(StructuredBlock::heading(level, node.full_text()));
            }
            BlockTag::Heading(_) => {}
            BlockTag::Paragraph => doc.push(StructuredBlock::paragraph(node.full_text())),
            BlockTag::List { ordered } => {
                for item in node.find_all(&["li"]) {
                    doc.push(StructuredBlock::list_item(ordered, item.full_text()));
                }
            }
            BlockTag::Table => emit_table(node, &mut doc),
            BlockTag::Other => {}
        }
    }

    doc
}

/// Ordered list of recognized elements to dispatch.
pub fn flatten(tree: &ParsedNode, mode: TraversalMode) -> Vec<(&ParsedNode, BlockTag)> {
    match mode {
        TraversalMode::Flattened => std::iter::once(tree)
            .chain(tree.descendants())
            .map(|node| (node, BlockTag::classify(node)))
            .filter(|(_, tag)| *tag != BlockTag::Other)
            .collect(),
        TraversalMode::TopLevel => {
            let mut out = Vec::new();
            collect_top_level(tree, &mut out);
            out
        }
    }
}

fn collect_top_level<'a>(node: &'a ParsedNode, out: &mut Vec<(&'a ParsedNode, BlockTag)>) {
    match BlockTag::classify(node) {
        BlockTag::Other => {
            for child in node.children() {
                collect_top_level(child, out);
            }
        }
        tag => out.push((node, tag)),
    }
}

/// Emit one table as a run of rows.
///
/// The first row fixes the column count and may use header or data cells.
/// Later rows only read data cells: rows without any are skipped, shorter
/// rows are padded with blank cells and longer rows are truncated.
fn emit_table(table: &ParsedNode, doc: &mut StructuredDocument) {
    let rows = table.find_all(&["tr"]);
    let Some((first, rest)) = rows.split_first() else {
        return;
    };

    let header: Vec<String> = first
        .find_all(&["th", "td"])
        .iter()
        .map(|cell| cell.full_text())
        .collect();
    if header.is_empty() {
        return;
    }
    let columns = header.len();
    doc.push(StructuredBlock::table_row(header, true));

    for row in rest {
        let cells = row.find_all(&["td"]);
        if cells.is_empty() {
            continue;
        }
        let mut texts: Vec<String> = cells
            .iter()
            .take(columns)
            .map(|cell| cell.full_text())
            .collect();
        texts.resize(columns, String::new());
        doc.push(StructuredBlock::table_row(texts, false));
    }
}
