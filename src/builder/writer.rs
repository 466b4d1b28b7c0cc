//! Structured document to Word package, using docx-rs.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, RunFonts, SpecialIndentType, Start, Style, StyleType, Table,
    TableCell, TableRow,
};

use super::options::BuildOptions;
use crate::error::{Error, Result};
use crate::model::{Segment, StructuredBlock, StructuredDocument};

/// Paragraph style id of unordered list items.
pub const LIST_BULLET_STYLE: &str = "ListBullet";

/// Paragraph style id of ordered list items.
pub const LIST_NUMBER_STYLE: &str = "ListNumber";

/// Table style id applied to every table.
pub const TABLE_GRID_STYLE: &str = "TableGrid";

// docx-rs always emits its own default numbering with id 1.
const BULLET_NUMBERING_ID: usize = 2;
const DECIMAL_NUMBERING_ID: usize = 3;

/// Heading sizes in half-points, level 1 first.
const HEADING_SIZES: [usize; 6] = [32, 28, 26, 24, 22, 20];

/// Serialize a structured document into Word package bytes.
///
/// Headings use the native `HeadingN` styles, list items carry native
/// numbering, and each contiguous run of table rows becomes one table
/// styled with a single-line grid.
pub fn to_docx(doc: &StructuredDocument, options: &BuildOptions) -> Result<Vec<u8>> {
    let mut docx = base_package(options);

    for segment in doc.segments() {
        docx = match segment {
            Segment::Block(block) => docx.add_paragraph(block_paragraph(block)),
            Segment::Table(rows) => docx.add_table(grid_table(&rows)),
        };
    }

    let mut buffer = Vec::new();
    docx.build()
        .pack(&mut Cursor::new(&mut buffer))
        .map_err(|e| Error::Build(format!("failed to pack package: {}", e)))?;

    Ok(buffer)
}

/// Empty package with the default text style, named styles and the two
/// list numberings.
fn base_package(options: &BuildOptions) -> Docx {
    let family = options.font_family.as_str();
    let fonts = RunFonts::new()
        .ascii(family)
        .hi_ansi(family)
        .east_asia(family)
        .cs(family);

    let mut docx = Docx::new()
        .default_fonts(fonts)
        .default_size(options.font_size_half_points());

    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        docx = docx.add_style(
            Style::new(&format!("Heading{}", level), StyleType::Paragraph)
                .name(&format!("Heading {}", level))
                .size(*size)
                .bold(),
        );
    }

    docx.add_style(Style::new(LIST_BULLET_STYLE, StyleType::Paragraph).name("List Bullet"))
        .add_style(Style::new(LIST_NUMBER_STYLE, StyleType::Paragraph).name("List Number"))
        .add_style(Style::new(TABLE_GRID_STYLE, StyleType::Table).name("Table Grid"))
        .add_abstract_numbering(
            AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(list_level("bullet", "\u{2022}")),
        )
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
        .add_abstract_numbering(
            AbstractNumbering::new(DECIMAL_NUMBERING_ID).add_level(list_level("decimal", "%1.")),
        )
        .add_numbering(Numbering::new(DECIMAL_NUMBERING_ID, DECIMAL_NUMBERING_ID))
}

fn list_level(format: &str, text: &str) -> Level {
    Level::new(
        0,
        Start::new(1),
        NumberFormat::new(format),
        LevelText::new(text),
        LevelJc::new("left"),
    )
    .indent(
        Some(720),
        Some(SpecialIndentType::Hanging(360)),
        None,
        None,
    )
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn block_paragraph(block: &StructuredBlock) -> Paragraph {
    match block {
        StructuredBlock::Heading { level, text } => {
            text_paragraph(text).style(&format!("Heading{}", (*level).clamp(1, 6)))
        }
        StructuredBlock::Paragraph { text } => text_paragraph(text),
        StructuredBlock::ListItem { ordered, text } => {
            let (style, numbering) = if *ordered {
                (LIST_NUMBER_STYLE, DECIMAL_NUMBERING_ID)
            } else {
                (LIST_BULLET_STYLE, BULLET_NUMBERING_ID)
            };
            text_paragraph(text)
                .style(style)
                .numbering(NumberingId::new(numbering), IndentLevel::new(0))
        }
        // Rows are grouped into tables by `segments`, a stray one is kept as text.
        StructuredBlock::TableRow { cells, .. } => text_paragraph(&cells.join("\t")),
    }
}

fn grid_table(rows: &[&[String]]) -> Table {
    let rows = rows
        .iter()
        .map(|cells| {
            TableRow::new(
                cells
                    .iter()
                    .map(|text| TableCell::new().add_paragraph(text_paragraph(text)))
                    .collect(),
            )
        })
        .collect();
    Table::new(rows).style(TABLE_GRID_STYLE)
}
