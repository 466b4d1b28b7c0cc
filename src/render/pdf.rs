//! PDF export.
//!
//! Builds a text-only document with lopdf: one base-14 Helvetica font in
//! WinAnsi encoding, greedy word wrap measured with the Helvetica metrics,
//! and a new page whenever the next line would cross the bottom margin.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};

use super::ExportOptions;

const FONT_NAME: &str = "F1";

/// Advance widths of Helvetica for U+0020..=U+007E, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Width used for Latin-1 characters above the ASCII range.
const DEFAULT_WIDTH: u16 = 556;

/// Render paragraphs to PDF bytes.
pub fn render_pdf(paragraphs: &[&str], options: &ExportOptions) -> Result<Vec<u8>> {
    let pages = layout(paragraphs, options);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_NAME => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page = options.page;
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), page.width.into(), page.height.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = info_dictionary(&mut doc, &options.title);
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| Error::Export(format!("PDF write failed: {}", e)))?;
    Ok(buf)
}

fn info_dictionary(doc: &mut Document, title: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_latin1(title)),
        "Producer" => Object::string_literal("docweave"),
    })
}

/// Lay paragraphs out into per-page content operations.
fn layout(paragraphs: &[&str], options: &ExportOptions) -> Vec<Vec<Operation>> {
    let page = options.page;
    let top = page.height - page.margin - options.font_size;
    let bottom = page.margin;

    let mut pages = Vec::new();
    let mut current: Vec<Operation> = Vec::new();
    let mut y = top;

    for paragraph in paragraphs {
        for line in wrap(paragraph, page.text_width(), options.font_size) {
            if y < bottom && !current.is_empty() {
                pages.push(std::mem::take(&mut current));
                y = top;
            }
            current.extend(text_line(&line, page.margin, y, options.font_size));
            y -= options.leading;
        }
        y -= options.paragraph_spacing;
    }

    // An empty export is still a valid one-page document.
    if !current.is_empty() || pages.is_empty() {
        pages.push(current);
    }
    pages
}

fn text_line(line: &str, x: f32, y: f32, size: f32) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_NAME.into(), size.into()]),
        Operation::new("Td", vec![x.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(encode_latin1(line))]),
        Operation::new("ET", vec![]),
    ]
}

/// Greedy word wrap. Words wider than a full line are split by character.
fn wrap(paragraph: &str, max_width: f32, size: f32) -> Vec<String> {
    let space = text_width(" ", size);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0.0f32;

    for word in paragraph.split_whitespace() {
        let word_width = text_width(word, size);

        if word_width > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                width = 0.0;
            }
            for c in word.chars() {
                let w = char_width(c, size);
                if width + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    width = 0.0;
                }
                line.push(c);
                width += w;
            }
            continue;
        }

        if line.is_empty() {
            line.push_str(word);
            width = word_width;
        } else if width + space + word_width <= max_width {
            line.push(' ');
            line.push_str(word);
            width += space + word_width;
        } else {
            lines.push(std::mem::replace(&mut line, word.to_string()));
            width = word_width;
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

fn char_width(c: char, size: f32) -> f32 {
    let units = match c as u32 {
        code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    };
    f32::from(units) * size / 1000.0
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(|c| char_width(c, size)).sum()
}

/// Encode for WinAnsi; characters outside Latin-1 become `?`.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x09 => b' ',
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Text-showing operations per page of a rendered document.
    pub(crate) fn shown_lines(bytes: &[u8]) -> Vec<Vec<String>> {
        let doc = Document::load_mem(bytes).unwrap();
        doc.get_pages()
            .values()
            .map(|page_id| {
                let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
                content
                    .operations
                    .iter()
                    .filter(|op| op.operator == "Tj")
                    .map(|op| match &op.operands[0] {
                        Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
                        other => panic!("unexpected operand {:?}", other),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_one_text_line_per_short_paragraph() {
        let bytes = render_pdf(&["Line1", "Line2"], &ExportOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(
            shown_lines(&bytes),
            vec![vec!["Line1".to_string(), "Line2".to_string()]]
        );
    }

    #[test]
    fn test_empty_export_has_one_page() {
        let bytes = render_pdf(&[], &ExportOptions::default()).unwrap();
        let pages = shown_lines(&bytes);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty());
    }

    #[test]
    fn test_page_breaks() {
        let paragraphs: Vec<String> = (0..100).map(|i| format!("Paragraph {}", i)).collect();
        let refs: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
        let bytes = render_pdf(&refs, &ExportOptions::default()).unwrap();

        let pages = shown_lines(&bytes);
        assert!(pages.len() > 1);
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), 100);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "word ".repeat(200);
        let lines = wrap(&text, 451.0, 10.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 10.0) <= 451.0);
        }
        assert_eq!(lines.join(" ").split_whitespace().count(), 200);
    }

    #[test]
    fn test_wrap_splits_long_word() {
        let word = "x".repeat(500);
        let lines = wrap(&word, 100.0, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("café"), b"caf\xE9".to_vec());
        assert_eq!(encode_latin1("日本"), b"??".to_vec());
        assert_eq!(encode_latin1("a\tb"), b"a b".to_vec());
    }
}
