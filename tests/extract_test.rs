//! Integration tests for text extraction.

use std::io::{Cursor, Write};

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};
use docweave::convert::extract_text_report;
use docweave::package::ExtractionChain;
use docweave::{
    convert_package_to_markup, extract_text, ConversionContext, ErrorKind, ExtractedText,
    ParseOptions,
};

fn docx_with_paragraphs(texts: &[&str]) -> Vec<u8> {
    let docx = texts.iter().fold(Docx::new(), |docx, text| {
        let paragraph = if text.is_empty() {
            Paragraph::new()
        } else {
            Paragraph::new().add_run(Run::new().add_text(*text))
        };
        docx.add_paragraph(paragraph)
    });
    pack(docx)
}

fn pack(docx: Docx) -> Vec<u8> {
    let mut buf = Vec::new();
    docx.build().pack(&mut Cursor::new(&mut buf)).unwrap();
    buf
}

fn zip_with_document(xml: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }
    buf
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
        }
    }
    !crc
}

/// A stored single-part package whose central directory claims, through a
/// zip64 extra field, that the part inflates to `claimed` bytes.
fn package_claiming_size(name: &str, content: &[u8], claimed: u64) -> Vec<u8> {
    const DOS_DATE: u16 = (40 << 9) | (1 << 5) | 1;
    let crc = crc32(content);
    let name = name.as_bytes();
    let len = content.len() as u32;
    let mut out = Vec::new();

    out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
    out.extend_from_slice(&20u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&DOS_DATE.to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(content);

    let mut extra = Vec::new();
    extra.extend_from_slice(&1u16.to_le_bytes());
    extra.extend_from_slice(&8u16.to_le_bytes());
    extra.extend_from_slice(&claimed.to_le_bytes());

    let directory_start = out.len();
    out.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&DOS_DATE.to_le_bytes());
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&len.to_le_bytes());
    // Uncompressed size deferred to the zip64 extra field.
    out.extend_from_slice(&u32::MAX.to_le_bytes());
    out.extend_from_slice(&(name.len() as u16).to_le_bytes());
    out.extend_from_slice(&(extra.len() as u16).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&extra);
    let directory_len = out.len() - directory_start;

    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&(directory_len as u32).to_le_bytes());
    out.extend_from_slice(&(directory_start as u32).to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

const SMALL_DOCUMENT: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#;

#[test]
fn test_blank_paragraphs_are_dropped() {
    let ctx = ConversionContext::default();
    let bytes = docx_with_paragraphs(&["Hello", "", "World"]);
    assert_eq!(
        extract_text(&ctx, &bytes, false).unwrap(),
        ExtractedText::Text("Hello\nWorld".into())
    );
}

#[test]
fn test_whitespace_only_paragraphs_are_dropped() {
    let ctx = ConversionContext::default();
    let bytes = docx_with_paragraphs(&["First", "   ", "Second"]);
    assert_eq!(
        extract_text(&ctx, &bytes, false).unwrap().as_str(),
        Some("First\nSecond")
    );
}

#[test]
fn test_table_text_is_not_a_body_paragraph() {
    let ctx = ConversionContext::default();
    let docx = Docx::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Intro")))
        .add_table(Table::new(vec![TableRow::new(vec![TableCell::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Cell")))])]));
    let report = extract_text_report(&ctx, &pack(docx), false).unwrap();

    assert_eq!(report.strategy, Some("structured-paragraphs"));
    assert_eq!(report.text.as_str(), Some("Intro"));
    assert!(report.failures.is_empty());
}

#[test]
fn test_table_only_document_has_no_body_text() {
    let ctx = ConversionContext::default();
    let docx = Docx::new().add_table(Table::new(vec![TableRow::new(vec![TableCell::new()
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Cell")))])]));
    let report = extract_text_report(&ctx, &pack(docx), false).unwrap();

    // Same reader and same rule as a table preceded by an intro paragraph.
    assert_eq!(report.strategy, Some("structured-paragraphs"));
    assert_eq!(report.text, ExtractedText::NoText);
    assert!(report.failures.is_empty());
}

#[test]
fn test_directory_part_size_is_not_trusted() {
    let ctx = ConversionContext::default();
    for claimed in [1u64 << 63, 1u64 << 62] {
        let bytes = package_claiming_size("word/document.xml", SMALL_DOCUMENT.as_bytes(), claimed);

        let report = extract_text_report(&ctx, &bytes, false).unwrap();
        assert_eq!(report.text, ExtractedText::Text("Hello".into()));

        let html = convert_package_to_markup(&ctx, &bytes).unwrap();
        assert!(html.contains("<p>Hello</p>"));
    }
}

#[test]
fn test_inflated_part_limit() {
    let body = format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", "word ".repeat(2000));
    let xml = SMALL_DOCUMENT.replace("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>", &body);
    let bytes = zip_with_document(&xml);
    // Deflate keeps the package itself far below the limit.
    assert!(bytes.len() < 4096);

    let ctx = ConversionContext::default()
        .with_parse_options(ParseOptions::new().with_max_part_bytes(4096));
    let report = extract_text_report(&ctx, &bytes, false).unwrap();
    assert_eq!(report.text, ExtractedText::NoText);
    assert_eq!(report.strategy, None);
    assert!(report.failures.iter().all(|f| f.message.contains("limit")));

    let err = convert_package_to_markup(&ctx, &bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
}

#[test]
fn test_falls_back_to_raw_xml() {
    let ctx = ConversionContext::default();
    let bytes = zip_with_document("<w:document><w:body><w:p><w:t>kept</w:t></w:p></w:wrong>");
    let report = extract_text_report(&ctx, &bytes, false).unwrap();

    assert_eq!(report.strategy, Some("raw-xml"));
    assert_eq!(report.text, ExtractedText::Text("kept".into()));
    assert_eq!(report.failures[0].strategy, "structured-paragraphs");
}

#[test]
fn test_no_text_marker_is_distinct_from_empty() {
    let ctx = ConversionContext::default();

    let empty = docx_with_paragraphs(&["", ""]);
    let report = extract_text_report(&ctx, &empty, false).unwrap();
    assert_eq!(report.text, ExtractedText::NoText);
    assert_eq!(report.strategy, Some("structured-paragraphs"));
    assert!(report.failures.is_empty());

    let garbage = extract_text(&ctx, b"definitely not a package", true).unwrap();
    assert_eq!(garbage, ExtractedText::NoText);
    assert_eq!(garbage.as_str(), None);
}

#[test]
fn test_legacy_flag_accepts_modern_package() {
    let ctx = ConversionContext::default();
    let bytes = docx_with_paragraphs(&["Renamed", "file"]);
    let report = extract_text_report(&ctx, &bytes, true).unwrap();
    assert_eq!(report.strategy, Some("ooxml-raw-text"));
    assert_eq!(report.text.as_str(), Some("Renamed\n\nfile\n\n"));
}

#[test]
fn test_chain_order() {
    assert_eq!(
        ExtractionChain::modern().names(),
        vec!["structured-paragraphs", "raw-xml"]
    );
    assert_eq!(
        ExtractionChain::legacy().names(),
        vec!["ooxml-raw-text", "word-binary", "binary-scan"]
    );
}
