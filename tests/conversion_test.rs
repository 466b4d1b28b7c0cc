//! Integration tests for the core conversion operations.

use std::io::{Cursor, Read};

use docweave::convert::{convert_markup_to_document, convert_upload, extract_upload};
use docweave::markup::{has_injected_style, inject_default_style, parse_markup};
use docweave::{
    build_document, convert_markup_to_package, convert_package_to_markup, ConversionContext,
    ErrorKind, PackageFamily, StructuredBlock,
};

const ROUND_TRIP_MARKUP: &str = "<h1>Quarterly report</h1>\
    <p>Revenue grew in every region.</p>\
    <ul><li>North</li><li>South</li></ul>\
    <table><tr><th>Region</th><th>Growth</th></tr><tr><td>North</td><td>4%</td></tr></table>";

fn document_xml(docx: &[u8]) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

#[test]
fn test_weak_round_trip_preserves_counts() {
    let ctx = ConversionContext::default();

    let docx = convert_markup_to_package(&ctx, ROUND_TRIP_MARKUP).unwrap();
    let html = convert_package_to_markup(&ctx, &docx).unwrap();
    let doc = convert_markup_to_document(&ctx, &html).unwrap();

    assert_eq!(doc.heading_count(), 1);
    assert_eq!(doc.paragraph_count(), 1);
    assert_eq!(doc.list_item_count(), 2);
    assert_eq!(doc.table_row_count(), 2);
}

#[test]
fn test_round_trip_keeps_text() {
    let ctx = ConversionContext::default();
    let docx = convert_markup_to_package(&ctx, ROUND_TRIP_MARKUP).unwrap();
    let doc = convert_markup_to_document(&ctx, &convert_package_to_markup(&ctx, &docx).unwrap())
        .unwrap();

    assert_eq!(doc.blocks[0], StructuredBlock::heading(1, "Quarterly report"));
    assert_eq!(
        doc.blocks[2],
        StructuredBlock::list_item(false, "North")
    );
    assert!(doc
        .iter()
        .any(|b| b == &StructuredBlock::table_row(vec!["North".into(), "4%".into()], false)));
}

#[test]
fn test_style_injection_is_idempotent() {
    let mut tree = parse_markup("<h1>Title</h1>").unwrap();
    assert!(inject_default_style(&mut tree));
    assert!(!inject_default_style(&mut tree));

    assert_eq!(tree.find_all(&["style"]).len(), 1);
    assert!(has_injected_style(&tree));
}

#[test]
fn test_converted_markup_has_single_style_block() {
    let ctx = ConversionContext::default();
    let docx = convert_markup_to_package(&ctx, "<p>Body</p>").unwrap();
    let html = convert_package_to_markup(&ctx, &docx).unwrap();

    assert_eq!(html.matches("<style").count(), 1);
    assert!(html.contains("font-family: Arial"));
    assert!(html.contains("border-collapse: collapse"));
}

#[test]
fn test_table_rectangularity_in_package() {
    let ctx = ConversionContext::default();
    let markup = "<table>\
        <tr><th>A</th><th>B</th><th>C</th></tr>\
        <tr><td>x</td><td>y</td></tr>\
        </table>";

    let doc = build_document(markup).unwrap();
    assert_eq!(
        doc.blocks,
        vec![
            StructuredBlock::table_row(vec!["A".into(), "B".into(), "C".into()], true),
            StructuredBlock::table_row(vec!["x".into(), "y".into(), String::new()], false),
        ]
    );

    let docx = convert_markup_to_package(&ctx, markup).unwrap();
    let xml = document_xml(&docx);
    assert_eq!(xml.matches("<w:tbl>").count(), 1);
    assert_eq!(xml.matches("<w:tr>").count(), 2);
    assert_eq!(xml.matches("<w:tc>").count(), 6);

    let html = convert_package_to_markup(&ctx, &docx).unwrap();
    let tree = parse_markup(&html).unwrap();
    let rows = tree.find_all(&["tr"]);
    assert_eq!(rows.len(), 2);
    let last_row: Vec<String> = rows[1]
        .find_all(&["td"])
        .iter()
        .map(|c| c.full_text())
        .collect();
    assert_eq!(last_row, vec!["x", "y", ""]);
}

#[test]
fn test_extension_gate() {
    assert_eq!(
        PackageFamily::from_file_name("report.DOCX").unwrap(),
        PackageFamily::Modern
    );
    assert_eq!(
        PackageFamily::from_file_name("memo.doc").unwrap(),
        PackageFamily::Legacy
    );

    let ctx = ConversionContext::default();
    let err = convert_upload(&ctx, "notes.txt", b"hello").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputValidation);
    let err = extract_upload(&ctx, "notes.txt", b"hello").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputValidation);
}

#[test]
fn test_heading_level_drop() {
    let doc = build_document("<h3>Third</h3><p>Body</p>").unwrap();
    assert_eq!(doc.heading_count(), 0);
    assert_eq!(doc.blocks, vec![StructuredBlock::paragraph("Body")]);
}

#[test]
fn test_legacy_package_has_no_markup_conversion() {
    let ctx = ConversionContext::default();
    let cfb_magic = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0, 0];
    let err = convert_upload(&ctx, "memo.doc", &cfb_magic).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
}

#[test]
fn test_public_messages_hide_diagnostics() {
    let ctx = ConversionContext::default();
    let err = convert_package_to_markup(&ctx, b"PK\x03\x04 not really a zip").unwrap_err();
    assert!(err.to_string().contains("ZIP"));
    assert!(!err.public_message().contains("ZIP"));

    let err = convert_upload(&ctx, "notes.txt", b"x").unwrap_err();
    assert!(err.public_message().contains(".txt"));
}
