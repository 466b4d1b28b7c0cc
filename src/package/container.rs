//! OOXML package container.
//!
//! A modern Word package is a ZIP archive of XML parts. This module opens
//! the archive, reads parts by name and parses the small package-wide parts
//! (relationships and style names) that the body readers depend on.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Main document part.
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Numbering definitions part.
pub const NUMBERING_PART: &str = "word/numbering.xml";

/// Style definitions part.
pub const STYLES_PART: &str = "word/styles.xml";

/// Relationships of the main document part.
pub const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Default ceiling on the decompressed size of a single part.
pub const DEFAULT_MAX_PART_BYTES: usize = 64 * 1024 * 1024;

/// An opened OOXML package.
pub struct OoxmlPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    max_part_bytes: usize,
}

impl<'a> OoxmlPackage<'a> {
    /// Open a package from bytes.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self {
            archive,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
        })
    }

    /// Limit the decompressed size of any part read (0 = unlimited).
    ///
    /// Sizes recorded in the archive directory are not trusted; a part is
    /// rejected once more than `bytes` have actually been inflated.
    pub fn with_max_part_bytes(mut self, bytes: usize) -> Self {
        self.max_part_bytes = bytes;
        self
    }

    /// Names of every part in the archive.
    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Check whether a part exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.archive.file_names().any(|n| n == name)
    }

    /// Read a part as raw bytes.
    pub fn read_part_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let limit = self.max_part_bytes;
        let file = self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Error::Conversion(format!("missing package part {}", name)),
            other => other.into(),
        })?;
        read_limited(file, limit, &format!("package part {}", name))
    }

    /// Read a part as UTF-8 text.
    pub fn read_part(&mut self, name: &str) -> Result<String> {
        let data = self.read_part_bytes(name)?;
        String::from_utf8(data)
            .map_err(|_| Error::Conversion(format!("package part {} is not UTF-8", name)))
    }

    /// Read a part that may be absent.
    pub fn read_optional_part(&mut self, name: &str) -> Result<Option<String>> {
        if !self.has_part(name) {
            return Ok(None);
        }
        self.read_part(name).map(Some)
    }

    /// Read the main document part.
    pub fn main_document(&mut self) -> Result<String> {
        self.read_part(MAIN_DOCUMENT_PART)
    }

    /// Read the main document relationships. Missing relationships yield an
    /// empty table.
    pub fn relationships(&mut self) -> Result<Relationships> {
        match self.read_optional_part(DOCUMENT_RELS_PART)? {
            Some(xml) => Relationships::parse(&xml),
            None => Ok(Relationships::default()),
        }
    }

    /// Read the style id to style name table. Missing styles yield an
    /// empty table.
    pub fn style_names(&mut self) -> Result<StyleNames> {
        match self.read_optional_part(STYLES_PART)? {
            Some(xml) => StyleNames::parse(&xml),
            None => Ok(StyleNames::default()),
        }
    }
}

/// Read `reader` to the end, failing once more than `limit` bytes arrive
/// (0 = unlimited).
pub(crate) fn read_limited<R: Read>(reader: R, limit: usize, what: &str) -> Result<Vec<u8>> {
    let cap = if limit == 0 {
        u64::MAX
    } else {
        (limit as u64).saturating_add(1)
    };
    let mut data = Vec::new();
    reader
        .take(cap)
        .read_to_end(&mut data)
        .map_err(|e| Error::Conversion(format!("reading {}: {}", what, e)))?;
    if limit > 0 && data.len() > limit {
        return Err(Error::Conversion(format!(
            "{} is larger than the {} byte limit",
            what, limit
        )));
    }
    Ok(data)
}

/// Relationship id to target map.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    targets: HashMap<String, String>,
}

impl Relationships {
    /// Parse a `.rels` part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut targets = HashMap::new();
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == b"Relationship" => {
                    if let (Some(id), Some(target)) = (attr_val(&e, b"Id"), attr_val(&e, b"Target")) {
                        targets.insert(id, target);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { targets })
    }

    /// Target of a relationship.
    pub fn target(&self, id: &str) -> Option<&str> {
        self.targets.get(id).map(String::as_str)
    }

    /// Number of relationships.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if there are no relationships.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Paragraph style id to display name map.
#[derive(Debug, Clone, Default)]
pub struct StyleNames {
    names: HashMap<String, String>,
}

impl StyleNames {
    /// Parse a styles part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut names = HashMap::new();
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();
        let mut current: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if local_name(e.name().as_ref()) == b"style" => {
                    current = attr_val(&e, b"styleId");
                }
                Event::Start(e) | Event::Empty(e) if local_name(e.name().as_ref()) == b"name" => {
                    if let (Some(id), Some(name)) = (current.as_ref(), attr_val(&e, b"val")) {
                        names.insert(id.clone(), name);
                    }
                }
                Event::End(e) if local_name(e.name().as_ref()) == b"style" => current = None,
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { names })
    }

    /// Display name of a style id.
    pub fn name_of(&self, style_id: &str) -> Option<&str> {
        self.names.get(style_id).map(String::as_str)
    }
}

/// Local part of a possibly prefixed XML name.
pub(crate) fn local_name(qname: &[u8]) -> &[u8] {
    match qname.iter().position(|&b| b == b':') {
        Some(i) => &qname[i + 1..],
        None => qname,
    }
}

/// Attribute value by local name.
pub(crate) fn attr_val(e: &BytesStart<'_>, key_local: &[u8]) -> Option<String> {
    e.attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key_local)
        .map(|attr| match attr.unescape_value() {
            Ok(value) => value.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            for (name, content) in parts {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_parts() {
        let bytes = package(&[(MAIN_DOCUMENT_PART, "<w:document/>")]);
        let mut pkg = OoxmlPackage::open(&bytes).unwrap();
        assert!(pkg.has_part(MAIN_DOCUMENT_PART));
        assert_eq!(pkg.main_document().unwrap(), "<w:document/>");
        assert_eq!(pkg.read_optional_part(NUMBERING_PART).unwrap(), None);
    }

    #[test]
    fn test_missing_part_is_conversion_error() {
        let bytes = package(&[("other.xml", "<x/>")]);
        let mut pkg = OoxmlPackage::open(&bytes).unwrap();
        assert!(matches!(pkg.main_document(), Err(Error::Conversion(_))));
    }

    #[test]
    fn test_part_limit_counts_inflated_bytes() {
        let big = "x".repeat(4096);
        let bytes = package(&[(MAIN_DOCUMENT_PART, big.as_str())]);

        let mut pkg = OoxmlPackage::open(&bytes).unwrap().with_max_part_bytes(1024);
        let err = pkg.main_document().unwrap_err();
        assert!(matches!(err, Error::Conversion(ref m) if m.contains("limit")));

        let mut pkg = OoxmlPackage::open(&bytes).unwrap().with_max_part_bytes(4096);
        assert_eq!(pkg.main_document().unwrap().len(), 4096);

        let mut pkg = OoxmlPackage::open(&bytes).unwrap().with_max_part_bytes(0);
        assert_eq!(pkg.main_document().unwrap().len(), 4096);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            OoxmlPackage::open(b"definitely not a zip"),
            Err(Error::Conversion(_))
        ));
    }

    #[test]
    fn test_relationships() {
        let rels = Relationships::parse(
            r#"<?xml version="1.0"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId1" Type="hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External"/>
            </Relationships>"#,
        )
        .unwrap();
        assert_eq!(rels.target("rId1"), Some("https://example.com/?a=1&b=2"));
        assert_eq!(rels.target("rId2"), None);
    }

    #[test]
    fn test_style_names() {
        let styles = StyleNames::parse(
            r#"<w:styles xmlns:w="w">
              <w:style w:type="paragraph" w:styleId="Titre1"><w:name w:val="heading 1"/></w:style>
            </w:styles>"#,
        )
        .unwrap();
        assert_eq!(styles.name_of("Titre1"), Some("heading 1"));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"w:p"), b"p");
        assert_eq!(local_name(b"p"), b"p");
    }
}
