//! List numbering definitions (`word/numbering.xml`).

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::container::{attr_val, local_name};
use crate::error::Result;

/// Number format that marks an unordered list level.
const BULLET_FORMAT: &str = "bullet";

/// Resolved numbering instances and their level formats.
#[derive(Debug, Clone, Default)]
pub struct NumberingDefinitions {
    /// numId -> abstractNumId
    instances: HashMap<String, String>,
    /// abstractNumId -> (ilvl -> numFmt)
    formats: HashMap<String, HashMap<u32, String>>,
}

impl NumberingDefinitions {
    /// Parse a numbering part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut defs = Self::default();
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut abstract_id: Option<String> = None;
        let mut level: Option<u32> = None;
        let mut num_id: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => match local_name(e.name().as_ref()) {
                    b"abstractNum" => abstract_id = attr_val(&e, b"abstractNumId"),
                    b"lvl" => level = attr_val(&e, b"ilvl").and_then(|v| v.parse().ok()),
                    b"num" => num_id = attr_val(&e, b"numId"),
                    b"numFmt" => {
                        if let (Some(abs), Some(lvl), Some(fmt)) =
                            (abstract_id.as_ref(), level, attr_val(&e, b"val"))
                        {
                            defs.formats.entry(abs.clone()).or_default().insert(lvl, fmt);
                        }
                    }
                    b"abstractNumId" => {
                        if let (Some(num), Some(abs)) = (num_id.as_ref(), attr_val(&e, b"val")) {
                            defs.instances.insert(num.clone(), abs);
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match local_name(e.name().as_ref()) {
                    b"abstractNum" => abstract_id = None,
                    b"lvl" => level = None,
                    b"num" => num_id = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(defs)
    }

    /// Number format of a level, if defined.
    pub fn format(&self, num_id: &str, ilvl: u32) -> Option<&str> {
        let abstract_id = self.instances.get(num_id)?;
        self.formats
            .get(abstract_id)?
            .get(&ilvl)
            .map(String::as_str)
    }

    /// Whether a numbered paragraph belongs to an ordered list.
    ///
    /// Bullet levels are unordered, every other format is ordered. Levels
    /// without a definition are treated as unordered.
    pub fn is_ordered(&self, num_id: &str, ilvl: u32) -> bool {
        match self.format(num_id, ilvl) {
            Some(fmt) => fmt != BULLET_FORMAT,
            None => false,
        }
    }

    /// Number of numbering instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if no numbering instance is defined.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUMBERING: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="o"/></w:lvl>
    <w:lvl w:ilvl="1"><w:numFmt w:val="decimal"/></w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:lvl w:ilvl="0"><w:numFmt w:val="lowerRoman"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="3"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="4"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;

    #[test]
    fn test_parse_formats() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs.format("3", 0), Some("bullet"));
        assert_eq!(defs.format("3", 1), Some("decimal"));
        assert_eq!(defs.format("4", 0), Some("lowerRoman"));
    }

    #[test]
    fn test_is_ordered() {
        let defs = NumberingDefinitions::parse(NUMBERING).unwrap();
        assert!(!defs.is_ordered("3", 0));
        assert!(defs.is_ordered("3", 1));
        assert!(defs.is_ordered("4", 0));
        assert!(!defs.is_ordered("99", 0));
    }
}
