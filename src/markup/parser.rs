//! HTML parsing using html5ever.
//!
//! html5ever implements the WHATWG tree-construction algorithm, so unclosed
//! tags, stray end tags and unknown elements all produce the same
//! best-effort tree a browser would build. The resulting reference-counted
//! DOM is copied into an owned [`ParsedNode`] tree, dropping `script` and
//! `style` subtrees on the way.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};

use super::node::{NodeData, ParsedNode};
use crate::error::{Error, Result};

/// Elements removed together with their subtree before interpretation.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style"];

/// Options for parsing markup.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Maximum element nesting depth accepted
    pub max_depth: usize,

    /// Maximum input size in bytes (0 = unlimited)
    pub max_input_bytes: usize,

    /// Maximum decompressed size of one package part or stream in bytes
    /// (0 = unlimited)
    pub max_part_bytes: usize,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Set the maximum input size in bytes (0 = unlimited).
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.max_input_bytes = bytes;
        self
    }

    /// Set the maximum decompressed size of one package part (0 = unlimited).
    pub fn with_max_part_bytes(mut self, bytes: usize) -> Self {
        self.max_part_bytes = bytes;
        self
    }

    /// Reject input that exceeds the configured size limit.
    pub fn check_input_size(&self, len: usize) -> Result<()> {
        if self.max_input_bytes > 0 && len > self.max_input_bytes {
            return Err(Error::InputValidation(format!(
                "input is {} bytes, the limit is {} bytes",
                len, self.max_input_bytes
            )));
        }
        Ok(())
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: 512,
            max_input_bytes: 10 * 1024 * 1024,
            max_part_bytes: crate::package::DEFAULT_MAX_PART_BYTES,
        }
    }
}

/// Parse a markup string with default options.
///
/// # Example
///
/// ```
/// use docweave::markup::parse_markup;
///
/// let root = parse_markup("<p>Hello<script>alert(1)</script>").unwrap();
/// assert!(root.find_first("script").is_none());
/// assert_eq!(root.find_first("p").unwrap().full_text(), "Hello");
/// ```
pub fn parse_markup(markup: &str) -> Result<ParsedNode> {
    parse_markup_with_options(markup, &ParseOptions::default())
}

/// Parse a markup string.
pub fn parse_markup_with_options(markup: &str, options: &ParseOptions) -> Result<ParsedNode> {
    options.check_input_size(markup.len())?;

    let dom = parse_document(RcDom::default(), Default::default()).one(markup);
    if !dom.errors.is_empty() {
        log::debug!("markup parsed with {} recoverable errors", dom.errors.len());
    }

    convert_handle(&dom.document, 0, options.max_depth)?
        .ok_or_else(|| Error::Parse("parser produced no document".into()))
}

/// Parse markup bytes, which must be UTF-8.
pub fn parse_markup_bytes(bytes: &[u8], options: &ParseOptions) -> Result<ParsedNode> {
    let markup = std::str::from_utf8(bytes).map_err(|e| {
        Error::Parse(format!(
            "markup is not valid UTF-8 at byte {}",
            e.valid_up_to()
        ))
    })?;
    parse_markup_with_options(markup, options)
}

/// Copy a DOM handle into an owned node. Returns `None` for stripped or
/// non-content nodes.
fn convert_handle(handle: &Handle, depth: usize, max_depth: usize) -> Result<Option<ParsedNode>> {
    if depth > max_depth {
        return Err(Error::Parse(format!(
            "markup nesting exceeds {} levels",
            max_depth
        )));
    }

    let mut node = match &handle.data {
        DomData::Document => ParsedNode::document(),
        DomData::Doctype { name, .. } => ParsedNode::doctype(name.to_string()),
        DomData::Text { contents } => ParsedNode::text(contents.borrow().to_string()),
        DomData::Comment { contents } => ParsedNode::comment(contents.to_string()),
        DomData::Element { name, attrs, .. } => {
            if STRIPPED_ELEMENTS.contains(&&*name.local) {
                return Ok(None);
            }
            let attrs = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.clone(), a.value.to_string()))
                .collect();
            ParsedNode::new(NodeData::Element {
                name: name.clone(),
                attrs,
            })
        }
        DomData::ProcessingInstruction { .. } => return Ok(None),
    };

    for child in handle.children.borrow().iter() {
        if let Some(converted) = convert_handle(child, depth + 1, max_depth)? {
            node.push_child(converted);
        }
    }

    Ok(Some(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let root = parse_markup("<html><body><h1>Hello</h1></body></html>").unwrap();
        assert_eq!(root.find_first("h1").unwrap().full_text(), "Hello");
    }

    #[test]
    fn test_parse_malformed_is_best_effort() {
        let root = parse_markup("<p>one<p>two<div><span>three").unwrap();
        let paragraphs = root.find_all(&["p"]);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(root.find_first("span").unwrap().full_text(), "three");
    }

    #[test]
    fn test_unknown_elements_survive() {
        let root = parse_markup("<custom-box><p>inside</p></custom-box>").unwrap();
        assert!(root.find_first("custom-box").is_some());
        assert_eq!(root.find_first("p").unwrap().full_text(), "inside");
    }

    #[test]
    fn test_script_and_style_removed() {
        let root = parse_markup(
            "<html><head><style>p{color:red}</style></head>\
             <body><p>keep</p><script>var x = 1;</script></body></html>",
        )
        .unwrap();
        assert!(root.find_first("style").is_none());
        assert!(root.find_first("script").is_none());
        let body = root.find_first("body").unwrap();
        assert_eq!(body.full_text(), "keep");
    }

    #[test]
    fn test_document_skeleton_is_created() {
        let root = parse_markup("just text").unwrap();
        assert!(root.find_first("html").is_some());
        assert!(root.find_first("head").is_some());
        assert!(root.find_first("body").is_some());
    }

    #[test]
    fn test_depth_limit() {
        let markup = "<div>".repeat(40);
        let options = ParseOptions::new().with_max_depth(10);
        let err = parse_markup_with_options(&markup, &options).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_size_limit() {
        let options = ParseOptions::new().with_max_input_bytes(8);
        let err = parse_markup_with_options("<p>too long</p>", &options).unwrap_err();
        assert!(matches!(err, Error::InputValidation(_)));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let err = parse_markup_bytes(&[0x3C, 0x70, 0x3E, 0xFF, 0xFE], &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
