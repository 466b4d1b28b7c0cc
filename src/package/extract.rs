//! Linear text extraction with ordered fallback strategies.
//!
//! Each [`ExtractionStrategy`] either returns text or fails with a reason.
//! An [`ExtractionChain`] tries its strategies in order and reports which
//! one succeeded, together with every failure met on the way. When none
//! succeeds, or the one that does finds only blank text, the result is
//! [`ExtractedText::NoText`], never an empty string.

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use serde::Serialize;

use super::container::{local_name, OoxmlPackage, MAIN_DOCUMENT_PART};
use super::legacy::{read_word_binary, scan_utf16_text};
use crate::detect::PackageFamily;
use crate::error::{Error, Result};
use crate::markup::ParseOptions;

/// Extracted text, or the explicit marker that nothing was extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedText {
    /// Text produced by a strategy
    Text(String),
    /// No strategy read the input, or the text it found was blank
    NoText,
}

impl ExtractedText {
    /// Check whether text was extracted.
    pub fn is_text(&self) -> bool {
        matches!(self, ExtractedText::Text(_))
    }

    /// The text, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtractedText::Text(text) => Some(text),
            ExtractedText::NoText => None,
        }
    }

    /// Consume into the text, if any.
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtractedText::Text(text) => Some(text),
            ExtractedText::NoText => None,
        }
    }
}

/// A named way of pulling text out of package bytes.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable strategy name, used in reports and logs.
    fn name(&self) -> &'static str;

    /// Extract text, failing when this strategy cannot read the input.
    ///
    /// `options` bounds how much decompressed data may be read.
    fn extract(&self, bytes: &[u8], options: &ParseOptions) -> Result<String>;
}

/// A strategy that failed, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyFailure {
    /// Strategy name
    pub strategy: &'static str,
    /// Diagnostic message
    pub message: String,
}

/// Outcome of running an extraction chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Extracted text or the no-text marker
    pub text: ExtractedText,
    /// Name of the strategy that read the input
    pub strategy: Option<&'static str>,
    /// Strategies that failed before the successful one (or all of them)
    pub failures: Vec<StrategyFailure>,
}

/// Ordered list of strategies; the first success wins.
pub struct ExtractionChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl ExtractionChain {
    /// Create a chain from strategies in priority order.
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Chain for modern packages: structured paragraphs, then raw XML.
    pub fn modern() -> Self {
        Self::new(vec![Box::new(StructuredParagraphs), Box::new(RawXml)])
    }

    /// Chain for legacy packages: a mislabelled modern package, then the
    /// binary piece table, then a UTF-16 scan.
    pub fn legacy() -> Self {
        Self::new(vec![
            Box::new(OoxmlRawText),
            Box::new(WordBinary),
            Box::new(BinaryScan),
        ])
    }

    /// Chain for a package family.
    pub fn for_family(family: PackageFamily) -> Self {
        match family {
            PackageFamily::Legacy => Self::legacy(),
            PackageFamily::Modern => Self::modern(),
        }
    }

    /// Strategy names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run strategies in order until one reads the input.
    ///
    /// The first strategy that reads the input ends the chain, even when
    /// all it finds is blank text. Only a strategy that fails hands over to
    /// the next one.
    pub fn run(&self, bytes: &[u8], options: &ParseOptions, log_target: &str) -> Extraction {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            match strategy.extract(bytes, options) {
                Ok(text) => {
                    log::debug!(
                        target: log_target,
                        "read {} bytes of text with {}",
                        text.len(),
                        strategy.name()
                    );
                    let text = if text.trim().is_empty() {
                        ExtractedText::NoText
                    } else {
                        ExtractedText::Text(text)
                    };
                    return Extraction {
                        text,
                        strategy: Some(strategy.name()),
                        failures,
                    };
                }
                Err(e) => {
                    log::warn!(target: log_target, "extraction strategy {} failed: {}", strategy.name(), e);
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Extraction {
            text: ExtractedText::NoText,
            strategy: None,
            failures,
        }
    }
}

impl std::fmt::Debug for ExtractionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Body-level paragraphs of a modern package, blank ones dropped, joined
/// by newlines. Paragraphs inside tables or text boxes are not body-level.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredParagraphs;

impl ExtractionStrategy for StructuredParagraphs {
    fn name(&self) -> &'static str {
        "structured-paragraphs"
    }

    fn extract(&self, bytes: &[u8], options: &ParseOptions) -> Result<String> {
        let mut package = open_package(bytes, options)?;
        let xml = package.main_document()?;
        let paragraphs = read_paragraphs(&xml, true)?;
        Ok(paragraphs
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Tag stripping over the main document part; tolerates XML that does not
/// parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawXml;

impl ExtractionStrategy for RawXml {
    fn name(&self) -> &'static str {
        "raw-xml"
    }

    fn extract(&self, bytes: &[u8], options: &ParseOptions) -> Result<String> {
        let mut package = open_package(bytes, options)?;
        let raw = package.read_part_bytes(MAIN_DOCUMENT_PART)?;
        strip_document_xml(&String::from_utf8_lossy(&raw))
    }
}

/// A legacy-named file that is really a modern package: every paragraph,
/// at any depth, followed by a blank line.
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlRawText;

impl ExtractionStrategy for OoxmlRawText {
    fn name(&self) -> &'static str {
        "ooxml-raw-text"
    }

    fn extract(&self, bytes: &[u8], options: &ParseOptions) -> Result<String> {
        let mut package = open_package(bytes, options)?;
        let xml = package.main_document()?;
        Ok(read_paragraphs(&xml, false)?
            .into_iter()
            .map(|p| p + "\n\n")
            .collect())
    }
}

/// Piece-table text of a binary Word document.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordBinary;

impl ExtractionStrategy for WordBinary {
    fn name(&self) -> &'static str {
        "word-binary"
    }

    fn extract(&self, bytes: &[u8], options: &ParseOptions) -> Result<String> {
        read_word_binary(bytes, options.max_part_bytes)
    }
}

/// Printable UTF-16 runs found anywhere in a compound file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryScan;

impl ExtractionStrategy for BinaryScan {
    fn name(&self) -> &'static str {
        "binary-scan"
    }

    fn extract(&self, bytes: &[u8], _options: &ParseOptions) -> Result<String> {
        scan_utf16_text(bytes)
    }
}

fn open_package<'a>(bytes: &'a [u8], options: &ParseOptions) -> Result<OoxmlPackage<'a>> {
    Ok(OoxmlPackage::open(bytes)?.with_max_part_bytes(options.max_part_bytes))
}

/// Paragraph texts of a document part in order.
///
/// With `body_only`, only paragraphs that are direct children of `w:body`
/// are returned. Otherwise every outermost paragraph is returned, table
/// cell paragraphs included.
fn read_paragraphs(xml: &str, body_only: bool) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Paragraphs opened inside the captured one (text boxes).
    let mut nested = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let local = local_name(e.name().as_ref()).to_vec();
                match local.as_slice() {
                    b"p" if current.is_some() => nested += 1,
                    b"p" => {
                        let parent_ok = !body_only
                            || stack.last().map(Vec::as_slice) == Some(b"body".as_slice());
                        if parent_ok {
                            current = Some(String::new());
                        }
                    }
                    b"t" => in_text = current.is_some() && nested == 0,
                    _ => {}
                }
                stack.push(local);
            }
            Event::Empty(e) => {
                if let (Some(text), 0) = (current.as_mut(), nested) {
                    match local_name(e.name().as_ref()) {
                        b"tab" => text.push('\t'),
                        b"br" | b"cr" => text.push('\n'),
                        _ => {}
                    }
                }
            }
            Event::End(e) => {
                stack.pop();
                match local_name(e.name().as_ref()) {
                    b"p" if nested > 0 => nested -= 1,
                    b"p" => {
                        if let Some(text) = current.take() {
                            paragraphs.push(text);
                        }
                    }
                    b"t" => in_text = false,
                    _ => {}
                }
            }
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn strip_document_xml(xml: &str) -> Result<String> {
    let compile =
        |pattern: &str| Regex::new(pattern).map_err(|e| Error::Conversion(e.to_string()));
    let paragraph_end = compile(r"</w:p>")?;
    let breaks = compile(r"<w:(?:br|cr)\b[^>]*/>")?;
    let tabs = compile(r"<w:tab\b[^>]*/>")?;
    let tags = compile(r"<[^>]*>")?;

    let text = paragraph_end.replace_all(xml, "\n");
    let text = breaks.replace_all(&text, "\n");
    let text = tabs.replace_all(&text, "\t");
    let text = tags.replace_all(&text, "");

    Ok(unescape_entities(&text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
