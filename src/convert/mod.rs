//! Core conversion operations.
//!
//! These functions are the surface a transport layer calls. Each takes the
//! caller's [`ConversionContext`], validates its input before doing any
//! work, and logs failures at the boundary with the full diagnostic. The
//! returned [`Error`] still carries that diagnostic; use
//! [`Error::public_message`] for anything shown to an untrusted caller.
//!
//! # Example
//!
//! ```
//! use docweave::convert::{convert_markup_to_package, convert_package_to_markup};
//! use docweave::ConversionContext;
//!
//! let ctx = ConversionContext::default();
//! let docx = convert_markup_to_package(&ctx, "<h1>Title</h1><p>Body</p>")?;
//! let html = convert_package_to_markup(&ctx, &docx)?;
//! assert!(html.contains("<h1>Title</h1>"));
//! # Ok::<(), docweave::Error>(())
//! ```

use std::path::Path;

use crate::builder::{self, to_docx};
use crate::context::ConversionContext;
use crate::detect::{detect_family_from_bytes, output_file_name, PackageFamily, DOCX_MIME_TYPE};
use crate::error::{Error, ErrorKind, Result};
use crate::markup::{inject_default_style, parse_markup_with_options, NodeData, ParsedNode};
use crate::model::{DocumentStats, StructuredDocument};
use crate::package::{
    DocxMarkupBackend, ExtractedText, Extraction, ExtractionChain, MarkupBackend,
};
use crate::render::{self, ExportFormat, ExportResult};

/// MIME type of markup output.
pub const MARKUP_MIME_TYPE: &str = "text/html; charset=utf-8";

/// Successful conversion output.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertedOutput {
    /// Styled markup
    Markup(String),
    /// Word package bytes
    Package(Vec<u8>),
}

/// Result of a conversion: the output, its MIME type, and statistics of the
/// structured document when one was built.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Converted output
    pub output: ConvertedOutput,

    /// MIME type of the output
    pub mime_type: &'static str,

    /// Structured document statistics (markup to package only)
    pub stats: Option<DocumentStats>,
}

impl ConvertResult {
    /// Create a markup result.
    pub fn markup(markup: String) -> Self {
        Self {
            output: ConvertedOutput::Markup(markup),
            mime_type: MARKUP_MIME_TYPE,
            stats: None,
        }
    }

    /// Create a package result.
    pub fn package(bytes: Vec<u8>, stats: DocumentStats) -> Self {
        Self {
            output: ConvertedOutput::Package(bytes),
            mime_type: DOCX_MIME_TYPE,
            stats: Some(stats),
        }
    }

    /// Markup output, if this is a markup result.
    pub fn as_markup(&self) -> Option<&str> {
        match &self.output {
            ConvertedOutput::Markup(markup) => Some(markup),
            ConvertedOutput::Package(_) => None,
        }
    }

    /// Output as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match &self.output {
            ConvertedOutput::Markup(markup) => markup.as_bytes(),
            ConvertedOutput::Package(bytes) => bytes,
        }
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.as_bytes().len()
    }
}

/// Convert a modern Word package to styled markup with the built-in backend.
pub fn convert_package_to_markup(ctx: &ConversionContext, bytes: &[u8]) -> Result<String> {
    convert_package_to_markup_with(ctx, &DocxMarkupBackend::new(), bytes)
}

/// Convert a Word package to styled markup with a caller-supplied backend.
///
/// The backend output is re-parsed, gains a doctype if it has none, and
/// receives the default style block exactly once.
pub fn convert_package_to_markup_with(
    ctx: &ConversionContext,
    backend: &dyn MarkupBackend,
    bytes: &[u8],
) -> Result<String> {
    boundary(ctx, "package to markup", || {
        validate_package_bytes(ctx, bytes)?;
        if detect_family_from_bytes(bytes) == Some(PackageFamily::Legacy) {
            return Err(Error::Conversion(
                "legacy binary packages have no markup conversion".into(),
            ));
        }

        let raw = backend.to_markup(bytes, &ctx.parse)?;
        log::debug!(
            target: ctx.target(),
            "{} backend produced {} bytes of markup",
            backend.name(),
            raw.len()
        );

        let mut tree = parse_markup_with_options(&raw, &ctx.parse)?;
        ensure_doctype(&mut tree);
        inject_default_style(&mut tree);
        tree.to_html()
    })
}

/// Convert a Word package named `file_name`, checking the extension first.
pub fn convert_upload(
    ctx: &ConversionContext,
    file_name: &str,
    bytes: &[u8],
) -> Result<ConvertResult> {
    let family = gate(ctx, file_name)?;
    log::info!(target: ctx.target(), "converting {} ({}) to markup", file_name, family);
    convert_package_to_markup(ctx, bytes).map(ConvertResult::markup)
}

/// Parse markup into a structured document.
pub fn convert_markup_to_document(
    ctx: &ConversionContext,
    markup: &str,
) -> Result<StructuredDocument> {
    boundary(ctx, "markup to document", || {
        validate_markup(ctx, markup)?;
        let tree = parse_markup_with_options(markup, &ctx.parse)?;
        Ok(builder::build(&tree, &ctx.build))
    })
}

/// Convert markup to Word package bytes.
pub fn convert_markup_to_package(ctx: &ConversionContext, markup: &str) -> Result<Vec<u8>> {
    let doc = convert_markup_to_document(ctx, markup)?;
    serialize_document(ctx, &doc)
}

/// Convert markup to Word package bytes, keeping the document statistics.
pub fn convert_markup(ctx: &ConversionContext, markup: &str) -> Result<ConvertResult> {
    let doc = convert_markup_to_document(ctx, markup)?;
    let bytes = serialize_document(ctx, &doc)?;
    Ok(ConvertResult::package(bytes, doc.stats()))
}

fn serialize_document(ctx: &ConversionContext, doc: &StructuredDocument) -> Result<Vec<u8>> {
    boundary(ctx, "markup to package", || {
        let bytes = to_docx(doc, &ctx.build)?;
        log::info!(
            target: ctx.target(),
            "built package of {} bytes from {} blocks",
            bytes.len(),
            doc.len()
        );
        Ok(bytes)
    })
}

/// Extract linear text from a Word package.
///
/// `legacy` selects the strategy chain for the binary family. The error
/// path is reserved for rejected input; a package nothing can be read from
/// yields [`ExtractedText::NoText`].
pub fn extract_text(
    ctx: &ConversionContext,
    bytes: &[u8],
    legacy: bool,
) -> Result<ExtractedText> {
    extract_text_report(ctx, bytes, legacy).map(|extraction| extraction.text)
}

/// Extract linear text and report which strategy produced it.
pub fn extract_text_report(
    ctx: &ConversionContext,
    bytes: &[u8],
    legacy: bool,
) -> Result<Extraction> {
    boundary(ctx, "text extraction", || {
        validate_package_bytes(ctx, bytes)?;

        let family = if legacy {
            PackageFamily::Legacy
        } else {
            PackageFamily::Modern
        };
        if let Some(detected) = detect_family_from_bytes(bytes) {
            if detected != family {
                log::debug!(target: ctx.target(), "package labelled {} looks like {}", family, detected);
            }
        }

        let extraction = ExtractionChain::for_family(family).run(bytes, &ctx.parse, ctx.target());
        match (extraction.strategy, extraction.text.is_text()) {
            (Some(strategy), true) => log::info!(target: ctx.target(), "text extracted with {}", strategy),
            (Some(strategy), false) => {
                log::info!(target: ctx.target(), "{} read the package but found no text", strategy)
            }
            (None, _) => log::warn!(
                target: ctx.target(),
                "no text extracted after {} failed strategies",
                extraction.failures.len()
            ),
        }
        Ok(extraction)
    })
}

/// Extract text from a package named `file_name`, checking the extension
/// first and choosing the chain from it.
pub fn extract_upload(
    ctx: &ConversionContext,
    file_name: &str,
    bytes: &[u8],
) -> Result<ExtractedText> {
    let family = gate(ctx, file_name)?;
    extract_text(ctx, bytes, family.is_legacy())
}

/// Export linear text to one of the derived formats.
pub fn export_text(
    ctx: &ConversionContext,
    text: &str,
    format: ExportFormat,
) -> Result<ExportResult> {
    boundary(ctx, "text export", || {
        ctx.parse.check_input_size(text.len())?;
        let result = render::export(text, format, &ctx.export)?;
        log::info!(
            target: ctx.target(),
            "exported {} paragraphs as {}",
            result.paragraph_count,
            format
        );
        Ok(result)
    })
}

/// Convert markup to a package file at `dest`.
///
/// The package is written into a per-call scratch directory and moved into
/// place only once complete.
pub fn write_markup_package(
    ctx: &ConversionContext,
    markup: &str,
    dest: &Path,
) -> Result<ConvertResult> {
    let result = convert_markup(ctx, markup)?;
    persist_via_scratch(
        ctx,
        result.as_bytes(),
        PackageFamily::Modern.extension(),
        dest,
        Error::Build,
    )?;
    Ok(result)
}

/// Export text to a file at `dest`, through a per-call scratch directory.
pub fn write_export(
    ctx: &ConversionContext,
    text: &str,
    format: ExportFormat,
    dest: &Path,
) -> Result<ExportResult> {
    let result = export_text(ctx, text, format)?;
    persist_via_scratch(ctx, &result.bytes, format.extension(), dest, Error::Export)?;
    Ok(result)
}

/// Stage `bytes` in scratch storage and move them to `dest`.
///
/// Scratch faults stay `Io`; a fault placing the destination file is
/// reported through `fault`, the error kind of the operation being served.
fn persist_via_scratch(
    ctx: &ConversionContext,
    bytes: &[u8],
    extension: &str,
    dest: &Path,
    fault: fn(String) -> Error,
) -> Result<()> {
    boundary(ctx, "write output", || {
        let scratch = ctx.scratch()?;
        let staged = scratch.write(&output_file_name("", extension), bytes)?;
        let outcome = scratch
            .persist(&staged, dest)
            .map_err(|e| fault(format!("writing {}: {}", dest.display(), e)));
        // Released on both paths; a failed release is only logged.
        scratch.release();
        outcome
    })
}

fn gate(ctx: &ConversionContext, file_name: &str) -> Result<PackageFamily> {
    PackageFamily::from_file_name(file_name).map_err(|e| {
        log::info!(target: ctx.target(), "rejected upload {:?}: {}", file_name, e);
        e
    })
}

fn validate_package_bytes(ctx: &ConversionContext, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::InputValidation("no file content provided".into()));
    }
    ctx.parse.check_input_size(bytes.len())
}

fn validate_markup(ctx: &ConversionContext, markup: &str) -> Result<()> {
    if markup.trim().is_empty() {
        return Err(Error::InputValidation("no markup content provided".into()));
    }
    ctx.parse.check_input_size(markup.len())
}

fn ensure_doctype(tree: &mut ParsedNode) {
    if !matches!(tree.data(), NodeData::Document) {
        return;
    }
    let has_doctype = tree
        .children()
        .iter()
        .any(|c| matches!(c.data(), NodeData::Doctype { .. }));
    if !has_doctype {
        tree.children_mut().insert(0, ParsedNode::doctype("html"));
    }
}

/// Run one operation, logging its failure with the full diagnostic.
fn boundary<T>(
    ctx: &ConversionContext,
    operation: &str,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    f().map_err(|e| {
        match e.kind() {
            ErrorKind::InputValidation => {
                log::info!(target: ctx.target(), "{} rejected input: {}", operation, e)
            }
            _ => log::error!(target: ctx.target(), "{} failed: {}", operation, e),
        }
        e
    })
}
