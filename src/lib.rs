//! # docweave
//!
//! Word document conversion library for Rust.
//!
//! This library converts between Word packages and markup, extracts linear
//! text from both Word families, and exports that text to lightweight
//! formats.
//!
//! ## Quick Start
//!
//! ```
//! use docweave::{convert_markup_to_package, convert_package_to_markup, ConversionContext};
//!
//! fn main() -> docweave::Result<()> {
//!     let ctx = ConversionContext::default();
//!
//!     // Markup to a Word package
//!     let docx = convert_markup_to_package(&ctx, "<h1>Report</h1><p>Body text</p>")?;
//!
//!     // And back to styled markup
//!     let html = convert_package_to_markup(&ctx, &docx)?;
//!     assert!(html.contains("<h1>Report</h1>"));
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **DOCX to HTML**: headings, emphasis, links, nested lists and tables,
//!   with a default stylesheet injected exactly once
//! - **HTML to DOCX**: a flattened structured document serialized with
//!   native heading, list and grid-table styles
//! - **Text extraction**: ordered fallback strategies for `.docx` and
//!   legacy `.doc` packages, with an explicit "no text" result
//! - **Text export**: PDF, HTML, Markdown and plain text

pub mod builder;
pub mod context;
pub mod convert;
pub mod detect;
pub mod error;
pub mod markup;
pub mod model;
pub mod package;
pub mod render;

// Re-export commonly used types
pub use builder::{BuildOptions, TraversalMode};
pub use context::{ConversionContext, ScratchDir};
pub use convert::{
    convert_markup_to_package, convert_package_to_markup, export_text, extract_text,
    ConvertResult, ConvertedOutput,
};
pub use detect::{detect_family_from_bytes, PackageFamily};
pub use error::{Error, ErrorKind, Result};
pub use markup::{inject_default_style, parse_markup, ParseOptions, ParsedNode};
pub use model::{DocumentStats, StructuredBlock, StructuredDocument};
pub use package::{ExtractedText, Extraction};
pub use render::{ExportFormat, ExportOptions, ExportResult, JsonFormat};

use std::path::Path;

/// Parse markup into a structured document with default options.
///
/// # Example
///
/// ```
/// use docweave::{build_document, StructuredBlock};
///
/// let doc = build_document("<h1>Title</h1><div><p>Nested</p></div>").unwrap();
/// assert_eq!(doc.blocks[1], StructuredBlock::paragraph("Nested"));
/// ```
pub fn build_document(markup: &str) -> Result<StructuredDocument> {
    convert::convert_markup_to_document(&ConversionContext::default(), markup)
}

/// Convert a Word file on disk to styled markup.
///
/// The file name must carry an accepted extension.
///
/// # Example
///
/// ```no_run
/// let html = docweave::file_to_markup("report.docx").unwrap();
/// std::fs::write("report.html", html).unwrap();
/// ```
pub fn file_to_markup<P: AsRef<Path>>(path: P) -> Result<String> {
    let (name, bytes) = read_word_file(path.as_ref())?;
    let result = convert::convert_upload(&ConversionContext::default(), &name, &bytes)?;
    match result.output {
        ConvertedOutput::Markup(markup) => Ok(markup),
        ConvertedOutput::Package(_) => Err(Error::Conversion(
            "markup conversion produced a package".into(),
        )),
    }
}

/// Extract text from a Word file on disk, choosing the strategy chain from
/// its extension.
///
/// # Example
///
/// ```no_run
/// use docweave::ExtractedText;
///
/// match docweave::file_to_text("memo.doc").unwrap() {
///     ExtractedText::Text(text) => println!("{}", text),
///     ExtractedText::NoText => eprintln!("no text found"),
/// }
/// ```
pub fn file_to_text<P: AsRef<Path>>(path: P) -> Result<ExtractedText> {
    let (name, bytes) = read_word_file(path.as_ref())?;
    convert::extract_upload(&ConversionContext::default(), &name, &bytes)
}

/// Dump the structured document built from markup as JSON.
///
/// # Example
///
/// ```
/// use docweave::{markup_to_json, JsonFormat};
///
/// let json = markup_to_json("<p>Hello</p>", JsonFormat::Compact).unwrap();
/// assert!(json.contains("\"kind\":\"paragraph\""));
/// ```
pub fn markup_to_json(markup: &str, format: JsonFormat) -> Result<String> {
    let doc = build_document(markup)?;
    render::to_json(&doc, format)
}

fn read_word_file(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    // Gate on the name before touching the file.
    PackageFamily::from_file_name(&name)?;
    let bytes = std::fs::read(path)?;
    Ok((name, bytes))
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```
/// use docweave::{Docweave, ExportFormat};
///
/// let weave = Docweave::new()
///     .with_max_heading_level(3)
///     .with_title("Minutes");
///
/// let docx = weave.markup_to_package("<h3>Agenda</h3><ul><li>One</li></ul>")?;
/// let text = weave.extract_text(&docx, false)?;
/// assert_eq!(text.as_str(), Some("Agenda\nOne"));
///
/// let md = weave.export(text.as_str().unwrap_or_default(), ExportFormat::LightMarkup)?;
/// assert_eq!(md.as_text(), Some("# Minutes\n\nAgenda\n\nOne\n\n"));
/// # Ok::<(), docweave::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Docweave {
    context: ConversionContext,
}

impl Docweave {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an existing context.
    pub fn with_context(mut self, context: ConversionContext) -> Self {
        self.context = context;
        self
    }

    /// Set the log target.
    pub fn with_log_target(mut self, target: impl Into<String>) -> Self {
        self.context = self.context.with_log_target(target);
        self
    }

    /// Set the scratch storage root.
    pub fn with_temp_root(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.context = self.context.with_temp_root(root);
        self
    }

    /// Map headings up to `level` (default 2).
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.context.build = self.context.build.with_max_heading_level(level);
        self
    }

    /// Stop at the first recognized element instead of visiting every node.
    pub fn top_level_only(mut self) -> Self {
        self.context.build = self.context.build.top_level_only();
        self
    }

    /// Set the default font of generated packages.
    pub fn with_font(mut self, family: impl Into<String>, size_pt: u8) -> Self {
        self.context.build = self
            .context
            .build
            .with_font_family(family)
            .with_font_size(size_pt);
        self
    }

    /// Set the export title literal.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.context.export = self.context.export.with_title(title);
        self
    }

    /// Set the maximum accepted input size in bytes (0 = unlimited).
    pub fn with_max_input_bytes(mut self, bytes: usize) -> Self {
        self.context.parse = self.context.parse.with_max_input_bytes(bytes);
        self
    }

    /// Set the maximum decompressed size of one package part (0 = unlimited).
    pub fn with_max_part_bytes(mut self, bytes: usize) -> Self {
        self.context.parse = self.context.parse.with_max_part_bytes(bytes);
        self
    }

    /// The context every operation runs with.
    pub fn context(&self) -> &ConversionContext {
        &self.context
    }

    /// Convert a Word package to styled markup.
    pub fn package_to_markup(&self, bytes: &[u8]) -> Result<String> {
        convert_package_to_markup(&self.context, bytes)
    }

    /// Parse markup into a structured document.
    pub fn markup_to_document(&self, markup: &str) -> Result<StructuredDocument> {
        convert::convert_markup_to_document(&self.context, markup)
    }

    /// Convert markup to Word package bytes.
    pub fn markup_to_package(&self, markup: &str) -> Result<Vec<u8>> {
        convert_markup_to_package(&self.context, markup)
    }

    /// Extract linear text from a Word package.
    pub fn extract_text(&self, bytes: &[u8], legacy: bool) -> Result<ExtractedText> {
        extract_text(&self.context, bytes, legacy)
    }

    /// Export linear text.
    pub fn export(&self, text: &str, format: ExportFormat) -> Result<ExportResult> {
        export_text(&self.context, text, format)
    }
}
