//! Export options and configuration.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Target format of a text export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    /// Paged PDF document
    #[default]
    PageDoc,

    /// Standalone HTML snapshot
    Markup,

    /// Markdown
    LightMarkup,

    /// Plain text, unchanged
    PlainText,
}

impl ExportFormat {
    /// All formats, in the order they are listed to users.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::PageDoc,
        ExportFormat::Markup,
        ExportFormat::LightMarkup,
        ExportFormat::PlainText,
    ];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::PageDoc => "pdf",
            ExportFormat::Markup => "html",
            ExportFormat::LightMarkup => "md",
            ExportFormat::PlainText => "txt",
        }
    }

    /// MIME type of the rendered bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::PageDoc => "application/pdf",
            ExportFormat::Markup => "text/html; charset=utf-8",
            ExportFormat::LightMarkup => "text/markdown; charset=utf-8",
            ExportFormat::PlainText => "text/plain; charset=utf-8",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::PageDoc => "pdf",
            ExportFormat::Markup => "html",
            ExportFormat::LightMarkup => "markdown",
            ExportFormat::PlainText => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::PageDoc),
            "html" | "htm" => Ok(ExportFormat::Markup),
            "markdown" | "md" => Ok(ExportFormat::LightMarkup),
            "text" | "txt" => Ok(ExportFormat::PlainText),
            other => Err(Error::InputValidation(format!(
                "unknown export format: {}",
                other
            ))),
        }
    }
}

/// Page geometry in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Margin applied on all four sides
    pub margin: f32,
}

impl PageGeometry {
    /// ISO A4 with one-inch margins.
    pub const A4: PageGeometry = PageGeometry {
        width: 595.0,
        height: 842.0,
        margin: 72.0,
    };

    /// Usable text width.
    pub fn text_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(1.0)
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Options for text exports.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Title literal used by the HTML and Markdown exports
    pub title: String,

    /// Page geometry of the PDF export
    pub page: PageGeometry,

    /// Body font size in points
    pub font_size: f32,

    /// Baseline-to-baseline distance in points
    pub leading: f32,

    /// Space after each paragraph in points
    pub paragraph_spacing: f32,
}

impl ExportOptions {
    /// Create new export options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title literal.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the page geometry.
    pub fn with_page(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }

    /// Set the body font size; leading follows at 1.2 times the size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        let size = size.clamp(4.0, 72.0);
        self.font_size = size;
        self.leading = size * 1.2;
        self
    }

    /// Set the space after each paragraph.
    pub fn with_paragraph_spacing(mut self, spacing: f32) -> Self {
        self.paragraph_spacing = spacing.max(0.0);
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "Converted document".to_string(),
            page: PageGeometry::A4,
            font_size: 10.0,
            leading: 12.0,
            paragraph_spacing: 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_options_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.title, "Converted document");
        assert_eq!(options.page, PageGeometry::A4);
        assert_eq!(options.font_size, 10.0);
        assert_eq!(options.leading, 12.0);
        assert_eq!(options.paragraph_spacing, 12.0);
    }

    #[test]
    fn test_export_options_builder() {
        let options = ExportOptions::new()
            .with_title("Minutes")
            .with_font_size(20.0)
            .with_paragraph_spacing(-3.0);
        assert_eq!(options.title, "Minutes");
        assert_eq!(options.leading, 24.0);
        assert_eq!(options.paragraph_spacing, 0.0);
    }

    #[test]
    fn test_format_parse_and_extension() {
        assert_eq!("PDF".parse::<ExportFormat>().unwrap(), ExportFormat::PageDoc);
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::LightMarkup);
        assert!("docx".parse::<ExportFormat>().is_err());

        assert_eq!(ExportFormat::Markup.extension(), "html");
        assert_eq!(ExportFormat::PlainText.extension(), "txt");
    }

    #[test]
    fn test_text_width() {
        assert_eq!(PageGeometry::A4.text_width(), 451.0);
    }
}
