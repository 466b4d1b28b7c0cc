//! Package family detection and the input extension gate.

use crate::error::{Error, Result};
use std::path::Path;

/// MIME type of the modern structured package (DOCX).
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// MIME type of the legacy binary package (DOC).
pub const DOC_MIME_TYPE: &str = "application/msword";

/// ZIP local file header: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE2 compound file signature, shared by every legacy Office format.
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Accepted extensions, lowercase without the leading dot.
const ALLOWED_EXTENSIONS: &[(&str, PackageFamily)] = &[
    ("doc", PackageFamily::Legacy),
    ("docx", PackageFamily::Modern),
];

/// The two Word package families accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageFamily {
    /// Word 97-2003 binary document (`.doc`)
    Legacy,
    /// Office Open XML document (`.docx`)
    Modern,
}

impl PackageFamily {
    /// Resolve the family from a file name, comparing the extension
    /// case-insensitively against the allow-list.
    ///
    /// # Example
    /// ```
    /// use docweave::detect::PackageFamily;
    ///
    /// assert_eq!(PackageFamily::from_file_name("report.DOCX").unwrap(), PackageFamily::Modern);
    /// assert!(PackageFamily::from_file_name("notes.txt").is_err());
    /// ```
    pub fn from_file_name(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::InputValidation("no file name provided".into()));
        }

        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                Error::InputValidation("only Word files (.doc, .docx) are accepted".into())
            })?;

        Self::from_extension(ext).ok_or_else(|| {
            Error::InputValidation(format!(
                "only Word files (.doc, .docx) are accepted, got .{}",
                ext
            ))
        })
    }

    /// Resolve the family from a bare extension (no leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext_lower = ext.to_lowercase();
        ALLOWED_EXTENSIONS
            .iter()
            .find(|(allowed, _)| *allowed == ext_lower)
            .map(|(_, family)| *family)
    }

    /// Canonical file extension for this family.
    pub fn extension(self) -> &'static str {
        match self {
            PackageFamily::Legacy => "doc",
            PackageFamily::Modern => "docx",
        }
    }

    /// MIME type for this family.
    pub fn mime_type(self) -> &'static str {
        match self {
            PackageFamily::Legacy => DOC_MIME_TYPE,
            PackageFamily::Modern => DOCX_MIME_TYPE,
        }
    }

    /// Whether this is the legacy binary family.
    pub fn is_legacy(self) -> bool {
        matches!(self, PackageFamily::Legacy)
    }
}

impl std::fmt::Display for PackageFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageFamily::Legacy => write!(f, "Word 97-2003 (.doc)"),
            PackageFamily::Modern => write!(f, "Word (.docx)"),
        }
    }
}

/// Detect the package family from the leading bytes of a file.
///
/// Returns `None` when the bytes match neither container signature.
pub fn detect_family_from_bytes(data: &[u8]) -> Option<PackageFamily> {
    if data.starts_with(ZIP_MAGIC) {
        Some(PackageFamily::Modern)
    } else if data.starts_with(CFB_MAGIC) {
        Some(PackageFamily::Legacy)
    } else {
        None
    }
}

/// Check if bytes start with a ZIP container signature.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC)
}

/// Check if bytes start with an OLE2 compound file signature.
pub fn is_cfb_bytes(data: &[u8]) -> bool {
    data.starts_with(CFB_MAGIC)
}

/// Build an output file name, falling back to `document` for an empty base.
///
/// ```
/// use docweave::detect::output_file_name;
///
/// assert_eq!(output_file_name("", "docx"), "document.docx");
/// assert_eq!(output_file_name("minutes", "pdf"), "minutes.pdf");
/// ```
pub fn output_file_name(base: &str, extension: &str) -> String {
    let base = base.trim();
    let base = if base.is_empty() { "document" } else { base };
    format!("{}.{}", base, extension)
}
