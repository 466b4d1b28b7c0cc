//! Word package reading.
//!
//! Modern packages are ZIP containers of WordprocessingML parts and are read
//! with `zip` and `quick-xml`. Legacy packages are OLE2 compound files whose
//! text lives in the `WordDocument` stream behind a piece table.
//!
//! Two consumers sit on top of the readers:
//!
//! - [`DocxMarkupBackend`] turns a modern package into raw markup.
//! - [`ExtractionChain`] pulls linear text out of either family, trying
//!   named strategies in order.

mod container;
mod extract;
mod legacy;
mod markup;
mod numbering;

pub use container::{
    OoxmlPackage, DEFAULT_MAX_PART_BYTES, Relationships, StyleNames, DOCUMENT_RELS_PART, MAIN_DOCUMENT_PART,
    NUMBERING_PART, STYLES_PART,
};
pub use extract::{
    BinaryScan, ExtractedText, Extraction, ExtractionChain, ExtractionStrategy, OoxmlRawText,
    RawXml, StrategyFailure, StructuredParagraphs, WordBinary,
};
pub use legacy::{read_word_binary, scan_utf16_text};
pub use markup::{DocxMarkupBackend, MarkupBackend};
pub use numbering::NumberingDefinitions;
