//! Markup to Word package builder.
//!
//! [`build`] walks a parsed markup tree into a [`StructuredDocument`], and
//! [`to_docx`] serializes that document into package bytes.
//!
//! [`StructuredDocument`]: crate::model::StructuredDocument

mod flatten;
mod options;
mod writer;

pub use flatten::{build, flatten, BlockTag};
pub use options::{BuildOptions, TraversalMode};
pub use writer::{to_docx, LIST_BULLET_STYLE, LIST_NUMBER_STYLE, TABLE_GRID_STYLE};
