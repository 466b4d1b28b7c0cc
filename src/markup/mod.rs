//! Markup tree, parsing and default style injection.
//!
//! Parsing is delegated to html5ever; the rest of the crate works on the
//! owned [`ParsedNode`] tree it produces.

mod node;
mod parser;
mod style;

pub use node::{Descendants, NodeData, ParsedNode, HTML_NAMESPACE};
pub use parser::{parse_markup, parse_markup_bytes, parse_markup_with_options, ParseOptions};
pub use style::{
    has_injected_style, inject_default_style, DEFAULT_STYLESHEET, STYLE_MARKER_ATTR,
    STYLE_MARKER_VALUE,
};
