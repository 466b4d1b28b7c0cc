//! Default presentation injection.

use super::node::{NodeData, ParsedNode};

/// Attribute that marks the injected style block.
pub const STYLE_MARKER_ATTR: &str = "data-docweave";

/// Value of [`STYLE_MARKER_ATTR`] on the injected style block.
pub const STYLE_MARKER_VALUE: &str = "default-style";

/// Fixed default presentation for converted documents.
pub const DEFAULT_STYLESHEET: &str = "
body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    max-width: 8.5in;
    margin: 0 auto;
    padding: 1in;
}
h1, h2, h3, h4, h5, h6 {
    color: #2c3e50;
    margin-top: 1.5em;
}
p {
    margin: 0 0 1em 0;
}
table {
    border-collapse: collapse;
    width: 100%;
    margin: 1em 0;
}
table, th, td {
    border: 1px solid #ddd;
}
th, td {
    padding: 8px;
    text-align: left;
}
";

/// Ensure the tree carries exactly one injected default style block.
///
/// A missing `head` is created as the first child of the `html` element
/// (itself created under the root if absent). Returns `true` when a style
/// block was appended and `false` when one was already present.
///
/// # Example
///
/// ```
/// use docweave::markup::{inject_default_style, parse_markup};
///
/// let mut root = parse_markup("<p>Hi</p>").unwrap();
/// assert!(inject_default_style(&mut root));
/// assert!(!inject_default_style(&mut root));
/// ```
pub fn inject_default_style(root: &mut ParsedNode) -> bool {
    let head = ensure_head(root);

    if has_injected_style(head) {
        return false;
    }

    head.push_child(
        ParsedNode::element("style")
            .with_attr(STYLE_MARKER_ATTR, STYLE_MARKER_VALUE)
            .with_text(DEFAULT_STYLESHEET),
    );
    true
}

/// Check whether a style block injected by [`inject_default_style`] is
/// present anywhere under `node`.
pub fn has_injected_style(node: &ParsedNode) -> bool {
    node.find_all(&["style"])
        .iter()
        .any(|s| s.attr(STYLE_MARKER_ATTR) == Some(STYLE_MARKER_VALUE))
}

fn ensure_head(root: &mut ParsedNode) -> &mut ParsedNode {
    if root.find_first("head").is_none() {
        let html = ensure_html(root);
        html.children_mut().insert(0, ParsedNode::element("head"));
    }
    // The head now exists, either found or inserted above.
    match root.find_first_mut("head") {
        Some(head) => head,
        None => unreachable!("head element was just inserted"),
    }
}

fn ensure_html(root: &mut ParsedNode) -> &mut ParsedNode {
    if root.is_element("html") {
        return root;
    }
    if root.find_first("html").is_none() {
        let html = ParsedNode::element("html");
        if matches!(root.data(), NodeData::Document) {
            root.push_child(html);
        } else {
            // A bare element root is wrapped so the head can precede it.
            let content = std::mem::replace(root, ParsedNode::document());
            root.push_child(html.with_child(content));
        }
    }
    match root.find_first_mut("html") {
        Some(html) => html,
        None => unreachable!("html element was just inserted"),
    }
}
