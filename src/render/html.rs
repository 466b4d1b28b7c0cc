//! Standalone HTML snapshot export.

use crate::error::Result;
use crate::markup::ParsedNode;

use super::ExportOptions;

/// Presentation embedded in every snapshot.
pub const SNAPSHOT_STYLESHEET: &str = "
body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    margin: 40px;
    color: #333;
}
p {
    margin-bottom: 15px;
}
";

/// Render paragraphs as a complete HTML document.
///
/// The document is assembled as a tree and serialized, so paragraph text
/// is always escaped.
pub fn render_html(paragraphs: &[&str], options: &ExportOptions) -> Result<String> {
    let head = ParsedNode::element("head")
        .with_child(ParsedNode::element("meta").with_attr("charset", "UTF-8"))
        .with_child(
            ParsedNode::element("meta")
                .with_attr("name", "viewport")
                .with_attr("content", "width=device-width, initial-scale=1.0"),
        )
        .with_child(ParsedNode::element("title").with_text(options.title.as_str()))
        .with_child(ParsedNode::element("style").with_text(SNAPSHOT_STYLESHEET));

    let content = paragraphs.iter().fold(
        ParsedNode::element("div").with_attr("class", "content"),
        |div, line| div.with_child(ParsedNode::element("p").with_text(*line)),
    );

    let body = ParsedNode::element("body")
        .with_child(ParsedNode::element("h1").with_text(options.title.as_str()))
        .with_child(content);

    let document = ParsedNode::document()
        .with_child(ParsedNode::doctype("html"))
        .with_child(
            ParsedNode::element("html")
                .with_attr("lang", "en")
                .with_child(head)
                .with_child(body),
        );

    let mut html = document.to_html()?;
    html.push('\n');
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse_markup;

    #[test]
    fn test_snapshot_structure() {
        let html = render_html(&["Line1", "Line2"], &ExportOptions::default()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<title>Converted document</title>"));
        assert!(html.contains("<h1>Converted document</h1>"));
        assert!(html.contains("<div class=\"content\"><p>Line1</p><p>Line2</p></div>"));
    }

    #[test]
    fn test_snapshot_escapes_text() {
        let html = render_html(&["<b>bold</b> & co"], &ExportOptions::default()).unwrap();
        assert!(html.contains("<p>&lt;b&gt;bold&lt;/b&gt; &amp; co</p>"));

        let root = parse_markup(&html).unwrap();
        assert_eq!(root.find_all(&["p"]).len(), 1);
        assert!(root.find_first("b").is_none());
    }

    #[test]
    fn test_snapshot_custom_title() {
        let options = ExportOptions::new().with_title("Q3 report");
        let html = render_html(&[], &options).unwrap();
        assert!(html.contains("<h1>Q3 report</h1>"));
        assert!(html.contains("<div class=\"content\"></div>"));
    }
}
