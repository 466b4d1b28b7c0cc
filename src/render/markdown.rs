//! Markdown export.

use super::ExportOptions;

/// Render paragraphs as Markdown: the title as a level-one heading, then
/// every paragraph followed by a blank line.
///
/// Paragraph text is emitted as is. The input is flattened text, so there
/// is no structure left to map onto Markdown syntax.
pub fn render_markdown(paragraphs: &[&str], options: &ExportOptions) -> String {
    let mut output = format!("# {}\n\n", options.title);
    for paragraph in paragraphs {
        output.push_str(paragraph);
        output.push_str("\n\n");
    }
    output
}
