//! Plain text export.

/// Plain text is passed through unchanged, blank lines included.
pub fn render_text(text: &str) -> String {
    text.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text_is_verbatim() {
        assert_eq!(render_text("Line1\n\nLine2"), "Line1\n\nLine2");
        assert_eq!(render_text("  indented\r\n"), "  indented\r\n");
    }
}
