//! Markdown rendering of extracted documentation text.

use comrak::{markdown_to_html, Options};

/// Render a section's documentation text to HTML.
///
/// Raw HTML inside comments is passed through, as literate sources often
/// embed it on purpose.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::default();
    options.render.unsafe_ = true;
    markdown_to_html(text, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_paragraphs_and_code_spans() {
        let html = render_markdown("Takes `int x` the input");
        assert_eq!(html, "<p>Takes <code>int x</code> the input</p>\n");
    }

    #[test]
    fn function_label_is_its_own_paragraph() {
        let html = render_markdown("**` add`**\n\n Takes `int x` the input\n.");
        assert!(html.starts_with("<p><strong><code> add</code></strong></p>\n"));
        assert!(html.contains("<p>Takes <code>int x</code> the input\n.</p>"));
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert_eq!(render_markdown(""), "");
    }

    #[test]
    fn inline_html_passes_through() {
        let html = render_markdown("<em>raw</em>");
        assert!(html.contains("<em>raw</em>"));
    }
}
