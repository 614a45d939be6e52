//! Markdown rendering for the insight stage.
//!
//! Inject a renderer when building the dispatcher; the default one uses
//! pulldown-cmark and escapes any raw HTML in the source.
use pulldown_cmark::{Event, Parser, html};

use crate::errors::MarkdownError;

/// Renderer abstraction: convert markdown to display-safe HTML.
pub trait MarkdownToHtml: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError>;
}

/// Default implementation using pulldown-cmark.
///
/// Raw HTML blocks and inline HTML are emitted as escaped text so that
/// producer-controlled markup never reaches the page.
pub struct PulldownMarkdownRenderer;

impl MarkdownToHtml for PulldownMarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, MarkdownError> {
        let events = Parser::new(markdown).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events);
        Ok(out)
    }
}

/// Escapes text for display when markdown rendering fails.
pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulldown_renderer_produces_html() {
        let html = PulldownMarkdownRenderer
            .render("# Hi\n**bold**")
            .expect("render");
        assert!(html.contains("<h1>") && html.contains("Hi"));
        assert!(html.contains("<strong>") && html.contains("bold"));
    }

    #[test]
    fn raw_html_is_escaped() {
        let html = PulldownMarkdownRenderer
            .render("before <script>alert(1)</script> after")
            .expect("render");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(PulldownMarkdownRenderer.render("").expect("render"), "");
    }

    #[test]
    fn escape_text_escapes_markup() {
        assert_eq!(escape_text("<b>&'\""), "&lt;b&gt;&amp;&#39;&quot;");
    }
}
