//! Rendering of segmented blocks into storage format.

use pulldown_cmark::{Options, Parser};

use crate::error::RenderError;
use crate::renderer::MarkdownRenderer;
use crate::segment::{Block, BlockKind, Segmenter};
use crate::storage;

/// Parser options for prose blocks. Tables are handled by the segmenter.
const TEXT_OPTIONS: Options = Options::ENABLE_STRIKETHROUGH
    .union(Options::ENABLE_TASKLISTS)
    .union(Options::ENABLE_HEADING_ATTRIBUTES);

/// Renders Markdown documents block by block.
///
/// Prose blocks render as regular storage XHTML. Table blocks render with
/// only the table extension enabled and are wrapped in a `panel` macro.
///
/// # Example
///
/// ```
/// use mdsync_renderer::BlockRenderer;
///
/// let html = BlockRenderer::new()
///     .render_document("Intro\n\n| a | b |\n|---|---|\n| 1 | 2 |\n")
///     .unwrap();
/// assert!(html.starts_with("<p>Intro</p>"));
/// assert!(html.contains(r#"<ac:structured-macro ac:name="panel">"#));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRenderer {
    segmenter: Segmenter,
}

impl BlockRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the strict table continuation rule when segmenting documents.
    #[must_use]
    pub fn with_strict_tables(mut self, strict: bool) -> Self {
        self.segmenter = self.segmenter.with_strict_tables(strict);
        self
    }

    /// Render a single block.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::MalformedTable`] if a table block does not
    /// produce a `<table>` element.
    pub fn render(&self, block: &Block<'_>) -> Result<String, RenderError> {
        match block.kind {
            BlockKind::Text => Ok(render_text(block.content)),
            BlockKind::Table => render_table(block.content),
        }
    }

    /// Segment `raw` and render every block in order.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed table block.
    pub fn render_document(&self, raw: &str) -> Result<String, RenderError> {
        let mut html = String::new();
        for block in self.segmenter.segment(raw) {
            html.push_str(&self.render(&block)?);
        }
        Ok(html)
    }
}

fn render_text(content: &str) -> String {
    MarkdownRenderer::new().render(Parser::new_ext(content, TEXT_OPTIONS))
}

fn render_table(content: &str) -> Result<String, RenderError> {
    let html = MarkdownRenderer::new().render(Parser::new_ext(content, Options::ENABLE_TABLES));
    if !html.contains("<table>") {
        return Err(RenderError::MalformedTable {
            header: content.lines().next().unwrap_or_default().trim().to_owned(),
        });
    }
    Ok(storage::panel(&html))
}
