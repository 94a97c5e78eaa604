//! Markdown to Confluence storage format rendering.
//!
//! Documents are first split into table and prose regions by the
//! [`Segmenter`], then each [`Block`] is rendered by the [`BlockRenderer`]:
//!
//! - prose renders as storage XHTML (paragraphs, headings, lists, inline
//!   formatting, `code` macros for fenced code, `ac:image` for images);
//! - tables render as `<table>` elements wrapped in a `panel` macro.
//!
//! # Example
//!
//! ```
//! use mdsync_renderer::{BlockKind, BlockRenderer, segment};
//!
//! let markdown = "Totals:\n| item | qty |\n|---|---:|\n| pens | 4 |\n";
//! let blocks = segment(markdown);
//! assert_eq!(blocks[1].kind, BlockKind::Table);
//!
//! let renderer = BlockRenderer::new();
//! let html = renderer.render(&blocks[0]).unwrap();
//! assert_eq!(html, "<p>Totals:</p>");
//! ```

mod block;
mod error;
mod renderer;
mod segment;
mod state;
pub mod storage;
mod util;

pub use block::BlockRenderer;
pub use error::RenderError;
pub use renderer::MarkdownRenderer;
pub use segment::{Block, BlockKind, Segmenter, segment};
pub use state::escape_html;
