//! Error types for block rendering.

/// Error rendering a Markdown block.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A region detected as a table did not parse as one.
    #[error("Table block did not render as a table (header: {header:?})")]
    MalformedTable {
        /// First line of the offending block.
        header: String,
    },
}
