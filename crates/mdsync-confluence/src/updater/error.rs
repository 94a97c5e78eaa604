//! Error types for page update operations.

use mdsync_renderer::RenderError;

use crate::error::ConfluenceError;

/// Error during page update operation.
///
/// Every variant ends the run. Nothing is written unless the failure is
/// [`RemoteWrite`](Self::RemoteWrite) itself.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    /// Unusable local input (missing directory, no Markdown files).
    #[error("{0}")]
    Config(String),

    /// Reading the page failed.
    #[error("Failed to fetch the page: {0}")]
    RemoteFetch(#[source] ConfluenceError),

    /// Writing the page failed, including version conflicts.
    #[error("Failed to update the page: {0}")]
    RemoteWrite(#[source] ConfluenceError),

    /// A source file could not be rendered.
    #[error("Failed to render '{file}': {source}")]
    Render {
        /// File name of the source.
        file: String,
        /// Underlying render error.
        #[source]
        source: RenderError,
    },

    /// IO error reading local files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
