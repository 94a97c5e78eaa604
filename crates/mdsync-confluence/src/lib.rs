//! Confluence integration for mdsync.
//!
//! This crate inserts Markdown files into an existing Confluence page without
//! ever duplicating a file's content, and exports pages back to Markdown:
//! - [`ConfluenceClient`]: REST API client with Basic or Bearer authentication
//! - [`PageUpdater`]: fetch, detect already inserted content, merge, write once
//! - [`Exporter`](export::Exporter): page or space export to Markdown files
//!
//! Inserted sections carry an anchor macro named after a digest of the source
//! content ([`ContentMarker`]). The page body itself is the record of what was
//! inserted.
//!
//! # Upload
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use mdsync_confluence::{ConfluenceClient, Credentials, PageUpdater, UpdateConfig, load_sources};
//!
//! let credentials = Credentials::Basic {
//!     username: "me@example.com".to_owned(),
//!     api_token: "token".to_owned(),
//! };
//! let client = ConfluenceClient::new("https://example.atlassian.net/wiki", "DOCS", &credentials);
//!
//! let units = load_sources(Path::new("Input"))?;
//! let result = PageUpdater::new(&client, UpdateConfig::default()).update("123", &units, None)?;
//! println!("{} new section(s): {}", result.prepared_count(), result.url);
//! # Ok(())
//! # }
//! ```

// Remote content operations
mod api;
pub use api::ContentApi;

// API client
mod client;
pub use client::{ConfluenceClient, Credentials};

// Section assembly and body merge
mod assembler;
pub use assembler::{FragmentBuilder, RenderedFragment, merge};

// Content identity and duplicate detection
pub mod marker;
pub use marker::{ContentMarker, MarkerIndex};

// Storage format parsing (internal, used by marker detection and export)
mod storage;

// Local sources
mod source;
pub use source::{SourceUnit, load_sources};

// Types (wire format)
pub mod types;
pub use types::{Page, RemoteDocument};

// Page updater
pub mod updater;
pub use updater::{PageUpdater, UpdateConfig, UpdateError};

// Export
pub mod export;

// Errors
pub mod error;
pub use error::ConfluenceError;

#[cfg(test)]
mod mock;
