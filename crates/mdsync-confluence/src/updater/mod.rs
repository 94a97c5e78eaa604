//! Page updater for Confluence.
//!
//! This module provides the [`PageUpdater`] struct that encapsulates the
//! workflow for inserting Markdown files into an existing page:
//!
//! 1. Fetch the page once
//! 2. Index the anchor markers already in its body
//! 3. Render every source that is neither empty nor already present
//! 4. Merge the new sections into the body
//! 5. Write the page once, requesting the next version
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use mdsync_confluence::{ConfluenceClient, Credentials, PageUpdater, UpdateConfig, load_sources};
//!
//! let credentials = Credentials::Bearer { token: "token".to_owned() };
//! let client = ConfluenceClient::new("https://confluence.example.com", "DOCS", &credentials);
//! let updater = PageUpdater::new(&client, UpdateConfig::default());
//!
//! let units = load_sources(Path::new("Input"))?;
//!
//! // Preview without writing
//! let preview = updater.dry_run("123", &units)?;
//!
//! // Perform update
//! let result = updater.update("123", &units, Some("Add meeting notes"))?;
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod result;

pub use error::UpdateError;
pub use executor::PageUpdater;
pub use result::{DryRunResult, UnitReport, UnitStatus, UpdateResult};

use mdsync_config::{InsertPosition, UploadConfig};

/// Configuration for inserting sources into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateConfig {
    /// Where new sections go.
    pub position: InsertPosition,
    /// Heading level of section titles.
    pub heading_level: u8,
    /// Whether sections start with a horizontal rule.
    pub separator: bool,
    /// Prefix of marker names.
    pub anchor_prefix: String,
    /// Hex digest characters kept in marker names.
    pub hash_len: usize,
    /// Strict table continuation when segmenting.
    pub strict_tables: bool,
}

impl From<&UploadConfig> for UpdateConfig {
    fn from(upload: &UploadConfig) -> Self {
        Self {
            position: upload.position,
            heading_level: upload.heading_level,
            separator: upload.separator,
            anchor_prefix: upload.anchor_prefix.clone(),
            hash_len: upload.hash_len,
            strict_tables: upload.strict_tables,
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self::from(&UploadConfig::default())
    }
}
