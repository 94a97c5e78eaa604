//! Export of Confluence pages to local Markdown files.
//!
//! A source URL names either one page (exported with its direct children) or
//! a whole space. Failures after the first request are collected as warnings
//! so a partial export still writes what it has.

mod markdown;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use ureq::http::Uri;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::RemoteDocument;

pub use markdown::{page_file_name, storage_to_markdown};

/// Children fetched for a page export.
pub const CHILD_LIMIT: usize = 100;

/// Batch size when paging through a space.
pub const SPACE_BATCH_SIZE: usize = 50;

/// Error during export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The URL names neither a page nor a space.
    #[error("Cannot determine a page ID or space key from '{0}'")]
    InvalidSource(String),

    /// The requested page could not be fetched.
    #[error("Failed to fetch the page: {0}")]
    Fetch(#[source] ConfluenceError),

    /// Writing output files failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// What to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportSource {
    /// A page and its direct children.
    Page(String),
    /// Every page in a space.
    Space(String),
}

impl ExportSource {
    /// Parse a Confluence URL.
    ///
    /// Recognised, in order: a `pageId` query parameter, the path segment
    /// after `pages`, the path segment after `spaces`.
    pub fn from_url(url: &str) -> Result<Self, ExportError> {
        let invalid = || ExportError::InvalidSource(url.to_owned());
        let uri: Uri = url.trim().parse().map_err(|_| invalid())?;

        let page_id = uri.query().and_then(|query| {
            query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, value)| *key == "pageId" && !value.is_empty())
                .map(|(_, value)| value.to_owned())
        });
        if let Some(id) = page_id {
            return Ok(Self::Page(id));
        }

        let segments: Vec<&str> = uri.path().split('/').filter(|s| !s.is_empty()).collect();
        let after = |name: &str| {
            segments
                .iter()
                .position(|s| *s == name)
                .and_then(|i| segments.get(i + 1))
                .copied()
        };

        if let Some(id) = after("pages").filter(|id| id.chars().all(|c| c.is_ascii_digit())) {
            return Ok(Self::Page(id.to_owned()));
        }
        if let Some(key) = after("spaces") {
            return Ok(Self::Space(key.to_owned()));
        }
        Err(invalid())
    }
}

/// Outcome of an export.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Files written, in export order.
    pub written: Vec<PathBuf>,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
}

/// Exports pages through a [`ContentApi`].
pub struct Exporter<'a, C: ContentApi> {
    client: &'a C,
}

impl<'a, C: ContentApi> Exporter<'a, C> {
    #[must_use]
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Fetch the pages named by `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Fetch`] if the page of a page export cannot be
    /// fetched. Listing failures are pushed to `warnings`.
    pub fn collect(
        &self,
        source: &ExportSource,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<RemoteDocument>, ExportError> {
        match source {
            ExportSource::Page(id) => {
                let page = self.client.fetch_page(id).map_err(ExportError::Fetch)?;
                let space_key = page.space_key.clone();
                let mut documents = vec![page];
                match self.client.list_child_pages(id, CHILD_LIMIT) {
                    Ok(children) => {
                        debug!("Page {id} has {} child page(s)", children.len());
                        documents.extend(
                            children
                                .iter()
                                .map(|child| RemoteDocument::from_page(child, &space_key)),
                        );
                    }
                    Err(e) => {
                        warn!("Failed to fetch child pages of {id}: {e}");
                        warnings.push(format!("Failed to fetch child pages of {id}: {e}"));
                    }
                }
                Ok(documents)
            }
            ExportSource::Space(key) => {
                let mut documents = Vec::new();
                let mut start = 0;
                loop {
                    match self.client.list_space_pages(key, start, SPACE_BATCH_SIZE) {
                        Ok(batch) => {
                            let count = batch.len();
                            debug!("Fetched {count} page(s) of space {key} from {start}");
                            documents
                                .extend(batch.iter().map(|page| RemoteDocument::from_page(page, key)));
                            if count < SPACE_BATCH_SIZE {
                                break;
                            }
                            start += count;
                        }
                        Err(e) => {
                            warn!("Failed to list pages of space {key} from {start}: {e}");
                            warnings.push(format!(
                                "Failed to list pages of space {key} from {start}: {e}"
                            ));
                            break;
                        }
                    }
                }
                Ok(documents)
            }
        }
    }

    /// Export `source` into `output_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the page of a page export cannot be fetched or a
    /// file cannot be written. A page whose body cannot be converted is
    /// skipped with a warning.
    pub fn export(&self, source: &ExportSource, output_dir: &Path) -> Result<ExportResult, ExportError> {
        let mut result = ExportResult::default();
        let documents = self.collect(source, &mut result.warnings)?;

        std::fs::create_dir_all(output_dir)?;
        for document in &documents {
            let markdown = match storage_to_markdown(&document.body) {
                Ok(markdown) => markdown,
                Err(e) => {
                    warn!("Skipping page {} '{}': {e}", document.id, document.title);
                    result
                        .warnings
                        .push(format!("Skipped page '{}': {e}", document.title));
                    continue;
                }
            };
            let path = output_dir.join(page_file_name(&document.title));
            std::fs::write(&path, markdown)?;
            info!("Wrote {}", path.display());
            result.written.push(path);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockContentApi;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_from_page_id_query() {
        assert_eq!(
            ExportSource::from_url("https://wiki.test/pages/viewpage.action?pageId=123&x=1").unwrap(),
            ExportSource::Page("123".to_owned())
        );
    }

    #[test]
    fn test_source_from_cloud_page_path() {
        assert_eq!(
            ExportSource::from_url("https://x.atlassian.net/wiki/spaces/DOCS/pages/98765/Some+Title")
                .unwrap(),
            ExportSource::Page("98765".to_owned())
        );
    }

    #[test]
    fn test_source_from_space_path() {
        assert_eq!(
            ExportSource::from_url("https://x.atlassian.net/wiki/spaces/DOCS/overview").unwrap(),
            ExportSource::Space("DOCS".to_owned())
        );
    }

    #[test]
    fn test_source_invalid() {
        assert!(matches!(
            ExportSource::from_url("https://wiki.test/display/whatever"),
            Err(ExportError::InvalidSource(_))
        ));
        assert!(matches!(
            ExportSource::from_url("https://wiki.test/pages/viewpage.action"),
            Err(ExportError::InvalidSource(_))
        ));
        assert!(ExportSource::from_url("not a url").is_err());
    }

    #[test]
    fn test_page_export_writes_page_and_children() {
        let api = MockContentApi::new()
            .with_page("1", "Parent", 3, "<h1>Parent</h1><p>text</p>")
            .with_child("1", "2", "Child/One", "<p>child</p>")
            .with_page("3", "Unrelated", 1, "<p>no</p>");
        let dir = tempfile::tempdir().unwrap();

        let result = Exporter::new(&api)
            .export(&ExportSource::Page("1".to_owned()), dir.path())
            .unwrap();

        assert_eq!(result.written.len(), 2);
        assert!(result.warnings.is_empty());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Parent.md")).unwrap(),
            "# Parent\n\ntext\n"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Child-One.md")).unwrap(),
            "child\n"
        );
        assert!(!dir.path().join("Unrelated.md").exists());
    }

    #[test]
    fn test_page_export_child_failure_is_warning() {
        let api = MockContentApi::new()
            .with_page("1", "Parent", 1, "<p>text</p>")
            .with_failing_list("1");
        let dir = tempfile::tempdir().unwrap();

        let result = Exporter::new(&api)
            .export(&ExportSource::Page("1".to_owned()), dir.path())
            .unwrap();

        assert_eq!(result.written, vec![dir.path().join("Parent.md")]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_page_export_missing_page_is_error() {
        let api = MockContentApi::new();
        let dir = tempfile::tempdir().unwrap();

        let err = Exporter::new(&api)
            .export(&ExportSource::Page("9".to_owned()), dir.path())
            .unwrap_err();

        assert!(matches!(err, ExportError::Fetch(ConfluenceError::NotFound { .. })));
    }

    #[test]
    fn test_space_export_pages_through_batches() {
        let mut api = MockContentApi::new();
        for i in 0..(SPACE_BATCH_SIZE + 5) {
            api = api.with_page(&format!("{i:03}"), &format!("Page {i:03}"), 1, "<p>x</p>");
        }
        let mut warnings = Vec::new();

        let documents = Exporter::new(&api)
            .collect(&ExportSource::Space("DOCS".to_owned()), &mut warnings)
            .unwrap();

        assert_eq!(documents.len(), SPACE_BATCH_SIZE + 5);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_space_listing_failure_keeps_going() {
        let api = MockContentApi::new()
            .with_page("1", "One", 1, "<p>x</p>")
            .with_failing_list("DOCS");
        let dir = tempfile::tempdir().unwrap();

        let result = Exporter::new(&api)
            .export(&ExportSource::Space("DOCS".to_owned()), dir.path())
            .unwrap();

        assert!(result.written.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_untitled_and_empty_pages() {
        let api = MockContentApi::new().with_bodyless_page("1", "", 1);
        let dir = tempfile::tempdir().unwrap();

        let result = Exporter::new(&api)
            .export(&ExportSource::Page("1".to_owned()), dir.path())
            .unwrap();

        assert_eq!(result.written, vec![dir.path().join("Untitled.md")]);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("Untitled.md")).unwrap(),
            ""
        );
    }
}
