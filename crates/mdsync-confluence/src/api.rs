//! Content operations used by the updater and exporter.

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Page, RemoteDocument};

/// Expansions needed to snapshot a page for an update.
const DOCUMENT_EXPAND: &[&str] = &["body.storage", "version", "space"];

/// Remote content store.
///
/// [`ConfluenceClient`] talks to a real server; tests substitute an
/// in-memory implementation.
pub trait ContentApi {
    /// Fetch the current state of a page.
    fn fetch_page(&self, page_id: &str) -> Result<RemoteDocument, ConfluenceError>;

    /// Write `body` as the next version of `doc`.
    ///
    /// Requests version `doc.version + 1` exactly once; a conflict is
    /// returned, not retried.
    fn push_page(
        &self,
        doc: &RemoteDocument,
        body: &str,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError>;

    /// One batch of pages in a space, with bodies.
    fn list_space_pages(
        &self,
        space_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Page>, ConfluenceError>;

    /// Direct children of a page, with bodies.
    fn list_child_pages(&self, page_id: &str, limit: usize) -> Result<Vec<Page>, ConfluenceError>;

    /// Browser URL of a page.
    fn page_url(&self, page_id: &str) -> String;
}

impl ContentApi for ConfluenceClient {
    fn fetch_page(&self, page_id: &str) -> Result<RemoteDocument, ConfluenceError> {
        let page = self.get_page(page_id, DOCUMENT_EXPAND)?;
        Ok(RemoteDocument::from_page(&page, &self.space_key))
    }

    fn push_page(
        &self,
        doc: &RemoteDocument,
        body: &str,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        self.update_page(
            &doc.id,
            &doc.title,
            &doc.space_key,
            body,
            doc.version,
            message,
        )
    }

    fn list_space_pages(
        &self,
        space_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Page>, ConfluenceError> {
        Ok(self.get_space_pages(space_key, start, limit)?.results)
    }

    fn list_child_pages(&self, page_id: &str, limit: usize) -> Result<Vec<Page>, ConfluenceError> {
        Ok(self.get_child_pages(page_id, limit)?.results)
    }

    fn page_url(&self, page_id: &str) -> String {
        ConfluenceClient::page_url(self, page_id)
    }
}
