//! Snapshot of a remote page taken at the start of a run.

use tracing::warn;

use super::page::Page;

/// Page state fetched once per run.
///
/// Writes derived from it request `version + 1`; if the page moved on in the
/// meantime the server rejects the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteDocument {
    /// Page ID.
    pub id: String,
    /// Page title, sent back unchanged on write.
    pub title: String,
    /// Version number at fetch time.
    pub version: u32,
    /// Storage format body at fetch time.
    pub body: String,
    /// Key of the space the page lives in.
    pub space_key: String,
}

impl RemoteDocument {
    /// Build a snapshot from a fetched page.
    ///
    /// `fallback_space_key` is used when the response does not name the space.
    /// A page without a storage body is treated as empty.
    #[must_use]
    pub fn from_page(page: &Page, fallback_space_key: &str) -> Self {
        let body = page.storage_value().unwrap_or_else(|| {
            warn!("Page {} has no storage body, treating it as empty", page.id);
            ""
        });
        let space_key = page
            .space
            .as_ref()
            .map_or(fallback_space_key, |space| space.key.as_str());

        Self {
            id: page.id.clone(),
            title: page.title.clone(),
            version: page.version.number,
            body: body.to_owned(),
            space_key: space_key.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(json: &str) -> Page {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_page_uses_page_space() {
        let page = page(
            r#"{"id": "1", "type": "page", "title": "T", "space": {"key": "OPS"},
                "version": {"number": 4},
                "body": {"storage": {"value": "<p>x</p>", "representation": "storage"}}}"#,
        );
        assert_eq!(
            RemoteDocument::from_page(&page, "DOCS"),
            RemoteDocument {
                id: "1".to_owned(),
                title: "T".to_owned(),
                version: 4,
                body: "<p>x</p>".to_owned(),
                space_key: "OPS".to_owned(),
            }
        );
    }

    #[test]
    fn test_from_page_falls_back_to_configured_space() {
        let page = page(r#"{"id": "1", "type": "page", "title": "T", "version": {"number": 1}}"#);
        let doc = RemoteDocument::from_page(&page, "DOCS");
        assert_eq!(doc.space_key, "DOCS");
        assert_eq!(doc.body, "");
    }
}
