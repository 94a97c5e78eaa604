//! In-memory content store for tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::{Body, Page, RemoteDocument, Space, Storage, Version};

/// A write request seen by the mock.
#[derive(Debug, Clone)]
pub(crate) struct Push {
    pub page_id: String,
    pub body: String,
    pub version: u32,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
struct StoredPage {
    title: String,
    version: u32,
    body: Option<String>,
    parent: Option<String>,
}

/// Pages keyed by ID, all in space `DOCS`.
#[derive(Debug, Default)]
pub(crate) struct MockContentApi {
    pages: RefCell<BTreeMap<String, StoredPage>>,
    pushes: RefCell<Vec<Push>>,
    push_error: Option<(u16, String)>,
    failing_lists: Vec<String>,
}

impl MockContentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, id: &str, title: &str, version: u32, body: &str) -> Self {
        self.insert(id, title, version, Some(body), None);
        self
    }

    pub fn with_bodyless_page(self, id: &str, title: &str, version: u32) -> Self {
        self.insert(id, title, version, None, None);
        self
    }

    pub fn with_child(self, parent: &str, id: &str, title: &str, body: &str) -> Self {
        self.insert(id, title, 1, Some(body), Some(parent));
        self
    }

    /// Every write fails with `status`.
    pub fn with_push_error(mut self, status: u16, body: &str) -> Self {
        self.push_error = Some((status, body.to_owned()));
        self
    }

    /// Listing children of `page_id` (or the space, for `"DOCS"`) fails.
    pub fn with_failing_list(mut self, id: &str) -> Self {
        self.failing_lists.push(id.to_owned());
        self
    }

    pub fn pushes(&self) -> Vec<Push> {
        self.pushes.borrow().clone()
    }

    pub fn page_version(&self, id: &str) -> Option<u32> {
        self.pages.borrow().get(id).map(|p| p.version)
    }

    fn insert(&self, id: &str, title: &str, version: u32, body: Option<&str>, parent: Option<&str>) {
        self.pages.borrow_mut().insert(
            id.to_owned(),
            StoredPage {
                title: title.to_owned(),
                version,
                body: body.map(str::to_owned),
                parent: parent.map(str::to_owned),
            },
        );
    }

    fn to_page(id: &str, stored: &StoredPage) -> Page {
        Page {
            id: id.to_owned(),
            content_type: "page".to_owned(),
            title: stored.title.clone(),
            version: Version {
                number: stored.version,
                message: None,
            },
            space: Some(Space {
                key: "DOCS".to_owned(),
            }),
            body: stored.body.as_ref().map(|value| Body {
                storage: Some(Storage {
                    value: value.clone(),
                    representation: "storage".to_owned(),
                }),
            }),
            links: None,
        }
    }

    fn list_error(&self, id: &str) -> Option<ConfluenceError> {
        self.failing_lists
            .iter()
            .any(|f| f == id)
            .then(|| ConfluenceError::from_status(500, "listing failed".to_owned()))
    }
}

impl ContentApi for MockContentApi {
    fn fetch_page(&self, page_id: &str) -> Result<RemoteDocument, ConfluenceError> {
        let pages = self.pages.borrow();
        let stored = pages
            .get(page_id)
            .ok_or_else(|| ConfluenceError::from_status(404, "No content found".to_owned()))?;
        Ok(RemoteDocument::from_page(&Self::to_page(page_id, stored), "DOCS"))
    }

    fn push_page(
        &self,
        doc: &RemoteDocument,
        body: &str,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let version = doc.version + 1;
        self.pushes.borrow_mut().push(Push {
            page_id: doc.id.clone(),
            body: body.to_owned(),
            version,
            message: message.map(str::to_owned),
        });

        if let Some((status, error_body)) = &self.push_error {
            return Err(ConfluenceError::from_status(*status, error_body.clone()));
        }

        let mut pages = self.pages.borrow_mut();
        let stored = pages
            .get_mut(&doc.id)
            .ok_or_else(|| ConfluenceError::from_status(404, "No content found".to_owned()))?;
        if stored.version + 1 != version {
            return Err(ConfluenceError::from_status(409, "Version mismatch".to_owned()));
        }
        stored.version = version;
        stored.body = Some(body.to_owned());
        Ok(Self::to_page(&doc.id, stored))
    }

    fn list_space_pages(
        &self,
        space_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Page>, ConfluenceError> {
        if let Some(e) = self.list_error(space_key) {
            return Err(e);
        }
        Ok(self
            .pages
            .borrow()
            .iter()
            .skip(start)
            .take(limit)
            .map(|(id, stored)| Self::to_page(id, stored))
            .collect())
    }

    fn list_child_pages(&self, page_id: &str, limit: usize) -> Result<Vec<Page>, ConfluenceError> {
        if let Some(e) = self.list_error(page_id) {
            return Err(e);
        }
        Ok(self
            .pages
            .borrow()
            .iter()
            .filter(|(_, stored)| stored.parent.as_deref() == Some(page_id))
            .take(limit)
            .map(|(id, stored)| Self::to_page(id, stored))
            .collect())
    }

    fn page_url(&self, page_id: &str) -> String {
        format!("https://wiki.test/pages/viewpage.action?pageId={page_id}")
    }
}
