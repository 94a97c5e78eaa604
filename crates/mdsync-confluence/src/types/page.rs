//! Confluence page types.

use serde::{Deserialize, Serialize};

/// Confluence page as returned by the content API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Content type ("page" for pages).
    #[serde(rename = "type")]
    pub content_type: String,
    /// Page title.
    #[serde(default)]
    pub title: String,
    /// Version information (only when `version` is expanded).
    #[serde(default)]
    pub version: Version,
    /// Space the page belongs to (only when `space` is expanded).
    #[serde(default)]
    pub space: Option<Space>,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// Storage format body, if it was expanded.
    #[must_use]
    pub fn storage_value(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Space reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Space {
    /// Space key.
    pub key: String,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Links {
    /// Web UI link.
    #[serde(default)]
    pub webui: Option<String>,
    /// API self link.
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
}

/// Paged list of content.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentsResponse {
    /// Pages in this batch.
    #[serde(default)]
    pub results: Vec<Page>,
    /// Number of results in this batch.
    #[serde(default)]
    pub size: usize,
}
