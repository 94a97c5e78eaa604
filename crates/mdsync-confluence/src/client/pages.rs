//! Page operations for Confluence API.

use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, encode_segment, read_json};
use crate::error::ConfluenceError;
use crate::types::Page;

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let mut url = format!("{}/content/{}", self.api_url(), encode_segment(page_id));

        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }

        info!("Getting page {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        read_json(response)
    }

    /// Replace a page body, requesting `version + 1`.
    ///
    /// `version` is the number the body was derived from. If the page has
    /// moved past it the server answers 409 and nothing is written.
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        space_key: &str,
        body: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), encode_segment(page_id));

        let payload = update_payload(page_id, title, space_key, body, version, message);

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json; charset=utf-8")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!("Updated page {} to version {}", page_id, page.version.number);
        Ok(page)
    }
}

/// JSON body of a page update, asking for `version + 1`.
pub(crate) fn update_payload(
    page_id: &str,
    title: &str,
    space_key: &str,
    body: &str,
    version: u32,
    message: Option<&str>,
) -> serde_json::Value {
    let mut payload = json!({
        "id": page_id,
        "type": "page",
        "title": title,
        "space": {"key": space_key},
        "body": {
            "storage": {
                "value": body,
                "representation": "storage"
            }
        },
        "version": {"number": version + 1}
    });

    if let Some(msg) = message {
        payload["version"]["message"] = json!(msg);
    }
    payload
}
