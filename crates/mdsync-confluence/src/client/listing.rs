//! Page listing operations for Confluence API.

use tracing::info;

use super::{ConfluenceClient, encode_segment, read_json};
use crate::error::ConfluenceError;
use crate::types::ContentsResponse;

/// Fields expanded on listed pages so they can be exported without a
/// second request each.
const LISTING_EXPAND: &str = "body.storage,version,space";

impl ConfluenceClient {
    /// Get one batch of pages in a space.
    pub fn get_space_pages(
        &self,
        space_key: &str,
        start: usize,
        limit: usize,
    ) -> Result<ContentsResponse, ConfluenceError> {
        let url = format!(
            "{}/content?spaceKey={}&type=page&start={start}&limit={limit}&expand={LISTING_EXPAND}",
            self.api_url(),
            encode_segment(space_key),
        );

        info!("Listing pages of space {} from {}", space_key, start);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let contents: ContentsResponse = read_json(response)?;
        info!("Found {} pages in space {}", contents.results.len(), space_key);
        Ok(contents)
    }

    /// Get the direct child pages of a page.
    pub fn get_child_pages(
        &self,
        page_id: &str,
        limit: usize,
    ) -> Result<ContentsResponse, ConfluenceError> {
        let url = format!(
            "{}/content/{}/child/page?limit={limit}&expand={LISTING_EXPAND}",
            self.api_url(),
            encode_segment(page_id),
        );

        info!("Getting child pages of {}", page_id);

        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .call()?;

        let contents: ContentsResponse = read_json(response)?;
        info!("Found {} child pages of {}", contents.results.len(), page_id);
        Ok(contents)
    }
}
