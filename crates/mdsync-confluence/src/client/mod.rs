//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence REST API (v1 `content`
//! endpoints) with Basic or Bearer token authentication.

mod listing;
mod pages;

use std::fmt;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mdsync_config::ConfluenceConfig;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Credentials sent with every request.
#[derive(Clone)]
pub enum Credentials {
    /// Account name and API token (Confluence Cloud).
    Basic {
        /// Account name, usually an email address.
        username: String,
        /// API token.
        api_token: String,
    },
    /// Personal access token (Server/Data Center).
    Bearer {
        /// Token value.
        token: String,
    },
}

impl Credentials {
    /// Basic auth when a username is configured, Bearer otherwise.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        match &config.username {
            Some(username) => Self::Basic {
                username: username.clone(),
                api_token: config.api_token.clone(),
            },
            None => Self::Bearer {
                token: config.api_token.clone(),
            },
        }
    }

    /// Value of the `Authorization` header.
    fn header_value(&self) -> String {
        match self {
            Self::Basic {
                username,
                api_token,
            } => format!("Basic {}", STANDARD.encode(format!("{username}:{api_token}"))),
            Self::Bearer { token } => format!("Bearer {token}"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
        }
    }
}

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    /// Space used when a response does not name one.
    pub(crate) space_key: String,
    auth_header: String,
}

impl ConfluenceClient {
    /// Create a client.
    ///
    /// # Arguments
    /// * `base_url` - Confluence base URL (for Cloud, including `/wiki`)
    /// * `space_key` - Space of the pages this client works with
    /// * `credentials` - Authentication for every request
    #[must_use]
    pub fn new(base_url: &str, space_key: &str, credentials: &Credentials) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            space_key: space_key.to_owned(),
            auth_header: credentials.header_value(),
        }
    }

    /// Create a client from a validated `[confluence]` config section.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.space_key,
            &Credentials::from_config(config),
        )
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }

    /// Browser URL of a page.
    #[must_use]
    pub fn page_url(&self, page_id: &str) -> String {
        format!(
            "{}/pages/viewpage.action?pageId={}",
            self.base_url,
            encode_segment(page_id)
        )
    }
}

/// Percent-encode a value for use in a URL path segment or query value.
fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Decode a JSON response, mapping error statuses to [`ConfluenceError`].
fn read_json<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, ConfluenceError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(ConfluenceError::from_status(status, error_body));
    }

    Ok(body_reader.read_json()?)
}
