//! Error types for Confluence integration.

/// Error parsing a storage format body.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageParseError {
    /// XML syntax error.
    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    /// Encoding error while decoding names or text.
    #[error("encoding error: {0}")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// Request never produced a response (DNS, connect, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] ureq::Error),

    /// The page does not exist or is not visible to the account.
    #[error("Page not found: {body}")]
    NotFound {
        /// Response body.
        body: String,
    },

    /// Credentials were rejected.
    #[error("Not authorized (HTTP {status}): {body}")]
    Unauthorized {
        /// 401 or 403.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The page changed since it was fetched (version mismatch).
    #[error("Version conflict: {body}")]
    Conflict {
        /// Response body.
        body: String,
    },

    /// Any other error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response lacked a field the operation needs.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ConfluenceError {
    /// Map an error status and its body to an error variant.
    #[must_use]
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            404 => Self::NotFound { body },
            401 | 403 => Self::Unauthorized { status, body },
            409 => Self::Conflict { body },
            _ => Self::HttpResponse { status, body },
        }
    }

    /// Whether the error is an optimistic-concurrency rejection.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            ConfluenceError::from_status(404, String::new()),
            ConfluenceError::NotFound { .. }
        ));
        assert!(matches!(
            ConfluenceError::from_status(401, String::new()),
            ConfluenceError::Unauthorized { status: 401, .. }
        ));
        assert!(matches!(
            ConfluenceError::from_status(403, String::new()),
            ConfluenceError::Unauthorized { status: 403, .. }
        ));
        assert!(ConfluenceError::from_status(409, String::new()).is_conflict());
        assert!(matches!(
            ConfluenceError::from_status(500, "boom".to_owned()),
            ConfluenceError::HttpResponse { status: 500, ref body } if body == "boom"
        ));
    }

    #[test]
    fn test_display_includes_body() {
        let err = ConfluenceError::from_status(409, "stale version".to_owned());
        assert_eq!(err.to_string(), "Version conflict: stale version");
    }
}
