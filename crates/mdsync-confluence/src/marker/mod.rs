//! Content-addressed markers for inserted sections.
//!
//! Every inserted section starts with an anchor macro named after a digest
//! of the source content. A later run recognises already inserted content by
//! looking for that anchor, so nothing needs to be stored locally.

mod index;

use std::fmt;

use sha2::{Digest, Sha256};

pub use index::MarkerIndex;

/// Longest digest a marker can carry (full SHA-256 in hex).
pub const MAX_HASH_LEN: usize = 64;

/// Identifier of one piece of source content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentMarker {
    prefix: String,
    digest: String,
}

impl ContentMarker {
    /// Compute the marker of `raw` content.
    ///
    /// The content is normalized first (see [`normalize_content`]), then
    /// hashed with SHA-256. The first `hash_len` hex characters form the
    /// digest; `hash_len` is clamped to `1..=64`.
    #[must_use]
    pub fn identify(raw: &str, prefix: &str, hash_len: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize_content(raw).as_bytes());
        let mut digest = hex::encode(hasher.finalize());
        digest.truncate(hash_len.clamp(1, MAX_HASH_LEN));

        Self {
            prefix: prefix.to_owned(),
            digest,
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Anchor name, `{prefix}-{digest}`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}-{}", self.prefix, self.digest)
    }

    /// Storage format anchor macro carrying the marker name.
    #[must_use]
    pub fn to_storage(&self) -> String {
        format!(
            r#"<ac:structured-macro ac:name="anchor"><ac:parameter ac:name="name">{}</ac:parameter></ac:structured-macro>"#,
            self.name()
        )
    }
}

impl fmt::Display for ContentMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.digest)
    }
}

/// Normalize content before hashing: CRLF becomes LF, then surrounding
/// whitespace is trimmed.
#[must_use]
pub fn normalize_content(raw: &str) -> String {
    raw.replace("\r\n", "\n").trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identify_is_deterministic() {
        let a = ContentMarker::identify("# Notes\n\nbody", "mdfile", 12);
        let b = ContentMarker::identify("# Notes\n\nbody", "mdfile", 12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_identify_known_digest() {
        // sha256("hello") = 2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824
        let marker = ContentMarker::identify("hello", "mdfile", 12);
        assert_eq!(marker.digest(), "2cf24dba5fb0");
        assert_eq!(marker.name(), "mdfile-2cf24dba5fb0");
        assert_eq!(marker.to_string(), "mdfile-2cf24dba5fb0");
    }

    #[test]
    fn test_different_content_different_marker() {
        let a = ContentMarker::identify("one", "mdfile", 12);
        let b = ContentMarker::identify("two", "mdfile", 12);
        assert_ne!(a, b);
    }

    #[test]
    fn test_line_endings_do_not_matter() {
        assert_eq!(
            ContentMarker::identify("a\nb", "mdfile", 12),
            ContentMarker::identify("a\r\nb", "mdfile", 12)
        );
    }

    #[test]
    fn test_surrounding_whitespace_does_not_matter() {
        assert_eq!(
            ContentMarker::identify(" a ", "mdfile", 12),
            ContentMarker::identify("a", "mdfile", 12)
        );
        assert_eq!(
            ContentMarker::identify("\n\na\n\n", "mdfile", 12),
            ContentMarker::identify("a", "mdfile", 12)
        );
    }

    #[test]
    fn test_inner_whitespace_matters() {
        assert_ne!(
            ContentMarker::identify("a  b", "mdfile", 12),
            ContentMarker::identify("a b", "mdfile", 12)
        );
    }

    #[test]
    fn test_hash_len_is_clamped() {
        assert_eq!(ContentMarker::identify("x", "p", 0).digest().len(), 1);
        assert_eq!(ContentMarker::identify("x", "p", 64).digest().len(), 64);
        assert_eq!(ContentMarker::identify("x", "p", 500).digest().len(), 64);
    }

    #[test]
    fn test_to_storage() {
        let marker = ContentMarker::identify("hello", "doc", 8);
        assert_eq!(
            marker.to_storage(),
            r#"<ac:structured-macro ac:name="anchor"><ac:parameter ac:name="name">doc-2cf24dba</ac:parameter></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_normalize_content() {
        assert_eq!(normalize_content("\r\n a\r\nb \r\n"), "a\nb");
    }
}
