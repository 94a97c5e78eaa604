//! Index of anchor markers present in a page body.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::ContentMarker;
use crate::storage::{StorageNode, StorageParser};

/// Anchor macros in bodies the XML reader rejects. Attribute order and case
/// are ignored like in the tree walk.
static ANCHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<ac:structured-macro\b[^>]*\bac:name\s*=\s*["']\s*anchor\s*["'][^>]*>\s*<ac:parameter\b[^>]*\bac:name\s*=\s*["']\s*name\s*["'][^>]*>\s*([^<]*?)\s*</ac:parameter>"#,
    )
    .expect("invalid anchor regex")
});

/// Set of marker names found in a page body.
///
/// Built once per run with a single pass over the body. Names compare
/// case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct MarkerIndex {
    names: HashSet<String>,
}

impl MarkerIndex {
    /// Index every anchor macro in `body`.
    ///
    /// An anchor is a `structured-macro` whose `name` attribute is `anchor`,
    /// with a `parameter` child whose `name` attribute is `name`. Bodies that
    /// fail to parse are scanned with a pattern instead.
    #[must_use]
    pub fn build(body: &str) -> Self {
        let names = match StorageParser::new().parse(body) {
            Ok(tree) => anchor_names(&tree),
            Err(e) => {
                warn!("Page body is not well-formed ({e}), scanning anchors by pattern");
                ANCHOR_PATTERN
                    .captures_iter(body)
                    .map(|caps| caps[1].trim().to_lowercase())
                    .collect()
            }
        };
        debug!("Indexed {} anchor markers", names.len());
        Self { names }
    }

    /// Whether the marker is present.
    #[must_use]
    pub fn contains(&self, marker: &ContentMarker) -> bool {
        self.names.contains(&marker.name().to_lowercase())
    }

    /// Record a marker, e.g. one about to be inserted in this run.
    ///
    /// Returns `false` if it was already present.
    pub fn insert(&mut self, marker: &ContentMarker) -> bool {
        self.names.insert(marker.name().to_lowercase())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

fn anchor_names(tree: &StorageNode) -> HashSet<String> {
    let mut names = HashSet::new();
    tree.walk(&mut |node| {
        if !node.is("ac:structured-macro") || !node.attr_is("ac:name", "anchor") {
            return;
        }
        let name = node
            .children
            .iter()
            .find(|child| child.is("ac:parameter") && child.attr_is("ac:name", "name"));
        if let Some(param) = name {
            let value = param.text_content();
            let value = value.trim();
            if !value.is_empty() {
                names.insert(value.to_lowercase());
            }
        }
    });
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(content: &str) -> ContentMarker {
        ContentMarker::identify(content, "mdfile", 12)
    }

    #[test]
    fn test_finds_generated_anchor() {
        let m = marker("hello");
        let body = format!("<p>intro</p><hr />{}<h2>Notes</h2>", m.to_storage());
        let index = MarkerIndex::build(&body);
        assert!(index.contains(&m));
        assert!(!index.contains(&marker("other")));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_empty_body() {
        let index = MarkerIndex::build("");
        assert!(index.is_empty());
        assert!(!index.contains(&marker("hello")));
    }

    #[test]
    fn test_case_whitespace_and_attribute_order() {
        let m = marker("hello");
        let body = format!(
            r#"<AC:STRUCTURED-MACRO ac:schema-version="1" AC:NAME=" Anchor " ac:macro-id="x">
                 <ac:parameter ac:name="NAME">
                   {}
                 </ac:parameter>
               </AC:STRUCTURED-MACRO>"#,
            m.name().to_uppercase()
        );
        let index = MarkerIndex::build(&body);
        assert!(index.contains(&m));
    }

    #[test]
    fn test_nested_anchor_found() {
        let m = marker("deep");
        let body = format!(
            r#"<ac:layout><ac:layout-section><ac:layout-cell><div>{}</div></ac:layout-cell></ac:layout-section></ac:layout>"#,
            m.to_storage()
        );
        assert!(MarkerIndex::build(&body).contains(&m));
    }

    #[test]
    fn test_other_macros_ignored() {
        let body = r#"<ac:structured-macro ac:name="info"><ac:parameter ac:name="name">mdfile-2cf24dba5fb0</ac:parameter></ac:structured-macro>
            <ac:structured-macro ac:name="anchor"><ac:parameter ac:name="title">mdfile-2cf24dba5fb0</ac:parameter></ac:structured-macro>"#;
        let index = MarkerIndex::build(body);
        assert!(!index.contains(&marker("hello")));
        assert!(index.is_empty());
    }

    #[test]
    fn test_marker_text_in_prose_is_not_a_marker() {
        let m = marker("hello");
        let body = format!("<p>{}</p>", m.name());
        assert!(!MarkerIndex::build(&body).contains(&m));
    }

    #[test]
    fn test_malformed_body_falls_back_to_pattern() {
        let m = marker("hello");
        let body = format!(
            r#"<p>broken<!-- {}"#,
            r#"<ac:structured-macro ac:name="anchor"><ac:parameter ac:name="name">mdfile-2cf24dba5fb0</ac:parameter></ac:structured-macro>"#
        );
        let index = MarkerIndex::build(&body);
        assert!(index.contains(&m));
    }

    #[test]
    fn test_insert_reports_new_markers() {
        let mut index = MarkerIndex::default();
        let m = marker("hello");
        assert!(index.insert(&m));
        assert!(!index.insert(&m));
        assert!(index.contains(&m));
    }
}
