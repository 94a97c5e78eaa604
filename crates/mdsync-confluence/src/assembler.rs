//! Assembly of rendered sections and merging into an existing body.

use mdsync_config::InsertPosition;

use crate::marker::ContentMarker;

/// A rendered section ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    /// Section title (source file stem).
    pub name: String,
    /// Marker identifying the source content.
    pub marker: ContentMarker,
    /// Storage format of the whole section.
    pub html: String,
}

/// Builds section fragments: optional rule, anchor, heading, body.
#[derive(Debug, Clone, Copy)]
pub struct FragmentBuilder {
    heading_level: u8,
    separator: bool,
}

impl FragmentBuilder {
    /// `heading_level` is clamped to `1..=6`.
    #[must_use]
    pub fn new(heading_level: u8, separator: bool) -> Self {
        Self {
            heading_level: heading_level.clamp(1, 6),
            separator,
        }
    }

    /// Assemble `[<hr />] + anchor + <hN>name</hN> + body`.
    #[must_use]
    pub fn build(&self, name: &str, marker: ContentMarker, body: &str) -> RenderedFragment {
        let level = self.heading_level;
        let mut html = String::new();
        if self.separator {
            html.push_str("<hr />");
        }
        html.push_str(&marker.to_storage());
        html.push_str(&format!(
            "<h{level}>{}</h{level}>",
            escape_heading(name)
        ));
        html.push_str(body);

        RenderedFragment {
            name: name.to_owned(),
            marker,
            html,
        }
    }
}

/// Escape the characters that would break heading markup.
fn escape_heading(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Combine an existing body with new fragments according to `position`.
#[must_use]
pub fn merge(existing: &str, fragments: &[RenderedFragment], position: InsertPosition) -> String {
    let added: String = fragments.iter().map(|f| f.html.as_str()).collect();
    match position {
        InsertPosition::Append => format!("{existing}{added}"),
        InsertPosition::Prepend => format!("{added}{existing}"),
        InsertPosition::Replace => added,
    }
}
