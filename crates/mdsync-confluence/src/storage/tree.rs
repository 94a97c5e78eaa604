//! Element tree for parsed storage format.

use std::collections::HashMap;

/// Element in a parsed storage format body.
///
/// Text is stored ElementTree style: `text` is the content before the first
/// child, `tail` is the content after this element's end tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageNode {
    /// Qualified tag name as written (e.g. `ac:structured-macro`).
    pub tag: String,
    /// Direct text content.
    pub text: String,
    /// Text after the element.
    pub tail: String,
    /// Attributes by qualified name.
    pub attrs: HashMap<String, String>,
    /// Child elements.
    pub children: Vec<StorageNode>,
}

impl StorageNode {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<StorageNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether the tag equals `name`, ignoring ASCII case.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.tag.eq_ignore_ascii_case(name)
    }

    /// Attribute value looked up with a case-insensitive name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether attribute `name` is present with a value equal to `value`,
    /// ignoring case and surrounding whitespace.
    #[must_use]
    pub fn attr_is(&self, name: &str, value: &str) -> bool {
        self.attr(name)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
    }

    /// First direct child with tag `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&StorageNode> {
        self.children.iter().find(|c| c.is(name))
    }

    /// Concatenated text of this element and its descendants, tail excluded.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Visit this element and all descendants in document order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a StorageNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
