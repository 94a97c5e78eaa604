//! Parsing of Confluence storage format into an element tree.
//!
//! Page bodies are XHTML fragments with `ac:` and `ri:` prefixed elements.
//! [`StorageParser`] wraps a fragment in a root element declaring those
//! prefixes and builds a [`StorageNode`] tree from it.

mod entities;
mod parser;
mod tree;

pub use parser::StorageParser;
pub use tree::StorageNode;
