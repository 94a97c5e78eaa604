//! Confluence storage format parser.

#![allow(clippy::unused_self)] // Unit struct methods have &self for API consistency

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::entities::convert_html_entities;
use super::tree::StorageNode;
use crate::error::StorageParseError;

/// Confluence XML namespaces.
const NAMESPACES: &[(&str, &str)] = &[
    ("ac", "http://www.atlassian.com/schema/confluence/4/ac/"),
    ("ri", "http://www.atlassian.com/schema/confluence/4/ri/"),
];

/// Tag of the synthetic element wrapping the parsed fragment.
const ROOT_TAG: &str = "root";

/// Parses storage format fragments into [`StorageNode`] trees.
///
/// Stray end tags are skipped rather than rejected. Syntax errors the XML
/// reader cannot recover from (unclosed comments or CDATA sections, broken
/// markup declarations) are returned as errors.
pub struct StorageParser;

impl StorageParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse a body into a tree whose root is a synthetic `root` element.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not well-formed enough for the XML reader.
    pub fn parse(&self, body: &str) -> Result<StorageNode, StorageParseError> {
        let body = convert_html_entities(body);

        let namespace_decls = NAMESPACES
            .iter()
            .map(|(prefix, uri)| format!(r#"xmlns:{prefix}="{uri}""#))
            .collect::<Vec<_>>()
            .join(" ");
        let wrapped = format!("<{ROOT_TAG} {namespace_decls}>{body}</{ROOT_TAG}>");

        let mut reader = Reader::from_str(&wrapped);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;

        let mut root = StorageNode::new(ROOT_TAG);
        let mut buf = Vec::new();
        // Skip to the wrapper's start tag
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(_) => break,
                Event::Eof => return Ok(root),
                _ => {}
            }
            buf.clear();
        }

        self.parse_children(&mut reader, &mut root)?;
        Ok(root)
    }

    fn parse_children<R: BufRead>(
        &self,
        reader: &mut Reader<R>,
        node: &mut StorageNode,
    ) -> Result<(), StorageParseError> {
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let mut child = self.element(reader, &e);
                    self.parse_children(reader, &mut child)?;
                    node.children.push(child);
                }
                Event::Empty(e) => {
                    let child = self.element(reader, &e);
                    node.children.push(child);
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    append_text(node, &text);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?.into_owned();
                    append_text(node, &decode_entity(&entity));
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    append_text(node, &text);
                }
                Event::End(e) => {
                    let end_tag = self.decode_name(reader, e.name().as_ref());
                    if end_tag == node.tag {
                        return Ok(());
                    }
                    // Stray end tag
                }
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
            buf.clear();
        }
    }

    fn element<R: BufRead>(&self, reader: &Reader<R>, e: &BytesStart) -> StorageNode {
        StorageNode {
            tag: self.decode_name(reader, e.name().as_ref()),
            attrs: self.decode_attrs(reader, e),
            ..Default::default()
        }
    }

    fn decode_name<R: BufRead>(&self, reader: &Reader<R>, name: &[u8]) -> String {
        reader.decoder().decode(name).map_or_else(
            |_| String::from_utf8_lossy(name).into_owned(),
            std::borrow::Cow::into_owned,
        )
    }

    fn decode_attrs<R: BufRead>(
        &self,
        reader: &Reader<R>,
        e: &BytesStart,
    ) -> HashMap<String, String> {
        let mut attrs = HashMap::new();
        for attr in e.attributes().flatten() {
            let key = self.decode_name(reader, attr.key.as_ref());
            if key.starts_with("xmlns") {
                continue;
            }
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            attrs.insert(key, value);
        }
        attrs
    }
}

impl Default for StorageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Append text to the node's text or its last child's tail.
fn append_text(node: &mut StorageNode, text: &str) {
    if let Some(last_child) = node.children.last_mut() {
        last_child.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}

/// Decode an XML entity reference to its character value.
fn decode_entity(entity: &str) -> String {
    match entity {
        "lt" => "<".to_owned(),
        "gt" => ">".to_owned(),
        "amp" => "&".to_owned(),
        "apos" => "'".to_owned(),
        "quot" => "\"".to_owned(),
        s if s.starts_with('#') => {
            let code = if s.starts_with("#x") || s.starts_with("#X") {
                u32::from_str_radix(&s[2..], 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{entity};"), |c| c.to_string())
        }
        _ => format!("&{entity};"),
    }
}
