//! HTML entity to Unicode conversion.
//!
//! Storage format bodies may carry HTML named entities that are not defined
//! in XML. They are replaced with the characters they stand for before
//! parsing. The five XML entities are left alone for the XML reader.

use std::sync::LazyLock;

use regex::Regex;

static ENTITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

/// Replace named HTML entities with Unicode characters.
pub(crate) fn convert_html_entities(html: &str) -> String {
    if !html.contains('&') {
        return html.to_owned();
    }
    ENTITY_PATTERN
        .replace_all(html, |caps: &regex::Captures| {
            entity_to_unicode(&caps[1]).map_or_else(|| caps[0].to_owned(), ToOwned::to_owned)
        })
        .into_owned()
}

fn entity_to_unicode(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwj" => "\u{200d}",
        "zwnj" => "\u{200c}",
        "shy" => "\u{00ad}",

        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        "bull" => "\u{2022}",
        "middot" => "\u{00b7}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",

        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "harr" => "\u{2194}",
        "rArr" => "\u{21d2}",

        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "deg" => "\u{00b0}",
        "micro" => "\u{00b5}",
        "frac12" => "\u{00bd}",
        "frac14" => "\u{00bc}",
        "frac34" => "\u{00be}",

        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "sect" => "\u{00a7}",
        "para" => "\u{00b6}",

        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",

        "auml" => "\u{00e4}",
        "ouml" => "\u{00f6}",
        "uuml" => "\u{00fc}",
        "Auml" => "\u{00c4}",
        "Ouml" => "\u{00d6}",
        "Uuml" => "\u{00dc}",
        "szlig" => "\u{00df}",
        "eacute" => "\u{00e9}",
        "egrave" => "\u{00e8}",
        "agrave" => "\u{00e0}",
        "ccedil" => "\u{00e7}",

        _ => return None,
    })
}
