//! Confluence storage format elements.
//!
//! Storage format is XHTML with `ac:` and `ri:` namespaced elements for
//! macros and resources. Void elements are always self-closed.

use std::fmt::Write;

use crate::state::escape_html;

/// Write a fenced code block as the `code` structured macro.
///
/// The body goes into a CDATA section; a literal `]]>` in the code is split
/// across two sections.
pub fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
    if let Some(lang) = lang {
        write!(
            out,
            r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
            escape_html(lang)
        )
        .unwrap();
    }
    let content = content.replace("]]>", "]]]]><![CDATA[>");
    write!(
        out,
        r"<ac:plain-text-body><![CDATA[{content}]]></ac:plain-text-body>"
    )
    .unwrap();
    out.push_str("</ac:structured-macro>");
}

/// Write an image as `ac:image`.
///
/// Absolute URLs become `ri:url`, anything else is treated as a page
/// attachment named after the last path segment.
pub fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    out.push_str("<ac:image");
    if !alt.is_empty() {
        write!(out, r#" ac:alt="{}""#, escape_html(alt)).unwrap();
    }
    if !title.is_empty() {
        write!(out, r#" ac:title="{}""#, escape_html(title)).unwrap();
    }
    out.push('>');

    let is_external = src.starts_with("http://") || src.starts_with("https://");
    if is_external {
        write!(out, r#"<ri:url ri:value="{}" />"#, escape_html(src)).unwrap();
    } else {
        let filename = src.rsplit('/').next().unwrap_or(src);
        write!(out, r#"<ri:attachment ri:filename="{}" />"#, escape_html(filename)).unwrap();
    }
    out.push_str("</ac:image>");
}

/// Wrap a fragment in a `panel` macro with an empty title.
#[must_use]
pub fn panel(body: &str) -> String {
    format!(
        r#"<ac:structured-macro ac:name="panel"><ac:parameter ac:name="title"></ac:parameter><ac:rich-text-body>{body}</ac:rich-text-body></ac:structured-macro>"#
    )
}

pub fn hard_break(out: &mut String) {
    out.push_str("<br />");
}

pub fn horizontal_rule(out: &mut String) {
    out.push_str("<hr />");
}

/// Task list items have no native storage element; keep the marker as text.
pub fn task_list_marker(checked: bool, out: &mut String) {
    out.push_str(if checked { "[x] " } else { "[ ] " });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_code_block_with_language() {
        let mut out = String::new();
        code_block(Some("python"), "print('hello')", &mut out);
        assert_eq!(
            out,
            concat!(
                r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
                r#"<ac:parameter ac:name="language">python</ac:parameter>"#,
                r"<ac:plain-text-body><![CDATA[print('hello')]]></ac:plain-text-body>",
                "</ac:structured-macro>"
            )
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let mut out = String::new();
        code_block(None, "plain <code>", &mut out);
        assert!(!out.contains(r#"ac:name="language""#));
        assert!(out.contains("<![CDATA[plain <code>]]>"));
    }

    #[test]
    fn test_code_block_splits_cdata_terminator() {
        let mut out = String::new();
        code_block(None, "a]]>b", &mut out);
        assert!(out.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
    }

    #[test]
    fn test_external_image() {
        let mut out = String::new();
        image("https://example.com/image.png", "", "", &mut out);
        assert_eq!(
            out,
            r#"<ac:image><ri:url ri:value="https://example.com/image.png" /></ac:image>"#
        );
    }

    #[test]
    fn test_local_image_with_alt() {
        let mut out = String::new();
        image("./images/diagram.png", "Flow", "", &mut out);
        assert_eq!(
            out,
            r#"<ac:image ac:alt="Flow"><ri:attachment ri:filename="diagram.png" /></ac:image>"#
        );
    }

    #[test]
    fn test_panel() {
        assert_eq!(
            panel("<table></table>"),
            r#"<ac:structured-macro ac:name="panel"><ac:parameter ac:name="title"></ac:parameter><ac:rich-text-body><table></table></ac:rich-text-body></ac:structured-macro>"#
        );
    }

    #[test]
    fn test_void_elements() {
        let mut out = String::new();
        hard_break(&mut out);
        horizontal_rule(&mut out);
        assert_eq!(out, "<br /><hr />");
    }

    #[test]
    fn test_task_list_marker() {
        let mut out = String::new();
        task_list_marker(false, &mut out);
        task_list_marker(true, &mut out);
        assert_eq!(out, "[ ] [x] ");
    }
}
