//! Storage format to Markdown conversion.

use crate::error::StorageParseError;
use crate::storage::{StorageNode, StorageParser};

/// Elements rendered inline when they appear at block level.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "ac:emoticon", "ac:image", "ac:link", "b", "big", "br", "cite", "code", "del",
    "em", "i", "img", "ins", "mark", "s", "small", "span", "strike", "strong", "sub", "sup",
    "time", "u",
];

/// Indentation per nesting level of lists.
const LIST_INDENT: &str = "    ";

/// Convert a storage format body to Markdown.
///
/// Anchor macros are dropped, `code` and `noformat` macros become fenced
/// blocks, other macros are replaced by their rich text body.
///
/// # Errors
///
/// Returns an error if the body cannot be parsed.
pub fn storage_to_markdown(body: &str) -> Result<String, StorageParseError> {
    let tree = StorageParser::new().parse(body)?;
    let markdown = tidy(&blocks(&tree));
    if markdown.is_empty() {
        Ok(markdown)
    } else {
        Ok(format!("{markdown}\n"))
    }
}

/// File name an exported page is written to.
#[must_use]
pub fn page_file_name(title: &str) -> String {
    let name = title.replace('/', "-");
    let name = name.trim();
    if name.is_empty() {
        "Untitled.md".to_owned()
    } else {
        format!("{name}.md")
    }
}

fn blocks(node: &StorageNode) -> String {
    let mut out = String::new();
    push_block_text(&mut out, &node.text);
    for child in &node.children {
        out.push_str(&block(child));
        push_block_text(&mut out, &child.tail);
    }
    out
}

fn push_block_text(out: &mut String, text: &str) {
    if text.trim().is_empty() {
        return;
    }
    let text = collapse_whitespace(text);
    if out.is_empty() || out.ends_with('\n') {
        out.push_str(text.trim_start());
    } else {
        out.push_str(&text);
    }
}

fn block(node: &StorageNode) -> String {
    let tag = node.tag.to_ascii_lowercase();
    match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(tag.as_bytes()[1] - b'0');
            format!(
                "\n\n{} {}\n\n",
                "#".repeat(level),
                inline_children(node).trim()
            )
        }
        "p" => format!("\n\n{}\n\n", inline_children(node).trim()),
        "hr" => "\n\n---\n\n".to_owned(),
        "ul" => format!("\n\n{}\n", list(node, false, 0)),
        "ol" => format!("\n\n{}\n", list(node, true, 0)),
        "blockquote" => quote(node),
        "pre" => fence("", &node.text_content()),
        "table" => table(node),
        "ac:structured-macro" => structured_macro(node),
        "ac:parameter" | "ac:plain-text-body" => String::new(),
        _ if INLINE_TAGS.contains(&tag.as_str()) => inline(node),
        _ => blocks(node),
    }
}

fn inline_children(node: &StorageNode) -> String {
    let mut out = collapse_whitespace(&node.text);
    for child in &node.children {
        out.push_str(&inline(child));
        out.push_str(&collapse_whitespace(&child.tail));
    }
    out
}

fn inline(node: &StorageNode) -> String {
    let tag = node.tag.to_ascii_lowercase();
    match tag.as_str() {
        "strong" | "b" => wrap("**", &inline_children(node)),
        "em" | "i" | "cite" => wrap("*", &inline_children(node)),
        "del" | "s" | "strike" => wrap("~~", &inline_children(node)),
        "code" => code_span(&node.text_content()),
        "br" => "\\\n".to_owned(),
        "a" => link(node),
        "ac:link" => page_link(node),
        "ac:image" | "img" => image(node),
        "ac:structured-macro" => {
            if node.attr_is("ac:name", "anchor") {
                String::new()
            } else {
                node.child("ac:rich-text-body")
                    .map(inline_children)
                    .unwrap_or_default()
            }
        }
        "ac:parameter" | "ac:plain-text-body" => String::new(),
        _ => inline_children(node),
    }
}

/// Wrap `text` in `marker`, keeping surrounding spaces outside.
fn wrap(marker: &str, text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return text.to_owned();
    }
    let lead = if text.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if text.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{lead}{marker}{trimmed}{marker}{trail}")
}

fn code_span(code: &str) -> String {
    let ticks = "`".repeat(longest_run(code, '`') + 1);
    if code.starts_with('`') || code.ends_with('`') {
        format!("{ticks} {code} {ticks}")
    } else {
        format!("{ticks}{code}{ticks}")
    }
}

fn link(node: &StorageNode) -> String {
    let text = inline_children(node);
    let text = text.trim();
    match node.attr("href") {
        Some(href) if text.is_empty() => format!("<{href}>"),
        Some(href) => format!("[{text}]({href})"),
        None => text.to_owned(),
    }
}

/// Links to other pages point at their exported file.
fn page_link(node: &StorageNode) -> String {
    let label = node
        .child("ac:plain-text-link-body")
        .or_else(|| node.child("ac:link-body"))
        .map(StorageNode::text_content)
        .unwrap_or_default();
    let label = label.trim();

    let target = node
        .child("ri:page")
        .and_then(|page| page.attr("ri:content-title"))
        .map(|title| format!("<{}>", page_file_name(title)))
        .or_else(|| node.attr("ac:anchor").map(|anchor| format!("#{anchor}")));

    match (target, label.is_empty()) {
        (Some(target), false) => format!("[{label}]({target})"),
        (Some(target), true) => {
            let text = node
                .child("ri:page")
                .and_then(|page| page.attr("ri:content-title"))
                .or_else(|| node.attr("ac:anchor"))
                .unwrap_or_default();
            format!("[{text}]({target})")
        }
        (None, _) => label.to_owned(),
    }
}

fn image(node: &StorageNode) -> String {
    let (alt, src) = if node.is("img") {
        (node.attr("alt"), node.attr("src"))
    } else {
        let src = node
            .child("ri:url")
            .and_then(|url| url.attr("ri:value"))
            .or_else(|| node.child("ri:attachment").and_then(|a| a.attr("ri:filename")));
        (node.attr("ac:alt"), src)
    };
    match src {
        Some(src) => format!("![{}]({src})", alt.unwrap_or_default()),
        None => String::new(),
    }
}

fn structured_macro(node: &StorageNode) -> String {
    if node.attr_is("ac:name", "anchor") {
        return String::new();
    }
    if node.attr_is("ac:name", "code") || node.attr_is("ac:name", "noformat") {
        let language = node
            .children
            .iter()
            .find(|c| c.is("ac:parameter") && c.attr_is("ac:name", "language"))
            .map(|p| p.text_content().trim().to_owned())
            .unwrap_or_default();
        let code = node
            .child("ac:plain-text-body")
            .map(StorageNode::text_content)
            .unwrap_or_default();
        return fence(&language, &code);
    }
    node.child("ac:rich-text-body")
        .map(|body| format!("\n\n{}\n\n", blocks(body)))
        .unwrap_or_default()
}

fn fence(language: &str, code: &str) -> String {
    let fence = "`".repeat(longest_run(code, '`').max(2) + 1);
    let code = code.trim_matches('\n');
    format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
}

fn quote(node: &StorageNode) -> String {
    let inner = tidy(&blocks(node));
    let quoted: Vec<String> = inner
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect();
    format!("\n\n{}\n\n", quoted.join("\n"))
}

fn list(node: &StorageNode, ordered: bool, depth: usize) -> String {
    let indent = LIST_INDENT.repeat(depth);
    let mut number = node
        .attr("start")
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1);
    let mut out = String::new();

    for item in node.children.iter().filter(|c| c.is("li")) {
        let mut text = collapse_whitespace(&item.text);
        let mut nested = String::new();
        for child in &item.children {
            if child.is("ul") || child.is("ol") {
                nested.push_str(&list(child, child.is("ol"), depth + 1));
            } else {
                text.push_str(&inline(child));
            }
            text.push_str(&collapse_whitespace(&child.tail));
        }

        let marker = if ordered {
            format!("{number}. ")
        } else {
            "- ".to_owned()
        };
        out.push_str(&format!("{indent}{marker}{}\n", text.trim()));
        out.push_str(&nested);
        number += 1;
    }
    out
}

fn table(node: &StorageNode) -> String {
    let mut rows = Vec::new();
    collect_rows(node, &mut rows);
    let Some(width) = rows.iter().map(Vec::len).max() else {
        return String::new();
    };
    if width == 0 {
        return String::new();
    }

    let mut out = String::from("\n\n");
    for (i, row) in rows.iter().enumerate() {
        let mut cells = row.clone();
        cells.resize(width, String::new());
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
        if i == 0 {
            out.push_str(&format!("|{}\n", " --- |".repeat(width)));
        }
    }
    out.push('\n');
    out
}

fn collect_rows(node: &StorageNode, rows: &mut Vec<Vec<String>>) {
    for child in &node.children {
        if child.is("tr") {
            let cells = child
                .children
                .iter()
                .filter(|c| c.is("th") || c.is("td"))
                .map(|cell| {
                    inline_children(cell)
                        .replace("\\\n", " ")
                        .replace('|', "\\|")
                        .trim()
                        .to_owned()
                })
                .collect();
            rows.push(cells);
        } else if child.is("thead") || child.is("tbody") || child.is("tfoot") {
            collect_rows(child, rows);
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn longest_run(text: &str, needle: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for c in text.chars() {
        if c == needle {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Trim line ends and collapse blank lines outside fenced code.
fn tidy(markdown: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut fence: Option<String> = None;

    for line in markdown.lines() {
        let trimmed = line.trim_start();
        match &fence {
            Some(open) => {
                if trimmed.trim_end() == open {
                    fence = None;
                }
                lines.push(line);
            }
            None => {
                if trimmed.starts_with("```") {
                    let ticks = trimmed.chars().take_while(|c| *c == '`').count();
                    fence = Some("`".repeat(ticks));
                }
                let line = line.trim_end();
                if line.is_empty() && lines.last().is_none_or(|last| last.is_empty()) {
                    continue;
                }
                lines.push(line);
            }
        }
    }

    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
