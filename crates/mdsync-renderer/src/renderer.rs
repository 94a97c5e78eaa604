//! Markdown event renderer producing Confluence storage format.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};

use crate::state::{CodeBlockState, ImageState, TableState, escape_html};
use crate::storage;
use crate::util::heading_level_to_num;

/// Markdown renderer producing Confluence XHTML storage format.
///
/// Handles common elements (paragraphs, lists, tables, inline formatting)
/// directly and delegates Confluence-specific elements (code blocks, images)
/// to the [`storage`] writers.
pub struct MarkdownRenderer {
    output: String,
    /// Code block rendering state.
    code: CodeBlockState,
    /// Table rendering state.
    table: TableState,
    /// Image alt text capture state.
    image: ImageState,
}

impl MarkdownRenderer {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
        }
    }

    /// Render markdown events and return the storage format fragment.
    pub fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => storage::hard_break(&mut self.output),
            Event::Rule => storage::horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => storage::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        // Formatting inside alt text is flattened
        if self.image.is_active() {
            return;
        }
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading {
                level, id, classes, ..
            } => self.heading_start(heading_level_to_num(level), id.as_deref(), &classes),
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) => fence_language(info),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{tag}{align}>").unwrap();
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_html(&dest_url)).unwrap();
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text arrives as text events; the image is written in end_tag
                self.image.start(dest_url.to_string(), title.to_string());
            }
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if self.image.is_active() && tag != TagEnd::Image {
            return;
        }
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => {
                write!(self.output, "</h{}>", heading_level_to_num(level)).unwrap();
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                storage::code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    storage::image(&src, &alt, &title, &mut self.output);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
        }
    }

    fn heading_start(&mut self, level: u8, id: Option<&str>, classes: &[CowStr<'_>]) {
        write!(self.output, "<h{level}").unwrap();
        if let Some(id) = id {
            write!(self.output, r#" id="{}""#, escape_html(id)).unwrap();
        }
        if !classes.is_empty() {
            let joined = classes
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(" ");
            write!(self.output, r#" class="{}""#, escape_html(&joined)).unwrap();
        }
        self.output.push('>');
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image > normal text
        if self.code.is_active() {
            self.code.push_str(text);
            return;
        }

        if self.image.is_active() {
            self.image.push_str(text);
            return;
        }

        self.output.push_str(&escape_html(text));
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        write!(self.output, "<code>{}</code>", escape_html(code)).unwrap();
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.output.push('\n');
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Language of a fenced code block: the first word of the info string.
fn fence_language(info: &str) -> Option<String> {
    info.split_whitespace()
        .next()
        .map(|lang| {
            lang.trim_matches(|c| c == '{' || c == '}')
                .trim_start_matches('.')
        })
        .filter(|lang| !lang.is_empty())
        .map(ToOwned::to_owned)
}
