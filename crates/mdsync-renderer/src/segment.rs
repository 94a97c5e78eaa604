//! Splitting of Markdown documents into table and prose regions.
//!
//! Tables are rendered separately from the surrounding text so they can be
//! wrapped in a panel. Detection is line based:
//!
//! - a table starts at a row line (`| a | b |`) immediately followed by a
//!   delimiter line (`|---|:---:|`) with at least two columns and as many
//!   cells as the row, neither indented by four or more columns;
//! - it continues while lines contain `|` and are not blank;
//! - a single blank line right after a table becomes its own text block.
//!
//! Blocks borrow from the input and cover it completely, so joining their
//! contents gives back the original document byte for byte.

use std::sync::LazyLock;

use regex::Regex;

static TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").expect("invalid table row regex"));

static TABLE_DELIMITER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\|?\s*:?-{3,}:?\s*(\|\s*:?-{3,}:?\s*)+\|?\s*$")
        .expect("invalid table delimiter regex")
});

/// Deeper indentation turns the lines into an indented code block.
const MAX_TABLE_INDENT: usize = 3;

/// Kind of a segmented region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Pipe table: header row, delimiter row and body rows.
    Table,
    /// Anything else.
    Text,
}

/// Contiguous region of a Markdown document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Region kind.
    pub kind: BlockKind,
    /// Raw text of the region, line terminators included.
    pub content: &'a str,
}

impl<'a> Block<'a> {
    fn table(content: &'a str) -> Self {
        Self {
            kind: BlockKind::Table,
            content,
        }
    }

    fn text(content: &'a str) -> Self {
        Self {
            kind: BlockKind::Text,
            content,
        }
    }
}

/// A line of input as byte offsets into the source.
struct Line<'a> {
    /// Offset of the first byte.
    start: usize,
    /// Offset one past the line terminator.
    end: usize,
    /// Line text without `\n` or `\r\n`.
    text: &'a str,
}

fn split_lines(raw: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for chunk in raw.split_inclusive('\n') {
        let end = start + chunk.len();
        let text = chunk.strip_suffix('\n').unwrap_or(chunk);
        let text = text.strip_suffix('\r').unwrap_or(text);
        lines.push(Line { start, end, text });
        start = end;
    }
    lines
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Scanner state.
#[derive(Debug, Clone, Copy)]
enum ScanState {
    /// Collecting prose. `start` is the offset of the pending text block.
    ScanningText { start: Option<usize> },
    /// Inside a table that began at `start`.
    InTable { start: usize },
}

/// Line-oriented Markdown segmenter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Segmenter {
    strict_tables: bool,
}

impl Segmenter {
    /// Create a segmenter with the default continuation rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only continue a table on lines that look like full table rows.
    ///
    /// By default any non-blank line containing `|` extends a table, which
    /// also swallows prose lines that merely mention a pipe.
    #[must_use]
    pub fn with_strict_tables(mut self, strict: bool) -> Self {
        self.strict_tables = strict;
        self
    }

    /// Split `raw` into table and text blocks, in document order.
    pub fn segment<'a>(&self, raw: &'a str) -> Vec<Block<'a>> {
        let lines = split_lines(raw);
        let mut blocks = Vec::new();
        let mut state = ScanState::ScanningText { start: None };
        let mut i = 0;

        while let Some(line) = lines.get(i) {
            match state {
                ScanState::ScanningText { start } => {
                    if is_table_start(&lines, i) {
                        if let Some(text_start) = start {
                            blocks.push(Block::text(&raw[text_start..line.start]));
                        }
                        state = ScanState::InTable { start: line.start };
                        // Header and delimiter rows.
                        i += 2;
                    } else {
                        state = ScanState::ScanningText {
                            start: Some(start.unwrap_or(line.start)),
                        };
                        i += 1;
                    }
                }
                ScanState::InTable { start } => {
                    if self.continues_table(line.text) {
                        i += 1;
                        continue;
                    }
                    blocks.push(Block::table(&raw[start..line.start]));
                    if is_blank(line.text) {
                        blocks.push(Block::text(&raw[line.start..line.end]));
                        i += 1;
                    }
                    state = ScanState::ScanningText { start: None };
                }
            }
        }

        match state {
            ScanState::ScanningText { start: Some(start) } => {
                blocks.push(Block::text(&raw[start..]));
            }
            ScanState::InTable { start } => blocks.push(Block::table(&raw[start..])),
            ScanState::ScanningText { start: None } => {}
        }

        blocks
    }

    fn continues_table(&self, text: &str) -> bool {
        if is_blank(text) || !text.contains('|') {
            return false;
        }
        !self.strict_tables || TABLE_ROW.is_match(text)
    }
}

fn is_table_start(lines: &[Line<'_>], i: usize) -> bool {
    match (lines.get(i), lines.get(i + 1)) {
        (Some(header), Some(delimiter)) => {
            TABLE_ROW.is_match(header.text)
                && TABLE_DELIMITER.is_match(delimiter.text)
                && indent_width(header.text) <= MAX_TABLE_INDENT
                && indent_width(delimiter.text) <= MAX_TABLE_INDENT
                && cell_count(header.text) == cell_count(delimiter.text)
        }
        _ => false,
    }
}

/// Cells in a pipe row. Outer pipes are optional, `\|` does not split.
fn cell_count(text: &str) -> usize {
    let row = text.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = match row.strip_suffix('|') {
        Some(inner) if !inner.ends_with('\\') => inner,
        _ => row,
    };

    let mut count = 1;
    let mut escaped = false;
    for c in row.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '|' => count += 1,
            _ => {}
        }
    }
    count
}

/// Leading whitespace in columns, tabs stopping at multiples of four.
fn indent_width(text: &str) -> usize {
    let mut width = 0;
    for c in text.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// Split `raw` with the default segmenter.
pub fn segment(raw: &str) -> Vec<Block<'_>> {
    Segmenter::new().segment(raw)
}
