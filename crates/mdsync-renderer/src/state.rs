//! Bookkeeping for constructs that span several parser events.

use pulldown_cmark::Alignment;

/// Fenced or indented code collected until its end tag.
#[derive(Default)]
pub struct CodeBlockState {
    open: Option<OpenCode>,
}

#[derive(Default)]
struct OpenCode {
    lang: Option<String>,
    text: String,
}

impl CodeBlockState {
    pub fn start(&mut self, language: Option<String>) {
        self.open = Some(OpenCode {
            lang: language,
            text: String::new(),
        });
    }

    /// Close the block, yielding its language and collected text.
    pub fn end(&mut self) -> (Option<String>, String) {
        let code = self.open.take().unwrap_or_default();
        (code.lang, code.text)
    }

    pub fn is_active(&self) -> bool {
        self.open.is_some()
    }

    pub fn push_str(&mut self, text: &str) {
        if let Some(code) = &mut self.open {
            code.text.push_str(text);
        }
    }
}

/// Position inside a pipe table.
#[derive(Default)]
pub struct TableState {
    alignments: Vec<Alignment>,
    column: usize,
    header: bool,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        *self = Self {
            alignments,
            ..Self::default()
        };
    }

    pub fn start_head(&mut self) {
        self.header = true;
        self.column = 0;
    }

    pub fn end_head(&mut self) {
        self.header = false;
    }

    pub fn start_row(&mut self) {
        self.column = 0;
    }

    pub fn next_cell(&mut self) {
        self.column += 1;
    }

    pub fn is_in_head(&self) -> bool {
        self.header
    }

    /// `style` attribute for the cell at the current column, or `""`.
    ///
    /// Rows wider than the delimiter get no alignment.
    pub fn current_alignment_style(&self) -> &'static str {
        let alignment = self.alignments.get(self.column).copied();
        match alignment {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// An image whose alt text is still being read.
#[derive(Default)]
pub struct ImageState {
    capture: Option<ImageCapture>,
}

struct ImageCapture {
    src: String,
    title: String,
    alt: String,
}

impl ImageState {
    pub fn start(&mut self, src: String, title: String) {
        self.capture = Some(ImageCapture {
            src,
            title,
            alt: String::new(),
        });
    }

    /// Finish the image as `(src, title, alt)`. `None` if none was started.
    pub fn end(&mut self) -> Option<(String, String, String)> {
        self.capture
            .take()
            .map(|image| (image.src, image.title, image.alt))
    }

    pub fn is_active(&self) -> bool {
        self.capture.is_some()
    }

    /// Alt text is flattened to plain text.
    pub fn push_str(&mut self, text: &str) {
        if let Some(image) = &mut self.capture {
            image.alt.push_str(text);
        }
    }
}

/// Escape text for use in XHTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        let entity = match c {
            '&' => "&amp;",
            '<' => "&lt;",
            '>' => "&gt;",
            '"' => "&quot;",
            '\'' => "&#x27;",
            _ => {
                escaped.push(c);
                continue;
            }
        };
        escaped.push_str(entity);
    }
    escaped
}
