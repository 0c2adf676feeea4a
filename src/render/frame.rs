//! Typed render model.
//!
//! Renderers produce `Span`/`Line`/`Frame` values carrying semantic styles
//! rather than terminal escape codes; the frontend decides how a style looks.

use crate::render::expansion::OccurrenceKey;

/// Semantic style of a span.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Style {
    Plain,
    /// `undefined`, `null` and structural hints such as `Array(n)`.
    Muted,
    Prompt,
    Link,
    Image,
    Error,
    /// Stack traces, shown verbatim.
    Preformatted,
}

/// A contiguous run of text with one style.
///
/// A span may carry the [`OccurrenceKey`] of the collapsible value it
/// toggles; frontends use these anchors as selection targets.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Span {
    text: String,
    style: Style,
    anchor: Option<OccurrenceKey>,
}

impl Span {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            anchor: None,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Style::Plain)
    }

    pub fn muted(text: impl Into<String>) -> Self {
        Self::new(text, Style::Muted)
    }

    pub fn with_anchor(mut self, anchor: OccurrenceKey) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn anchor(&self) -> Option<&OccurrenceKey> {
        self.anchor.as_ref()
    }
}

/// A single rendered line. `indent` counts nesting levels, not columns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    indent: usize,
    spans: Vec<Span>,
}

impl Line {
    pub fn new(indent: usize, spans: Vec<Span>) -> Self {
        Self { indent, spans }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn push(&mut self, span: Span) {
        self.spans.push(span);
    }

    pub(crate) fn extend(&mut self, spans: impl IntoIterator<Item = Span>) {
        self.spans.extend(spans);
    }

    pub(crate) fn into_spans(self) -> Vec<Span> {
        self.spans
    }

    /// Text without styling, indented two columns per level.
    pub fn plain_text(&self) -> String {
        let mut out = "  ".repeat(self.indent);
        for span in &self.spans {
            out.push_str(span.as_str());
        }
        out
    }
}

/// A rendered frame (collection of lines).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Frame {
    lines: Vec<Line>,
}

impl Frame {
    pub fn new(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    pub fn extend(&mut self, lines: impl IntoIterator<Item = Line>) {
        self.lines.extend(lines);
    }

    /// Toggle anchors in display order.
    pub fn anchors(&self) -> impl Iterator<Item = &OccurrenceKey> + '_ {
        self.lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .filter_map(Span::anchor)
    }

    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(Line::plain_text).collect()
    }
}

impl From<Vec<Line>> for Frame {
    fn from(lines: Vec<Line>) -> Self {
        Self::new(lines)
    }
}
