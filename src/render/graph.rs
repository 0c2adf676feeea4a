//! Lazily expandable tree view of a [`SerializedGraph`].
//!
//! Only expanded occurrences are descended into, so the renderer never walks
//! the whole graph and never loops on cycles by itself. References that do
//! not resolve are skipped along with the pair or element holding them.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::core::graph::{ErrorValue, NodeId, ObjectEntry, SerializedGraph, SerializedNode};
use crate::core::session::EntryId;
use crate::render::expansion::{ExpansionState, OccurrenceKey, RenderPath};
use crate::render::frame::{Line, Span, Style};

pub const COLLAPSED_MARKER: &str = "▶ ";
pub const EXPANDED_MARKER: &str = "▼ ";

fn image_path_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| Regex::new(r"(?i)\.(png|jpe?g)$").expect("image path regex must compile"))
}

/// How a string primitive is presented.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StringKind {
    Plain,
    Link,
    Image,
}

/// Absolute URLs become links; URLs whose path names a png/jpg/jpeg file
/// become inline images.
pub fn classify_string(value: &str) -> StringKind {
    match Url::parse(value) {
        Ok(url) if image_path_regex().is_match(url.path()) => StringKind::Image,
        Ok(_) => StringKind::Link,
        Err(_) => StringKind::Plain,
    }
}

pub struct GraphRenderer<'a> {
    graph: &'a SerializedGraph,
    entry: &'a EntryId,
    expansion: &'a ExpansionState,
}

impl<'a> GraphRenderer<'a> {
    pub fn new(
        graph: &'a SerializedGraph,
        entry: &'a EntryId,
        expansion: &'a ExpansionState,
    ) -> Self {
        Self {
            graph,
            entry,
            expansion,
        }
    }

    /// Renders the root value. A dangling root renders no lines.
    pub fn render(&self) -> Vec<Line> {
        self.render_node(&self.graph.root_id, RenderPath::root(), 0)
            .unwrap_or_default()
    }

    /// Renders one occurrence at `depth`. The first line is the value's head
    /// and may be joined onto a parent line; any following lines are already
    /// indented. Returns `None` when `node_id` does not resolve.
    fn render_node(&self, node_id: &NodeId, path: RenderPath, depth: usize) -> Option<Vec<Line>> {
        let node = match self.graph.resolve(node_id) {
            Ok(node) => node,
            Err(error) => {
                debug!(entry = %self.entry, %error, "skipping unresolved node");
                return None;
            }
        };

        let lines = match node {
            SerializedNode::String(value) => vec![Line::new(depth, vec![string_span(value)])],
            SerializedNode::Number(value) => {
                vec![Line::new(depth, vec![Span::plain(value.to_string())])]
            }
            SerializedNode::Boolean(value) => {
                vec![Line::new(depth, vec![Span::plain(value.to_string())])]
            }
            SerializedNode::Undefined => vec![Line::new(depth, vec![Span::muted("undefined")])],
            SerializedNode::Null => vec![Line::new(depth, vec![Span::muted("null")])],
            SerializedNode::Error(error) => self.render_error(error, path, depth),
            SerializedNode::Object(entries) => self.render_object(entries, path, depth),
            SerializedNode::Array(items) => self.render_array(items, path, depth),
        };
        Some(lines)
    }

    fn render_object(&self, entries: &[ObjectEntry], path: RenderPath, depth: usize) -> Vec<Line> {
        let key = self.occurrence(path);
        if !self.expansion.is_expanded(&key) {
            return vec![Line::new(
                depth,
                vec![
                    marker(false, key),
                    Span::plain("{ "),
                    Span::muted("…"),
                    Span::plain(" }"),
                ],
            )];
        }

        let pairs: Vec<Vec<Line>> = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let key_lines = self.render_node(&entry.key, key.path.key(index), depth + 1)?;
                let value_lines =
                    self.render_node(&entry.value, key.path.value(index), depth + 1)?;
                Some(join_pair(key_lines, value_lines))
            })
            .collect();

        let head = Line::new(depth, vec![marker(true, key), Span::plain("{")]);
        wrap_children(head, pairs, Line::new(depth, vec![Span::plain("}")]))
    }

    fn render_array(&self, items: &[NodeId], path: RenderPath, depth: usize) -> Vec<Line> {
        let key = self.occurrence(path);
        if !self.expansion.is_expanded(&key) {
            return vec![Line::new(
                depth,
                vec![
                    marker(false, key),
                    Span::plain("[ "),
                    Span::muted(format!("Array({})", items.len())),
                    Span::plain(" ]"),
                ],
            )];
        }

        let elements: Vec<Vec<Line>> = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                self.render_node(item, key.path.element(index), depth + 1)
            })
            .collect();

        let head = Line::new(depth, vec![marker(true, key), Span::plain("[")]);
        wrap_children(head, elements, Line::new(depth, vec![Span::plain("]")]))
    }

    fn render_error(&self, error: &ErrorValue, path: RenderPath, depth: usize) -> Vec<Line> {
        let key = self.occurrence(path);
        let expanded = self.expansion.is_expanded(&key);
        let summary = Span::new(format!("{}: {}", error.name, error.message), Style::Error);
        let mut lines = vec![Line::new(depth, vec![marker(expanded, key), summary])];

        if expanded {
            lines.extend(
                error
                    .stack_trace
                    .lines()
                    .map(|line| Line::new(depth + 1, vec![Span::new(line, Style::Preformatted)])),
            );
        }
        lines
    }

    fn occurrence(&self, path: RenderPath) -> OccurrenceKey {
        OccurrenceKey::new(self.entry.clone(), path)
    }
}

fn string_span(value: &str) -> Span {
    let style = match classify_string(value) {
        StringKind::Plain => Style::Plain,
        StringKind::Link => Style::Link,
        StringKind::Image => Style::Image,
    };
    Span::new(value, style)
}

fn marker(expanded: bool, key: OccurrenceKey) -> Span {
    let glyph = if expanded {
        EXPANDED_MARKER
    } else {
        COLLAPSED_MARKER
    };
    Span::plain(glyph).with_anchor(key)
}

/// `key: value`, where the value's head continues the key's last line.
fn join_pair(mut key_lines: Vec<Line>, value_lines: Vec<Line>) -> Vec<Line> {
    let mut value_lines = value_lines.into_iter();
    if let Some(last) = key_lines.last_mut() {
        last.push(Span::plain(": "));
        if let Some(head) = value_lines.next() {
            last.extend(head.into_spans());
        }
    }
    key_lines.extend(value_lines);
    key_lines
}

/// Children separated by commas, none after the last one.
fn wrap_children(head: Line, children: Vec<Vec<Line>>, close: Line) -> Vec<Line> {
    let count = children.len();
    let mut lines = vec![head];
    for (index, mut child) in children.into_iter().enumerate() {
        if index + 1 < count {
            if let Some(last) = child.last_mut() {
                last.push(Span::plain(","));
            }
        }
        lines.extend(child);
    }
    lines.push(close);
    lines
}
