use crate::core::session::{Session, TranscriptEntry};
use crate::render::expansion::ExpansionState;
use crate::render::frame::{Frame, Line, Span, Style};
use crate::render::graph::GraphRenderer;

pub const PROMPT: &str = "> ";

/// Renders a whole session transcript, oldest entry first.
pub fn render_transcript(session: &Session, expansion: &ExpansionState) -> Frame {
    let mut frame = Frame::default();
    for entry in session.chronological() {
        frame.extend(render_entry(entry, expansion));
    }
    frame
}

pub fn render_entry(entry: &TranscriptEntry, expansion: &ExpansionState) -> Vec<Line> {
    match entry {
        TranscriptEntry::UserInput { text, .. } => text
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                let prompt = if index == 0 { PROMPT } else { "  " };
                Line::new(
                    0,
                    vec![Span::new(prompt, Style::Prompt), Span::plain(line)],
                )
            })
            .collect(),
        TranscriptEntry::Success { id, graph } => GraphRenderer::new(graph, id, expansion).render(),
        TranscriptEntry::RequestError { message, .. } => message
            .lines()
            .map(|line| Line::new(0, vec![Span::new(line, Style::Error)]))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_input_keeps_prompt_on_first_line_only() {
        let entry = TranscriptEntry::user_input("let a = 1;\na");
        let lines: Vec<String> = render_entry(&entry, &ExpansionState::new())
            .iter()
            .map(Line::plain_text)
            .collect();
        assert_eq!(lines, vec!["> let a = 1;", "  a"]);
    }

    #[test]
    fn request_error_renders_message_with_error_style() {
        let entry = TranscriptEntry::request_error("HTTP 500");
        let lines = render_entry(&entry, &ExpansionState::new());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans()[0].style(), Style::Error);
        assert_eq!(lines[0].plain_text(), "HTTP 500");
    }
}
