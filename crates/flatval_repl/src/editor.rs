//! Single-line input buffer with a grapheme-aligned cursor.
//!
//! Multi-line code is typed with the two-character `\n` escape, which the
//! app unescapes on submit.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    /// Byte offset, always on a grapheme boundary.
    cursor: usize,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replaces the contents and parks the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn insert_str(&mut self, text: &str) {
        self.text.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    pub fn backspace(&mut self) -> bool {
        let Some(previous) = self.text[..self.cursor].graphemes(true).next_back() else {
            return false;
        };
        let start = self.cursor - previous.len();
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    pub fn delete(&mut self) -> bool {
        let Some(next) = self.text[self.cursor..].graphemes(true).next() else {
            return false;
        };
        let end = self.cursor + next.len();
        self.text.replace_range(self.cursor..end, "");
        true
    }

    pub fn move_left(&mut self) {
        if let Some(previous) = self.text[..self.cursor].graphemes(true).next_back() {
            self.cursor -= previous.len();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.text[self.cursor..].graphemes(true).next() {
            self.cursor += next.len();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Display columns between the start of the text and the cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].width()
    }
}
