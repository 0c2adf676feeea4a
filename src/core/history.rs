use std::collections::VecDeque;

/// Submitted inputs of one session, newest first, with a recall cursor.
///
/// `cursor == None` means the editor shows the live draft. While browsing,
/// the draft that was on screen when browsing began is kept so that walking
/// back past the newest entry restores it exactly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<String>,
    cursor: Option<usize>,
    pending_draft: String,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns recorded inputs, most recent first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn record(&mut self, text: impl Into<String>) {
        self.entries.push_front(text.into());
        self.reset_cursor();
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
        self.pending_draft.clear();
    }

    /// Steps toward older entries. Clamped at the oldest entry.
    pub fn recall_previous(&mut self, current_draft: &str) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        if self.cursor.is_none() {
            self.pending_draft = current_draft.to_string();
        }

        let last = self.entries.len() - 1;
        let next = match self.cursor {
            Some(index) => (index + 1).min(last),
            None => 0,
        };
        self.cursor = Some(next);
        self.entries[next].trim().to_string()
    }

    /// Steps toward newer entries, ending at the saved draft.
    pub fn recall_next(&mut self) -> String {
        match self.cursor {
            None | Some(0) => {
                self.cursor = None;
                self.pending_draft.clone()
            }
            Some(index) => {
                let next = (index - 1).min(self.entries.len().saturating_sub(1));
                self.cursor = Some(next);
                self.entries
                    .get(next)
                    .map(|entry| entry.trim().to_string())
                    .unwrap_or_default()
            }
        }
    }
}
