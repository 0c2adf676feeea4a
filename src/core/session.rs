//! One REPL conversation: identity, transcript and input history.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::graph::SerializedGraph;
use crate::core::history::History;

/// Identity of a session as seen by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Render identity of a transcript entry. Never used as a content key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    UserInput { id: EntryId, text: String },
    Success { id: EntryId, graph: SerializedGraph },
    RequestError { id: EntryId, message: String },
}

impl TranscriptEntry {
    pub fn user_input(text: impl Into<String>) -> Self {
        Self::UserInput {
            id: EntryId::generate(),
            text: text.into(),
        }
    }

    pub fn success(graph: SerializedGraph) -> Self {
        Self::Success {
            id: EntryId::generate(),
            graph,
        }
    }

    pub fn request_error(message: impl Into<String>) -> Self {
        Self::RequestError {
            id: EntryId::generate(),
            message: message.into(),
        }
    }

    pub fn id(&self) -> &EntryId {
        match self {
            Self::UserInput { id, .. } | Self::Success { id, .. } | Self::RequestError { id, .. } => {
                id
            }
        }
    }
}

/// Transcript entries are stored newest first. Entries are shared between
/// registry snapshots, so cloning a session never deep-copies a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    transcript: VecDeque<Arc<TranscriptEntry>>,
    history: History,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::generate())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            transcript: VecDeque::new(),
            history: History::new(),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Entries newest first.
    pub fn transcript(&self) -> impl DoubleEndedIterator<Item = &TranscriptEntry> + '_ {
        self.transcript.iter().map(|entry| &**entry)
    }

    /// Entries oldest first, the order they are displayed in.
    pub fn chronological(&self) -> impl Iterator<Item = &TranscriptEntry> + '_ {
        self.transcript().rev()
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript.len()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Prepends an entry. User inputs are also recorded into the history so
    /// that it always mirrors the user-input entries of the transcript.
    pub(crate) fn prepend(&mut self, entry: TranscriptEntry) {
        if let TranscriptEntry::UserInput { text, .. } = &entry {
            self.history.record(text.clone());
        }
        self.transcript.push_front(Arc::new(entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(SessionId::generate(), SessionId::generate());
        assert_ne!(EntryId::generate(), EntryId::generate());
    }

    #[test]
    fn prepend_keeps_newest_first_and_mirrors_history() {
        let mut session = Session::new();
        session.prepend(TranscriptEntry::user_input("1 + 1"));
        session.prepend(TranscriptEntry::request_error("offline"));
        session.prepend(TranscriptEntry::user_input("2 + 2"));

        let kinds: Vec<_> = session
            .chronological()
            .map(|entry| match entry {
                TranscriptEntry::UserInput { text, .. } => format!("in:{text}"),
                TranscriptEntry::Success { .. } => "ok".to_string(),
                TranscriptEntry::RequestError { message, .. } => format!("err:{message}"),
            })
            .collect();
        assert_eq!(kinds, vec!["in:1 + 1", "err:offline", "in:2 + 2"]);
        assert_eq!(
            session.history().entries().collect::<Vec<_>>(),
            vec!["2 + 2", "1 + 1"]
        );
    }
}
