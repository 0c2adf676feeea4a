//! Open sessions (tabs) and the active one.
//!
//! [`SessionRegistry`] is an immutable snapshot. Every transition takes the
//! current snapshot by reference and returns the next one, leaving the old
//! snapshot untouched. Sessions are shared between snapshots through `Arc`
//! and copied on write, so a transition only clones what it changes.
//!
//! Invariants:
//! - tab order is the order of `sessions` and is only changed by `open`/`close`;
//! - `active` is `None` exactly when there are no sessions.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::history::History;
use crate::core::session::{Session, SessionId, TranscriptEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no open session has id '{session_id}'")]
    UnknownSession { session_id: SessionId },
    #[error("tab index {index} is out of range for {len} open tabs")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Lifecycle events understood by [`SessionRegistry::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Open,
    Close(usize),
    Reset(usize),
    SwitchTo(usize),
    Append {
        session_id: SessionId,
        entry: TranscriptEntry,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionRegistry {
    sessions: Vec<Arc<Session>>,
    active: Option<usize>,
}

impl SessionRegistry {
    /// An empty registry: no tabs, nothing active.
    pub fn new() -> Self {
        Self::default()
    }

    /// The startup state: one fresh, active session.
    pub fn with_initial_session() -> Self {
        Self::new().open()
    }

    pub fn apply(&self, event: RegistryEvent) -> Result<Self, RegistryError> {
        match event {
            RegistryEvent::Open => Ok(self.open()),
            RegistryEvent::Close(index) => self.close(index),
            RegistryEvent::Reset(index) => self.reset(index),
            RegistryEvent::SwitchTo(index) => self.switch_to(index),
            RegistryEvent::Append { session_id, entry } => self.append_entry(&session_id, entry),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> impl ExactSizeIterator<Item = &Session> + '_ {
        self.sessions.iter().map(|session| &**session)
    }

    pub fn session(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index).map(|session| &**session)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active.and_then(|index| self.session(index))
    }

    pub fn position(&self, session_id: &SessionId) -> Option<usize> {
        self.sessions
            .iter()
            .position(|session| session.id() == session_id)
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.position(session_id).is_some()
    }

    #[must_use]
    pub fn open(&self) -> Self {
        let session = Session::new();
        debug!(session_id = %session.id(), "opening session");

        let mut next = self.clone();
        next.sessions.push(Arc::new(session));
        next.active = Some(next.sessions.len() - 1);
        next
    }

    /// Removes a tab. When the active tab is closed the tab now at the same
    /// position becomes active, or the new last tab if it was the last one.
    pub fn close(&self, index: usize) -> Result<Self, RegistryError> {
        self.check_index(index)?;

        let mut next = self.clone();
        let removed = next.sessions.remove(index);
        debug!(session_id = %removed.id(), index, "closing session");

        next.active = match self.active {
            _ if next.sessions.is_empty() => None,
            Some(active) if active == index => Some(index.min(next.sessions.len() - 1)),
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        if let Some(active) = next.active {
            next.reset_history_cursor(active);
        }
        Ok(next)
    }

    /// Replaces a tab with a fresh session at the same position. The active
    /// tab stays active.
    pub fn reset(&self, index: usize) -> Result<Self, RegistryError> {
        self.check_index(index)?;

        let mut next = self.clone();
        let session = Session::new();
        debug!(
            old_session_id = %next.sessions[index].id(),
            new_session_id = %session.id(),
            index,
            "resetting session"
        );
        next.sessions[index] = Arc::new(session);
        Ok(next)
    }

    pub fn switch_to(&self, index: usize) -> Result<Self, RegistryError> {
        self.check_index(index)?;

        let mut next = self.clone();
        if let Some(previous) = next.active.filter(|previous| *previous != index) {
            next.reset_history_cursor(previous);
        }
        next.active = Some(index);
        next.reset_history_cursor(index);
        Ok(next)
    }

    /// Prepends an entry to the transcript of the session holding
    /// `session_id`. Fails with [`RegistryError::UnknownSession`] if that
    /// session was closed or reset in the meantime; callers drop the entry.
    pub fn append_entry(
        &self,
        session_id: &SessionId,
        entry: TranscriptEntry,
    ) -> Result<Self, RegistryError> {
        let Some(index) = self.position(session_id) else {
            warn!(%session_id, "dropping transcript entry for unknown session");
            return Err(RegistryError::UnknownSession {
                session_id: session_id.clone(),
            });
        };

        let mut next = self.clone();
        Arc::make_mut(&mut next.sessions[index]).prepend(entry);
        Ok(next)
    }

    /// Recalls an older input in the active session. Returns the unchanged
    /// snapshot and an empty string when no session is active.
    #[must_use]
    pub fn recall_previous(&self, current_draft: &str) -> (Self, String) {
        self.with_active_history(|history| history.recall_previous(current_draft))
    }

    #[must_use]
    pub fn recall_next(&self) -> (Self, String) {
        self.with_active_history(|history| history.recall_next())
    }

    fn with_active_history(
        &self,
        recall: impl FnOnce(&mut History) -> String,
    ) -> (Self, String) {
        let Some(index) = self.active else {
            return (self.clone(), String::new());
        };

        let mut next = self.clone();
        let text = recall(Arc::make_mut(&mut next.sessions[index]).history_mut());
        (next, text)
    }

    fn reset_history_cursor(&mut self, index: usize) {
        if let Some(session) = self.sessions.get_mut(index) {
            if session.history().cursor().is_some() {
                Arc::make_mut(session).history_mut().reset_cursor();
            }
        }
    }

    fn check_index(&self, index: usize) -> Result<(), RegistryError> {
        if index < self.sessions.len() {
            Ok(())
        } else {
            Err(RegistryError::IndexOutOfRange {
                index,
                len: self.sessions.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_tabs(count: usize) -> SessionRegistry {
        let mut registry = SessionRegistry::new();
        for _ in 0..count {
            registry = registry.open();
        }
        registry
    }

    #[test]
    fn open_appends_and_activates() {
        let registry = registry_with_tabs(2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.active_index(), Some(1));
    }

    #[test]
    fn transitions_leave_previous_snapshot_untouched() {
        let before = registry_with_tabs(1);
        let session_id = before.session(0).expect("tab").id().clone();

        let after = before
            .append_entry(&session_id, TranscriptEntry::user_input("x"))
            .expect("append");

        assert_eq!(before.session(0).expect("tab").transcript_len(), 0);
        assert_eq!(after.session(0).expect("tab").transcript_len(), 1);
    }

    #[test]
    fn closing_active_middle_tab_activates_same_position() {
        let registry = registry_with_tabs(3).switch_to(1).expect("switch");
        let third = registry.session(2).expect("tab").id().clone();

        let registry = registry.close(1).expect("close");
        assert_eq!(registry.active_index(), Some(1));
        assert_eq!(registry.active_session().map(Session::id), Some(&third));
    }

    #[test]
    fn closing_active_last_tab_activates_new_last() {
        let registry = registry_with_tabs(3).close(2).expect("close");
        assert_eq!(registry.active_index(), Some(1));
    }

    #[test]
    fn closing_tab_before_active_keeps_same_session_active() {
        let registry = registry_with_tabs(3);
        let active = registry.active_session().expect("active").id().clone();

        let registry = registry.close(0).expect("close");
        assert_eq!(registry.active_index(), Some(1));
        assert_eq!(registry.active_session().map(Session::id), Some(&active));
    }

    #[test]
    fn closing_only_tab_leaves_nothing_active() {
        let registry = registry_with_tabs(1).close(0).expect("close");
        assert!(registry.is_empty());
        assert_eq!(registry.active_index(), None);
        assert!(registry.active_session().is_none());
    }

    #[test]
    fn reset_keeps_position_and_activity_with_fresh_identity() {
        let registry = registry_with_tabs(2).switch_to(0).expect("switch");
        let old = registry.session(0).expect("tab").id().clone();
        let registry = registry
            .append_entry(&old, TranscriptEntry::user_input("let x = 1"))
            .expect("append");

        let registry = registry.reset(0).expect("reset");
        let fresh = registry.session(0).expect("tab");
        assert_ne!(fresh.id(), &old);
        assert_eq!(fresh.transcript_len(), 0);
        assert!(fresh.history().is_empty());
        assert_eq!(registry.active_index(), Some(0));
        assert!(!registry.contains(&old));
    }

    #[test]
    fn append_to_unknown_session_fails() {
        let registry = registry_with_tabs(1);
        let closed = registry.session(0).expect("tab").id().clone();
        let registry = registry.close(0).expect("close");

        assert_eq!(
            registry.append_entry(&closed, TranscriptEntry::request_error("late")),
            Err(RegistryError::UnknownSession { session_id: closed })
        );
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let registry = registry_with_tabs(1);
        assert_eq!(
            registry.switch_to(3),
            Err(RegistryError::IndexOutOfRange { index: 3, len: 1 })
        );
        assert!(registry.close(1).is_err());
        assert!(registry.reset(1).is_err());
    }

    #[test]
    fn switching_resets_history_browsing() {
        let registry = registry_with_tabs(2).switch_to(0).expect("switch");
        let first = registry.session(0).expect("tab").id().clone();
        let registry = registry
            .append_entry(&first, TranscriptEntry::user_input("a"))
            .expect("append");

        let (registry, recalled) = registry.recall_previous("draft");
        assert_eq!(recalled, "a");

        let registry = registry.switch_to(1).expect("switch");
        assert_eq!(registry.session(0).expect("tab").history().cursor(), None);
        let registry = registry.switch_to(0).expect("switch");
        let (_, recalled) = registry.recall_next();
        assert_eq!(recalled, "");
    }

    #[test]
    fn apply_dispatches_events() {
        let registry = SessionRegistry::new()
            .apply(RegistryEvent::Open)
            .and_then(|registry| registry.apply(RegistryEvent::Open))
            .and_then(|registry| registry.apply(RegistryEvent::SwitchTo(0)))
            .expect("events should apply");
        assert_eq!(registry.active_index(), Some(0));
    }
}
