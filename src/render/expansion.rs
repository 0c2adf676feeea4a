//! Per-occurrence expand/collapse state.
//!
//! A value is identified by where it appears in the rendered tree, not by its
//! node id: the same node reached twice (shared reference or cycle) has two
//! independent toggles. Every occurrence starts collapsed.
//!
//! Expansion is only ever user driven, and each expanded occurrence extends
//! its path by one step, so rendering a finite [`ExpansionState`] always
//! terminates. A user can still expand around a cycle as deep as they like;
//! nothing bounds that.

use std::collections::HashSet;

use crate::core::session::EntryId;

/// One child selector from a container to a nested value.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum PathStep {
    /// Key node of the n-th object pair.
    Key(usize),
    /// Value node of the n-th object pair.
    Value(usize),
    /// n-th array element.
    Element(usize),
}

/// Sequence of selectors from an entry's root value to one occurrence.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct RenderPath(Vec<PathStep>);

impl RenderPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn child(&self, step: PathStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    #[must_use]
    pub fn key(&self, index: usize) -> Self {
        self.child(PathStep::Key(index))
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Self {
        self.child(PathStep::Value(index))
    }

    #[must_use]
    pub fn element(&self, index: usize) -> Self {
        self.child(PathStep::Element(index))
    }
}

impl FromIterator<PathStep> for RenderPath {
    fn from_iter<T: IntoIterator<Item = PathStep>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct OccurrenceKey {
    pub entry: EntryId,
    pub path: RenderPath,
}

impl OccurrenceKey {
    pub fn new(entry: EntryId, path: RenderPath) -> Self {
        Self { entry, path }
    }
}

/// Set of expanded occurrences. Absent means collapsed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExpansionState {
    expanded: HashSet<OccurrenceKey>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, key: &OccurrenceKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn expand(&mut self, key: OccurrenceKey) {
        self.expanded.insert(key);
    }

    pub fn collapse(&mut self, key: &OccurrenceKey) {
        self.expanded.remove(key);
    }

    /// Flips one occurrence and returns whether it is now expanded.
    pub fn toggle(&mut self, key: &OccurrenceKey) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.clone());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_a_single_occurrence() {
        let entry = EntryId::from("entry");
        let root = OccurrenceKey::new(entry.clone(), RenderPath::root());
        let nested = OccurrenceKey::new(entry, RenderPath::root().value(0));
        let mut state = ExpansionState::new();

        assert!(state.toggle(&root));
        assert!(state.is_expanded(&root));
        assert!(!state.is_expanded(&nested));
        assert!(!state.toggle(&root));
        assert!(state.is_empty());
    }

    #[test]
    fn paths_to_same_node_through_different_steps_are_distinct() {
        let a = RenderPath::root().value(0).value(0);
        let b = RenderPath::root().value(0);
        assert_ne!(a, b);
        assert_eq!(a.depth(), 2);
        assert_eq!(a.steps(), &[PathStep::Value(0), PathStep::Value(0)]);
    }
}
