use flatval::{
    render_transcript, ExpansionState, RegistryError, SessionRegistry, TranscriptEntry,
};
use pretty_assertions::assert_eq;

fn submit(registry: &SessionRegistry, index: usize, text: &str) -> SessionRegistry {
    let session_id = registry.session(index).expect("tab").id().clone();
    registry
        .append_entry(&session_id, TranscriptEntry::user_input(text))
        .and_then(|registry| {
            registry.append_entry(&session_id, TranscriptEntry::request_error(format!("result of {text}")))
        })
        .expect("session should accept entries")
}

#[test]
fn transcript_reads_back_in_submission_order() {
    let mut registry = SessionRegistry::with_initial_session();
    for text in ["a", "b", "c"] {
        registry = submit(&registry, 0, text);
    }

    let session = registry.active_session().expect("active session");
    let lines = render_transcript(session, &ExpansionState::new()).plain_lines();
    assert_eq!(
        lines,
        vec!["> a", "result of a", "> b", "result of b", "> c", "result of c"]
    );
}

#[test]
fn submissions_never_leak_across_sessions() {
    let registry = SessionRegistry::with_initial_session().open();
    let registry = submit(&registry, 0, "only in first");

    assert_eq!(registry.session(0).expect("tab").transcript_len(), 2);
    assert_eq!(registry.session(1).expect("tab").transcript_len(), 0);
    assert!(registry.session(1).expect("tab").history().is_empty());
}

#[test]
fn history_round_trip_through_registry() {
    let mut registry = SessionRegistry::with_initial_session();
    for text in ["a", "b", "c"] {
        registry = submit(&registry, 0, text);
    }

    let mut recalled = Vec::new();
    for _ in 0..4 {
        let (next, text) = registry.recall_previous("live draft");
        registry = next;
        recalled.push(text);
    }
    assert_eq!(recalled, vec!["c", "b", "a", "a"]);

    let mut walked_back = Vec::new();
    for _ in 0..3 {
        let (next, text) = registry.recall_next();
        registry = next;
        walked_back.push(text);
    }
    assert_eq!(walked_back, vec!["b", "c", "live draft"]);
}

#[test]
fn closing_active_tab_always_leaves_exactly_one_active() {
    for count in 2..5 {
        for active in 0..count {
            let mut registry = SessionRegistry::new();
            for _ in 0..count {
                registry = registry.open();
            }
            let registry = registry
                .switch_to(active)
                .and_then(|registry| registry.close(active))
                .expect("close should succeed");

            assert_eq!(registry.len(), count - 1);
            let index = registry.active_index().expect("a tab stays active");
            assert!(index < registry.len());
        }
    }
}

#[test]
fn closing_only_tab_shows_no_transcript() {
    let registry = SessionRegistry::with_initial_session();
    let registry = submit(&registry, 0, "x").close(0).expect("close");

    assert_eq!(registry.active_index(), None);
    assert!(registry.active_session().is_none());
    let (_, recalled) = registry.recall_previous("draft");
    assert_eq!(recalled, "");
}

#[test]
fn late_result_for_reset_session_is_rejected() {
    let registry = SessionRegistry::with_initial_session();
    let stale = registry.session(0).expect("tab").id().clone();
    let registry = registry.reset(0).expect("reset");

    let result = registry.append_entry(&stale, TranscriptEntry::request_error("late"));
    assert_eq!(result, Err(RegistryError::UnknownSession { session_id: stale }));
    assert_eq!(registry.session(0).expect("tab").transcript_len(), 0);
}
