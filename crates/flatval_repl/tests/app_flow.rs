mod support;

use flatval::{render_transcript, ExpansionState, TranscriptEntry};
use flatval_repl::app::{App, HELP_TEXT};
use flatval_repl::commands::{parse_slash_command, SlashCommand};
use pretty_assertions::assert_eq;

use support::{number_graph, HostSpy};

fn transcript_lines(app: &App) -> Vec<String> {
    let session = app.registry.active_session().expect("active session");
    render_transcript(session, &ExpansionState::new()).plain_lines()
}

#[test]
fn app_starts_with_one_active_tab() {
    let app = App::new();
    assert_eq!(app.registry.len(), 1);
    assert_eq!(app.registry.active_index(), Some(0));
}

#[test]
fn submit_records_input_before_evaluation_starts() {
    let mut app = App::new();
    let mut host = HostSpy::default();
    let session_id = app.registry.active_session().expect("tab").id().clone();

    app.on_input_replace("1 + 1".to_string());
    app.on_submit(&mut host);

    assert_eq!(app.input, "");
    assert_eq!(host.started.len(), 1);
    assert_eq!(host.started[0].session_id, session_id);
    assert_eq!(host.started[0].code, "1 + 1");
    assert_eq!(app.pending_count(&session_id), 1);

    let session = app.registry.active_session().expect("tab");
    let newest = session.transcript().next().expect("user input entry");
    assert_eq!(newest, &TranscriptEntry::UserInput {
        id: host.started[0].entry_id.clone(),
        text: "1 + 1".to_string(),
    });
    assert_eq!(session.history().len(), 1);
}

#[test]
fn completion_appends_result_and_clears_pending() {
    let mut app = App::new();
    let mut host = HostSpy::default();
    let session_id = app.registry.active_session().expect("tab").id().clone();

    app.on_input_replace("1 + 1".to_string());
    app.on_submit(&mut host);
    assert!(app.on_evaluation_complete(&session_id, Ok(number_graph(2))));
    app.on_input_replace("boom()".to_string());
    app.on_submit(&mut host);
    assert!(app.on_evaluation_complete(&session_id, Err("HTTP 500".to_string())));

    assert_eq!(app.pending_count(&session_id), 0);
    assert_eq!(
        transcript_lines(&app),
        vec!["> 1 + 1", "2", "> boom()", "HTTP 500"]
    );
}

#[test]
fn literal_newline_escapes_are_unescaped_before_sending() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    app.on_input_replace("let a = 1;\\na".to_string());
    app.on_submit(&mut host);

    assert_eq!(host.started[0].code, "let a = 1;\na");
    assert_eq!(transcript_lines(&app), vec!["> let a = 1;", "  a"]);
}

#[test]
fn whitespace_only_input_is_ignored() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    app.on_input_replace("   \\n  ".to_string());
    app.on_submit(&mut host);

    assert!(host.started.is_empty());
    assert_eq!(app.registry.active_session().expect("tab").transcript_len(), 0);
    assert_eq!(host.render_requests, 1);
}

#[test]
fn failed_start_becomes_request_error_entry() {
    let mut app = App::new();
    let mut host = HostSpy {
        fail_start: Some("no threads left".to_string()),
        ..HostSpy::default()
    };
    let session_id = app.registry.active_session().expect("tab").id().clone();

    app.on_input_replace("x".to_string());
    app.on_submit(&mut host);

    assert_eq!(app.pending_count(&session_id), 0);
    assert_eq!(
        transcript_lines(&app),
        vec!["> x", "Failed to start evaluation: no threads left"]
    );
}

#[test]
fn slash_commands_are_neither_sent_nor_recorded() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    app.on_input_replace("/help".to_string());
    app.on_submit(&mut host);

    assert!(host.started.is_empty());
    assert_eq!(app.notice.as_deref(), Some(HELP_TEXT));
    let session = app.registry.active_session().expect("tab");
    assert_eq!(session.transcript_len(), 0);
    assert!(session.history().is_empty());
}

#[test]
fn code_starting_with_a_slash_is_evaluated() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    for input in ["/ab+c/.test('abbc')", "// sum\\n1 + 1", "/frobnicate now"] {
        app.on_input_replace(input.to_string());
        app.on_submit(&mut host);
    }

    let sent: Vec<&str> = host.started.iter().map(|started| started.code.as_str()).collect();
    assert_eq!(sent, vec!["/ab+c/.test('abbc')", "// sum\n1 + 1", "/frobnicate now"]);
    assert_eq!(app.notice, None);
    assert_eq!(app.registry.active_session().expect("tab").transcript_len(), 3);
}

#[test]
fn submitting_with_no_open_tab_keeps_the_draft() {
    let mut app = App::new();
    let mut host = HostSpy::default();
    app.on_close_tab(&mut host);

    app.on_input_replace("let kept = 1".to_string());
    app.on_submit(&mut host);

    assert!(host.started.is_empty());
    assert_eq!(app.input, "let kept = 1");
    assert_eq!(
        app.notice.as_deref(),
        Some("No open tab. Use /new or Ctrl+N to open one.")
    );
}

#[test]
fn tab_commands_drive_the_registry() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    for command in ["/new", "/new", "/tab 1"] {
        app.on_input_replace(command.to_string());
        app.on_submit(&mut host);
    }
    assert_eq!(app.registry.len(), 3);
    assert_eq!(app.registry.active_index(), Some(0));

    app.on_input_replace("/tab 9".to_string());
    app.on_submit(&mut host);
    assert_eq!(app.registry.active_index(), Some(0));
    assert_eq!(app.notice.as_deref(), Some("No tab 9; 3 open"));

    app.on_input_replace("/close".to_string());
    app.on_submit(&mut host);
    assert_eq!(app.registry.len(), 2);
    assert_eq!(app.registry.active_index(), Some(0));
}

#[test]
fn reset_keeps_position_with_fresh_identity() {
    let mut app = App::new();
    let mut host = HostSpy::default();
    app.on_input_replace("1".to_string());
    app.on_submit(&mut host);
    let before = app.registry.active_session().expect("tab").id().clone();

    app.on_input_replace("/reset".to_string());
    app.on_submit(&mut host);

    let session = app.registry.active_session().expect("tab");
    assert_ne!(session.id(), &before);
    assert_eq!(session.transcript_len(), 0);
    assert!(session.history().is_empty());
    assert_eq!(app.pending_count(&before), 0);
}

#[test]
fn recall_walks_history_of_active_tab_only() {
    let mut app = App::new();
    let mut host = HostSpy::default();
    for code in ["a", "  b  "] {
        app.on_input_replace(code.to_string());
        app.on_submit(&mut host);
    }

    app.on_input_replace("draft".to_string());
    app.on_input_history_previous();
    assert_eq!(app.input, "b");
    app.on_input_history_previous();
    assert_eq!(app.input, "a");
    app.on_input_history_next();
    app.on_input_history_next();
    assert_eq!(app.input, "draft");

    app.on_open_tab(&mut host);
    app.on_input_history_previous();
    assert_eq!(app.input, "");
}

#[test]
fn control_c_clears_draft_then_quits() {
    let mut app = App::new();
    let mut host = HostSpy::default();

    app.on_input_replace("half typed".to_string());
    app.on_control_c(&mut host);
    assert_eq!(app.input, "");
    assert!(!app.should_exit);

    app.on_control_c(&mut host);
    assert!(app.should_exit);
    assert_eq!(host.stop_requests, 1);
}

#[test]
fn parse_slash_command_handles_tab_argument() {
    assert_eq!(parse_slash_command("1 / 2"), None);
    assert_eq!(parse_slash_command("/tab 2"), Some(SlashCommand::Tab(Some(1))));
    assert_eq!(parse_slash_command("/tab 0"), Some(SlashCommand::Tab(None)));
    assert_eq!(parse_slash_command("/tab x"), Some(SlashCommand::Tab(None)));
    assert_eq!(parse_slash_command(" /quit "), Some(SlashCommand::Quit));
}
