use std::collections::HashMap;

use flatval::{EntryId, RegistryError, SerializedGraph, SessionId, SessionRegistry, TranscriptEntry};
use tracing::{debug, info, warn};

use crate::commands::{parse_slash_command, SlashCommand};

/// What an evaluation produced: a graph, or the failure text shown in the
/// transcript.
pub type EvalOutcome = Result<SerializedGraph, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    pub registry: SessionRegistry,
    pub input: String,
    /// One-line message for the status line. Never part of a transcript.
    pub notice: Option<String>,
    pending: HashMap<SessionId, usize>,
    pub should_exit: bool,
}

pub trait HostOps {
    fn start_evaluation(
        &mut self,
        session_id: SessionId,
        entry_id: EntryId,
        code: String,
    ) -> Result<(), String>;
    fn request_render(&mut self);
    fn request_stop(&mut self);
}

pub const HELP_TEXT: &str =
    "Commands: /help, /new, /close, /reset, /tab <n>, /quit. Type \\n for a newline.";
const NO_SESSION_NOTICE: &str = "No open tab. Use /new or Ctrl+N to open one.";
const TAB_USAGE_NOTICE: &str = "Usage: /tab <n> where n is a tab number";

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Starts with exactly one open, active tab.
    pub fn new() -> Self {
        Self::with_registry(SessionRegistry::with_initial_session())
    }

    pub fn with_registry(registry: SessionRegistry) -> Self {
        Self {
            registry,
            input: String::new(),
            notice: None,
            pending: HashMap::new(),
            should_exit: false,
        }
    }

    pub fn on_input_replace(&mut self, text: String) {
        self.input = text;
    }

    /// Number of evaluations still outstanding for a session.
    pub fn pending_count(&self, session_id: &SessionId) -> usize {
        self.pending.get(session_id).copied().unwrap_or(0)
    }

    pub fn on_submit(&mut self, host: &mut dyn HostOps) {
        let code = normalize_newline_escapes(&self.input);

        if code.trim().is_empty() {
            self.input.clear();
            host.request_render();
            return;
        }

        if let Some(command) = parse_slash_command(&code) {
            self.input.clear();
            self.apply_command(command, host);
            return;
        }

        let Some(session_id) = self.registry.active_session().map(|session| session.id().clone())
        else {
            self.notice = Some(NO_SESSION_NOTICE.to_string());
            host.request_render();
            return;
        };

        self.input.clear();
        self.submit(session_id, code, host);
        host.request_render();
    }

    /// Records the user input in the session first, then hands the code to
    /// the host. The result arrives later through
    /// [`App::on_evaluation_complete`].
    fn submit(&mut self, session_id: SessionId, code: String, host: &mut dyn HostOps) {
        let entry = TranscriptEntry::user_input(code.clone());
        let entry_id = entry.id().clone();
        if !self.append(&session_id, entry) {
            return;
        }
        self.notice = None;

        match host.start_evaluation(session_id.clone(), entry_id, code) {
            Ok(()) => {
                *self.pending.entry(session_id).or_default() += 1;
            }
            Err(error) => {
                warn!(%session_id, %error, "evaluation could not be started");
                self.append(
                    &session_id,
                    TranscriptEntry::request_error(format!("Failed to start evaluation: {error}")),
                );
            }
        }
    }

    /// Applies a finished evaluation to the session that submitted it.
    /// Returns false when that session was closed or reset in the meantime;
    /// the result is dropped and no other session is touched.
    pub fn on_evaluation_complete(&mut self, session_id: &SessionId, outcome: EvalOutcome) -> bool {
        if let Some(count) = self.pending.get_mut(session_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.pending.remove(session_id);
            }
        }

        let entry = match outcome {
            Ok(graph) => TranscriptEntry::success(graph),
            Err(message) => TranscriptEntry::request_error(message),
        };
        self.append(session_id, entry)
    }

    pub fn on_input_history_previous(&mut self) {
        let (registry, text) = self.registry.recall_previous(&self.input);
        self.registry = registry;
        self.input = text;
    }

    pub fn on_input_history_next(&mut self) {
        let (registry, text) = self.registry.recall_next();
        self.registry = registry;
        self.input = text;
    }

    pub fn on_open_tab(&mut self, host: &mut dyn HostOps) {
        self.registry = self.registry.open();
        self.notice = None;
        host.request_render();
    }

    pub fn on_close_tab(&mut self, host: &mut dyn HostOps) {
        if let Some(index) = self.registry.active_index() {
            let closed = self.session_id_at(index);
            self.transition(|registry| registry.close(index));
            self.forget_pending(closed);
        } else {
            self.notice = Some(NO_SESSION_NOTICE.to_string());
        }
        host.request_render();
    }

    pub fn on_reset_tab(&mut self, host: &mut dyn HostOps) {
        if let Some(index) = self.registry.active_index() {
            let replaced = self.session_id_at(index);
            self.transition(|registry| registry.reset(index));
            self.forget_pending(replaced);
        } else {
            self.notice = Some(NO_SESSION_NOTICE.to_string());
        }
        host.request_render();
    }

    pub fn on_switch_tab(&mut self, index: usize, host: &mut dyn HostOps) {
        let len = self.registry.len();
        if index >= len {
            self.notice = Some(format!("No tab {}; {len} open", index + 1));
        } else {
            self.transition(|registry| registry.switch_to(index));
        }
        host.request_render();
    }

    /// Moves the active tab by `offset`, wrapping at either end.
    pub fn on_cycle_tab(&mut self, offset: isize, host: &mut dyn HostOps) {
        let len = self.registry.len();
        if let Some(active) = self.registry.active_index() {
            let target = (active as isize + offset).rem_euclid(len as isize) as usize;
            self.transition(|registry| registry.switch_to(target));
        }
        host.request_render();
    }

    pub fn on_control_c(&mut self, host: &mut dyn HostOps) {
        if !self.input.is_empty() {
            self.on_input_replace(String::new());
            host.request_render();
            return;
        }

        self.on_quit(host);
    }

    pub fn on_quit(&mut self, host: &mut dyn HostOps) {
        info!("exit requested");
        self.should_exit = true;
        host.request_stop();
        host.request_render();
    }

    fn apply_command(&mut self, command: SlashCommand, host: &mut dyn HostOps) {
        debug!(?command, "slash command");
        match command {
            SlashCommand::Help => {
                self.notice = Some(HELP_TEXT.to_string());
                host.request_render();
            }
            SlashCommand::New => self.on_open_tab(host),
            SlashCommand::Close => self.on_close_tab(host),
            SlashCommand::Reset => self.on_reset_tab(host),
            SlashCommand::Tab(Some(index)) => self.on_switch_tab(index, host),
            SlashCommand::Tab(None) => {
                self.notice = Some(TAB_USAGE_NOTICE.to_string());
                host.request_render();
            }
            SlashCommand::Quit => self.on_quit(host),
        }
    }

    fn append(&mut self, session_id: &SessionId, entry: TranscriptEntry) -> bool {
        match self.registry.append_entry(session_id, entry) {
            Ok(registry) => {
                self.registry = registry;
                true
            }
            Err(error) => {
                warn!(%error, "transcript entry dropped");
                false
            }
        }
    }

    fn transition(
        &mut self,
        step: impl FnOnce(&SessionRegistry) -> Result<SessionRegistry, RegistryError>,
    ) {
        match step(&self.registry) {
            Ok(registry) => {
                self.registry = registry;
                self.notice = None;
            }
            Err(error) => {
                self.notice = Some(error.to_string());
            }
        }
    }

    fn session_id_at(&self, index: usize) -> Option<SessionId> {
        self.registry.session(index).map(|session| session.id().clone())
    }

    fn forget_pending(&mut self, session_id: Option<SessionId>) {
        if let Some(session_id) = session_id {
            self.pending.remove(&session_id);
        }
    }
}

/// Turns the two-character sequence `\n` into a newline.
pub fn normalize_newline_escapes(text: &str) -> String {
    text.replace("\\n", "\n")
}
