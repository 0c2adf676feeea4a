use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use flatval::{
    render_transcript, ExpansionState, Frame, Line, OccurrenceKey, Session, SessionId, Span, Style,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::app::{App, HostOps};
use crate::editor::InputBuffer;
use crate::runtime::{lock_unpoisoned, RuntimeController};

const TAB_ID_WIDTH: usize = 8;
const EDITOR_PROMPT: &str = "> ";
const PENDING_MARKER: &str = "…";
const IMAGE_LABEL: &str = "[image] ";
const STATUS_HINT: &str =
    "Enter run · Tab select · Ctrl+O expand · Ctrl+N new · Ctrl+W close · Ctrl+R reset · /help";
const EMPTY_NOTICE: &str = "No open tab. Press Ctrl+N to open one.";
/// Tab bar, two separators, status line and editor.
const CHROME_ROWS: usize = 5;

fn ansi_wrap(text: &str, prefix: &str, suffix: &str) -> String {
    format!("{prefix}{text}{suffix}")
}

fn dim(text: &str) -> String {
    ansi_wrap(text, "\x1b[2m", "\x1b[22m")
}

fn bold(text: &str) -> String {
    ansi_wrap(text, "\x1b[1m", "\x1b[22m")
}

fn yellow(text: &str) -> String {
    ansi_wrap(text, "\x1b[33m", "\x1b[39m")
}

fn reverse(text: &str) -> String {
    ansi_wrap(text, "\x1b[7m", "\x1b[27m")
}

fn style_codes(style: Style) -> (&'static str, &'static str) {
    match style {
        Style::Plain => ("", ""),
        Style::Muted | Style::Prompt => ("\x1b[2m", "\x1b[22m"),
        Style::Link => ("\x1b[4m\x1b[34m", "\x1b[39m\x1b[24m"),
        Style::Image => ("\x1b[35m", "\x1b[39m"),
        Style::Error => ("\x1b[31m", "\x1b[39m"),
        Style::Preformatted => ("\x1b[31m\x1b[2m", "\x1b[22m\x1b[39m"),
    }
}

/// Frontend-only state: per-session expansion side-tables, the selected
/// toggle and the editor buffer.
#[derive(Debug, Default)]
pub struct ViewState {
    expansions: HashMap<SessionId, ExpansionState>,
    selected: Option<OccurrenceKey>,
    pub editor: InputBuffer,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expansion(&self, session_id: &SessionId) -> Option<&ExpansionState> {
        self.expansions.get(session_id)
    }

    pub fn selected(&self) -> Option<&OccurrenceKey> {
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drops side-tables of sessions that were closed or reset.
    pub fn retain_sessions(&mut self, live: impl Fn(&SessionId) -> bool) {
        self.expansions.retain(|session_id, _| live(session_id));
    }

    /// Moves the selection through `anchors`, wrapping at either end. With
    /// nothing selected, the newest toggle is picked first.
    pub fn move_selection(&mut self, anchors: &[OccurrenceKey], forward: bool) {
        let len = anchors.len();
        if len == 0 {
            self.selected = None;
            return;
        }

        let current = self
            .selected
            .as_ref()
            .and_then(|selected| anchors.iter().position(|anchor| anchor == selected));
        let next = match (current, forward) {
            (None, _) => len - 1,
            (Some(index), true) => (index + 1) % len,
            (Some(index), false) => (index + len - 1) % len,
        };
        self.selected = Some(anchors[next].clone());
    }

    /// Flips the selected occurrence in the session's side-table. Returns the
    /// new expanded state, or `None` when nothing is selected.
    pub fn toggle_selected(&mut self, session_id: &SessionId) -> Option<bool> {
        let selected = self.selected.as_ref()?;
        Some(
            self.expansions
                .entry(session_id.clone())
                .or_default()
                .toggle(selected),
        )
    }
}

/// Renders the active session's transcript with its side-table.
pub fn active_frame(app: &App, view: &ViewState) -> Option<(SessionId, Frame)> {
    let session = app.registry.active_session()?;
    let empty = ExpansionState::new();
    let expansion = view.expansion(session.id()).unwrap_or(&empty);
    Some((session.id().clone(), render_transcript(session, expansion)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub lines: Vec<String>,
    /// `(column, row)` of the editor cursor.
    pub cursor: (u16, u16),
}

pub fn render_screen(app: &App, view: &ViewState, width: usize, height: usize) -> Screen {
    let width = width.max(1);
    let transcript_rows = height.saturating_sub(CHROME_ROWS);
    let mut lines = Vec::with_capacity(height);

    lines.push(render_tab_bar(app, width));
    lines.push(separator_line(width));

    let body = match active_frame(app, view) {
        Some((_, frame)) => transcript_window(&frame, view.selected(), width, transcript_rows),
        None => vec![dim(EMPTY_NOTICE)],
    };
    lines.extend(body.into_iter().take(transcript_rows));
    while lines.len() < transcript_rows + 2 {
        lines.push(String::new());
    }

    lines.push(separator_line(width));
    lines.push(render_status_line(app, width));

    let (editor_line, cursor_column) = render_editor_line(&view.editor, width);
    let cursor_row = lines.len();
    lines.push(editor_line);

    Screen {
        lines,
        cursor: (
            u16::try_from(cursor_column).unwrap_or(u16::MAX),
            u16::try_from(cursor_row).unwrap_or(u16::MAX),
        ),
    }
}

fn render_tab_bar(app: &App, width: usize) -> String {
    if app.registry.is_empty() {
        return dim("no open tabs");
    }

    let active = app.registry.active_index();
    let mut out = String::new();
    let mut used = 0usize;
    for (index, session) in app.registry.sessions().enumerate() {
        let label = tab_label(index, session, app.pending_count(session.id()) > 0);
        let label_width = label.width();
        if used + label_width > width {
            break;
        }
        used += label_width;
        if Some(index) == active {
            out.push_str(&reverse(&bold(&label)));
        } else {
            out.push_str(&dim(&label));
        }
    }
    out
}

/// ` 2:3f2a9c1d… ` style label: 1-based position, truncated id, pending marker.
pub fn tab_label(index: usize, session: &Session, pending: bool) -> String {
    let short_id: String = session.id().as_str().chars().take(TAB_ID_WIDTH).collect();
    let marker = if pending { PENDING_MARKER } else { "" };
    format!(" {}:{short_id}{marker} ", index + 1)
}

fn render_status_line(app: &App, width: usize) -> String {
    if let Some(notice) = app.notice.as_deref() {
        return yellow(&clip_to_width(notice, width));
    }

    let pending = app
        .registry
        .active_session()
        .map(|session| app.pending_count(session.id()))
        .unwrap_or(0);
    let status = match pending {
        0 => STATUS_HINT.to_string(),
        1 => "evaluating…".to_string(),
        count => format!("evaluating {count} submissions…"),
    };
    dim(&clip_to_width(&status, width))
}

fn clip_to_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        used += grapheme.width();
        if used > width {
            break;
        }
        out.push_str(grapheme);
    }
    out
}

/// Draws the prompt and the slice of the draft that fits, scrolling
/// horizontally so the cursor stays on screen.
fn render_editor_line(editor: &InputBuffer, width: usize) -> (String, usize) {
    let prompt_width = EDITOR_PROMPT.width();
    let Some(available) = width.checked_sub(prompt_width).filter(|columns| *columns > 0) else {
        return (String::new(), 0);
    };

    let cursor = editor.cursor_column();
    let mut skipped = 0;
    let mut visible = String::new();
    let mut used = 0;
    for grapheme in editor.text().graphemes(true) {
        let grapheme_width = grapheme.width();
        if cursor - skipped >= available {
            skipped += grapheme_width;
            continue;
        }
        if used + grapheme_width > available {
            break;
        }
        visible.push_str(grapheme);
        used += grapheme_width;
    }

    let column = (prompt_width + cursor - skipped).min(width - 1);
    (format!("{}{visible}", dim(EDITOR_PROMPT)), column)
}

fn separator_line(width: usize) -> String {
    dim(&"─".repeat(width))
}

/// Wraps every frame line to `width` and keeps the newest rows that fit,
/// scrolling up when the selected toggle would fall off the top.
fn transcript_window(
    frame: &Frame,
    selected: Option<&OccurrenceKey>,
    width: usize,
    rows: usize,
) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut selected_row = None;
    for line in frame.lines() {
        if selected_row.is_none() && selected.is_some_and(|key| line_has_anchor(line, key)) {
            selected_row = Some(wrapped.len());
        }
        wrapped.extend(wrap_line(line, selected, width));
    }

    let mut start = wrapped.len().saturating_sub(rows);
    if let Some(row) = selected_row.filter(|row| *row < start) {
        start = row;
    }
    wrapped.into_iter().skip(start).take(rows).collect()
}

fn line_has_anchor(line: &Line, key: &OccurrenceKey) -> bool {
    line.spans().iter().any(|span| span.anchor() == Some(key))
}

/// Renders one line into terminal rows no wider than `width`. Continuation
/// rows keep the line's indentation.
pub fn wrap_line(line: &Line, selected: Option<&OccurrenceKey>, width: usize) -> Vec<String> {
    let indent = "  ".repeat(line.indent());
    let indent = if indent.width() >= width { String::new() } else { indent };

    let mut rows = Vec::new();
    let mut row = indent.clone();
    let mut column = indent.width();

    for span in line.spans() {
        let is_selected = selected.is_some() && span.anchor() == selected;
        let (prefix, suffix) = style_codes(span.style());
        let (open, close) = if is_selected {
            (format!("\x1b[7m{prefix}"), format!("{suffix}\x1b[27m"))
        } else {
            (prefix.to_string(), suffix.to_string())
        };

        row.push_str(&open);
        for grapheme in span_text(span).graphemes(true) {
            let grapheme_width = grapheme.width();
            if column + grapheme_width > width && column > indent.width() {
                row.push_str(&close);
                rows.push(std::mem::replace(&mut row, indent.clone()));
                row.push_str(&open);
                column = indent.width();
            }
            row.push_str(grapheme);
            column += grapheme_width;
        }
        row.push_str(&close);
    }

    rows.push(row);
    rows
}

fn span_text(span: &Span) -> String {
    match span.style() {
        Style::Image => format!("{IMAGE_LABEL}{}", span.as_str()),
        _ => span.as_str().to_string(),
    }
}

/// Keyboard front of the app. Owns the view state and forwards state
/// transitions to `App` under its lock.
pub struct AppComponent {
    app: Arc<Mutex<App>>,
    host: Arc<RuntimeController>,
    view: ViewState,
}

impl AppComponent {
    pub fn new(app: Arc<Mutex<App>>, host: Arc<RuntimeController>) -> Self {
        Self {
            app,
            host,
            view: ViewState::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    fn with_app_mut<T>(&self, f: impl FnOnce(&mut App, &mut dyn HostOps) -> T) -> T {
        let mut app = lock_unpoisoned(&self.app);
        let mut host = Arc::clone(&self.host);
        f(&mut app, &mut host)
    }

    pub fn render(&mut self, width: usize, height: usize) -> Screen {
        let app = lock_unpoisoned(&self.app);
        self.view
            .retain_sessions(|session_id| app.registry.contains(session_id));
        render_screen(&app, &self.view, width, height)
    }

    /// Inserts pasted text. Real newlines become the `\n` escape so the
    /// single-line buffer keeps them until submit.
    pub fn handle_paste(&mut self, text: &str) {
        let escaped = text.replace("\r\n", "\n").replace('\n', "\\n");
        self.view.editor.insert_str(&escaped);
        self.sync_input_from_editor();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Enter => self.submit(),
            KeyCode::Up => {
                let text = self.with_app_mut(|app, host| {
                    app.on_input_history_previous();
                    host.request_render();
                    app.input.clone()
                });
                self.view.editor.set_text(text);
            }
            KeyCode::Down => {
                let text = self.with_app_mut(|app, host| {
                    app.on_input_history_next();
                    host.request_render();
                    app.input.clone()
                });
                self.view.editor.set_text(text);
            }
            KeyCode::Left if control => self.change_tab(|app, host| app.on_cycle_tab(-1, host)),
            KeyCode::Right if control => self.change_tab(|app, host| app.on_cycle_tab(1, host)),
            KeyCode::Tab => self.move_selection(true),
            KeyCode::BackTab => self.move_selection(false),
            KeyCode::Char(ch) if control => match ch.to_ascii_lowercase() {
                'n' => self.change_tab(|app, host| app.on_open_tab(host)),
                'w' => self.change_tab(|app, host| app.on_close_tab(host)),
                'r' => self.change_tab(|app, host| app.on_reset_tab(host)),
                'o' => self.toggle_selected(),
                'c' => {
                    let text = self.with_app_mut(|app, host| {
                        app.on_control_c(host);
                        app.input.clone()
                    });
                    self.view.editor.set_text(text);
                }
                'd' => self.with_app_mut(|app, host| app.on_quit(host)),
                _ => {}
            },
            KeyCode::Char(ch) if alt => {
                if let Some(digit) = ch.to_digit(10).filter(|digit| *digit > 0) {
                    let index = digit as usize - 1;
                    self.change_tab(move |app, host| app.on_switch_tab(index, host));
                }
            }
            _ => {
                if self.edit(key.code) {
                    self.sync_input_from_editor();
                }
            }
        }
    }

    fn edit(&mut self, code: KeyCode) -> bool {
        let editor = &mut self.view.editor;
        match code {
            KeyCode::Char(ch) => editor.insert_char(ch),
            KeyCode::Backspace => {
                editor.backspace();
            }
            KeyCode::Delete => {
                editor.delete();
            }
            KeyCode::Left => editor.move_left(),
            KeyCode::Right => editor.move_right(),
            KeyCode::Home => editor.move_home(),
            KeyCode::End => editor.move_end(),
            _ => return false,
        }
        true
    }

    fn sync_input_from_editor(&mut self) {
        let text = self.view.editor.text().to_string();
        self.with_app_mut(|app, host| {
            app.on_input_replace(text);
            host.request_render();
        });
    }

    fn submit(&mut self) {
        let text = self.view.editor.text().to_string();
        let remaining = self.with_app_mut(|app, host| {
            app.on_input_replace(text);
            app.on_submit(host);
            app.input.clone()
        });
        self.view.editor.set_text(remaining);
        self.view.clear_selection();
    }

    fn change_tab(&mut self, f: impl FnOnce(&mut App, &mut dyn HostOps)) {
        self.with_app_mut(f);
        self.view.clear_selection();
    }

    fn move_selection(&mut self, forward: bool) {
        let anchors: Vec<OccurrenceKey> = {
            let app = lock_unpoisoned(&self.app);
            active_frame(&app, &self.view)
                .map(|(_, frame)| frame.anchors().cloned().collect())
                .unwrap_or_default()
        };
        self.view.move_selection(&anchors, forward);
        let mut host = Arc::clone(&self.host);
        host.request_render();
    }

    fn toggle_selected(&mut self) {
        let session_id = lock_unpoisoned(&self.app)
            .registry
            .active_session()
            .map(|session| session.id().clone());
        if let Some(session_id) = session_id {
            self.view.toggle_selected(&session_id);
        }
        let mut host = Arc::clone(&self.host);
        host.request_render();
    }
}
