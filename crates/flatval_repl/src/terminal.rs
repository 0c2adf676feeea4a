//! Raw-mode terminal session and the blocking UI loop.

use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use tracing::info;

use crate::app::App;
use crate::runtime::{lock_unpoisoned, RuntimeController};
use crate::tui::{AppComponent, Screen};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Raw mode plus alternate screen. Restored on drop.
pub struct TerminalSession {
    stdout: Stdout,
}

impl TerminalSession {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen, EnableBracketedPaste) {
            teardown_terminal();
            return Err(error);
        }
        Ok(Self { stdout })
    }

    pub fn size(&self) -> io::Result<(usize, usize)> {
        let (columns, rows) = terminal::size()?;
        Ok((usize::from(columns), usize::from(rows)))
    }

    pub fn draw(&mut self, screen: &Screen) -> io::Result<()> {
        queue!(self.stdout, Hide)?;
        for (row, line) in screen.lines.iter().enumerate() {
            let row = u16::try_from(row).unwrap_or(u16::MAX);
            queue!(
                self.stdout,
                MoveTo(0, row),
                Print(line),
                Print("\x1b[0m"),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        queue!(
            self.stdout,
            Clear(ClearType::FromCursorDown),
            MoveTo(screen.cursor.0, screen.cursor.1),
            Show
        )?;
        self.stdout.flush()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show);
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Runs the UI until the app asks to exit. Outstanding evaluations are
/// abandoned on exit.
pub fn run(app: Arc<Mutex<App>>, host: Arc<RuntimeController>) -> io::Result<()> {
    let mut terminal = TerminalSession::new()?;
    let mut component = AppComponent::new(Arc::clone(&app), Arc::clone(&host));
    let mut dirty = true;

    loop {
        if lock_unpoisoned(&app).should_exit || host.stop_requested() {
            break;
        }

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => component.handle_key(key),
                Event::Paste(text) => component.handle_paste(&text),
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        host.flush_pending_events();
        if host.take_render_request() || dirty {
            let (width, height) = terminal.size()?;
            terminal.draw(&component.render(width, height))?;
            dirty = false;
        }
    }

    info!(in_flight = host.in_flight(), "terminal loop finished");
    Ok(())
}
