//! Blocking user notifications on the terminal
use std::io::{self, IsTerminal, Write};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use orienter_core::Notifier;

/// Shows each message and, when interactive, waits for Enter before continuing
pub struct TerminalNotifier<W: Write> {
    out: W,
    wait_for_key: bool,
    shown: usize,
}

impl TerminalNotifier<io::Stderr> {
    /// Notifier on stderr; only blocks when stdin is a terminal
    pub fn stderr() -> Self {
        Self::new(io::stderr(), io::stdin().is_terminal())
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(out: W, wait_for_key: bool) -> Self {
        Self {
            out,
            wait_for_key,
            shown: 0,
        }
    }

    /// Number of messages shown so far
    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn show(&mut self, message: &str) -> io::Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::Yellow),
            Print("[Orienter] "),
            ResetColor,
            Print(message),
            Print("\r\n")
        )?;

        if self.wait_for_key {
            queue!(
                self.out,
                SetForegroundColor(Color::DarkGrey),
                Print("Press Enter to continue"),
                ResetColor,
                Print("\r\n")
            )?;
            self.out.flush()?;
            wait_for_enter()?;
        }

        self.out.flush()
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn notify(&mut self, message: &str) {
        self.shown += 1;
        if let Err(e) = self.show(message) {
            log::error!("failed to show notification '{message}': {e}");
        }
    }
}

fn wait_for_enter() -> io::Result<()> {
    terminal::enable_raw_mode()?;

    let result = loop {
        match event::read() {
            Ok(Event::Key(KeyEvent {
                code: KeyCode::Enter | KeyCode::Esc,
                ..
            })) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };

    // Cleanup
    terminal::disable_raw_mode()?;
    result
}
