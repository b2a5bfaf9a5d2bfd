//! Real terminal driver: crossterm for modes and input, ratatui for drawing.

use std::io::{self, Stdout};
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::ExecutableCommand;
use crossterm::cursor::{DisableBlinking, EnableBlinking, Hide, Show};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::style::available_color_count;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::tty::IsTty;
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Color;

use crate::error::{Result, ShellError};
use crate::types::{ColorPairId, CursorVisibility, Role};

use super::TerminalDriver;

/// Fewer colors than this and the theme runs monochrome.
const MIN_COLORS: u16 = 8;

static PANIC_HOOK: Once = Once::new();

/// Set while this process has the terminal in raw mode. Whoever clears it
/// (the driver or the panic hook) does the teardown.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Driver for the process's controlling terminal.
pub struct CrosstermDriver {
    terminal: Option<Terminal<CrosstermBackend<Stdout>>>,
    next_pair: u16,
}

impl CrosstermDriver {
    pub fn new() -> Self {
        CrosstermDriver {
            terminal: None,
            next_pair: 1,
        }
    }
}

impl Default for CrosstermDriver {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

fn apply_cursor(stdout: &mut Stdout, cursor: CursorVisibility) -> io::Result<()> {
    match cursor {
        CursorVisibility::Invisible => {
            stdout.execute(Hide)?;
        }
        CursorVisibility::Normal => {
            stdout.execute(Show)?.execute(DisableBlinking)?;
        }
        CursorVisibility::VeryVisible => {
            stdout.execute(Show)?.execute(EnableBlinking)?;
        }
    }
    Ok(())
}

fn mark_active() {
    ACTIVE.store(true, Ordering::Release);
}

/// Claim the teardown. True for exactly one caller per `mark_active`.
fn claim_restore() -> bool {
    ACTIVE.swap(false, Ordering::AcqRel)
}

/// Restore the terminal to normal mode.
fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?.execute(Show)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            // Best-effort; a no-op once the driver has restored.
            if claim_restore() {
                let _ = restore_terminal();
            }
            original_hook(panic_info);
        }));
    });
}

fn init_error(e: io::Error) -> ShellError {
    ShellError::TerminalInit(e.to_string())
}

impl TerminalDriver for CrosstermDriver {
    fn init(&mut self, cursor: CursorVisibility) -> Result<()> {
        if !io::stdin().is_tty() || !io::stdout().is_tty() {
            return Err(ShellError::TerminalInit(
                "no controlling terminal".to_string(),
            ));
        }

        enable_raw_mode().map_err(init_error)?;
        let setup = (|| -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
            let mut stdout = io::stdout();
            stdout.execute(EnterAlternateScreen)?;
            apply_cursor(&mut stdout, cursor)?;
            let backend = CrosstermBackend::new(stdout);
            Terminal::new(backend)
        })();

        match setup {
            Ok(terminal) => {
                install_panic_hook();
                self.terminal = Some(terminal);
                mark_active();
                tracing::debug!(?cursor, "terminal in raw mode");
                Ok(())
            }
            Err(e) => {
                // Init failed halfway; undo what was done.
                let _ = restore_terminal();
                Err(init_error(e))
            }
        }
    }

    fn supports_color(&self) -> bool {
        std::env::var_os("NO_COLOR").is_none() && available_color_count() >= MIN_COLORS
    }

    fn register_color_pair(&mut self, role: Role, fg: Color, bg: Color) -> ColorPairId {
        let id = ColorPairId(self.next_pair);
        self.next_pair += 1;
        tracing::debug!(?role, ?fg, ?bg, pair = id.0, "registered color pair");
        id
    }

    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => return Ok(Some(key)),
                Ok(_) => {} // ignore releases, mouse, resize, etc.
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe
                    ) =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn draw(&mut self, view: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()> {
        match self.terminal.as_mut() {
            Some(terminal) => {
                terminal.draw(|frame| view(frame))?;
                Ok(())
            }
            None => Err(io::Error::other("terminal not initialized")),
        }
    }

    fn restore(&mut self) -> io::Result<()> {
        if self.terminal.take().is_none() || !claim_restore() {
            return Ok(());
        }
        restore_terminal()
    }
}

// ============================================================================
// TESTS
// ============================================================================
