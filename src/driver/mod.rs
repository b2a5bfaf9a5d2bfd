//! Terminal driver boundary.
//!
//! The shell only talks to the terminal through [`TerminalDriver`]. Call
//! order is fixed: `init`, then optionally one `register_color_pair` per
//! role, then repeated `read_key`/`draw`, then `restore` exactly once.
//!
//! - `terminal`: the real terminal via crossterm and ratatui
//! - `scripted`: headless driver fed from a key script, for tests and demos

mod scripted;
mod terminal;

pub use scripted::{DriverLog, ScriptedDriver, ScriptedInput};
pub use terminal::CrosstermDriver;

use std::io;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::style::Color;

use crate::error::Result;
use crate::types::{ColorPairId, CursorVisibility, Role};

/// Narrow interface to the terminal device.
pub trait TerminalDriver {
    /// Put the terminal into raw interactive mode.
    ///
    /// # Errors
    /// Returns `TerminalInit` when no usable terminal is available.
    fn init(&mut self, cursor: CursorVisibility) -> Result<()>;

    /// Whether the terminal can display color pairs.
    fn supports_color(&self) -> bool;

    /// Register a foreground/background pair for a theme role.
    fn register_color_pair(&mut self, role: Role, fg: Color, bg: Color) -> ColorPairId;

    /// Block until the next key press. `Ok(None)` means end of input.
    fn read_key(&mut self) -> io::Result<Option<KeyEvent>>;

    /// Render one frame.
    fn draw(&mut self, view: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()>;

    /// Return the terminal to its pre-application state.
    fn restore(&mut self) -> io::Result<()>;
}
