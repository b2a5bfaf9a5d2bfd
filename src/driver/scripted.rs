//! Headless driver: replays a key script and records every call.
//!
//! The call log is shared through an `Rc` so it stays readable after the
//! driver has been moved into (and dropped with) the shell.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::style::Color;

use crate::error::{Result, ShellError};
use crate::types::{ColorPairId, CursorVisibility, Role};

use super::TerminalDriver;

/// One scripted input step.
#[derive(Debug, Clone)]
pub enum ScriptedInput {
    Key(KeyEvent),
    /// Fail the read with this error kind.
    Error(io::ErrorKind),
}

/// Everything the shell asked of the driver.
#[derive(Debug, Default, Clone)]
pub struct DriverLog {
    pub inits: usize,
    pub restores: usize,
    pub reads: usize,
    pub draws: usize,
    pub cursor: Option<CursorVisibility>,
    pub pairs: Vec<(Role, Color, Color)>,
    /// Text of the last drawn frame, one string per row.
    pub last_frame: Vec<String>,
}

pub struct ScriptedDriver {
    script: VecDeque<ScriptedInput>,
    color: bool,
    fail_init: bool,
    size: (u16, u16),
    next_pair: u16,
    terminal: Option<Terminal<TestBackend>>,
    log: Rc<RefCell<DriverLog>>,
}

impl ScriptedDriver {
    /// Color-capable 80x24 driver with an empty script.
    pub fn new() -> Self {
        ScriptedDriver {
            script: VecDeque::new(),
            color: true,
            fail_init: false,
            size: (80, 24),
            next_pair: 1,
            terminal: None,
            log: Rc::new(RefCell::new(DriverLog::default())),
        }
    }

    /// Append one plain key press per character.
    pub fn with_keys(mut self, keys: &str) -> Self {
        self.script.extend(
            keys.chars()
                .map(|c| ScriptedInput::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))),
        );
        self
    }

    /// Append arbitrary key events.
    pub fn with_events(mut self, events: impl IntoIterator<Item = KeyEvent>) -> Self {
        self.script.extend(events.into_iter().map(ScriptedInput::Key));
        self
    }

    /// Append a failing read.
    pub fn with_read_error(mut self, kind: io::ErrorKind) -> Self {
        self.script.push_back(ScriptedInput::Error(kind));
        self
    }

    /// Report no color support.
    pub fn without_color(mut self) -> Self {
        self.color = false;
        self
    }

    /// Make `init` fail as if there were no controlling terminal.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.size = (width, height);
        self
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> Rc<RefCell<DriverLog>> {
        Rc::clone(&self.log)
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDriver for ScriptedDriver {
    fn init(&mut self, cursor: CursorVisibility) -> Result<()> {
        if self.fail_init {
            return Err(ShellError::TerminalInit(
                "no controlling terminal".to_string(),
            ));
        }
        let (width, height) = self.size;
        let terminal = Terminal::new(TestBackend::new(width, height))
            .map_err(|e| ShellError::TerminalInit(e.to_string()))?;
        self.terminal = Some(terminal);

        let mut log = self.log.borrow_mut();
        log.inits += 1;
        log.cursor = Some(cursor);
        Ok(())
    }

    fn supports_color(&self) -> bool {
        self.color
    }

    fn register_color_pair(&mut self, role: Role, fg: Color, bg: Color) -> ColorPairId {
        self.log.borrow_mut().pairs.push((role, fg, bg));
        let id = ColorPairId(self.next_pair);
        self.next_pair += 1;
        id
    }

    fn read_key(&mut self) -> io::Result<Option<KeyEvent>> {
        self.log.borrow_mut().reads += 1;
        match self.script.pop_front() {
            Some(ScriptedInput::Key(key)) => Ok(Some(key)),
            Some(ScriptedInput::Error(kind)) => Err(io::Error::new(kind, "scripted read failure")),
            None => Ok(None),
        }
    }

    fn draw(&mut self, view: &mut dyn FnMut(&mut Frame<'_>)) -> io::Result<()> {
        let terminal = self
            .terminal
            .as_mut()
            .ok_or_else(|| io::Error::other("terminal not initialized"))?;
        terminal
            .draw(|frame| view(frame))
            .map_err(|e| io::Error::other(e.to_string()))?;

        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        let rows = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect();

        let mut log = self.log.borrow_mut();
        log.draws += 1;
        log.last_frame = rows;
        Ok(())
    }

    fn restore(&mut self) -> io::Result<()> {
        self.terminal = None;
        self.log.borrow_mut().restores += 1;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    #[test]
    fn script_replays_keys_then_end_of_input() {
        let mut driver = ScriptedDriver::new().with_keys("ab");
        driver.init(CursorVisibility::Normal).unwrap();

        assert_eq!(driver.read_key().unwrap().map(|k| k.code), Some(KeyCode::Char('a')));
        assert_eq!(driver.read_key().unwrap().map(|k| k.code), Some(KeyCode::Char('b')));
        assert!(driver.read_key().unwrap().is_none());
        assert_eq!(driver.log().borrow().reads, 3);
    }

    #[test]
    fn scripted_error_surfaces_from_read() {
        let mut driver = ScriptedDriver::new().with_read_error(io::ErrorKind::PermissionDenied);
        let err = driver.read_key().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn pair_handles_are_sequential() {
        let mut driver = ScriptedDriver::new();
        let a = driver.register_color_pair(Role::Foreground, Color::White, Color::Blue);
        let b = driver.register_color_pair(Role::Background, Color::Blue, Color::White);
        assert_eq!((a, b), (ColorPairId(1), ColorPairId(2)));
        assert_eq!(driver.log().borrow().pairs.len(), 2);
    }

    #[test]
    fn draw_captures_frame_text() {
        let mut driver = ScriptedDriver::new().with_size(10, 2);
        driver.init(CursorVisibility::Invisible).unwrap();
        driver
            .draw(&mut |frame: &mut Frame| frame.render_widget(Paragraph::new("hello"), frame.area()))
            .unwrap();

        let log = driver.log();
        let log = log.borrow();
        assert_eq!(log.draws, 1);
        assert!(log.last_frame[0].starts_with("hello"));
    }

    #[test]
    fn draw_before_init_fails() {
        let mut driver = ScriptedDriver::new();
        assert!(driver.draw(&mut |_frame: &mut Frame| {}).is_err());
    }

    #[test]
    fn failing_init_reports_terminal_error() {
        let mut driver = ScriptedDriver::new().failing_init();
        let err = driver.init(CursorVisibility::Normal).unwrap_err();
        assert!(matches!(err, ShellError::TerminalInit(_)));
        assert_eq!(driver.log().borrow().inits, 0);
    }
}
