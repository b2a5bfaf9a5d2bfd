//! The application shell: terminal lifecycle, theme accessors, focus
//! dispatch and the run loop.
//!
//! One shell may be live per process. Construction claims the slot before
//! touching the terminal and dropping the shell releases it, so a failed
//! construction never leaves a half-built shell behind.
//!
//! Run loop: Running --key--> Running (forward to focus target, or drop it
//! when nothing is focused), Running --kill key | end of input--> Stopped.

use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::style::Style;

use crate::config::{Arguments, ShellConfig};
use crate::driver::TerminalDriver;
use crate::error::{Result, ShellError};
use crate::focus::{FocusSlot, WeakTarget};
use crate::theme::{AttributePolicy, ColorPairs, DefaultPolicy, Theme};
use crate::types::{Attr, Role, StopReason};

/// Set while a shell exists.
static LIVE: AtomicBool = AtomicBool::new(false);

/// Claim on the process-wide shell slot, released on drop.
struct InstanceGuard;

impl InstanceGuard {
    fn acquire() -> Result<Self> {
        LIVE.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InstanceGuard)
            .map_err(|_| ShellError::DoubleInitialization)
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        LIVE.store(false, Ordering::Release);
    }
}

/// The process-wide shell: owns the terminal driver, theme, focus slot and
/// kill key.
pub struct Application {
    driver: Box<dyn TerminalDriver>,
    theme: Theme,
    policy: Box<dyn AttributePolicy>,
    focus: FocusSlot,
    kill_key: char,
    has_colors: bool,
    arguments: Arguments,
    running: bool,
    restored: bool,
    // Declared last: the slot is released only after the terminal is restored.
    _instance: InstanceGuard,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl Application {
    /// Build the shell and take over the terminal.
    ///
    /// # Errors
    /// `DoubleInitialization` if a shell is already live, `TerminalInit` if
    /// the driver cannot set up the terminal.
    pub fn new(driver: impl TerminalDriver + 'static, config: ShellConfig) -> Result<Self> {
        Self::with_arguments(driver, Arguments::default(), config)
    }

    /// Like [`Application::new`], keeping the host's command-line arguments.
    pub fn with_arguments(
        driver: impl TerminalDriver + 'static,
        arguments: Arguments,
        config: ShellConfig,
    ) -> Result<Self> {
        let instance = InstanceGuard::acquire()?;
        let mut driver: Box<dyn TerminalDriver> = Box::new(driver);
        driver.init(config.cursor)?;

        let has_colors = config.enable_colors && driver.supports_color();
        let theme = if has_colors {
            let ids = Role::ALL.map(|role| {
                let colors = config.palette.get(role);
                driver.register_color_pair(role, colors.fg, colors.bg)
            });
            Theme::colored(ColorPairs::new(ids), config.palette, config.cursor)
        } else {
            Theme::monochrome(config.palette, config.cursor)
        };

        tracing::info!(
            has_colors,
            kill_key = %config.kill_key,
            "application shell started"
        );

        Ok(Application {
            driver,
            theme,
            policy: Box::new(DefaultPolicy),
            focus: FocusSlot::default(),
            kill_key: config.kill_key,
            has_colors,
            arguments,
            running: false,
            restored: false,
            _instance: instance,
        })
    }

    /// Whether a shell is live in this process.
    pub fn is_live() -> bool {
        LIVE.load(Ordering::Acquire)
    }

    /// Restore the terminal now, reporting any failure.
    pub fn close(mut self) -> Result<()> {
        self.release_terminal()?;
        Ok(())
    }

    fn release_terminal(&mut self) -> std::io::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        tracing::debug!("restoring terminal");
        self.driver.restore()
    }

    /// True when color pairs were registered.
    pub fn has_colors(&self) -> bool {
        self.has_colors
    }

    /// Registered pairs, palette and cursor setting.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Command-line arguments handed over at construction.
    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("has_colors", &self.has_colors)
            .field("kill_key", &self.kill_key)
            .field("focus", &self.focus)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        if let Err(e) = self.release_terminal() {
            tracing::error!(error = %e, "failed to restore terminal");
            eprintln!("Failed to restore terminal: {}", e);
        }
    }
}

// ============================================================================
// THEME ACCESSORS
// ============================================================================

impl Application {
    /// Replace the attribute policy.
    pub fn set_policy(&mut self, policy: impl AttributePolicy + 'static) {
        self.policy = Box::new(policy);
    }

    /// Attribute for any role under the current policy.
    pub fn attr(&self, role: Role) -> Attr {
        self.policy.resolve(role, self.theme.pairs())
    }

    /// Ratatui style for a role.
    pub fn style(&self, role: Role) -> Style {
        self.theme.style(self.attr(role))
    }

    /// Menu and form foregrounds.
    pub fn foregrounds(&self) -> Attr {
        self.attr(Role::Foreground)
    }

    /// Menu and form backgrounds.
    pub fn backgrounds(&self) -> Attr {
        self.attr(Role::Background)
    }

    /// Inactive (menu) elements.
    pub fn inactives(&self) -> Attr {
        self.attr(Role::Inactive)
    }

    /// Form labels and soft-label keys.
    pub fn labels(&self) -> Attr {
        self.attr(Role::Label)
    }

    /// Form backgrounds.
    pub fn dialog_backgrounds(&self) -> Attr {
        self.attr(Role::DialogBackground)
    }

    /// Default window backgrounds.
    pub fn window_backgrounds(&self) -> Attr {
        self.attr(Role::WindowBackground)
    }

    /// Title window.
    pub fn screen_titles(&self) -> Attr {
        self.attr(Role::Title)
    }
}

// ============================================================================
// FOCUS AND KILL KEY
// ============================================================================

impl Application {
    /// Set the element that receives input.
    ///
    /// The shell keeps only a weak handle. Clear focus before dropping the
    /// target if it should stop receiving input deterministically.
    ///
    /// # Errors
    /// `InvalidArgument` for a null or dropped handle, or a target that
    /// cannot take focus. The previous target stays focused.
    pub fn set_initial_focus(&mut self, target: WeakTarget) -> Result<()> {
        let Some(strong) = target.upgrade() else {
            return Err(ShellError::InvalidArgument(
                "focus target is null or already dropped".to_string(),
            ));
        };
        // A target busy handling input is the one asking for focus.
        let focusable = strong.try_borrow().map(|t| t.can_focus()).unwrap_or(true);
        if !focusable {
            return Err(ShellError::InvalidArgument(
                "focus target cannot take focus".to_string(),
            ));
        }
        self.focus.replace(target);
        tracing::debug!("initial focus set");
        Ok(())
    }

    /// Slot holding the current focus target.
    pub fn focus(&self) -> &FocusSlot {
        &self.focus
    }

    /// Focus slot for targets passing focus along.
    pub fn focus_mut(&mut self) -> &mut FocusSlot {
        &mut self.focus
    }

    /// Change the key that stops the run loop.
    // TODO: detect collisions between the kill key and widget key bindings.
    pub fn set_kill_key(&mut self, key: char) {
        self.kill_key = key;
    }

    /// Key that stops the run loop.
    pub fn kill_key(&self) -> char {
        self.kill_key
    }

    /// True when the press stands for the kill key character.
    ///
    /// Enter matches both `'\r'` and `'\n'`.
    pub fn is_kill_key(&self, key: &KeyEvent) -> bool {
        match key_char(key) {
            Some('\r') => matches!(self.kill_key, '\r' | '\n'),
            Some(c) => c == self.kill_key,
            None => false,
        }
    }
}

/// The character a key press stands for, as a raw terminal read would
/// deliver it.
///
/// Esc, Tab, Enter and Backspace map to their control codes and
/// Ctrl+letter to the matching control character. Alt chords and keys
/// without a character (arrows, function keys) map to `None`.
pub fn key_char(key: &KeyEvent) -> Option<char> {
    if key.modifiers.contains(KeyModifiers::ALT) {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some('\u{1b}'),
        KeyCode::Tab => Some('\t'),
        KeyCode::Enter => Some('\r'),
        KeyCode::Backspace => Some('\u{7f}'),
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'a'..='z' | 'A'..='Z' => Some(((c.to_ascii_lowercase() as u8) & 0x1f) as char),
            '@' | ' ' => Some('\0'),
            '[' => Some('\u{1b}'),
            '\\' => Some('\u{1c}'),
            ']' => Some('\u{1d}'),
            '^' => Some('\u{1e}'),
            '_' => Some('\u{1f}'),
            _ => None,
        },
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// RUN LOOP
// ============================================================================

impl Application {
    /// Render one frame through the driver.
    pub fn draw<F>(&mut self, mut view: F) -> Result<()>
    where
        F: FnMut(&mut Frame<'_>),
    {
        self.driver.draw(&mut view)?;
        Ok(())
    }

    /// Read keys and forward them to the focus target until the kill key
    /// or end of input. Leaves the terminal as is; dropping the shell
    /// restores it.
    ///
    /// # Errors
    /// `Reentrant` when called from inside a dispatch, `Io` when the driver
    /// fails to read.
    pub fn start(&mut self) -> Result<StopReason> {
        if self.running {
            return Err(ShellError::Reentrant);
        }
        self.running = true;
        let outcome = self.run_loop();
        self.running = false;
        outcome
    }

    fn run_loop(&mut self) -> Result<StopReason> {
        loop {
            let Some(key) = self.driver.read_key()? else {
                tracing::info!("end of input");
                return Ok(StopReason::EndOfInput);
            };

            if self.is_kill_key(&key) {
                tracing::info!(kill_key = %self.kill_key, "kill key pressed");
                return Ok(StopReason::KillKey);
            }

            self.dispatch(key);
        }
    }

    fn dispatch(&mut self, key: KeyEvent) {
        let Some(target) = self.focus.current() else {
            tracing::trace!(?key, "no focus target, key dropped");
            return;
        };
        let Ok(mut target) = target.try_borrow_mut() else {
            tracing::warn!(?key, "focus target busy, key dropped");
            return;
        };
        target.handle_input(key, self);
    }
}

// ============================================================================
// TESTS
// ============================================================================
