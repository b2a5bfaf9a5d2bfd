//! termshell demo
//!
//! Two key-log panes driven by the application shell. Tab moves focus
//! between panes; the kill key quits.

use std::cell::RefCell;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Mutex;

use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::layout::{Constraint, Layout};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use termshell::config::{Arguments, ShellConfig, default_config_path};
use termshell::driver::{CrosstermDriver, TerminalDriver};
use termshell::focus::{FocusTarget, WeakTarget, weak_target};
use termshell::types::{Role, StopReason};
use termshell::{Application, ShellError};

/// Keys kept per pane.
const MAX_KEYS: usize = 200;

#[derive(Parser)]
#[command(name = "termshell")]
#[command(about = "Key-log demo for the termshell application shell")]
#[command(version)]
struct Cli {
    /// Run monochrome even if the terminal supports colors
    #[arg(long)]
    no_color: bool,

    /// Key that quits (default: from config, else 'q')
    #[arg(long)]
    kill_key: Option<char>,

    /// Config file (default: <config dir>/termshell/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Passed through to the shell uninterpreted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(reason) => {
            match reason {
                StopReason::KillKey => println!("Bye."),
                StopReason::EndOfInput => println!("Input closed."),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<StopReason, String> {
    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let mut config = ShellConfig::load_or_default(&config_path).map_err(|e| e.to_string())?;
    if cli.no_color {
        config.enable_colors = false;
    }
    if let Some(key) = cli.kill_key {
        config.kill_key = key;
    }

    let (reason, _state) = run_demo(CrosstermDriver::new(), Arguments::new(cli.args), config)
        .map_err(|e| e.to_string())?;
    Ok(reason)
}

/// Log to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("termshell=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ============================================================================
// DEMO STATE
// ============================================================================

#[derive(Debug)]
struct PaneState {
    name: &'static str,
    keys: Vec<String>,
}

#[derive(Debug)]
struct DemoState {
    panes: [PaneState; 2],
    active: usize,
}

impl DemoState {
    fn new() -> Self {
        DemoState {
            panes: [
                PaneState { name: " left ", keys: Vec::new() },
                PaneState { name: " right ", keys: Vec::new() },
            ],
            active: 0,
        }
    }
}

fn describe(key: KeyEvent) -> String {
    match key.code {
        KeyCode::Char(c) => c.to_string(),
        other => format!("{:?}", other),
    }
}

// ============================================================================
// WIDGET
// ============================================================================

/// One pane. Logs key presses; Tab passes focus to its peer.
struct KeyLog {
    index: usize,
    state: Rc<RefCell<DemoState>>,
    peer: Option<WeakTarget>,
}

impl FocusTarget for KeyLog {
    fn handle_input(&mut self, key: KeyEvent, app: &mut Application) {
        {
            let mut state = self.state.borrow_mut();
            match (key.code, &self.peer) {
                (KeyCode::Tab, Some(peer)) => {
                    state.active = 1 - self.index;
                    app.focus_mut().replace(peer.clone());
                }
                _ => {
                    let keys = &mut state.panes[self.index].keys;
                    keys.push(describe(key));
                    if keys.len() > MAX_KEYS {
                        keys.remove(0);
                    }
                }
            }
        }

        if let Err(e) = render(&self.state.borrow(), app) {
            tracing::warn!(error = %e, "redraw failed");
        }
    }
}

fn render(state: &DemoState, app: &mut Application) -> Result<(), ShellError> {
    let title = app.style(Role::Title);
    let active = app.style(Role::Foreground);
    let inactive = app.style(Role::Inactive);
    let label = app.style(Role::Label);
    let window = app.style(Role::WindowBackground);
    let help = format!(" Tab: switch pane   {}: quit", app.kill_key());

    app.draw(|frame| {
        let area = frame.area();
        frame.render_widget(Block::new().style(window), area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Min(0),    // panes
            Constraint::Length(1), // help
        ])
        .split(area);
        frame.render_widget(Paragraph::new(" termshell demo").style(title), rows[0]);

        let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        for (i, pane) in state.panes.iter().enumerate() {
            let style = if i == state.active { active } else { inactive };
            let visible = rows[1].height.saturating_sub(2) as usize;
            let skip = pane.keys.len().saturating_sub(visible);
            let lines: Vec<Line> = pane.keys[skip..].iter().map(|k| Line::from(k.as_str())).collect();
            let block = Block::bordered().title(pane.name);
            frame.render_widget(Paragraph::new(lines).block(block).style(style), cols[i]);
        }

        frame.render_widget(Paragraph::new(help.as_str()).style(label), rows[2]);
    })
}

/// Build the panes, focus the left one and run until stopped.
fn run_demo(
    driver: impl TerminalDriver + 'static,
    arguments: Arguments,
    config: ShellConfig,
) -> Result<(StopReason, Rc<RefCell<DemoState>>), ShellError> {
    let mut app = Application::with_arguments(driver, arguments, config)?;
    let state = Rc::new(RefCell::new(DemoState::new()));

    let left = Rc::new(RefCell::new(KeyLog {
        index: 0,
        state: Rc::clone(&state),
        peer: None,
    }));
    let right = Rc::new(RefCell::new(KeyLog {
        index: 1,
        state: Rc::clone(&state),
        peer: Some(weak_target(&left)),
    }));
    left.borrow_mut().peer = Some(weak_target(&right));

    app.set_initial_focus(weak_target(&left))?;
    render(&state.borrow(), &mut app)?;
    let reason = app.start()?;

    // Panes go away before the shell restores the terminal.
    app.focus_mut().clear();
    drop((left, right));
    app.close()?;
    Ok((reason, state))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use termshell::driver::ScriptedDriver;

    // Single test: only one shell may be live per process.
    #[test]
    fn demo_logs_keys_per_pane_and_quits_on_kill_key() {
        let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
        let driver = ScriptedDriver::new()
            .with_keys("ab")
            .with_events([tab])
            .with_keys("cqz");
        let log = driver.log();

        let (reason, state) =
            run_demo(driver, Arguments::default(), ShellConfig::default()).unwrap();

        assert_eq!(reason, StopReason::KillKey);
        let state = state.borrow();
        assert_eq!(state.panes[0].keys, vec!["a", "b"]);
        assert_eq!(state.panes[1].keys, vec!["c"]);
        assert_eq!(state.active, 1);

        let log = log.borrow();
        assert_eq!(log.restores, 1);
        assert_eq!(log.draws, 5);
        assert!(log.last_frame[0].contains("termshell demo"));
    }
}
