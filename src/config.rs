//! Shell configuration and pass-through command-line arguments.
//!
//! Every field has a default, so a partial JSON file is valid.
//! Default location: <config dir>/termshell/config.json

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::theme::Palette;
use crate::types::CursorVisibility;

/// Config filename within the config directory.
const CONFIG_FILENAME: &str = "config.json";

/// Key that stops the run loop unless configured otherwise.
pub const DEFAULT_KILL_KEY: char = 'q';

// ============================================================================
// TYPES
// ============================================================================

/// Settings applied when the shell is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Key that terminates the run loop.
    pub kill_key: char,
    /// Register color pairs when the terminal supports them.
    pub enable_colors: bool,
    /// Cursor visibility while the shell owns the terminal.
    pub cursor: CursorVisibility,
    /// Requested colors per theme role.
    pub palette: Palette,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            kill_key: DEFAULT_KILL_KEY,
            enable_colors: true,
            cursor: CursorVisibility::default(),
            palette: Palette::default(),
        }
    }
}

/// Host command-line arguments handed to the shell.
///
/// Stored as given. The shell never interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(Vec<String>);

impl Arguments {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arguments(args.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Returns the default config file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("termshell")
        .join(CONFIG_FILENAME)
}

impl ShellConfig {
    /// Load configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ShellError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| ShellError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load configuration, falling back to defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::metadata(path) {
            Ok(_) => Self::load(path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ShellError::Config(format!("{}: {}", path.display(), e))),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn defaults_match_documented_values() {
        let config = ShellConfig::default();
        assert_eq!(config.kill_key, 'q');
        assert!(config.enable_colors);
        assert_eq!(config.cursor, CursorVisibility::Invisible);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "kill_key": "x", "cursor": "very_visible" }}"#).unwrap();

        let config = ShellConfig::load(file.path()).unwrap();
        assert_eq!(config.kill_key, 'x');
        assert_eq!(config.cursor, CursorVisibility::VeryVisible);
        assert!(config.enable_colors);
        assert_eq!(config.palette, Palette::default());
    }

    #[test]
    fn load_rejects_malformed_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = ShellConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ShellError::Config(_)));
    }

    #[test]
    fn load_or_default_tolerates_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = ShellConfig::load_or_default(&temp.path().join("absent.json")).unwrap();
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn default_path_ends_with_config_file() {
        let path = default_config_path();
        assert!(path.ends_with("termshell/config.json"));
    }

    #[test]
    fn arguments_are_kept_verbatim() {
        let args = Arguments::new(["--verbose", "file.txt"]);
        assert_eq!(args.as_slice(), ["--verbose", "file.txt"]);
        assert!(Arguments::default().is_empty());
    }
}
