//! termshell: application shell for terminal UIs.
//!
//! Owns terminal mode setup, the color/attribute theme, the focused
//! element, and the run loop that feeds it key presses.

pub mod application;
pub mod config;
pub mod driver;
pub mod error;
pub mod focus;
pub mod theme;
pub mod types;

pub use application::Application;
pub use error::{Result, ShellError};

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that build an `Application`: only one may be live
    /// per process.
    pub fn serial() -> MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
