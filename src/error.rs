use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Terminal initialization failed: {0}")]
    TerminalInit(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("An application shell is already live in this process")]
    DoubleInitialization,

    #[error("The run loop is already active")]
    Reentrant,

    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ShellError>;
