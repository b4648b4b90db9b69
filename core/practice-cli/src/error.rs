//! Errors surfaced to the terminal.

use practice_core::PracticeError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Practice(#[from] PracticeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T> = std::result::Result<T, CliError>;
