use std::path::PathBuf;
use std::process::ExitStatus;

use crate::exit::{ErrorMode, EXIT_FAILURE, EXIT_USAGE};

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("no command specified")]
    NoCommand,

    #[error("invalid error mode '{value}' (expected default, no-content or on-content)")]
    InvalidErrorMode { value: String },

    #[error("{message} {path:?}: {source}")]
    PatternFile {
        message: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start command {command:?}: {source}")]
    CommandStart {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to register signal relay: {0}")]
    SignalRelay(#[source] std::io::Error),

    #[error("command exited with {status}")]
    CommandExit { status: ExitStatus },

    #[error("error due to error mode '{mode}'")]
    ModeViolation { mode: ErrorMode },
}

impl FilterError {
    /// Errors raised before any process is started.
    pub fn is_initialization(&self) -> bool {
        matches!(
            self,
            FilterError::NoCommand
                | FilterError::InvalidErrorMode { .. }
                | FilterError::PatternFile { .. }
        )
    }

    /// Whether the front end prints this error. Child failures and mode
    /// violations are carried by the exit code alone.
    pub fn is_reported(&self) -> bool {
        !matches!(
            self,
            FilterError::CommandExit { .. } | FilterError::ModeViolation { .. }
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            FilterError::CommandExit { status } => match status.code() {
                Some(code) if code > 0 => code,
                // killed by a signal, or a zero status that should never land here
                _ => EXIT_FAILURE,
            },
            err if err.is_initialization() => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
