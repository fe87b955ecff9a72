use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;

pub const EXIT_SUCCESS: i32 = 0;
/// Start/IO failures and error mode violations.
pub const EXIT_FAILURE: i32 = 1;
/// Bad flags, bad error mode, missing command, unreadable pattern file.
pub const EXIT_USAGE: i32 = 2;

/// Post-hoc override of a successful run, based on whether any line was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Exit status mirrors the command's status.
    #[default]
    Default,
    /// Fail when the command succeeded but nothing was written.
    NoContent,
    /// Fail when the command succeeded and something was written.
    OnContent,
}

impl ErrorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorMode::Default => "default",
            ErrorMode::NoContent => "no-content",
            ErrorMode::OnContent => "on-content",
        }
    }

    /// Apply the mode to a run whose child already exited with status zero.
    pub fn check(self, content_observed: bool) -> Result<(), FilterError> {
        let violated = match self {
            ErrorMode::Default => false,
            ErrorMode::NoContent => !content_observed,
            ErrorMode::OnContent => content_observed,
        };

        if violated {
            Err(FilterError::ModeViolation { mode: self })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for ErrorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(ErrorMode::Default),
            "no-content" => Ok(ErrorMode::NoContent),
            "on-content" => Ok(ErrorMode::OnContent),
            other => Err(FilterError::InvalidErrorMode {
                value: other.to_string(),
            }),
        }
    }
}

/// Final process exit code for a finished invocation.
pub fn exit_code(result: &Result<(), FilterError>) -> i32 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => err.exit_code(),
    }
}
