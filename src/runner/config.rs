use std::ffi::OsString;

use crate::exit::ErrorMode;

/// Configuration for one filtered run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub error_mode: ErrorMode,
    /// Forward signals received by this process to the child.
    pub relay_signals: bool,
}

impl RunConfig {
    pub fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        RunConfig {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..RunConfig::default()
        }
    }

    pub fn with_error_mode(mut self, error_mode: ErrorMode) -> Self {
        self.error_mode = error_mode;
        self
    }

    pub fn with_signal_relay(mut self, relay_signals: bool) -> Self {
        self.relay_signals = relay_signals;
        self
    }

    /// Program name for diagnostics.
    pub fn display_program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            program: OsString::new(),
            args: Vec::new(),
            error_mode: ErrorMode::Default,
            relay_signals: true,
        }
    }
}
