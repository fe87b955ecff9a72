// src/runner.rs
mod child;
pub mod config;
pub mod signals;
pub mod stream;

use std::io::{self, BufReader, Write};
use std::process::{Command, ExitStatus, Stdio};

use tracing::debug;

use crate::error::FilterError;
use crate::exit::ErrorMode;
use crate::pattern::PatternSet;
use child::{close_pipe, ChildGuard};
pub use config::RunConfig;
pub use signals::SignalRelay;
pub use stream::{filter_lines, FilterStats};

/// What one run produced, handed to the exit policy exactly once.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Set once the child has been waited on.
    pub exit_status: Option<ExitStatus>,
    pub content_observed: bool,
    pub stats: FilterStats,
    /// Start/IO failure, or a non-zero child exit.
    pub error: Option<FilterError>,
    /// Mode the run was configured with; applied by [`RunOutcome::into_result`].
    pub error_mode: ErrorMode,
}

impl RunOutcome {
    fn failed(error_mode: ErrorMode, error: FilterError) -> Self {
        RunOutcome {
            error: Some(error),
            error_mode,
            ..RunOutcome::default()
        }
    }

    pub fn child_exit_code(&self) -> Option<i32> {
        self.exit_status.and_then(|status| status.code())
    }

    /// Resolve the outcome under its error mode. Run errors and child
    /// failures are returned untouched; the mode only judges a clean zero exit.
    pub fn into_result(self) -> Result<(), FilterError> {
        match self.error {
            Some(err) => Err(err),
            None => self.error_mode.check(self.content_observed),
        }
    }
}

/// Runs one command with its stdout filtered through a [`PatternSet`].
///
/// Stdin and stderr are handed to the child directly (inherited unless set),
/// stdout is read line by line and only the selected lines reach the output
/// sink. While the child runs, signals sent to this process are relayed to it.
pub struct CommandRunner {
    config: RunConfig,
    patterns: PatternSet,
    stdin: Option<Stdio>,
    stderr: Option<Stdio>,
}

/// Live state of a started run. Field order is teardown order: the child is
/// killed (if still unreaped) before the relay stops.
struct ActiveRun {
    child: ChildGuard,
    relay: Option<SignalRelay>,
}

impl CommandRunner {
    pub fn new(config: RunConfig, patterns: PatternSet) -> Self {
        CommandRunner {
            config,
            patterns,
            stdin: None,
            stderr: None,
        }
    }

    pub fn stdin(mut self, stdin: impl Into<Stdio>) -> Self {
        self.stdin = Some(stdin.into());
        self
    }

    pub fn stderr(mut self, stderr: impl Into<Stdio>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Run the command to completion, writing selected lines to `output`.
    pub fn run<W: Write + ?Sized>(self, output: &mut W) -> RunOutcome {
        let CommandRunner {
            config,
            patterns,
            stdin,
            stderr,
        } = self;
        let error_mode = config.error_mode;

        let mut command = Command::new(&config.program);
        command
            .args(&config.args)
            .stdin(stdin.unwrap_or_else(Stdio::inherit))
            .stderr(stderr.unwrap_or_else(Stdio::inherit))
            .stdout(Stdio::piped());

        let child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                let err = FilterError::CommandStart {
                    command: config.display_program(),
                    source,
                };
                return RunOutcome::failed(error_mode, err);
            }
        };

        let mut child = ChildGuard::new(child);
        debug!(
            program = %config.display_program(),
            pid = child.id(),
            patterns = patterns.len(),
            invert = patterns.invert(),
            "spawned command"
        );

        let Some(stdout) = child.take_stdout() else {
            let err = io::Error::other("command stdout was not captured");
            return RunOutcome::failed(error_mode, FilterError::Io(err));
        };

        let relay = if config.relay_signals {
            match SignalRelay::start(child.id()) {
                Ok(relay) => Some(relay),
                Err(err) => {
                    return RunOutcome::failed(error_mode, FilterError::SignalRelay(err))
                }
            }
        } else {
            None
        };

        let mut active = ActiveRun { child, relay };

        let mut reader = BufReader::new(stdout);
        let stats = match filter_lines(&mut reader, output, &patterns) {
            Ok(stats) => stats,
            Err(err) => return RunOutcome::failed(error_mode, err),
        };

        if let Err(err) = close_pipe(reader.into_inner()) {
            return RunOutcome::failed(error_mode, FilterError::Io(err));
        }

        let status = match active.child.wait() {
            Ok(status) => status,
            Err(err) => return RunOutcome::failed(error_mode, FilterError::Io(err)),
        };

        if let Some(relay) = active.relay.take() {
            relay.stop();
        }

        RunOutcome {
            exit_status: Some(status),
            content_observed: stats.content_observed(),
            error: (!status.success()).then_some(FilterError::CommandExit { status }),
            error_mode,
            stats,
        }
    }
}
