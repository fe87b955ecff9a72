use anyhow::{anyhow, Context};
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cmdfilter::{
    exit_code, read_patterns, CommandRunner, ErrorMode, FilterError, PatternSet, RunConfig,
    EXIT_SUCCESS, EXIT_USAGE,
};

/// Environment variable holding a tracing filter, e.g. `CMDFILTER_LOG=debug`.
const LOG_ENV: &str = "CMDFILTER_LOG";

const HELP_DETAILS: &str = "\
PATTERNS:
  Patterns match the entire line, start to end.
  '*' matches zero or more characters; '**' matches one literal '*'.
  Every other character matches itself. A line matches when it matches ANY
  pattern given with -p/--pattern or read from -f/--pattern-file.

PATTERN FILES:
  One pattern per line; empty lines are skipped. A '#' starts a comment that
  runs to the end of the line, along with any whitespace right before it.
  Write '##' for a literal '#'.

WITHOUT PATTERNS:
  No line can match, so nothing is printed, unless -v/--invert-match is given,
  in which case every line is printed.

EXIT STATUS:
  The command's exit status is passed through. Only when it exits 0 does the
  error mode apply:
    default     exit 0
    no-content  exit 1 if no line was printed, else 0
    on-content  exit 1 if any line was printed, else 0
  Exit 2 means bad usage; exit 1 means the command could not be run.

Stdin and stderr are passed to the command untouched, and signals sent to
this process are forwarded to it.";

#[derive(Parser, Debug)]
#[command(name = "cmdfilter")]
#[command(about = "Run a command and filter its standard output line by line")]
#[command(version)]
#[command(after_help = HELP_DETAILS)]
struct Args {
    /// Pattern to filter by (can be given multiple times)
    #[arg(short = 'p', long = "pattern", value_name = "PATTERN", action = ArgAction::Append)]
    patterns: Vec<String>,

    /// File of patterns, one per line (can be given multiple times)
    #[arg(short = 'f', long = "pattern-file", value_name = "FILE", action = ArgAction::Append)]
    pattern_files: Vec<PathBuf>,

    /// Select non-matching lines instead
    #[arg(short = 'v', long = "invert-match")]
    invert_match: bool,

    /// Error mode: default, no-content or on-content
    #[arg(short = 'e', long = "error-mode", value_name = "MODE", default_value = "default")]
    error_mode: ErrorMode,

    /// Debug mode - log run details to stderr
    #[arg(long)]
    debug: bool,

    /// Command to run, followed by its arguments
    #[arg(
        value_name = "COMMAND",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    command: Vec<OsString>,
}

impl Args {
    /// Merge direct patterns with pattern file contents, in that order.
    fn load_patterns(&self) -> Result<PatternSet, FilterError> {
        let mut raw = self.patterns.clone();
        for path in &self.pattern_files {
            read_patterns(path, &mut raw)?;
        }
        Ok(PatternSet::new(raw, self.invert_match))
    }

    fn run_config(&self) -> Result<RunConfig, FilterError> {
        let (program, args) = self.command.split_first().ok_or(FilterError::NoCommand)?;
        Ok(RunConfig::new(program.clone(), args.iter().cloned()).with_error_mode(self.error_mode))
    }
}

fn main() {
    std::process::exit(real_main());
}

fn real_main() -> i32 {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // help and usage go to stderr so stdout only carries filtered lines
            eprint!("{}", err);
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
                _ => EXIT_USAGE,
            };
        }
    };

    let (config, patterns) = match init(&args) {
        Ok(parts) => parts,
        Err(err) => {
            eprintln!("Error initializing: {:#}", err);
            if let Some(FilterError::NoCommand) = err.downcast_ref::<FilterError>() {
                eprintln!();
                eprint!("{}", Args::command().render_help());
            }
            return EXIT_USAGE;
        }
    };

    let stdout = io::stdout();
    let mut output = stdout.lock();
    let outcome = CommandRunner::new(config, patterns).run(&mut output);

    debug!(
        exit_status = ?outcome.exit_status,
        content_observed = outcome.content_observed,
        "run finished"
    );

    let result = outcome.into_result();
    if let Err(err) = &result {
        if err.is_reported() {
            eprintln!("Error running command: {}", err);
        }
    }
    exit_code(&result)
}

fn init(args: &Args) -> anyhow::Result<(RunConfig, PatternSet)> {
    init_logging(args.debug)?;

    let config = args.run_config()?;
    let patterns = args.load_patterns()?;
    debug!(
        patterns = patterns.len(),
        invert = patterns.invert(),
        error_mode = %config.error_mode,
        "configuration loaded"
    );
    Ok((config, patterns))
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid {} filter '{}'", LOG_ENV, directives))?,
        Err(_) if debug => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install logger")
}
