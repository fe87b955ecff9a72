// src/lib.rs
#[cfg(not(unix))]
compile_error!("cmdfilter relays POSIX signals and only supports unix targets");

pub mod error;
pub mod exit;
pub mod pattern;
pub mod pattern_file;
pub mod runner;

pub use error::*;

pub use exit::{exit_code, ErrorMode, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use pattern::{CompiledPattern, PatternSet};
pub use pattern_file::{read_patterns, strip_comment};
pub use runner::{CommandRunner, FilterStats, RunConfig, RunOutcome};
