use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::FilterError;

/// Append the patterns from `path` to `patterns`, one per non-empty line
/// after comment stripping.
pub fn read_patterns(path: &Path, patterns: &mut Vec<String>) -> Result<(), FilterError> {
    let file = File::open(path).map_err(|source| FilterError::PatternFile {
        message: "failed to open pattern file",
        path: path.to_path_buf(),
        source,
    })?;

    let before = patterns.len();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| FilterError::PatternFile {
            message: "failed to read pattern file",
            path: path.to_path_buf(),
            source,
        })?;

        let pattern = strip_comment(&line);
        if !pattern.is_empty() {
            patterns.push(pattern);
        }
    }

    debug!(
        path = %path.display(),
        count = patterns.len() - before,
        "loaded pattern file"
    );
    Ok(())
}

/// Remove a trailing `#` comment from a pattern file line.
///
/// `##` stands for a literal `#`. A lone `#` starts a comment that runs to the
/// end of the line, and any whitespace right before it is dropped too.
pub fn strip_comment(line: &str) -> String {
    let mut result = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '#' {
            if chars.peek() != Some(&'#') {
                let trimmed = result.trim_end().len();
                result.truncate(trimmed);
                break;
            }
            chars.next();
        }
        result.push(ch);
    }

    result
}
