use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::error::FilterError;
use crate::pattern::PatternSet;

/// Counters for one pass of the line filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub lines_read: usize,
    pub lines_written: usize,
    /// The output sink went away (broken pipe) before the input ended.
    pub output_closed: bool,
}

impl FilterStats {
    /// At least one line reached the output sink.
    pub fn content_observed(&self) -> bool {
        self.lines_written > 0
    }
}

/// Copy the lines of `input` that the pattern set selects to `output`, in
/// order, each followed by a single newline and flushed right away.
///
/// Lines are split on `\n`; a `\r` right before the newline (or at the end of
/// the input) is not part of the line. Bytes are passed through as-is, valid
/// UTF-8 or not.
pub fn filter_lines<R, W>(
    mut input: R,
    output: &mut W,
    patterns: &PatternSet,
) -> Result<FilterStats, FilterError>
where
    R: BufRead,
    W: Write + ?Sized,
{
    let mut stats = FilterStats::default();
    let mut buf = Vec::with_capacity(8 * 1024);

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        stats.lines_read += 1;

        let line = trim_line_ending(&buf);
        if !patterns.should_output(line) {
            continue;
        }

        match write_line(output, line) {
            Ok(()) => stats.lines_written += 1,
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                // Reader went away; stop like a normal end of input
                debug!(lines_read = stats.lines_read, "output closed, stopping filter");
                stats.output_closed = true;
                break;
            }
            Err(e) => return Err(FilterError::Io(e)),
        }
    }

    debug!(
        lines_read = stats.lines_read,
        lines_written = stats.lines_written,
        "line filter finished"
    );
    Ok(stats)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn write_line<W: Write + ?Sized>(output: &mut W, line: &[u8]) -> io::Result<()> {
    output.write_all(line)?;
    output.write_all(b"\n")?;
    output.flush()
}
