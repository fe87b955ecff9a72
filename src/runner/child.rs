use std::io;
use std::process::{Child, ChildStdout, ExitStatus};

use nix::errno::Errno;
use nix::unistd::close;
use tracing::{debug, warn};

/// Owns a spawned child until it has been waited on. Dropping an unreaped
/// child kills it first, so no exit path leaves the process running.
pub(crate) struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    pub(crate) fn new(child: Child) -> Self {
        ChildGuard {
            child,
            reaped: false,
        }
    }

    pub(crate) fn id(&self) -> u32 {
        self.child.id()
    }

    pub(crate) fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub(crate) fn wait(&mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        debug!(pid = self.child.id(), %status, "command exited");
        Ok(status)
    }

    /// Kill and reap the child. Errors are logged, not returned.
    pub(crate) fn kill(&mut self) {
        if self.reaped {
            return;
        }

        let pid = self.child.id();
        debug!(pid, "killing command");
        if let Err(err) = self.child.kill() {
            warn!(pid, %err, "failed to kill command");
        }
        match self.child.wait() {
            Ok(status) => {
                self.reaped = true;
                debug!(pid, %status, "killed command reaped");
            }
            Err(err) => warn!(pid, %err, "failed to reap killed command"),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Close the read end of the child's stdout pipe, reporting close errors
/// that dropping the handle would swallow.
pub(crate) fn close_pipe(stdout: ChildStdout) -> io::Result<()> {
    match close(stdout) {
        // the descriptor is released even when close is interrupted
        Ok(()) | Err(Errno::EINTR) => Ok(()),
        Err(errno) => Err(io::Error::from(errno)),
    }
}
