use std::io;
use std::thread::{self, JoinHandle};

use libc::c_int;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use signal_hook::consts::signal::{SIGBUS, SIGCHLD, SIGPIPE, SIGTRAP};
use signal_hook::consts::FORBIDDEN;
use signal_hook::iterator::{Handle, Signals};
use tracing::{debug, trace, warn};

/// Catchable signals that stay out of the relay. SIGBUS and SIGTRAP are
/// faults raised by this process itself, SIGCHLD reports our own child and
/// SIGPIPE stays ignored so a closed output shows up as a write error.
const NOT_RELAYED: &[c_int] = &[SIGBUS, SIGTRAP, SIGCHLD, SIGPIPE];

/// Every signal forwarded to the child while it runs: all signals the OS
/// defines, realtime ones included, minus those signal-hook refuses to catch
/// and [`NOT_RELAYED`].
///
/// Catching a signal replaces its default action, so nothing in this set can
/// terminate this process while the child is still running.
pub fn relayed_signals() -> Vec<c_int> {
    let standard = Signal::iterator().map(|signal| signal as c_int);
    standard
        .chain(realtime_signals())
        .filter(|raw| !FORBIDDEN.contains(raw) && !NOT_RELAYED.contains(raw))
        .collect()
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn realtime_signals() -> std::ops::RangeInclusive<c_int> {
    libc::SIGRTMIN()..=libc::SIGRTMAX()
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn realtime_signals() -> std::ops::Range<c_int> {
    0..0
}

/// Background thread that forwards every relayed signal this process receives
/// to one child pid, until stopped or dropped.
///
/// Delivery is best-effort. Pending signals are kept as a set, so repeats of
/// the same signal that land before the thread wakes up are folded into one;
/// distinct signals are never lost.
pub struct SignalRelay {
    handle: Handle,
    thread: Option<JoinHandle<usize>>,
}

impl SignalRelay {
    pub fn start(pid: u32) -> io::Result<Self> {
        let target = Pid::from_raw(pid as libc::pid_t);
        let mut signals = Signals::new(relayed_signals())?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signal-relay".to_string())
            .spawn(move || {
                let mut relayed = 0;
                for raw in signals.forever() {
                    forward(target, raw);
                    relayed += 1;
                }
                relayed
            })?;

        debug!(pid, "signal relay started");
        Ok(SignalRelay {
            handle,
            thread: Some(thread),
        })
    }

    /// Stop relaying and release the registration. Returns how many signals
    /// were forwarded.
    pub fn stop(mut self) -> usize {
        self.shutdown()
    }

    fn shutdown(&mut self) -> usize {
        self.handle.close();
        let Some(thread) = self.thread.take() else {
            return 0;
        };

        let relayed = thread.join().unwrap_or(0);
        debug!(relayed, "signal relay stopped");
        relayed
    }
}

impl Drop for SignalRelay {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn forward(target: Pid, raw: c_int) {
    let sent = match Signal::try_from(raw) {
        Ok(signal) => kill(target, signal),
        Err(_) => kill_raw(target, raw),
    };

    match sent {
        Ok(()) => trace!(raw, pid = %target, "forwarded signal"),
        // child already gone; its exit status will say why
        Err(Errno::ESRCH) => debug!(raw, pid = %target, "child exited before signal"),
        Err(err) => warn!(raw, pid = %target, %err, "failed to forward signal"),
    }
}

/// `kill` for signal numbers without a [`Signal`] variant (realtime signals).
fn kill_raw(target: Pid, raw: c_int) -> nix::Result<()> {
    // SAFETY: kill(2) takes plain integers and touches no memory.
    let res = unsafe { libc::kill(target.as_raw(), raw) };
    Errno::result(res).map(drop)
}
