//! Signal forwarding to the child's process group

use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use recycler_host_api::{HostError, HostResult};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal as listen, SignalKind};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Signals passed on to the wrapped command, so logrecycler behaves like the command it wraps
pub const FORWARDED_SIGNALS: [Signal; 6] = [
    Signal::SIGINT,
    Signal::SIGTERM,
    Signal::SIGQUIT,
    Signal::SIGHUP,
    Signal::SIGUSR1,
    Signal::SIGUSR2,
];

/// Copyable reference to a child's process group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessGroup {
    pgid: u32,
}

impl ProcessGroup {
    pub fn new(pgid: u32) -> Self {
        Self { pgid }
    }

    pub fn pgid(&self) -> u32 {
        self.pgid
    }

    /// Send a signal to every member of the group
    pub fn signal(&self, sig: Signal) -> HostResult<()> {
        let target = Pid::from_raw(-(self.pgid as i32)); // Negative for process group

        match signal::kill(target, sig) {
            Ok(()) => {
                debug!(pgid = self.pgid, signal = sig.as_str(), "Signaled process group");
                Ok(())
            }
            Err(Errno::ESRCH) => {
                // Group already gone
                Ok(())
            }
            Err(e) => Err(HostError::SignalFailed {
                signal: sig.as_str().to_string(),
                pgid: self.pgid,
                message: e.to_string(),
            }),
        }
    }

    /// SIGKILL the whole group
    pub fn kill(&self) -> HostResult<()> {
        self.signal(Signal::SIGKILL)
    }
}

/// Handlers for [`FORWARDED_SIGNALS`], installed before the child is spawned
pub struct SignalSet {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    user1: tokio::signal::unix::Signal,
    user2: tokio::signal::unix::Signal,
}

impl SignalSet {
    /// Install the handlers. Must be called inside a tokio runtime.
    pub fn install() -> HostResult<Self> {
        Ok(Self {
            interrupt: listen(SignalKind::interrupt()).map_err(HostError::SignalSetup)?,
            terminate: listen(SignalKind::terminate()).map_err(HostError::SignalSetup)?,
            quit: listen(SignalKind::quit()).map_err(HostError::SignalSetup)?,
            hangup: listen(SignalKind::hangup()).map_err(HostError::SignalSetup)?,
            user1: listen(SignalKind::user_defined1()).map_err(HostError::SignalSetup)?,
            user2: listen(SignalKind::user_defined2()).map_err(HostError::SignalSetup)?,
        })
    }

    /// Wait for the next delivered signal
    pub async fn recv(&mut self) -> Option<Signal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(Signal::SIGINT),
            Some(()) = self.terminate.recv() => Some(Signal::SIGTERM),
            Some(()) = self.quit.recv() => Some(Signal::SIGQUIT),
            Some(()) = self.hangup.recv() => Some(Signal::SIGHUP),
            Some(()) = self.user1.recv() => Some(Signal::SIGUSR1),
            Some(()) = self.user2.recv() => Some(Signal::SIGUSR2),
            else => None,
        }
    }
}

/// Running forwarder task for one process group
pub struct SignalForwarder {
    task: JoinHandle<()>,
    last_forwarded: Arc<AtomicI32>,
}

impl SignalForwarder {
    /// Forward every signal received by `signals` to `group` until stopped
    pub fn start(mut signals: SignalSet, group: ProcessGroup) -> Self {
        let last_forwarded = Arc::new(AtomicI32::new(0));
        let recorded = last_forwarded.clone();

        let task = tokio::spawn(async move {
            while let Some(sig) = signals.recv().await {
                info!(signal = sig.as_str(), pgid = group.pgid(), "Forwarding signal to process group");
                recorded.store(sig as i32, Ordering::SeqCst);
                if let Err(e) = group.signal(sig) {
                    warn!(error = %e, "Failed to forward signal");
                }
            }
        });

        Self {
            task,
            last_forwarded,
        }
    }

    /// Whether `signal` is the last signal this forwarder sent to the group
    pub fn forwarded(&self, signal: i32) -> bool {
        let last = self.last_forwarded.load(Ordering::SeqCst);
        last != 0 && last == signal
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for SignalForwarder {
    fn drop(&mut self) {
        self.task.abort();
    }
}
