//! Process supervision

use recycler_host_api::{ChildHandle, ChildState, ExitOutcome, HostError, HostResult};
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::signals::{ProcessGroup, SignalForwarder, SignalSet};
use crate::streams::StreamMultiplexer;

/// Supervised child process leading its own process group
///
/// Owns the child exclusively. Dropping an unreaped supervisor kills the group.
pub struct Supervisor {
    child: Child,
    handle: ChildHandle,
    state: ChildState,
    forwarder: SignalForwarder,
}

impl Supervisor {
    /// Spawn `argv` in a new process group and start forwarding signals to it
    pub fn launch(argv: &[String]) -> HostResult<Self> {
        let (program, args) = argv.split_first().ok_or(HostError::EmptyCommand)?;
        let executable = resolve_executable(program)?;

        // Installed before spawning so no signal slips through unforwarded
        let signals = SignalSet::install()?;

        let mut cmd = Command::new(&executable);
        cmd.arg0(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // SAFETY: setsid is async-signal-safe and the closure does not allocate
        unsafe {
            cmd.pre_exec(|| {
                // New session, which creates a new process group led by the child
                nix::unistd::setsid().map_err(io::Error::from)?;
                Ok(())
            });
        }

        let child = cmd.spawn().map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => HostError::ExecutableNotFound {
                program: program.clone(),
            },
            _ => HostError::SpawnFailed {
                program: program.clone(),
                source,
            },
        })?;

        let pid = child
            .id()
            .ok_or_else(|| HostError::Internal("spawned child has no pid".into()))?;
        let handle = ChildHandle::new(pid); // After setsid, pid == pgid

        let forwarder = SignalForwarder::start(signals, ProcessGroup::new(handle.pgid));

        debug!(pid = handle.pid, pgid = handle.pgid, program = %program, "Process spawned");

        Ok(Self {
            child,
            handle,
            state: ChildState::Running,
            forwarder,
        })
    }

    pub fn handle(&self) -> ChildHandle {
        self.handle
    }

    pub fn state(&self) -> ChildState {
        self.state
    }

    /// Copyable group reference, for teardown from other tasks
    pub fn group(&self) -> ProcessGroup {
        ProcessGroup::new(self.handle.pgid)
    }

    /// Take the child's output pipes. Succeeds once.
    pub fn take_streams(&mut self) -> HostResult<StreamMultiplexer> {
        let stdout = self
            .child
            .stdout
            .take()
            .ok_or(HostError::StreamUnavailable("stdout"))?;
        let stderr = self
            .child
            .stderr
            .take()
            .ok_or(HostError::StreamUnavailable("stderr"))?;
        Ok(StreamMultiplexer::new(stdout, stderr))
    }

    /// Wait for the child to terminate, then kill whatever is left of its group.
    ///
    /// Background descendants would otherwise outlive the run and keep the
    /// output pipes open.
    pub async fn wait(&mut self) -> HostResult<ExitOutcome> {
        let status = match self.child.wait().await {
            Ok(status) => status,
            Err(e) => {
                let _ = self.group().kill();
                return Err(HostError::Wait(e));
            }
        };
        self.forwarder.stop();

        let outcome = match (status.code(), status.signal()) {
            (Some(code), _) => ExitOutcome::with_code(code),
            (None, Some(sig)) => ExitOutcome::signaled(sig, self.forwarder.forwarded(sig)),
            (None, None) => ExitOutcome::with_code(-1),
        };
        self.state = outcome.state();

        info!(pid = self.handle.pid, outcome = %outcome, "Process exited");

        if let Err(e) = self.group().kill() {
            warn!(pgid = self.handle.pgid, error = %e, "Failed to clean up process group");
        }

        Ok(outcome)
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.forwarder.stop();
        if matches!(self.state, ChildState::Starting | ChildState::Running) {
            debug!(pgid = self.handle.pgid, "Supervisor dropped before exit, killing process group");
            let _ = self.group().kill();
        }
    }
}

/// Resolve a program through `$PATH`, or as a path when it contains a slash
pub fn resolve_executable(program: &str) -> HostResult<PathBuf> {
    which::which(program).map_err(|_| HostError::ExecutableNotFound {
        program: program.to_string(),
    })
}
