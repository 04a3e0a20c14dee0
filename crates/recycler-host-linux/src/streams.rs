//! Draining of the child's output pipes

use recycler_host_api::{HostError, HostResult, RawLine, StreamOrigin};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capacity of the line channel between the drains and the relay.
/// A slow consumer applies backpressure to the child through its pipes.
pub const LINE_BUFFER: usize = 1024;

/// Both output pipes of one child
pub struct StreamMultiplexer {
    stdout: ChildStdout,
    stderr: ChildStderr,
}

impl StreamMultiplexer {
    pub fn new(stdout: ChildStdout, stderr: ChildStderr) -> Self {
        Self { stdout, stderr }
    }

    /// Start one drain task per pipe, both feeding `tx`.
    ///
    /// Lines keep their order within a stream; the two streams interleave
    /// in whatever order they arrive.
    pub fn start(self, tx: mpsc::Sender<RawLine>) -> DrainHandles {
        let stdout = tokio::spawn(drain_lines(self.stdout, StreamOrigin::Stdout, tx.clone()));
        let stderr = tokio::spawn(drain_lines(self.stderr, StreamOrigin::Stderr, tx));
        DrainHandles { stdout, stderr }
    }
}

/// Line counts per stream, reported once both pipes hit EOF
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainStats {
    pub stdout_lines: u64,
    pub stderr_lines: u64,
}

pub struct DrainHandles {
    stdout: JoinHandle<HostResult<u64>>,
    stderr: JoinHandle<HostResult<u64>>,
}

impl DrainHandles {
    /// Wait until both pipes are closed
    pub async fn join(self) -> HostResult<DrainStats> {
        let (stdout, stderr) = tokio::join!(self.stdout, self.stderr);
        let stdout_lines = stdout.map_err(|e| HostError::Internal(e.to_string()))??;
        let stderr_lines = stderr.map_err(|e| HostError::Internal(e.to_string()))??;
        Ok(DrainStats {
            stdout_lines,
            stderr_lines,
        })
    }
}

/// Read `reader` to EOF, sending each line tagged with `origin`.
///
/// A final line without a trailing newline is still sent. Once the receiver
/// is gone the reader is still drained, so the writer never blocks on a full
/// pipe.
pub async fn drain_lines<R>(reader: R, origin: StreamOrigin, tx: mpsc::Sender<RawLine>) -> HostResult<u64>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut count = 0u64;
    let mut receiver_open = true;

    loop {
        let mut buf = Vec::new();
        let n = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| HostError::Read {
                stream: origin.as_str(),
                source,
            })?;
        if n == 0 {
            break;
        }

        count += 1;
        if receiver_open && tx.send(RawLine::new(origin, buf)).await.is_err() {
            debug!(stream = %origin, "Line receiver closed, discarding remaining output");
            receiver_open = false;
        }
    }

    debug!(stream = %origin, lines = count, "Stream reached EOF");
    Ok(count)
}
