//! Standard input as a line source

use nix::sys::stat::{fstat, SFlag};
use recycler_host_api::{HostResult, RawLine, StreamOrigin};
use std::os::fd::AsRawFd;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::streams::drain_lines;

/// Whether standard input is fed by a pipe or file rather than a terminal
///
/// Anything that is not a character device counts as piped. If stdin
/// cannot be inspected at all it is treated as not piped.
pub fn stdin_is_piped() -> bool {
    match fstat(std::io::stdin().as_raw_fd()) {
        Ok(stat) => !is_char_device(stat.st_mode),
        Err(e) => {
            debug!(error = %e, "Cannot stat stdin");
            false
        }
    }
}

fn is_char_device(mode: nix::libc::mode_t) -> bool {
    SFlag::from_bits_truncate(mode) & SFlag::S_IFMT == SFlag::S_IFCHR
}

/// Reader task over the process's own standard input
pub struct StdinSource;

impl StdinSource {
    /// Drain stdin into `tx` until EOF. Resolves to the number of lines read.
    pub fn start(tx: mpsc::Sender<RawLine>) -> JoinHandle<HostResult<u64>> {
        tokio::spawn(drain_lines(tokio::io::stdin(), StreamOrigin::Stdin, tx))
    }
}
