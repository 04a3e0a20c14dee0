//! Line relay: transformed records to stdout, child stderr passed through

use recycler_core::LineTransformer;
use recycler_host_api::RawLine;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{RunError, RunResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub records: u64,
    pub discarded: u64,
    pub passed_through: u64,
}

/// Consumes raw lines and writes them out, one flush per line
pub struct LineRelay<O, E> {
    transformer: LineTransformer,
    out: O,
    err: E,
    stats: RelayStats,
}

impl<O, E> LineRelay<O, E>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    pub fn new(transformer: LineTransformer, out: O, err: E) -> Self {
        Self {
            transformer,
            out,
            err,
            stats: RelayStats::default(),
        }
    }

    /// Relay every line until all senders are gone
    pub async fn run(mut self, mut rx: mpsc::Receiver<RawLine>) -> RunResult<RelayStats> {
        while let Some(line) = rx.recv().await {
            self.relay(&line).await?;
        }
        Ok(self.stats)
    }

    pub async fn relay(&mut self, line: &RawLine) -> RunResult<()> {
        if !line.origin.is_transformed() {
            write_flushed(&mut self.err, "stderr", line.as_bytes()).await?;
            self.stats.passed_through += 1;
            return Ok(());
        }

        match self.transformer.transform(&line.text()) {
            Some(record) => {
                let mut json = record.to_json()?;
                json.push('\n');
                write_flushed(&mut self.out, "stdout", json.as_bytes()).await?;
                self.stats.records += 1;
            }
            None => {
                trace!(stream = %line.origin, "Line discarded");
                self.stats.discarded += 1;
            }
        }
        Ok(())
    }
}

async fn write_flushed<W>(writer: &mut W, stream: &'static str, bytes: &[u8]) -> RunResult<()>
where
    W: AsyncWrite + Unpin,
{
    let result = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;
    result.map_err(|source| RunError::Output { stream, source })
}
