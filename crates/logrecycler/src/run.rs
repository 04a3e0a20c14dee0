//! One run of logrecycler: load the config, pick an input, relay until done

use recycler_config::load_config;
use recycler_core::LineTransformer;
use recycler_host_api::HostError;
use recycler_host_linux::{stdin_is_piped, StdinSource, Supervisor, LINE_BUFFER};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncWrite, Stderr, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::RunResult;
use crate::input::InputSource;
use crate::relay::LineRelay;

/// Run to completion and return the process exit code
pub async fn run(config_path: &Path, command: Vec<String>) -> RunResult<u8> {
    let config = load_config(config_path)?;
    info!(
        config_path = %config_path.display(),
        patterns = config.patterns.len(),
        preprocess = config.preprocess.is_some(),
        "Configuration loaded"
    );

    let transformer = LineTransformer::new(Arc::new(config));
    let relay = LineRelay::new(transformer, tokio::io::stdout(), tokio::io::stderr());

    match InputSource::select(stdin_is_piped(), command)? {
        InputSource::Stdin => run_stdin(relay).await,
        InputSource::Command(argv) => run_command(&argv, relay).await,
    }
}

async fn run_stdin(relay: LineRelay<Stdout, Stderr>) -> RunResult<u8> {
    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let reader = StdinSource::start(tx);

    let stats = relay.run(rx).await?;
    let lines = reader
        .await
        .map_err(|e| HostError::Internal(e.to_string()))??;

    debug!(lines, records = stats.records, discarded = stats.discarded, "Stdin exhausted");
    Ok(0)
}

/// Launch the command, relay its output, and mirror its termination
pub async fn run_command<O, E>(argv: &[String], relay: LineRelay<O, E>) -> RunResult<u8>
where
    O: AsyncWrite + Unpin,
    E: AsyncWrite + Unpin,
{
    let mut supervisor = Supervisor::launch(argv)?;
    let group = supervisor.group();
    let streams = supervisor.take_streams()?;

    let (tx, rx) = mpsc::channel(LINE_BUFFER);
    let drains = streams.start(tx);

    // A failed relay must not leave the command running
    let relaying = async {
        let result = relay.run(rx).await;
        if result.is_err() {
            warn!(pgid = group.pgid(), "Output failed, killing process group");
            let _ = group.kill();
        }
        result
    };

    let (relayed, outcome) = tokio::join!(relaying, supervisor.wait());
    let stats = relayed?;
    let outcome = outcome?;
    let drained = drains.join().await?;

    debug!(
        stdout_lines = drained.stdout_lines,
        stderr_lines = drained.stderr_lines,
        records = stats.records,
        discarded = stats.discarded,
        "Command output drained"
    );

    Ok(outcome.exit_code())
}
