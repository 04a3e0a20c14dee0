//! logrecycler - turn plain-text logs into JSON
//!
//! Reads lines either from a pipe or from the output of a command given
//! after `--`, and writes one JSON record per line to stdout:
//! - Configuration loading and validation
//! - Input selection (piped stdin or wrapped command)
//! - Process supervision with signal forwarding
//! - Exit code mirroring of the wrapped command

mod error;
mod input;
mod relay;
mod run;

use clap::Parser;
use recycler_util::{default_config_path, ExitClass, PROGRAM_NAME};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// logrecycler - Turn plain-text logs into JSON records
#[derive(Parser, Debug)]
#[command(name = PROGRAM_NAME, version)]
#[command(about = "Turn plain-text logs into JSON records", long_about = None)]
struct Args {
    /// Configuration file path (default: ./logrecycler.yaml, or set LOGRECYCLER_CONFIG)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Diagnostic log filter, written to stderr (RUST_LOG takes precedence)
    #[arg(short, long, env = "LOGRECYCLER_LOG", default_value = "off")]
    log_level: String,

    /// Command to run; its output is recycled instead of stdin
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "logrecycler starting");

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: runtime: {}", e);
            return ExitCode::from(ExitClass::Runtime.code());
        }
    };

    let result = runtime.block_on(run::run(&args.config, args.command));

    // A pending read on our own stdin must not hold up the exit
    runtime.shutdown_background();

    match result {
        Ok(code) => {
            info!(code, "logrecycler finished");
            ExitCode::from(code)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
