//! compose-core CLI entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use compose_core::cli::{Cli, CommandDispatcher};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
///
/// Logs go to stderr so stdout only carries command output.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("compose_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("compose_core=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("compose-core starting with args: {:?}", cli);

    let current_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };
    let dispatcher = CommandDispatcher::from_cli(&cli, &current_dir);

    // Not locked: the progress renderer writes to stdout from its own thread.
    let mut stdout = io::stdout();
    match dispatcher.dispatch(&cli.command, &mut stdout) {
        Ok(result) => ExitCode::from(result.process_exit_code()),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}
