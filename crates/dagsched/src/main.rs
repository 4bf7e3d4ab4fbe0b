//! dagsched: analyze task dependency graphs from the command line.

mod cli;
mod commands;
mod errors;
mod generator;
mod loader;
mod report;
mod tracing;

use crate::commands::Command;
use crate::tracing::{TracingConfig, init_tracing};

fn main() {
    if let Err(error) = run() {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("{error:?}");
        }
        std::process::exit(1);
    }
}

fn run() -> miette::Result<()> {
    let cli = cli::parse();

    init_tracing(TracingConfig {
        format: cli.tracing_format(),
        level: cli.level.into(),
        ..Default::default()
    })?;

    let command: Command = cli.command.into();
    let span = ::tracing::info_span!("command", command = command.name());
    let _guard = span.enter();

    commands::execute(command)?;
    ::tracing::debug!("Command completed");
    Ok(())
}
