mod commands;

use std::io;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::commands::base_commands::{CliArgs, Commands, LogFormat};
use crate::commands::dependencies_cmd::dependencies_command;
use crate::commands::forecast_cmd::forecast_command;
use crate::commands::graph_cmd::graph_command;

const DEFAULT_LOG_LEVEL: &str = "warn";

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(e) = init_logging(args.log_format) {
        eprintln!("Failed to initialise logging: {e}");
    }

    let result = match args.command {
        cmd @ Commands::Dependencies { .. } => dependencies_command(cmd),
        cmd @ Commands::Forecast { .. } => forecast_command(cmd),
        cmd @ Commands::Graph { .. } => graph_command(cmd),
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            generate(shell, &mut command, name, &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so reports printed to stdout stay clean.
fn init_logging(format: LogFormat) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(io::stderr))
            .try_init(),
    }
}
