use std::io;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use thiserror::Error;

use sprint_analytics::domain::timebox::{TimeBox, TimeBoxStatus};
use sprint_analytics::services::date_parsing::{DATE_FORMAT, DateParseError};
use sprint_analytics::services::forecast_config::ForecastConfigError;
use sprint_analytics::services::graph_yaml::GraphYamlError;
use sprint_analytics::services::simulation::ForecastError;
use sprint_analytics::services::sprint_dependency_analyzer::AnalyzerError;
use sprint_analytics::services::sprint_yaml::SprintYamlError;

use crate::commands::report_format::ReportFormat;

#[derive(Parser)]
#[command(author, version, about)]
pub struct CliArgs {
    /// Log output format; verbosity follows RUST_LOG (default: warn)
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the dependency report of a sprint as Markdown
    Dependencies {
        /// Sprint YAML file
        #[arg(short, long)]
        input: String,
        /// Output Markdown file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Sprint to analyze (defaults to the active sprint)
        #[arg(short, long)]
        sprint: Option<String>,
    },
    /// Forecast sprint or project completion with Monte Carlo simulation
    Forecast {
        /// Sprint YAML file
        #[arg(short, long)]
        input: String,
        /// Forecast every sprint in the file against the last end date
        #[arg(long)]
        project: bool,
        /// Sprint to forecast (defaults to the active sprint)
        #[arg(short, long, conflicts_with = "project")]
        sprint: Option<String>,
        /// Number of simulation runs [default: 10000]
        #[arg(short = 'n', long)]
        simulations: Option<usize>,
        /// First simulated day (YYYY-MM-DD)
        #[arg(short, long, default_value_t = default_today())]
        today: String,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
        /// Number of simulation threads
        #[arg(short, long)]
        workers: Option<usize>,
        /// Forecast config YAML file; flags override its values
        #[arg(short, long)]
        config: Option<String>,
        /// Report format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Analyze a generic vertex/edge dependency graph
    Graph {
        /// Graph YAML file
        #[arg(short, long)]
        input: String,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    SprintYaml(#[from] SprintYamlError),
    #[error(transparent)]
    GraphYaml(#[from] GraphYamlError),
    #[error(transparent)]
    Config(#[from] ForecastConfigError),
    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error("invalid --today value: {0}")]
    Today(#[from] DateParseError),
    #[error("no sprint named '{0}' in the input")]
    UnknownSprint(String),
    #[error("failed to render report: {0}")]
    Render(String),
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
}

fn default_today() -> String {
    Local::now().date_naive().format(DATE_FORMAT).to_string()
}

/// Picks the sprint named `name`, or else the first one in progress, or else
/// the last one in the file.
pub fn select_sprint<'a>(
    sprints: &'a [TimeBox],
    name: Option<&str>,
) -> Result<&'a TimeBox, CommandError> {
    if let Some(name) = name {
        return sprints
            .iter()
            .find(|sprint| sprint.name == name)
            .ok_or_else(|| CommandError::UnknownSprint(name.to_string()));
    }
    sprints
        .iter()
        .find(|sprint| sprint.status == TimeBoxStatus::InProgress)
        .or_else(|| sprints.last())
        .ok_or_else(|| CommandError::UnknownSprint(String::new()))
}

/// Writes `contents` to `output`, or prints it when no path is given.
pub fn write_output(output: Option<&str>, contents: &str) -> Result<(), CommandError> {
    match output {
        Some(path) => {
            std::fs::write(path, contents).map_err(|source| CommandError::Write {
                path: path.to_string(),
                source,
            })?;
            println!("Report written to {path}");
        }
        None => print!("{contents}"),
    }
    Ok(())
}
