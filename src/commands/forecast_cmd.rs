use tracing::info;

use sprint_analytics::services::date_parsing::parse_date;
use sprint_analytics::services::forecast_config::ForecastConfig;
use sprint_analytics::services::simulation::{ForecastParams, forecast_project, forecast_sprint};
use sprint_analytics::services::sprint_yaml::load_sprints_from_yaml_file;

use crate::commands::base_commands::{CommandError, Commands, select_sprint, write_output};
use crate::commands::report_format::format_forecast;

pub fn forecast_command(cmd: Commands) -> Result<(), CommandError> {
    if let Commands::Forecast {
        input,
        project,
        sprint,
        simulations,
        today,
        seed,
        workers,
        config,
        format,
        output,
    } = cmd
    {
        let mut params = ForecastParams::new(parse_date(&today)?);
        if let Some(path) = &config {
            ForecastConfig::from_yaml_file(path)?.apply_to(&mut params)?;
        }
        if let Some(simulations) = simulations {
            params.simulations = simulations;
        }
        if let Some(seed) = seed {
            params.seed = Some(seed);
        }
        if let Some(workers) = workers {
            params.workers = workers;
        }

        let sprints = load_sprints_from_yaml_file(&input)?;
        let forecast = if project {
            forecast_project(&sprints, &params)?
        } else {
            let timebox = select_sprint(&sprints, sprint.as_deref())?;
            info!(sprint = %timebox.name, "forecasting sprint");
            forecast_sprint(timebox, &params)?
        };

        write_output(output.as_deref(), &format_forecast(&forecast, format)?)?;
    }
    Ok(())
}
