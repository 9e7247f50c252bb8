use sprint_analytics::services::sprint_dependency_analyzer::analyze_timebox;
use sprint_analytics::services::sprint_dependency_report::generate_dependency_markdown;
use sprint_analytics::services::sprint_yaml::load_sprints_from_yaml_file;

use crate::commands::base_commands::{CommandError, Commands, select_sprint, write_output};

pub fn dependencies_command(cmd: Commands) -> Result<(), CommandError> {
    if let Commands::Dependencies {
        input,
        output,
        sprint,
    } = cmd
    {
        let sprints = load_sprints_from_yaml_file(&input)?;
        let timebox = select_sprint(&sprints, sprint.as_deref())?;
        let report = analyze_timebox(timebox)?;
        write_output(output.as_deref(), &generate_dependency_markdown(&report))?;
    }
    Ok(())
}
