use sprint_analytics::services::dependency_graph::DependencyGraph;
use sprint_analytics::services::graph_yaml::load_graph_from_yaml_file;

use crate::commands::base_commands::{CommandError, Commands, write_output};

pub fn graph_command(cmd: Commands) -> Result<(), CommandError> {
    if let Commands::Graph { input } = cmd {
        let graph = load_graph_from_yaml_file(&input)?;
        write_output(None, &format_graph_report(&graph))?;
    }
    Ok(())
}

pub fn format_graph_report(graph: &DependencyGraph) -> String {
    let cycle = match graph.detect_cycle() {
        Some(cycle) => {
            let mut chain = cycle.clone();
            if let Some(first) = cycle.first() {
                chain.push(first.clone());
            }
            chain.join(" → ")
        }
        None => "No cycle detected.".to_string(),
    };
    let order = match graph.topological_sort() {
        Some(order) => order
            .iter()
            .enumerate()
            .map(|(idx, id)| format!("{}. {id}", idx + 1))
            .collect::<Vec<_>>()
            .join("\n"),
        None => "No complete order: the graph contains a cycle.".to_string(),
    };

    format!(
        "# Dependency Graph\n\n{}\n\n```mermaid\n{}\n```\n\n## First Cycle\n{cycle}\n\n## Order\n{order}\n",
        graph.to_markdown_table(),
        graph.to_mermaid()
    )
}
