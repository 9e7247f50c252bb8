pub mod date_parsing;
pub mod dependency_graph;
pub mod forecast_classification;
pub mod forecast_config;
pub mod graph_yaml;
pub mod percentiles;
pub mod simulation;
pub mod simulation_types;
pub mod sprint_dependency_analyzer;
pub mod sprint_dependency_report;
pub mod sprint_yaml;
pub mod velocity_calculation;
