pub mod base_commands;
pub mod dependencies_cmd;
pub mod forecast_cmd;
pub mod graph_cmd;
pub mod report_format;
