use clap::ValueEnum;

use sprint_analytics::services::simulation_types::{
    Forecast, ForecastReport, ForecastVariant, SimulationPercentile,
};

use crate::commands::base_commands::CommandError;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
    Yaml,
    Json,
}

pub fn format_forecast(forecast: &Forecast, format: ReportFormat) -> Result<String, CommandError> {
    match format {
        ReportFormat::Text => Ok(format_forecast_text(forecast)),
        ReportFormat::Markdown => Ok(format_forecast_markdown(forecast)),
        ReportFormat::Yaml => {
            serde_yaml::to_string(forecast).map_err(|e| CommandError::Render(e.to_string()))
        }
        ReportFormat::Json => serde_json::to_string_pretty(forecast)
            .map(|json| format!("{json}\n"))
            .map_err(|e| CommandError::Render(e.to_string())),
    }
}

fn title(variant: ForecastVariant) -> &'static str {
    match variant {
        ForecastVariant::Sprint => "Sprint Forecast",
        ForecastVariant::Project => "Project Forecast",
    }
}

pub fn format_forecast_text(forecast: &Forecast) -> String {
    let mut lines = Vec::new();
    let report = match forecast {
        Forecast::InsufficientData {
            variant,
            start_date,
            planned_end_date,
        } => {
            lines.push(format!("{} Report", title(*variant)));
            lines.push(format!("Start date: {start_date}"));
            lines.push(format!("Planned end date: {planned_end_date}"));
            lines.push("Insufficient data: there are no items to forecast.".to_string());
            return lines.join("\n") + "\n";
        }
        Forecast::Simulated(report) => report,
    };

    lines.push(format!("{} Report", title(report.variant)));
    lines.push(format!("Start date: {}", report.start_date));
    lines.push(format!("Planned end date: {}", report.planned_end_date));
    lines.push(format!(
        "Simulations: {} (converged: {}, unfinished: {})",
        report.simulations, report.converged_runs, report.unfinished_runs
    ));
    lines.push(format!(
        "Items: {} total, {} completed, {} remaining",
        report.total_items, report.completed_items, report.remaining_items
    ));
    lines.push(format!(
        "Average velocity: {:.2} items/day",
        report.average_velocity
    ));
    lines.push(format!(
        "On-time probability: {:.1}%",
        report.on_time_probability
    ));
    lines.push(format!(
        "Most likely completion: {} ({:+} days)",
        report.most_likely_date, report.delay_days
    ));
    lines.push(format!("Delay: {}", report.delay));
    lines.push(format!("Risk: {}", report.risk));
    if report.used_fallback {
        lines.push(
            "Note: no run finished within the day cap; the planned end date is assumed."
                .to_string(),
        );
    }

    lines.push(String::new());
    lines.push("Percentiles:".to_string());
    lines.push("Percentile | Days | Date".to_string());
    lines.push("-----------|------|-----".to_string());
    lines.extend(percentile_rows(report).map(|(label, p)| {
        format!("{label} | {} | {}", p.days, p.date)
    }));

    lines.push(String::new());
    lines.push("Completion dates:".to_string());
    lines.push("Date | Probability | Cumulative".to_string());
    lines.push("-----|-------------|-----------".to_string());
    for bucket in &report.buckets {
        lines.push(format!(
            "{} | {:.1}% | {:.1}%",
            bucket.date, bucket.probability, bucket.cumulative_probability
        ));
    }

    lines.push(String::new());
    lines.push("Recommendations:".to_string());
    lines.extend(report.recommendations.iter().map(|line| format!("- {line}")));

    lines.join("\n") + "\n"
}

pub fn format_forecast_markdown(forecast: &Forecast) -> String {
    let report = match forecast {
        Forecast::InsufficientData {
            variant,
            start_date,
            planned_end_date,
        } => {
            return format!(
                "# {}\n\nNo items to forecast between {start_date} and {planned_end_date}.\n",
                title(*variant)
            );
        }
        Forecast::Simulated(report) => report,
    };

    let mut lines = vec![
        format!("# {}", title(report.variant)),
        String::new(),
        "| Metric | Value |".to_string(),
        "|--------|-------|".to_string(),
        format!("| Start date | {} |", report.start_date),
        format!("| Planned end date | {} |", report.planned_end_date),
        format!("| Most likely completion | {} |", report.most_likely_date),
        format!("| Delay | {:+} days ({}) |", report.delay_days, report.delay),
        format!("| On-time probability | {:.1}% |", report.on_time_probability),
        format!("| Risk | {} |", report.risk),
        format!(
            "| Items | {} of {} done |",
            report.completed_items, report.total_items
        ),
        format!("| Average velocity | {:.2} items/day |", report.average_velocity),
        format!(
            "| Runs | {} converged, {} unfinished |",
            report.converged_runs, report.unfinished_runs
        ),
    ];
    lines.extend(
        percentile_rows(report).map(|(label, p)| format!("| {label} | {} ({} days) |", p.date, p.days)),
    );

    lines.push(String::new());
    lines.push("## Completion Dates".to_string());
    lines.push(String::new());
    lines.push("| Date | Probability | Cumulative |".to_string());
    lines.push("|------|-------------|------------|".to_string());
    for bucket in &report.buckets {
        lines.push(format!(
            "| {} | {:.1}% | {:.1}% |",
            bucket.date, bucket.probability, bucket.cumulative_probability
        ));
    }

    lines.push(String::new());
    lines.push("## Recommendations".to_string());
    lines.push(String::new());
    lines.extend(report.recommendations.iter().map(|line| format!("- {line}")));

    lines.join("\n") + "\n"
}

fn percentile_rows(
    report: &ForecastReport,
) -> impl Iterator<Item = (&'static str, &SimulationPercentile)> {
    [("P50", &report.p50), ("P85", &report.p85), ("P100", &report.p100)].into_iter()
}
