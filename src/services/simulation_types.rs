use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::services::forecast_classification::{
    DelayThresholds, PROJECT_DELAY_THRESHOLDS, SPRINT_DELAY_THRESHOLDS,
};
use crate::services::simulation::{PROJECT_DAY_CAP, SPRINT_DAY_CAP};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastVariant {
    Sprint,
    Project,
}

impl ForecastVariant {
    pub fn day_cap(self) -> u32 {
        match self {
            ForecastVariant::Sprint => SPRINT_DAY_CAP,
            ForecastVariant::Project => PROJECT_DAY_CAP,
        }
    }

    pub fn delay_thresholds(self) -> DelayThresholds {
        match self {
            ForecastVariant::Sprint => SPRINT_DELAY_THRESHOLDS,
            ForecastVariant::Project => PROJECT_DELAY_THRESHOLDS,
        }
    }
}

impl fmt::Display for ForecastVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastVariant::Sprint => write!(f, "sprint"),
            ForecastVariant::Project => write!(f, "project"),
        }
    }
}

/// Probability mass of one simulated completion day. Both values are
/// percentages in `0.0..=100.0`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CompletionDateBucket {
    pub date: NaiveDate,
    pub probability: f64,
    pub cumulative_probability: f64,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DelayClass {
    AheadOfSchedule,
    OnTime,
    MinorDelay,
    ModerateDelay,
    CriticalDelay,
}

impl fmt::Display for DelayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DelayClass::AheadOfSchedule => "ahead of schedule",
            DelayClass::OnTime => "on time",
            DelayClass::MinorDelay => "minor delay",
            DelayClass::ModerateDelay => "moderate delay",
            DelayClass::CriticalDelay => "critical delay",
        };
        write!(f, "{label}")
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    LikelyOnTime,
    ModerateRisk,
    HighRisk,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::LikelyOnTime => "likely on time",
            RiskLevel::ModerateRisk => "moderate risk",
            RiskLevel::HighRisk => "high risk",
        };
        write!(f, "{label}")
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SimulationPercentile {
    /// Calendar days after the simulation start.
    pub days: i64,
    pub date: NaiveDate,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastReport {
    pub variant: ForecastVariant,
    pub start_date: NaiveDate,
    pub planned_end_date: NaiveDate,
    pub simulations: usize,
    pub converged_runs: usize,
    pub unfinished_runs: usize,
    /// Set when no run finished inside the day cap and the distribution is
    /// a single synthetic completion at the planned end date.
    pub used_fallback: bool,
    pub total_items: usize,
    pub completed_items: usize,
    pub remaining_items: usize,
    pub average_velocity: f64,
    pub buckets: Vec<CompletionDateBucket>,
    pub on_time_probability: f64,
    pub most_likely_date: NaiveDate,
    pub delay_days: i64,
    pub delay: DelayClass,
    pub risk: RiskLevel,
    pub recommendations: Vec<String>,
    pub p50: SimulationPercentile,
    pub p85: SimulationPercentile,
    pub p100: SimulationPercentile,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Forecast {
    /// Nothing to simulate: the collection holds no items.
    InsufficientData {
        variant: ForecastVariant,
        start_date: NaiveDate,
        planned_end_date: NaiveDate,
    },
    Simulated(ForecastReport),
}

impl Forecast {
    pub fn report(&self) -> Option<&ForecastReport> {
        match self {
            Forecast::Simulated(report) => Some(report),
            Forecast::InsufficientData { .. } => None,
        }
    }
}
