use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::calendar::{FreeDateRange, WorkCalendar};
use crate::services::date_parsing::{DateParseError, parse_date};
use crate::services::simulation::ForecastParams;

#[derive(Error, Debug)]
pub enum ForecastConfigError {
    #[error("failed to read forecast config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse forecast config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid weekday value: {0}")]
    InvalidWeekday(String),
    #[error("invalid date in forecast config: {0}")]
    Date(#[from] DateParseError),
    #[error("invalid date range: start_date {start_date} is after end_date {end_date}")]
    InvalidDateRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    pub simulations: Option<usize>,
    pub seed: Option<u64>,
    pub workers: Option<usize>,
    pub day_cap: Option<u32>,
    /// Replaces the default Saturday/Sunday weekend when present.
    pub free_weekdays: Option<Vec<String>>,
    pub free_date_ranges: Vec<FreeDateRangeRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FreeDateRangeRecord {
    pub start_date: String,
    pub end_date: String,
}

impl ForecastConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ForecastConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ForecastConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, ForecastConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }

    /// Overwrites every parameter the file sets.
    pub fn apply_to(&self, params: &mut ForecastParams) -> Result<(), ForecastConfigError> {
        if let Some(simulations) = self.simulations {
            params.simulations = simulations;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if let Some(workers) = self.workers {
            params.workers = workers;
        }
        if let Some(day_cap) = self.day_cap {
            params.day_cap = Some(day_cap);
        }
        params.calendar = self.calendar()?;
        Ok(())
    }

    pub fn calendar(&self) -> Result<WorkCalendar, ForecastConfigError> {
        let mut calendar = WorkCalendar::new();
        if let Some(values) = &self.free_weekdays {
            calendar.free_weekdays = values
                .iter()
                .map(|value| parse_weekday(value))
                .collect::<Result<Vec<_>, _>>()?;
        }
        for record in &self.free_date_ranges {
            let start_date = parse_date(&record.start_date)?;
            let end_date = parse_date(&record.end_date)?;
            if start_date > end_date {
                return Err(ForecastConfigError::InvalidDateRange {
                    start_date,
                    end_date,
                });
            }
            calendar.free_date_ranges.push(FreeDateRange {
                start_date,
                end_date,
            });
        }
        Ok(calendar)
    }
}

fn parse_weekday(value: &str) -> Result<Weekday, ForecastConfigError> {
    value
        .trim()
        .parse::<Weekday>()
        .map_err(|_| ForecastConfigError::InvalidWeekday(value.to_string()))
}
