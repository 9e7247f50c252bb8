use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::assignment::Assignment;
use crate::domain::calendar::WorkCalendar;
use crate::domain::timebox::TimeBox;
use crate::services::forecast_classification::{
    classify_delay, classify_risk, most_likely_bucket, on_time_probability, recommendations,
};
use crate::services::percentiles::value_from_counts;
use crate::services::simulation_types::{
    CompletionDateBucket, Forecast, ForecastReport, ForecastVariant, SimulationPercentile,
};
use crate::services::velocity_calculation::{average_velocity, calculate_daily_velocity};

pub const DEFAULT_SIMULATIONS: usize = 10_000;
pub const SPRINT_DAY_CAP: u32 = 30;
pub const PROJECT_DAY_CAP: u32 = 90;

const WORKER_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ForecastError {
    #[error("simulation count must be greater than zero")]
    InvalidSimulationCount,
    #[error("worker count must be greater than zero")]
    InvalidWorkerCount,
    #[error("day cap must be greater than zero")]
    InvalidDayCap,
    #[error("calendar has no working weekday")]
    NoWorkdays,
    #[error("project forecast needs at least one sprint")]
    NoTimeBoxes,
    #[error("failed to start simulation workers: {0}")]
    ThreadPool(String),
}

/// Parameters of one forecast call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastParams {
    pub simulations: usize,
    /// First simulated day.
    pub today: NaiveDate,
    /// Overrides the variant's day cap.
    pub day_cap: Option<u32>,
    /// Fixed seed for reproducible runs; entropy-seeded when `None`.
    pub seed: Option<u64>,
    /// Runs are split over this many threads. 1 runs everything inline.
    pub workers: usize,
    pub calendar: WorkCalendar,
}

impl ForecastParams {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            today,
            day_cap: None,
            seed: None,
            workers: 1,
            calendar: WorkCalendar::new(),
        }
    }

    fn validate(&self) -> Result<(), ForecastError> {
        if self.simulations == 0 {
            return Err(ForecastError::InvalidSimulationCount);
        }
        if self.workers == 0 {
            return Err(ForecastError::InvalidWorkerCount);
        }
        if self.day_cap == Some(0) {
            return Err(ForecastError::InvalidDayCap);
        }
        if !self.calendar.has_workdays() {
            return Err(ForecastError::NoWorkdays);
        }
        Ok(())
    }
}

pub fn forecast_sprint(timebox: &TimeBox, params: &ForecastParams) -> Result<Forecast, ForecastError> {
    let assignments: Vec<&Assignment> = timebox.assignments.iter().collect();
    run_forecast(
        ForecastVariant::Sprint,
        &assignments,
        timebox.end_date,
        params,
    )
}

/// Forecasts the union of all sprints against the end date of the last one.
pub fn forecast_project(
    timeboxes: &[TimeBox],
    params: &ForecastParams,
) -> Result<Forecast, ForecastError> {
    let last = timeboxes.last().ok_or(ForecastError::NoTimeBoxes)?;
    let assignments: Vec<&Assignment> = timeboxes
        .iter()
        .flat_map(|timebox| timebox.assignments.iter())
        .collect();
    run_forecast(
        ForecastVariant::Project,
        &assignments,
        last.end_date,
        params,
    )
}

fn run_forecast(
    variant: ForecastVariant,
    assignments: &[&Assignment],
    planned_end: NaiveDate,
    params: &ForecastParams,
) -> Result<Forecast, ForecastError> {
    params.validate()?;

    let total_items = assignments.len();
    if total_items == 0 {
        debug!(%variant, "no items to forecast");
        return Ok(Forecast::InsufficientData {
            variant,
            start_date: params.today,
            planned_end_date: planned_end,
        });
    }
    let completed_items = assignments.iter().filter(|a| a.is_done()).count();

    let samples = calculate_daily_velocity(assignments.iter().copied());
    let velocity: Vec<usize> = samples.iter().map(|s| s.completed_items).collect();
    let input = RunInput {
        velocity: &velocity,
        total_items,
        completed_items,
        start_date: params.today,
        day_cap: params.day_cap.unwrap_or(variant.day_cap()),
        calendar: &params.calendar,
    };
    debug!(
        %variant,
        total_items,
        completed_items,
        velocity_days = velocity.len(),
        simulations = params.simulations,
        "running completion simulation"
    );

    let tally = tally_runs(&input, params)?;
    let converged_runs = tally.converged_runs();
    let mut counts = tally.counts;
    let used_fallback = counts.is_empty();
    if used_fallback {
        warn!(
            %variant,
            day_cap = input.day_cap,
            "no simulation run finished, assuming completion at the planned end date"
        );
        counts.insert(planned_end, 1);
    }

    let buckets = aggregate_buckets(&counts);
    let on_time = on_time_probability(&buckets, planned_end);
    let most_likely_date = most_likely_bucket(&buckets)
        .map(|bucket| bucket.date)
        .unwrap_or(planned_end);
    let delay_days = most_likely_date
        .signed_duration_since(planned_end)
        .num_days();
    let risk = classify_risk(on_time);
    let percentile = |p: f64| {
        let date = value_from_counts(&counts, p).unwrap_or(planned_end);
        SimulationPercentile {
            days: date.signed_duration_since(params.today).num_days(),
            date,
        }
    };

    Ok(Forecast::Simulated(ForecastReport {
        variant,
        start_date: params.today,
        planned_end_date: planned_end,
        simulations: params.simulations,
        converged_runs,
        unfinished_runs: tally.unfinished_runs,
        used_fallback,
        total_items,
        completed_items,
        remaining_items: total_items - completed_items,
        average_velocity: average_velocity(&samples),
        on_time_probability: on_time,
        most_likely_date,
        delay_days,
        delay: classify_delay(delay_days, variant.delay_thresholds()),
        risk,
        recommendations: recommendations(risk),
        p50: percentile(50.0),
        p85: percentile(85.0),
        p100: percentile(100.0),
        buckets,
    }))
}

/// Read-only state shared by every run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RunInput<'a> {
    pub velocity: &'a [usize],
    pub total_items: usize,
    pub completed_items: usize,
    pub start_date: NaiveDate,
    pub day_cap: u32,
    pub calendar: &'a WorkCalendar,
}

/// Completion dates keyed by day. Runs are merged by value, so the order in
/// which runs or workers finish does not matter.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SimulationTally {
    pub counts: BTreeMap<NaiveDate, usize>,
    pub unfinished_runs: usize,
}

impl SimulationTally {
    fn record(&mut self, completion: Option<NaiveDate>) {
        match completion {
            Some(date) => *self.counts.entry(date).or_insert(0) += 1,
            None => self.unfinished_runs += 1,
        }
    }

    fn merge(&mut self, other: SimulationTally) {
        for (date, count) in other.counts {
            *self.counts.entry(date).or_insert(0) += count;
        }
        self.unfinished_runs += other.unfinished_runs;
    }

    pub fn converged_runs(&self) -> usize {
        self.counts.values().sum()
    }
}

fn tally_runs(input: &RunInput<'_>, params: &ForecastParams) -> Result<SimulationTally, ForecastError> {
    let workers = params.workers.min(params.simulations);
    if workers <= 1 {
        let mut rng = rng_for_worker(params.seed, 0);
        return Ok(simulate_runs(input, params.simulations, &mut rng));
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| ForecastError::ThreadPool(e.to_string()))?;
    let base = params.simulations / workers;
    let extra = params.simulations % workers;
    let seed = params.seed;
    Ok(pool.install(|| {
        (0..workers)
            .into_par_iter()
            .map(|worker| {
                let runs = base + usize::from(worker < extra);
                let mut rng = rng_for_worker(seed, worker);
                simulate_runs(input, runs, &mut rng)
            })
            .reduce(SimulationTally::default, |mut merged, partial| {
                merged.merge(partial);
                merged
            })
    }))
}

/// Worker streams are derived by mixing the worker index into the seed, so
/// neighbouring seeds do not share streams.
fn rng_for_worker(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ (worker as u64).wrapping_mul(WORKER_SEED_MIX)),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn simulate_runs<R: Rng + ?Sized>(
    input: &RunInput<'_>,
    runs: usize,
    rng: &mut R,
) -> SimulationTally {
    let mut tally = SimulationTally::default();
    for _ in 0..runs {
        tally.record(simulate_single_run(input, rng));
    }
    tally
}

/// Plays out one future. Each working day adds one uniformly drawn
/// historical day of throughput; non-working days add nothing. Returns the
/// day after the last simulated day once every item is done, or `None` when
/// the day cap is reached first.
fn simulate_single_run<R: Rng + ?Sized>(input: &RunInput<'_>, rng: &mut R) -> Option<NaiveDate> {
    let mut completed = input.completed_items;
    let mut date = input.start_date;
    let mut days_elapsed = 0;

    while completed < input.total_items {
        if days_elapsed >= input.day_cap {
            return None;
        }
        if input.calendar.is_workday(date) {
            completed += input.velocity.choose(rng).copied().unwrap_or(0);
        }
        date = date.succ_opt()?;
        days_elapsed += 1;
    }

    Some(date)
}

/// Turns completion counts into percentages over all converged runs, with a
/// running cumulative sum in ascending date order.
pub fn aggregate_buckets(counts: &BTreeMap<NaiveDate, usize>) -> Vec<CompletionDateBucket> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }

    let mut cumulative = 0.0;
    counts
        .iter()
        .map(|(date, occurrences)| {
            let probability = *occurrences as f64 / total as f64 * 100.0;
            cumulative += probability;
            CompletionDateBucket {
                date: *date,
                probability,
                cumulative_probability: cumulative,
            }
        })
        .collect()
}
