use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::assignment::Assignment;
use crate::domain::velocity::VelocitySample;

/// Daily completed-item counts over all done assignments, in ascending date
/// order. An item's day is its done date, or its start date when no done
/// date was recorded.
///
/// Without any dated completed item the result is a single sample of 1, so
/// a simulation always makes some progress.
pub fn calculate_daily_velocity<'a, I>(assignments: I) -> Vec<VelocitySample>
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for assignment in assignments.into_iter().filter(|a| a.is_done()) {
        match assignment.done_date.or(assignment.start_date) {
            Some(date) => *per_day.entry(date).or_insert(0) += 1,
            None => debug!(issue = assignment.id(), "done item without dates skipped"),
        }
    }

    if per_day.is_empty() {
        warn!("no completed items with dates, falling back to a velocity of 1");
        return vec![VelocitySample {
            date: None,
            completed_items: 1,
        }];
    }

    per_day
        .into_iter()
        .map(|(date, completed_items)| VelocitySample {
            date: Some(date),
            completed_items,
        })
        .collect()
}

pub fn average_velocity(samples: &[VelocitySample]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: usize = samples.iter().map(|s| s.completed_items).sum();
    total as f64 / samples.len() as f64
}
