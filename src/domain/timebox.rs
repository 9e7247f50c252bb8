use chrono::NaiveDate;
use serde::Serialize;

use super::assignment::Assignment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeBoxStatus {
    Planned,
    InProgress,
    Closed,
}

/// A dated container of assignments, i.e. a sprint.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBox {
    pub name: String,
    pub status: TimeBoxStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assignments: Vec<Assignment>,
}

impl TimeBox {
    pub fn completed_count(&self) -> usize {
        self.assignments.iter().filter(|a| a.is_done()).count()
    }
}
