use chrono::NaiveDate;
use serde::Serialize;

/// Number of items completed on one calendar day. The fallback sample used
/// when no history exists has no date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VelocitySample {
    pub date: Option<NaiveDate>,
    pub completed_items: usize,
}
