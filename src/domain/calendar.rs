use chrono::Datelike;
use chrono::NaiveDate;
use chrono::Weekday;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeDateRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Decides which days the team makes progress on. Ranges are inclusive on
/// both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    pub free_weekdays: Vec<Weekday>,
    pub free_date_ranges: Vec<FreeDateRange>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            free_weekdays: vec![Weekday::Sat, Weekday::Sun],
            free_date_ranges: Vec::new(),
        }
    }
}

impl WorkCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_workday(&self, date: NaiveDate) -> bool {
        if self.free_weekdays.contains(&date.weekday()) {
            return false;
        }

        !self
            .free_date_ranges
            .iter()
            .any(|range| date >= range.start_date && date <= range.end_date)
    }

    /// Whether any weekday of the week is a working day. A calendar without
    /// one can never make progress.
    pub fn has_workdays(&self) -> bool {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .iter()
        .any(|day| !self.free_weekdays.contains(day))
    }
}
