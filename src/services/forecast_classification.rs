use chrono::NaiveDate;

use crate::services::simulation_types::{CompletionDateBucket, DelayClass, RiskLevel};

/// Upper bounds, in calendar days past the planned end, of each delay class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayThresholds {
    pub on_time: i64,
    pub minor: i64,
    pub moderate: i64,
}

pub const SPRINT_DELAY_THRESHOLDS: DelayThresholds = DelayThresholds {
    on_time: 0,
    minor: 2,
    moderate: 5,
};

pub const PROJECT_DELAY_THRESHOLDS: DelayThresholds = DelayThresholds {
    on_time: 0,
    minor: 5,
    moderate: 15,
};

pub const LIKELY_ON_TIME_PERCENT: f64 = 85.0;
pub const MODERATE_RISK_PERCENT: f64 = 50.0;

/// Probability mass at or before `planned_end`. It is read off the first
/// bucket past the deadline; with no such bucket everything is on time.
pub fn on_time_probability(buckets: &[CompletionDateBucket], planned_end: NaiveDate) -> f64 {
    match buckets.iter().find(|bucket| bucket.date > planned_end) {
        Some(first_late) => {
            (first_late.cumulative_probability - first_late.probability).clamp(0.0, 100.0)
        }
        None => 100.0,
    }
}

/// Bucket with the highest probability. The earliest date wins a tie.
pub fn most_likely_bucket(buckets: &[CompletionDateBucket]) -> Option<&CompletionDateBucket> {
    buckets.iter().fold(None, |best, bucket| match best {
        Some(current) if current.probability >= bucket.probability => Some(current),
        _ => Some(bucket),
    })
}

pub fn classify_delay(delay_days: i64, thresholds: DelayThresholds) -> DelayClass {
    if delay_days < thresholds.on_time {
        DelayClass::AheadOfSchedule
    } else if delay_days == thresholds.on_time {
        DelayClass::OnTime
    } else if delay_days <= thresholds.minor {
        DelayClass::MinorDelay
    } else if delay_days <= thresholds.moderate {
        DelayClass::ModerateDelay
    } else {
        DelayClass::CriticalDelay
    }
}

pub fn classify_risk(on_time_probability: f64) -> RiskLevel {
    if on_time_probability >= LIKELY_ON_TIME_PERCENT {
        RiskLevel::LikelyOnTime
    } else if on_time_probability >= MODERATE_RISK_PERCENT {
        RiskLevel::ModerateRisk
    } else {
        RiskLevel::HighRisk
    }
}

pub fn recommendations(risk: RiskLevel) -> Vec<String> {
    let lines: &[&str] = match risk {
        RiskLevel::LikelyOnTime => &[
            "Keep the current scope and pace.",
            "Re-run the forecast as items complete to confirm the trend.",
        ],
        RiskLevel::ModerateRisk => &[
            "Review the remaining items and defer lower-priority work.",
            "Resolve blocking dependencies early in the sprint.",
            "Compare daily progress against this forecast.",
        ],
        RiskLevel::HighRisk => &[
            "Reduce scope or negotiate a later deadline.",
            "Add capacity to, or unblock, the items on the critical path.",
            "Escalate the schedule risk to stakeholders now.",
        ],
    };
    lines.iter().map(|line| line.to_string()).collect()
}
