use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const ACCEPTED_FORMATS: &str = "YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS, RFC 3339";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DateParseError {
    #[error("unrecognized date '{value}' (expected one of: {expected})")]
    Unrecognized { value: String, expected: &'static str },
}

/// Parses a date or timestamp and truncates it to its calendar day.
pub fn parse_date(value: &str) -> Result<NaiveDate, DateParseError> {
    let text = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Ok(timestamp.date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(timestamp.date());
    }

    Err(DateParseError::Unrecognized {
        value: value.to_string(),
        expected: ACCEPTED_FORMATS,
    })
}

pub fn parse_date_opt(value: Option<&str>) -> Result<Option<NaiveDate>, DateParseError> {
    match value {
        Some(text) if !text.trim().is_empty() => parse_date(text).map(Some),
        _ => Ok(None),
    }
}
