use chrono::NaiveDate;

use crate::error::{ContribError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive analysis window of calendar dates.
///
/// Both bounds are kept as zero-padded `YYYY-MM-DD` strings, which makes a
/// lexicographic comparison against a timestamp's date prefix equivalent to a
/// date comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    start: String,
    end: String,
}

impl DateWindow {
    pub fn new(start: &str, end: &str) -> Result<Self> {
        let start_date = parse_date(start)?;
        let end_date = parse_date(end)?;

        if start_date > end_date {
            return Err(ContribError::InvertedWindow {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        Ok(Self {
            start: start_date.format(DATE_FORMAT).to_string(),
            end: end_date.format(DATE_FORMAT).to_string(),
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Whether the date part of a tracker timestamp
    /// (`2025-01-15T10:30:00.000+0000`) falls inside the window.
    pub fn contains(&self, timestamp: Option<&str>) -> bool {
        let Some(date) = timestamp.and_then(|ts| ts.split('T').next()) else {
            return false;
        };
        !date.is_empty() && self.start.as_str() <= date && date <= self.end.as_str()
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ContribError::InvalidDate {
        value: value.to_string(),
    })
}
