// src/cron/expression.rs
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    DEFAULT_DAY_OF_MONTH, DEFAULT_DAY_OF_WEEK, DEFAULT_HOUR, DEFAULT_MINUTE, DEFAULT_MONTH, DEFAULT_SECOND,
    DEFAULT_YEAR,
};

/// Calendar schedule as supplied by a caller: one string per field plus optional bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScheduleExpression {
    pub second: String,
    pub minute: String,
    pub hour: String,
    pub day_of_month: String,
    pub day_of_week: String,
    pub month: String,
    pub year: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// IANA timezone id; blank or unknown ids fall back to the caller's default.
    pub timezone: Option<String>,
}

impl Default for ScheduleExpression {
    fn default() -> Self {
        Self {
            second: DEFAULT_SECOND.to_string(),
            minute: DEFAULT_MINUTE.to_string(),
            hour: DEFAULT_HOUR.to_string(),
            day_of_month: DEFAULT_DAY_OF_MONTH.to_string(),
            day_of_week: DEFAULT_DAY_OF_WEEK.to_string(),
            month: DEFAULT_MONTH.to_string(),
            year: DEFAULT_YEAR.to_string(),
            start: None,
            end: None,
            timezone: None,
        }
    }
}

impl ScheduleExpression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn second(mut self, value: impl Into<String>) -> Self {
        self.second = value.into();
        self
    }

    pub fn minute(mut self, value: impl Into<String>) -> Self {
        self.minute = value.into();
        self
    }

    pub fn hour(mut self, value: impl Into<String>) -> Self {
        self.hour = value.into();
        self
    }

    pub fn day_of_month(mut self, value: impl Into<String>) -> Self {
        self.day_of_month = value.into();
        self
    }

    pub fn day_of_week(mut self, value: impl Into<String>) -> Self {
        self.day_of_week = value.into();
        self
    }

    pub fn month(mut self, value: impl Into<String>) -> Self {
        self.month = value.into();
        self
    }

    pub fn year(mut self, value: impl Into<String>) -> Self {
        self.year = value.into();
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

impl fmt::Display for ScheduleExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "second={};minute={};hour={};dayOfMonth={};month={};dayOfWeek={};year={};timezone={};start={};end={}",
            self.second,
            self.minute,
            self.hour,
            self.day_of_month,
            self.month,
            self.day_of_week,
            self.year,
            self.timezone.as_deref().unwrap_or("-"),
            self.start.map_or_else(|| "-".to_string(), |start| start.to_rfc3339()),
            self.end.map_or_else(|| "-".to_string(), |end| end.to_rfc3339()),
        )
    }
}

/// Whether two schedules describe the same timer: every field, both bounds and the timezone.
///
/// Field values are compared as written; `"1,2"` and `"2,1"` are different schedules.
pub fn does_schedule_match(first: &ScheduleExpression, second: &ScheduleExpression) -> bool {
    first.second == second.second
        && first.minute == second.minute
        && first.hour == second.hour
        && first.day_of_month == second.day_of_month
        && first.day_of_week == second.day_of_week
        && first.month == second.month
        && first.year == second.year
        && first.start == second.start
        && first.end == second.end
        && first.timezone == second.timezone
}
