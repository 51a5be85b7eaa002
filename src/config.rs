// src/config.rs
use std::env;

use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::cron::calendar_timeout::CalendarBasedTimeout;
use crate::cron::expression::ScheduleExpression;
use crate::error::ScheduleResult;
use crate::utils::constants::{ENV_DEFAULT_TIMEZONE, ENV_TZ};

/// Caller-side settings for building calendar timeouts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarConfig {
    /// Used when a schedule names no timezone or an unknown one.
    pub default_timezone: Tz,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl CalendarConfig {
    pub fn new(default_timezone: Tz) -> Self {
        Self { default_timezone }
    }

    /// Reads the default timezone from `CALENDAR_TIMEOUT_TZ`, then `TZ`, falling back to UTC.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        for key in [ENV_DEFAULT_TIMEZONE, ENV_TZ] {
            let Some(value) = lookup(key) else { continue };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match value.parse::<Tz>() {
                Ok(timezone) => {
                    debug!("Default timezone {} taken from {}", timezone, key);
                    return Self::new(timezone);
                }
                Err(_) => warn!("Ignoring unknown timezone {} in {}", value, key),
            }
        }
        Self::default()
    }

    pub fn timeout(&self, schedule: &ScheduleExpression) -> ScheduleResult<CalendarBasedTimeout> {
        CalendarBasedTimeout::new(schedule, self.default_timezone)
    }
}
