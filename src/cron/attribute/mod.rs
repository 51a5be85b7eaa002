// src/cron/attribute/mod.rs
//! Field matchers for the seven attributes of a schedule expression.
//!
//! Every matcher answers two questions for its field: the first legal value, and the
//! smallest legal value greater than or equal to a given one. Day-of-month and
//! day-of-week answer the second question for a whole date, since their legality
//! depends on the month being looked at.

mod day_of_month;
mod day_of_week;
mod hour;
mod minute;
mod month;
mod second;
mod year;

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use crate::cron::expression_type::{classify, split_range, ScheduleExpressionType};
use crate::error::{ScheduleError, ScheduleResult};

pub use day_of_month::DayOfMonth;
pub use day_of_week::DayOfWeek;
pub use hour::Hour;
pub use minute::Minute;
pub use month::Month;
pub use second::Second;
pub use year::Year;

/// Static description of a numeric field domain.
#[derive(Debug)]
pub(crate) struct FieldSpec {
    pub(crate) name: &'static str,
    pub(crate) min: u32,
    pub(crate) max: u32,
    /// Case-insensitive names accepted in place of numbers.
    pub(crate) names: &'static [(&'static str, u32)],
    pub(crate) supports_increment: bool,
    /// Whether `x-y` with `x > y` wraps around the domain.
    pub(crate) wraps: bool,
    /// Maps raw domain values onto canonical ones (day-of-week 7 is Sunday).
    pub(crate) normalize: fn(u32) -> u32,
}

pub(crate) fn identity(value: u32) -> u32 {
    value
}

impl FieldSpec {
    fn parse_value(&self, raw: &str) -> ScheduleResult<u32> {
        let raw = raw.trim();
        if let Some((_, value)) = self
            .names
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(raw))
        {
            return Ok(*value);
        }

        let value: i64 = raw.parse().map_err(|_| ScheduleError::InvalidValue {
            field: self.name,
            value: raw.to_string(),
        })?;
        if value < i64::from(self.min) || value > i64::from(self.max) {
            return Err(ScheduleError::ValueOutOfRange {
                field: self.name,
                value,
                min: i64::from(self.min),
                max: i64::from(self.max),
            });
        }
        Ok(value as u32)
    }
}

/// Parsed representation shared by every numeric field.
///
/// A wildcard keeps no value set at all; everything else is expanded once at
/// construction into the set of legal values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerBasedExpression {
    kind: ScheduleExpressionType,
    min: u32,
    max: u32,
    values: BTreeSet<u32>,
}

impl IntegerBasedExpression {
    pub(crate) fn parse(spec: &FieldSpec, value: &str) -> ScheduleResult<Self> {
        let kind = classify(spec.name, value)?;
        let value = value.trim();
        let mut values = BTreeSet::new();

        match kind {
            ScheduleExpressionType::Wildcard => {}
            ScheduleExpressionType::SingleValue => {
                values.insert(spec.parse_value(value)?);
            }
            ScheduleExpressionType::Range => insert_range(spec, value, &mut values)?,
            ScheduleExpressionType::List => {
                for item in value.split(',') {
                    match classify(spec.name, item) {
                        Ok(ScheduleExpressionType::SingleValue) => {
                            values.insert(spec.parse_value(item)?);
                        }
                        Ok(ScheduleExpressionType::Range) => insert_range(spec, item.trim(), &mut values)?,
                        _ => {
                            return Err(ScheduleError::InvalidList {
                                field: spec.name,
                                value: value.to_string(),
                            })
                        }
                    }
                }
            }
            ScheduleExpressionType::Increment => {
                if !spec.supports_increment {
                    return Err(ScheduleError::UnsupportedType {
                        field: spec.name,
                        value: value.to_string(),
                        kind,
                    });
                }
                insert_increment(spec, value, &mut values)?;
            }
        }

        let values = values.into_iter().map(spec.normalize).collect();
        Ok(Self {
            kind,
            min: (spec.normalize)(spec.min),
            max: spec.normalize_max(),
            values,
        })
    }

    pub fn kind(&self) -> ScheduleExpressionType {
        self.kind
    }

    pub fn first(&self) -> Option<u32> {
        match self.kind {
            ScheduleExpressionType::Wildcard => Some(self.min),
            _ => self.values.first().copied(),
        }
    }

    /// Smallest legal value `>= current`, or `None` when the domain is exhausted.
    pub fn next_match(&self, current: u32) -> Option<u32> {
        match self.kind {
            ScheduleExpressionType::Wildcard if current > self.max => None,
            ScheduleExpressionType::Wildcard => Some(current.max(self.min)),
            _ => self.values.range(current..).next().copied(),
        }
    }

    pub fn is_match(&self, value: u32) -> bool {
        match self.kind {
            ScheduleExpressionType::Wildcard => (self.min..=self.max).contains(&value),
            _ => self.values.contains(&value),
        }
    }
}

/// Queries shared by the numeric field matchers.
pub trait FieldMatcher {
    fn expression(&self) -> &IntegerBasedExpression;

    fn kind(&self) -> ScheduleExpressionType {
        self.expression().kind()
    }

    fn first(&self) -> Option<u32> {
        self.expression().first()
    }

    fn next_match(&self, current: u32) -> Option<u32> {
        self.expression().next_match(current)
    }

    fn is_match(&self, value: u32) -> bool {
        self.expression().is_match(value)
    }
}

impl FieldSpec {
    /// Largest canonical value once `normalize` has been applied.
    fn normalize_max(&self) -> u32 {
        (self.min..=self.max).map(self.normalize).max().unwrap_or(self.max)
    }
}

fn insert_range(spec: &FieldSpec, value: &str, values: &mut BTreeSet<u32>) -> ScheduleResult<()> {
    let invalid = || ScheduleError::InvalidRange {
        field: spec.name,
        value: value.to_string(),
    };
    let (start, end) = split_range(value).ok_or_else(invalid)?;
    let start = spec.parse_value(start)?;
    let end = spec.parse_value(end)?;

    if start <= end {
        values.extend(start..=end);
    } else if spec.wraps {
        values.extend(start..=spec.max);
        values.extend(spec.min..=end);
    } else {
        return Err(invalid());
    }
    Ok(())
}

fn insert_increment(spec: &FieldSpec, value: &str, values: &mut BTreeSet<u32>) -> ScheduleResult<()> {
    let invalid = || ScheduleError::InvalidIncrement {
        field: spec.name,
        value: value.to_string(),
    };
    let (start, step) = value.split_once('/').ok_or_else(invalid)?;
    let (start, step) = (start.trim(), step.trim());
    if step.contains('/') {
        return Err(invalid());
    }

    let start = if start == "*" {
        spec.min
    } else {
        start.parse::<u32>().map_err(|_| invalid())?
    };
    let step: u32 = step.parse().map_err(|_| invalid())?;
    if step == 0 {
        return Err(invalid());
    }
    if start < spec.min || start > spec.max {
        return Err(ScheduleError::ValueOutOfRange {
            field: spec.name,
            value: i64::from(start),
            min: i64::from(spec.min),
            max: i64::from(spec.max),
        });
    }

    values.extend((start..=spec.max).step_by(step as usize));
    Ok(())
}

/// Number of days in the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(28, |last| last.day())
}
