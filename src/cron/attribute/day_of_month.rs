use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

use super::day_of_week::DAY_NAMES;
use super::days_in_month;
use crate::cron::expression_type::{classify, split_range, ScheduleExpressionType};
use crate::error::{ScheduleError, ScheduleResult};

const FIELD: &str = "day-of-month";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ordinal {
    Nth(u32),
    Last,
}

/// One day-of-month value, possibly relative to the month it is resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayValue {
    /// `1..=31`
    Absolute(u32),
    /// `Last`
    Last,
    /// `-1..=-7`, days before the last day
    BeforeLast(u32),
    /// `2nd Tue`, `Last Fri`
    Weekday { ordinal: Ordinal, weekday: u32 },
}

impl DayValue {
    fn parse(raw: &str) -> ScheduleResult<Self> {
        let raw = raw.trim();
        let invalid = || ScheduleError::InvalidDayOfMonth {
            value: raw.to_string(),
        };

        if raw.eq_ignore_ascii_case("last") {
            return Ok(Self::Last);
        }

        if let Some(days) = raw.strip_prefix('-') {
            let days: i64 = days.trim().parse().map_err(|_| invalid())?;
            if !(1..=7).contains(&days) {
                return Err(ScheduleError::ValueOutOfRange {
                    field: FIELD,
                    value: -days,
                    min: -7,
                    max: -1,
                });
            }
            return Ok(Self::BeforeLast(days as u32));
        }

        let parts: Vec<&str> = raw.split_whitespace().collect();
        if let [ordinal, weekday] = parts.as_slice() {
            let ordinal = match ordinal.to_ascii_lowercase().as_str() {
                "1st" => Ordinal::Nth(1),
                "2nd" => Ordinal::Nth(2),
                "3rd" => Ordinal::Nth(3),
                "4th" => Ordinal::Nth(4),
                "5th" => Ordinal::Nth(5),
                "last" => Ordinal::Last,
                _ => return Err(invalid()),
            };
            let weekday = DAY_NAMES
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(weekday))
                .map(|(_, day)| *day)
                .ok_or_else(invalid)?;
            return Ok(Self::Weekday { ordinal, weekday });
        }
        if parts.len() > 1 {
            return Err(invalid());
        }

        let day: i64 = raw.parse().map_err(|_| ScheduleError::InvalidValue {
            field: FIELD,
            value: raw.to_string(),
        })?;
        if !(1..=31).contains(&day) {
            return Err(ScheduleError::ValueOutOfRange {
                field: FIELD,
                value: day,
                min: 1,
                max: 31,
            });
        }
        Ok(Self::Absolute(day as u32))
    }

    /// Day of the given month this value stands for, if the month has it.
    fn resolve(self, year: i32, month: u32) -> Option<u32> {
        let last_day = days_in_month(year, month);
        match self {
            Self::Absolute(day) => (day <= last_day).then_some(day),
            Self::Last => Some(last_day),
            Self::BeforeLast(days) => Some(last_day - days),
            Self::Weekday {
                ordinal: Ordinal::Nth(nth),
                weekday,
            } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)?
                    .weekday()
                    .num_days_from_sunday();
                let day = 1 + (weekday + 7 - first) % 7 + 7 * (nth - 1);
                (day <= last_day).then_some(day)
            }
            Self::Weekday {
                ordinal: Ordinal::Last,
                weekday,
            } => {
                let last = NaiveDate::from_ymd_opt(year, month, last_day)?
                    .weekday()
                    .num_days_from_sunday();
                Some(last_day - (last + 7 - weekday) % 7)
            }
        }
    }

    /// Like `resolve`, but an absolute day is kept even past the end of the month.
    fn range_bound(self, year: i32, month: u32) -> Option<u32> {
        match self {
            Self::Absolute(day) => Some(day),
            _ => self.resolve(year, month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Single(DayValue),
    Range(DayValue, DayValue),
}

impl Entry {
    fn parse(kind: ScheduleExpressionType, value: &str) -> ScheduleResult<Self> {
        match kind {
            ScheduleExpressionType::SingleValue => DayValue::parse(value).map(Self::Single),
            ScheduleExpressionType::Range => {
                let (start, end) = split_range(value).ok_or_else(|| ScheduleError::InvalidRange {
                    field: FIELD,
                    value: value.to_string(),
                })?;
                Ok(Self::Range(DayValue::parse(start)?, DayValue::parse(end)?))
            }
            _ => Err(ScheduleError::InvalidList {
                field: FIELD,
                value: value.to_string(),
            }),
        }
    }

    fn collect_days(&self, year: i32, month: u32, days: &mut BTreeSet<u32>) {
        match self {
            Self::Single(value) => days.extend(value.resolve(year, month)),
            Self::Range(start, end) => {
                let (Some(start), Some(end)) = (start.range_bound(year, month), end.range_bound(year, month))
                else {
                    return;
                };
                // days the month lacks are dropped, the rest of the range stays
                let last_day = days_in_month(year, month);
                if start <= end {
                    days.extend(start..=end.min(last_day));
                } else {
                    days.extend(start..=last_day);
                    days.extend(1..=end.min(last_day));
                }
            }
        }
    }
}

/// Matcher for the day-of-month attribute.
///
/// Besides `1..=31` it accepts values relative to the month: `Last`, `-N` and
/// `<ordinal> <weekday>`. Legal days are therefore only known once a month is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOfMonth {
    kind: ScheduleExpressionType,
    entries: Vec<Entry>,
}

impl DayOfMonth {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        let kind = classify(FIELD, value)?;
        let value = value.trim();

        let entries = match kind {
            ScheduleExpressionType::Wildcard => Vec::new(),
            ScheduleExpressionType::SingleValue | ScheduleExpressionType::Range => {
                vec![Entry::parse(kind, value)?]
            }
            ScheduleExpressionType::List => value
                .split(',')
                .map(|item| match classify(FIELD, item) {
                    Ok(item_kind) => Entry::parse(item_kind, item.trim()),
                    Err(_) => Err(ScheduleError::InvalidList {
                        field: FIELD,
                        value: value.to_string(),
                    }),
                })
                .collect::<ScheduleResult<_>>()?,
            ScheduleExpressionType::Increment => {
                return Err(ScheduleError::UnsupportedType {
                    field: FIELD,
                    value: value.to_string(),
                    kind,
                })
            }
        };

        Ok(Self { kind, entries })
    }

    pub fn kind(&self) -> ScheduleExpressionType {
        self.kind
    }

    fn days(&self, year: i32, month: u32) -> BTreeSet<u32> {
        let mut days = BTreeSet::new();
        if self.kind == ScheduleExpressionType::Wildcard {
            days.extend(1..=days_in_month(year, month));
        } else {
            for entry in &self.entries {
                entry.collect_days(year, month, &mut days);
            }
        }
        days
    }

    /// First legal day of the given month, `None` when the month has none.
    pub fn first_match(&self, year: i32, month: u32) -> Option<u32> {
        self.days(year, month).first().copied()
    }

    /// Earliest legal date `>= date` within the same month.
    pub fn next_match_on(&self, date: NaiveDate) -> Option<NaiveDate> {
        let day = self
            .days(date.year(), date.month())
            .range(date.day()..)
            .next()
            .copied()?;
        date.with_day(day)
    }

    pub fn is_match_on(&self, date: NaiveDate) -> bool {
        self.days(date.year(), date.month()).contains(&date.day())
    }
}
