// src/cron/expression_type.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ScheduleError, ScheduleResult};

/// Syntactic kind of a single schedule field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleExpressionType {
    /// `*`
    Wildcard,
    /// `1,3,5` or `Mon,Wed-Fri`
    List,
    /// `1-5`, wraps around when the lower bound is greater than the upper bound
    Range,
    /// `0/15` or `*/10`
    Increment,
    /// `7`, `Jan`, `Last`
    SingleValue,
}

impl fmt::Display for ScheduleExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Wildcard => "WILDCARD",
            Self::List => "LIST",
            Self::Range => "RANGE",
            Self::Increment => "INCREMENT",
            Self::SingleValue => "SINGLE_VALUE",
        };
        f.write_str(name)
    }
}

/// Classifies a raw field value.
///
/// Precedence: exact `*`, then `,`, then a `-` that splits into a valid range, then `/`,
/// otherwise a single value.
pub fn classify(field: &'static str, value: &str) -> ScheduleResult<ScheduleExpressionType> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ScheduleError::EmptyValue { field });
    }

    if value == "*" {
        return Ok(ScheduleExpressionType::Wildcard);
    }
    if value.contains(',') {
        return Ok(ScheduleExpressionType::List);
    }
    if value.contains('-') && split_range(value).is_some() {
        return Ok(ScheduleExpressionType::Range);
    }
    if value.contains('/') {
        return Ok(ScheduleExpressionType::Increment);
    }
    Ok(ScheduleExpressionType::SingleValue)
}

/// Splits `value` into the two bounds of a range.
///
/// The separator is the first `-` with a non-empty bound on both sides, so relative
/// day-of-month bounds such as `-7-Last` or `1--2` split as expected while `-3` does not split.
pub(crate) fn split_range(value: &str) -> Option<(&str, &str)> {
    value
        .char_indices()
        .filter(|(_, c)| *c == '-')
        .map(|(idx, _)| (value[..idx].trim(), value[idx + 1..].trim()))
        .find(|(start, end)| !start.is_empty() && !end.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify("hour", "*").unwrap(), ScheduleExpressionType::Wildcard);
        assert_eq!(classify("hour", " * ").unwrap(), ScheduleExpressionType::Wildcard);
        assert_eq!(classify("hour", "1,3-5").unwrap(), ScheduleExpressionType::List);
        assert_eq!(classify("hour", "1-5").unwrap(), ScheduleExpressionType::Range);
        assert_eq!(classify("minute", "0/15").unwrap(), ScheduleExpressionType::Increment);
        assert_eq!(classify("minute", "*/15").unwrap(), ScheduleExpressionType::Increment);
        assert_eq!(classify("month", "Jan").unwrap(), ScheduleExpressionType::SingleValue);
    }

    #[test]
    fn test_classify_relative_day_of_month() {
        assert_eq!(classify("day-of-month", "-3").unwrap(), ScheduleExpressionType::SingleValue);
        assert_eq!(classify("day-of-month", "-7-Last").unwrap(), ScheduleExpressionType::Range);
        assert_eq!(classify("day-of-month", "1st Mon-Last Fri").unwrap(), ScheduleExpressionType::Range);
    }

    #[test]
    fn test_classify_rejects_empty() {
        assert_eq!(
            classify("second", "  "),
            Err(ScheduleError::EmptyValue { field: "second" })
        );
    }

    #[test]
    fn test_split_range() {
        assert_eq!(split_range("22-2"), Some(("22", "2")));
        assert_eq!(split_range("-7-Last"), Some(("-7", "Last")));
        assert_eq!(split_range("1--2"), Some(("1", "-2")));
        assert_eq!(split_range("-3"), None);
        assert_eq!(split_range("5-"), None);
    }
}
