use chrono::{Datelike, Duration, NaiveDate};

use super::{FieldMatcher, FieldSpec, IntegerBasedExpression};
use crate::error::ScheduleResult;

/// Weekday names, Sunday first, as accepted by day-of-week and relative day-of-month values.
pub(crate) const DAY_NAMES: &[(&str, u32)] = &[
    ("sun", 0),
    ("mon", 1),
    ("tue", 2),
    ("wed", 3),
    ("thu", 4),
    ("fri", 5),
    ("sat", 6),
];

/// 0 and 7 both mean Sunday.
fn sunday_is_zero(value: u32) -> u32 {
    value % 7
}

const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 7,
    names: DAY_NAMES,
    supports_increment: false,
    wraps: true,
    normalize: sunday_is_zero,
};

/// Matcher for the day-of-week attribute, `0..=7` or `Sun..Sat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOfWeek(IntegerBasedExpression);

impl DayOfWeek {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        IntegerBasedExpression::parse(&DAY_OF_WEEK, value).map(Self)
    }

    pub fn is_match_on(&self, date: NaiveDate) -> bool {
        self.is_match(date.weekday().num_days_from_sunday())
    }

    /// Earliest date `>= date` falling on a legal weekday. Moves into the following
    /// week when no legal weekday remains in the current one.
    pub fn next_match_on(&self, date: NaiveDate) -> Option<NaiveDate> {
        let today = date.weekday().num_days_from_sunday();
        let target = self.next_match(today).or_else(|| self.first())?;
        let days_ahead = (target + 7 - today) % 7;
        date.checked_add_signed(Duration::days(i64::from(days_ahead)))
    }
}

impl FieldMatcher for DayOfWeek {
    fn expression(&self) -> &IntegerBasedExpression {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cron::expression_type::ScheduleExpressionType;
    use crate::error::ScheduleError;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_seven_is_sunday() {
        let dow = DayOfWeek::new("7").unwrap();
        assert!(dow.is_match(0));
        // 2024-01-07 is a Sunday
        assert!(dow.is_match_on(date(2024, 1, 7)));
        assert_eq!(dow.first(), Some(0));
    }

    #[test]
    fn test_named_range_wraps_over_weekend() {
        let dow = DayOfWeek::new("Fri-Mon").unwrap();
        assert_eq!(dow.kind(), ScheduleExpressionType::Range);
        let all: Vec<u32> = (0..7).filter(|d| dow.is_match(*d)).collect();
        assert_eq!(all, vec![0, 1, 5, 6]);
    }

    #[test]
    fn test_next_match_on_rolls_into_next_week() {
        let dow = DayOfWeek::new("Mon").unwrap();
        // Wednesday 2024-01-03 -> Monday 2024-01-08
        assert_eq!(dow.next_match_on(date(2024, 1, 3)), Some(date(2024, 1, 8)));
        // Monday itself matches
        assert_eq!(dow.next_match_on(date(2024, 1, 8)), Some(date(2024, 1, 8)));
    }

    #[test]
    fn test_wildcard_matches_today() {
        let dow = DayOfWeek::new("*").unwrap();
        assert_eq!(dow.next_match_on(date(2024, 2, 29)), Some(date(2024, 2, 29)));
    }

    #[test]
    fn test_rejects_increment_and_out_of_range() {
        assert!(matches!(
            DayOfWeek::new("1/2"),
            Err(ScheduleError::UnsupportedType { .. })
        ));
        assert!(matches!(
            DayOfWeek::new("8"),
            Err(ScheduleError::ValueOutOfRange { .. })
        ));
    }
}
