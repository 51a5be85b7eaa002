// src/cron/calendar_timeout.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::cron::attribute::{DayOfMonth, DayOfWeek, FieldMatcher, Hour, Minute, Month, Second, Year};
use crate::cron::dst::{fold_start, forward_shift, resolve_local, LocalInstant};
use crate::cron::expression::ScheduleExpression;
use crate::cron::expression_type::ScheduleExpressionType;
use crate::error::ScheduleResult;
use crate::utils::constants::MAX_YEAR;

/// Computes the timeouts of a calendar schedule.
///
/// The search runs on local wall-clock values of the schedule's timezone; results are
/// mapped back onto instants by [`resolve_local`]. Schedules with `hour = "*"` fire at every
/// real instant whose wall time matches, so repeated wall times fire twice and skipped ones
/// never. Schedules with specific hours fire repeated wall times once and move skipped ones
/// forward by the DST jump.
#[derive(Debug, Clone)]
pub struct CalendarBasedTimeout {
    schedule: ScheduleExpression,
    second: Second,
    minute: Minute,
    hour: Hour,
    day_of_month: DayOfMonth,
    day_of_week: DayOfWeek,
    month: Month,
    year: Year,
    timezone: Tz,
    first_timeout: Option<DateTime<Tz>>,
}

impl CalendarBasedTimeout {
    pub fn new(schedule: &ScheduleExpression, default_timezone: Tz) -> ScheduleResult<Self> {
        Self::new_at(schedule, default_timezone, Utc::now())
    }

    /// Like [`CalendarBasedTimeout::new`], seeding a schedule without start from `now`.
    pub fn new_at(schedule: &ScheduleExpression, default_timezone: Tz, now: DateTime<Utc>) -> ScheduleResult<Self> {
        let mut timeout = Self {
            schedule: schedule.clone(),
            second: Second::new(&schedule.second)?,
            minute: Minute::new(&schedule.minute)?,
            hour: Hour::new(&schedule.hour)?,
            day_of_month: DayOfMonth::new(&schedule.day_of_month)?,
            day_of_week: DayOfWeek::new(&schedule.day_of_week)?,
            month: Month::new(&schedule.month)?,
            year: Year::new(&schedule.year)?,
            timezone: resolve_timezone(schedule.timezone.as_deref(), default_timezone),
            first_timeout: None,
        };
        timeout.first_timeout = timeout.compute_first_timeout(now);

        debug!(
            "Calendar timeout created for [{}] in {}, first timeout: {:?}",
            timeout.schedule, timeout.timezone, timeout.first_timeout
        );
        Ok(timeout)
    }

    pub fn schedule_expression(&self) -> &ScheduleExpression {
        &self.schedule
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn first_timeout(&self) -> Option<DateTime<Tz>> {
        self.first_timeout
    }

    /// Next timeout strictly after the current time.
    pub fn get_next_timeout(&self) -> Option<DateTime<Tz>> {
        self.get_next_timeout_from(&Utc::now())
    }

    /// Next timeout strictly after `from`. Sub-second precision of `from` is ignored.
    pub fn get_next_timeout_from<T: TimeZone>(&self, from: &DateTime<T>) -> Option<DateTime<Tz>> {
        let from = from.with_timezone(&self.timezone).trunc_subsecs(0);
        if let Some(start) = self.schedule.start {
            if from.with_timezone(&Utc) < start {
                return self.first_timeout;
            }
        }
        self.next_timeout(from, false)
    }

    fn compute_first_timeout(&self, now: DateTime<Utc>) -> Option<DateTime<Tz>> {
        let seed = match self.schedule.start {
            Some(start) => {
                let start = start.with_timezone(&self.timezone);
                let truncated = start.trunc_subsecs(0);
                if truncated < start {
                    truncated + Duration::seconds(1)
                } else {
                    truncated
                }
            }
            None => {
                let today = now.with_timezone(&self.timezone).date_naive();
                let time = NaiveTime::from_hms_opt(self.hour.first()?, self.minute.first()?, self.second.first()?)?;
                self.instant_for(today.and_time(time))?
            }
        };
        self.next_timeout(seed, true)
    }

    fn next_timeout(&self, after: DateTime<Tz>, includes: bool) -> Option<DateTime<Tz>> {
        if self.no_more_timeouts(&after) {
            return None;
        }

        let timeout = if self.hour.kind() == ScheduleExpressionType::Wildcard {
            self.next_any_hour(after, includes)
        } else {
            self.next_specific_hour(after, includes)
        };

        match timeout {
            Some(timeout) if !self.no_more_timeouts(&timeout) => Some(timeout),
            _ => {
                debug!("No more timeouts for [{}] after {}", self.schedule, after);
                None
            }
        }
    }

    /// Every instant whose wall time matches fires, including both passes through a fold.
    fn next_any_hour(&self, after: DateTime<Tz>, includes: bool) -> Option<DateTime<Tz>> {
        let accepts = |candidate: &DateTime<Tz>| if includes { *candidate >= after } else { *candidate > after };
        let wall = after.naive_local();

        let mut forward = None;
        let mut cursor = if includes { wall } else { next_second(wall)? };
        while let Some(candidate) = self.next_wall(cursor) {
            match resolve_local(&self.timezone, candidate) {
                Some(LocalInstant::Single(dt)) if accepts(&dt) => {
                    forward = Some(dt);
                    break;
                }
                Some(LocalInstant::Ambiguous { earliest, latest }) => {
                    if let Some(dt) = [earliest, latest].into_iter().find(|dt| accepts(dt)) {
                        forward = Some(dt);
                        break;
                    }
                }
                _ => {}
            }
            cursor = next_second(candidate)?;
        }

        // During the first pass through a fold, the second pass of the fold is still ahead.
        let mut repeated = None;
        if let Some(LocalInstant::Ambiguous { earliest, .. }) = resolve_local(&self.timezone, wall) {
            if earliest == after {
                let mut cursor = fold_start(&self.timezone, wall);
                while let Some(candidate) = self.next_wall(cursor) {
                    let Some(LocalInstant::Ambiguous { latest, .. }) = resolve_local(&self.timezone, candidate) else {
                        break;
                    };
                    if accepts(&latest) {
                        repeated = Some(latest);
                        break;
                    }
                    cursor = next_second(candidate)?;
                }
            }
        }

        earliest_of(forward, repeated)
    }

    /// Repeated wall times fire once; skipped wall times fire shifted by the DST jump.
    fn next_specific_hour(&self, after: DateTime<Tz>, includes: bool) -> Option<DateTime<Tz>> {
        let accepts = |candidate: &DateTime<Tz>| if includes { *candidate >= after } else { *candidate > after };
        let wall = after.naive_local();

        // Wall times skipped just before `after` may have been moved past it.
        let mut cursor = match forward_shift(&after) {
            Some(delta) => wall.checked_sub_signed(delta)?,
            None if includes => wall,
            None => next_second(wall)?,
        };

        let mut replacement = None;
        while let Some(candidate_wall) = self.next_wall(cursor) {
            let candidate = match resolve_local(&self.timezone, candidate_wall) {
                Some(LocalInstant::Single(dt)) => dt,
                Some(LocalInstant::Ambiguous { earliest, .. }) => earliest,
                Some(LocalInstant::Skipped { shifted }) => {
                    if accepts(&shifted) {
                        replacement = earliest_of(replacement, Some(shifted));
                    }
                    match next_second(candidate_wall) {
                        Some(next) => cursor = next,
                        None => break,
                    }
                    continue;
                }
                None => break,
            };

            if accepts(&candidate) {
                return earliest_of(replacement, Some(candidate));
            }
            if self.is_after_end(&candidate) {
                break;
            }
            match next_second(candidate_wall) {
                Some(next) => cursor = next,
                None => break,
            }
        }
        replacement
    }

    /// Earliest wall time `>= from` matching every field, or `None` past `MAX_YEAR`.
    fn next_wall(&self, from: NaiveDateTime) -> Option<NaiveDateTime> {
        let mut candidate = from;
        loop {
            let year = candidate.year();
            if year > MAX_YEAR {
                return None;
            }

            let next_year = self.compute_next_year(year)?;
            if next_year != year {
                candidate = midnight(NaiveDate::from_ymd_opt(next_year, 1, 1)?)?;
                continue;
            }

            match self.compute_next_month(candidate.month()) {
                Some(month) if month == candidate.month() => {}
                Some(month) => {
                    candidate = midnight(NaiveDate::from_ymd_opt(year, month, 1)?)?;
                    continue;
                }
                None => {
                    candidate = midnight(NaiveDate::from_ymd_opt(year + 1, 1, 1)?)?;
                    continue;
                }
            }

            let date = candidate.date();
            match self.compute_next_date(date) {
                Some(next_date) if next_date == date => {}
                Some(next_date) => {
                    candidate = midnight(next_date)?;
                    continue;
                }
                None => {
                    candidate = midnight(first_of_next_month(date)?)?;
                    continue;
                }
            }

            match self.compute_next_time(candidate.time()) {
                Some(time) => return Some(date.and_time(time)),
                None => candidate = midnight(date.succ_opt()?)?,
            }
        }
    }

    fn compute_next_year(&self, year: i32) -> Option<i32> {
        self.year.next_year(year).filter(|next| *next >= year)
    }

    fn compute_next_month(&self, month: u32) -> Option<u32> {
        self.month.next_match(month)
    }

    /// Earliest legal date `>= date` within the month of `date`.
    ///
    /// When both day-of-month and day-of-week are restricted, either one is enough.
    fn compute_next_date(&self, date: NaiveDate) -> Option<NaiveDate> {
        let by_week = || {
            self.day_of_week
                .next_match_on(date)
                .filter(|next| next.month() == date.month())
        };
        let by_month = || self.day_of_month.next_match_on(date);

        let day_of_month_wildcard = self.day_of_month.kind() == ScheduleExpressionType::Wildcard;
        let day_of_week_wildcard = self.day_of_week.kind() == ScheduleExpressionType::Wildcard;
        match (day_of_month_wildcard, day_of_week_wildcard) {
            (true, _) => by_week(),
            (false, true) => by_month(),
            (false, false) => earliest_of(by_month(), by_week()),
        }
    }

    /// Earliest legal time of day `>= time`, or `None` when the day has no such time left.
    fn compute_next_time(&self, time: NaiveTime) -> Option<NaiveTime> {
        let (hour, minute, second) = (time.hour(), time.minute(), time.second());
        let first_minute = self.minute.first()?;
        let first_second = self.second.first()?;

        let next_hour = self.hour.next_match(hour)?;
        if next_hour > hour {
            return NaiveTime::from_hms_opt(next_hour, first_minute, first_second);
        }

        if let Some(next_minute) = self.minute.next_match(minute) {
            if next_minute > minute {
                return NaiveTime::from_hms_opt(hour, next_minute, first_second);
            }
            if let Some(next_second) = self.second.next_match(second) {
                return NaiveTime::from_hms_opt(hour, minute, next_second);
            }
            // seconds overflow
            if let Some(next_minute) = self.minute.next_match(minute + 1) {
                return NaiveTime::from_hms_opt(hour, next_minute, first_second);
            }
        }

        // minutes overflow
        let next_hour = self.hour.next_match(hour + 1)?;
        NaiveTime::from_hms_opt(next_hour, first_minute, first_second)
    }

    fn instant_for(&self, wall: NaiveDateTime) -> Option<DateTime<Tz>> {
        match resolve_local(&self.timezone, wall)? {
            LocalInstant::Single(dt) => Some(dt),
            LocalInstant::Ambiguous { earliest, .. } => Some(earliest),
            LocalInstant::Skipped { shifted } => Some(shifted),
        }
    }

    fn is_after_end(&self, instant: &DateTime<Tz>) -> bool {
        self.schedule
            .end
            .is_some_and(|end| instant.with_timezone(&Utc) > end)
    }

    fn no_more_timeouts(&self, instant: &DateTime<Tz>) -> bool {
        instant.year() > MAX_YEAR || self.is_after_end(instant)
    }
}

fn resolve_timezone(id: Option<&str>, default_timezone: Tz) -> Tz {
    match id.map(str::trim).filter(|id| !id.is_empty()) {
        None => default_timezone,
        Some(id) => id.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "Unknown timezone id: {} found in schedule expression. Ignoring it and using default timezone: {}",
                id, default_timezone
            );
            default_timezone
        }),
    }
}

fn earliest_of<T: Ord>(first: Option<T>, second: Option<T>) -> Option<T> {
    match (first, second) {
        (Some(first), Some(second)) => Some(first.min(second)),
        (first, second) => first.or(second),
    }
}

fn midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(0, 0, 0)
}

fn next_second(wall: NaiveDateTime) -> Option<NaiveDateTime> {
    wall.checked_add_signed(Duration::seconds(1))
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout(schedule: &ScheduleExpression) -> CalendarBasedTimeout {
        CalendarBasedTimeout::new(schedule, Tz::UTC).unwrap()
    }

    fn time(hour: u32, minute: u32, second: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, second).unwrap()
    }

    fn wall(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn test_next_time_seconds_overflow_resets_seconds() {
        let calc = timeout(&ScheduleExpression::new().hour("*").minute("0-45").second("0/10"));
        assert_eq!(calc.compute_next_time(time(9, 46, 42)), Some(time(10, 0, 0)));
        assert_eq!(calc.compute_next_time(time(9, 44, 51)), Some(time(9, 45, 0)));
        assert_eq!(calc.compute_next_time(time(9, 44, 50)), Some(time(9, 44, 50)));
    }

    #[test]
    fn test_next_time_hour_overflow_resets_minutes_and_seconds() {
        let calc = timeout(&ScheduleExpression::new().hour("20-22").minute("0/5").second("20,40"));
        assert_eq!(calc.compute_next_time(time(9, 45, 35)), Some(time(20, 0, 20)));
        assert_eq!(calc.compute_next_time(time(22, 55, 41)), None);
        assert_eq!(calc.compute_next_time(time(23, 0, 0)), None);
    }

    #[test]
    fn test_next_wall_skips_months_without_the_day() {
        let calc = timeout(&ScheduleExpression::new().day_of_month("31"));
        assert_eq!(calc.next_wall(wall(2024, 1, 31, 0, 0, 1)), Some(wall(2024, 3, 31, 0, 0, 0)));
        assert_eq!(calc.next_wall(wall(2024, 4, 1, 0, 0, 0)), Some(wall(2024, 5, 31, 0, 0, 0)));
    }

    #[test]
    fn test_next_wall_year_list_exhausted() {
        let calc = timeout(&ScheduleExpression::new().year("2020, 2022"));
        assert_eq!(calc.next_wall(wall(2021, 6, 1, 0, 0, 0)), Some(wall(2022, 1, 1, 0, 0, 0)));
        assert_eq!(calc.next_wall(wall(2022, 12, 31, 0, 0, 1)), None);
    }

    #[test]
    fn test_next_wall_impossible_date_terminates() {
        let calc = timeout(&ScheduleExpression::new().month("Feb").day_of_month("30"));
        assert_eq!(calc.next_wall(wall(2024, 1, 1, 0, 0, 0)), None);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_default() {
        let schedule = ScheduleExpression::new().timezone("Mars/Olympus_Mons");
        let calc = CalendarBasedTimeout::new(&schedule, Tz::Europe__Paris).unwrap();
        assert_eq!(calc.timezone(), Tz::Europe__Paris);

        let blank = ScheduleExpression::new().timezone("  ");
        let calc = CalendarBasedTimeout::new(&blank, Tz::Asia__Tokyo).unwrap();
        assert_eq!(calc.timezone(), Tz::Asia__Tokyo);

        let known = ScheduleExpression::new().timezone(" America/Chicago ");
        let calc = CalendarBasedTimeout::new(&known, Tz::UTC).unwrap();
        assert_eq!(calc.timezone(), Tz::America__Chicago);
    }

    #[test]
    fn test_schedule_is_copied() {
        let mut schedule = ScheduleExpression::new().hour("5");
        let calc = timeout(&schedule);
        schedule.hour = "6".to_string();
        assert_eq!(calc.schedule_expression().hour, "5");
    }

    #[test]
    fn test_malformed_field_fails_construction() {
        assert!(CalendarBasedTimeout::new(&ScheduleExpression::new().minute("61"), Tz::UTC).is_err());
        assert!(CalendarBasedTimeout::new(&ScheduleExpression::new().month("0/2"), Tz::UTC).is_err());
        assert!(CalendarBasedTimeout::new(&ScheduleExpression::new().second(""), Tz::UTC).is_err());
    }

    #[test]
    fn test_earliest_of() {
        assert_eq!(earliest_of(Some(3), Some(1)), Some(1));
        assert_eq!(earliest_of(None, Some(1)), Some(1));
        assert_eq!(earliest_of(Some(3), None), Some(3));
        assert_eq!(earliest_of::<i32>(None, None), None);
    }
}
