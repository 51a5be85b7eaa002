// src/cron/dst.rs
//! Mapping of local wall-clock values onto instants around DST transitions.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

/// Longest span searched backwards for the edge of a gap or fold.
const MAX_TRANSITION_MINUTES: i64 = 26 * 60;

/// Window inspected for a recent forward transition.
const FORWARD_WINDOW_HOURS: i64 = 3;

/// How a wall-clock value exists in a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LocalInstant {
    Single(DateTime<Tz>),
    /// The wall time is repeated by a backward transition.
    Ambiguous {
        earliest: DateTime<Tz>,
        latest: DateTime<Tz>,
    },
    /// The wall time is skipped by a forward transition. `shifted` reads it with the
    /// offset in force before the gap.
    Skipped { shifted: DateTime<Tz> },
}

pub(crate) fn resolve_local(tz: &Tz, wall: NaiveDateTime) -> Option<LocalInstant> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(dt) => Some(LocalInstant::Single(dt)),
        LocalResult::Ambiguous(earliest, latest) => Some(LocalInstant::Ambiguous { earliest, latest }),
        LocalResult::None => {
            let before_gap = (1..=MAX_TRANSITION_MINUTES)
                .filter_map(|minutes| wall.checked_sub_signed(Duration::minutes(minutes)))
                .find_map(|earlier| tz.from_local_datetime(&earlier).latest())?;
            let offset = before_gap.offset().fix().local_minus_utc();
            let utc = wall.checked_sub_signed(Duration::seconds(i64::from(offset)))?;
            Some(LocalInstant::Skipped {
                shifted: Utc.from_utc_datetime(&utc).with_timezone(tz),
            })
        }
    }
}

/// When `at` lies within the jump of a recent forward transition, returns the size of that
/// jump. Wall times in `[wall(at) - jump, wall(at)]` may then have been replaced by instants
/// at or after `at`.
pub(crate) fn forward_shift(at: &DateTime<Tz>) -> Option<Duration> {
    let tz = at.timezone();
    let offset_at = |instant: DateTime<Utc>| tz.offset_from_utc_datetime(&instant.naive_utc()).fix();

    let now = at.with_timezone(&Utc);
    let current = offset_at(now).local_minus_utc();
    let earlier = offset_at(now - Duration::hours(FORWARD_WINDOW_HOURS)).local_minus_utc();
    if earlier >= current {
        return None;
    }

    let delta = Duration::seconds(i64::from(current - earlier));
    (offset_at(now - delta).local_minus_utc() == earlier).then_some(delta)
}

/// First wall time of the fold containing the ambiguous `wall`.
pub(crate) fn fold_start(tz: &Tz, wall: NaiveDateTime) -> NaiveDateTime {
    let mut start = wall;
    for _ in 0..MAX_TRANSITION_MINUTES {
        let Some(earlier) = start.checked_sub_signed(Duration::minutes(1)) else {
            break;
        };
        match tz.from_local_datetime(&earlier) {
            LocalResult::Ambiguous(..) => start = earlier,
            _ => break,
        }
    }
    start
}
