use super::{identity, FieldMatcher, FieldSpec, IntegerBasedExpression};
use crate::error::ScheduleResult;
use crate::utils::constants::{MAX_YEAR, MIN_YEAR};

const YEAR: FieldSpec = FieldSpec {
    name: "year",
    min: MIN_YEAR as u32,
    max: MAX_YEAR as u32,
    names: &[],
    supports_increment: false,
    wraps: false,
    normalize: identity,
};

/// Matcher for the year attribute, bounded by `MIN_YEAR..=MAX_YEAR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Year(IntegerBasedExpression);

impl Year {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        IntegerBasedExpression::parse(&YEAR, value).map(Self)
    }

    /// Smallest legal year `>= year`, never past `MAX_YEAR`.
    pub fn next_year(&self, year: i32) -> Option<i32> {
        let next = if year < MIN_YEAR {
            self.first()
        } else {
            self.next_match(u32::try_from(year).ok()?)
        };
        next.and_then(|next| i32::try_from(next).ok())
    }
}

impl FieldMatcher for Year {
    fn expression(&self) -> &IntegerBasedExpression {
        &self.0
    }
}
