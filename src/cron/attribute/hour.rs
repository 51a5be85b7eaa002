use super::{identity, FieldMatcher, FieldSpec, IntegerBasedExpression};
use crate::error::ScheduleResult;

const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    names: &[],
    supports_increment: true,
    wraps: true,
    normalize: identity,
};

/// Matcher for the hour attribute, `0..=23`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hour(IntegerBasedExpression);

impl Hour {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        IntegerBasedExpression::parse(&HOUR, value).map(Self)
    }
}

impl FieldMatcher for Hour {
    fn expression(&self) -> &IntegerBasedExpression {
        &self.0
    }
}
