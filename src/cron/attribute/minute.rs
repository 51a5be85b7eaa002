use super::{identity, FieldMatcher, FieldSpec, IntegerBasedExpression};
use crate::error::ScheduleResult;

const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    names: &[],
    supports_increment: true,
    wraps: true,
    normalize: identity,
};

/// Matcher for the minute attribute, `0..=59`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Minute(IntegerBasedExpression);

impl Minute {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        IntegerBasedExpression::parse(&MINUTE, value).map(Self)
    }
}

impl FieldMatcher for Minute {
    fn expression(&self) -> &IntegerBasedExpression {
        &self.0
    }
}
