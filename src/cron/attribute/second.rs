use super::{identity, FieldMatcher, FieldSpec, IntegerBasedExpression};
use crate::error::ScheduleResult;

const SECOND: FieldSpec = FieldSpec {
    name: "second",
    min: 0,
    max: 59,
    names: &[],
    supports_increment: true,
    wraps: true,
    normalize: identity,
};

/// Matcher for the second attribute, `0..=59`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Second(IntegerBasedExpression);

impl Second {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        IntegerBasedExpression::parse(&SECOND, value).map(Self)
    }
}

impl FieldMatcher for Second {
    fn expression(&self) -> &IntegerBasedExpression {
        &self.0
    }
}
