use super::{identity, FieldMatcher, FieldSpec, IntegerBasedExpression};
use crate::error::ScheduleResult;

const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    names: &[
        ("jan", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("may", 5),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("sep", 9),
        ("oct", 10),
        ("nov", 11),
        ("dec", 12),
    ],
    supports_increment: false,
    wraps: true,
    normalize: identity,
};

/// Matcher for the month attribute, `1..=12` or `Jan..Dec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Month(IntegerBasedExpression);

impl Month {
    pub fn new(value: &str) -> ScheduleResult<Self> {
        IntegerBasedExpression::parse(&MONTH, value).map(Self)
    }
}

impl FieldMatcher for Month {
    fn expression(&self) -> &IntegerBasedExpression {
        &self.0
    }
}
