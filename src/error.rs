// src/error.rs
use thiserror::Error;

use crate::cron::expression_type::ScheduleExpressionType;

/// Errors raised while parsing the fields of a schedule expression.
///
/// An exhausted schedule is never an error: the calculator reports it as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("{field} cannot be empty in schedule expression")]
    EmptyValue { field: &'static str },

    #[error("Could not parse: {value} in schedule expression for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Invalid value: {value} for {field}. Valid values are between {min} and {max}")]
    ValueOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid range value: {value} for {field}")]
    InvalidRange { field: &'static str, value: String },

    #[error("Invalid list expression: {value} for {field}")]
    InvalidList { field: &'static str, value: String },

    #[error("Invalid increment value: {value} for {field}")]
    InvalidIncrement { field: &'static str, value: String },

    #[error("Invalid value: {value} since {field} doesn't support values of types {kind}")]
    UnsupportedType {
        field: &'static str,
        value: String,
        kind: ScheduleExpressionType,
    },

    #[error("Invalid value for day-of-month: {value}")]
    InvalidDayOfMonth { value: String },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
