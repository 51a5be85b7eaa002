// src/lib.rs
pub mod config;
pub mod cron;
pub mod error;
pub mod utils;

pub use config::CalendarConfig;
pub use cron::calendar_timeout::CalendarBasedTimeout;
pub use cron::expression::{does_schedule_match, ScheduleExpression};
pub use cron::expression_type::ScheduleExpressionType;
pub use error::{ScheduleError, ScheduleResult};
