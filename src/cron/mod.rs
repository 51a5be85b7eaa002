// src/cron/mod.rs
pub mod attribute;
pub mod calendar_timeout;
pub(crate) mod dst;
pub mod expression;
pub mod expression_type;
