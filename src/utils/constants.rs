pub const MIN_YEAR: i32 = 1000;
pub const MAX_YEAR: i32 = 9999;

pub const DEFAULT_SECOND: &str = "0";
pub const DEFAULT_MINUTE: &str = "0";
pub const DEFAULT_HOUR: &str = "0";
pub const DEFAULT_DAY_OF_MONTH: &str = "*";
pub const DEFAULT_DAY_OF_WEEK: &str = "*";
pub const DEFAULT_MONTH: &str = "*";
pub const DEFAULT_YEAR: &str = "*";

pub const ENV_DEFAULT_TIMEZONE: &str = "CALENDAR_TIMEOUT_TZ";
pub const ENV_TZ: &str = "TZ";
