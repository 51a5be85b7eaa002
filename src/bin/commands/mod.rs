mod calendar_timeout;

pub use self::calendar_timeout::*;
