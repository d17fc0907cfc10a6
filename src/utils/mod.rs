pub mod time;

pub use time::{utc_day, utc_day_label, DAY_FORMAT};
