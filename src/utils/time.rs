use chrono::{DateTime, NaiveDate, Utc};

/// Calendar format used for partition file names.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// UTC calendar day containing `millis` (milliseconds since the Unix epoch).
pub fn utc_day(millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// `YYYY-MM-DD` label of the UTC day containing `millis`.
pub fn utc_day_label(millis: i64) -> Option<String> {
    utc_day(millis).map(|day| day.format(DAY_FORMAT).to_string())
}
