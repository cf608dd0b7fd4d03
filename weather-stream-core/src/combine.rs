use crate::coerce::reformat_timestamp;

/// Astro times come back as 12-hour clock strings, e.g. `06:15 AM` or `8:00 PM`.
const DATE_TIME_12H_FORMAT: &str = "%Y-%m-%d %I:%M %p";

/// Join a `YYYY-MM-DD` date with a `hh:mm AM/PM` time of day into a 24-hour
/// `YYYY-MM-DD HH:MM:SS` timestamp. Any missing or malformed part gives `None`.
pub fn combine_date_and_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let combined = format!("{} {}", date?, time?);
    reformat_timestamp(&combined, DATE_TIME_12H_FORMAT)
}
