//! Human-readable date labels such as `Tuesday, Dec 6th`.

use chrono::{DateTime, Datelike, Utc};

/// Format a date for phase banners and emails.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use eptss::domain::round::format_phase_label;
///
/// let date = Utc.with_ymd_and_hms(2022, 12, 6, 0, 0, 0).unwrap();
/// assert_eq!(format_phase_label(date), "Tuesday, Dec 6th");
/// ```
pub fn format_phase_label(date: DateTime<Utc>) -> String {
    let day = date.day();
    format!("{}{}{}", date.format("%A, %b "), day, ordinal_suffix(day))
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}
