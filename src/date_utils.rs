use chrono::{Datelike, Days, NaiveDate};

/// Julian Date of the reference new moon (2000-01-06)
pub const REFERENCE_NEW_MOON_JD: f64 = 2451549.5;

/// Convert a Gregorian civil date to a Julian Date (midnight, fractional .5)
pub fn julian_date(date: NaiveDate) -> f64 {
    let mut year = date.year() as f64;
    let mut month = date.month() as f64;
    let day = date.day() as f64;

    // January and February count as months 13 and 14 of the previous year
    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day + b - 1524.5
}

/// Days elapsed since the reference new moon
pub fn days_since_reference(date: NaiveDate) -> f64 {
    julian_date(date) - REFERENCE_NEW_MOON_JD
}

/// Date `offset` days after `start`, or None past the end of the calendar
pub fn day_after(start: NaiveDate, offset: u32) -> Option<NaiveDate> {
    start.checked_add_days(Days::new(u64::from(offset)))
}

/// Date `offset` days before `end`, or None before the start of the calendar
pub fn day_before(end: NaiveDate, offset: u32) -> Option<NaiveDate> {
    end.checked_sub_days(Days::new(u64::from(offset)))
}
