//! Stand-up time window.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, TimeZone, Utc, Weekday};

/// The working day a stand-up on `date` reports on.
///
/// Monday, Saturday and Sunday look back to Friday; any other day looks
/// back one day.
pub fn previous_working_day(date: NaiveDate) -> NaiveDate {
    let back = match date.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// `[start, end)` of `day` in the local timezone, expressed in UTC.
pub fn day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = day.succ_opt().unwrap_or(day);
    (local_midnight(day), local_midnight(next))
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}
