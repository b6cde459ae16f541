use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{Error, Result};

/// Whether `due` falls on the same local calendar day as `now`.
pub fn is_today<Tz: TimeZone>(due: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    due.with_timezone(&now.timezone()).date_naive() == now.date_naive()
}

/// Whether `due` lies between `now` and seven days from now.
pub fn is_this_week<Tz: TimeZone>(due: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    let now = now.with_timezone(&Utc);
    due >= now && due <= now + Duration::days(7)
}

/// Whether `due` is in the same local month and year as `now`.
pub fn is_this_month<Tz: TimeZone>(due: DateTime<Utc>, now: &DateTime<Tz>) -> bool {
    let local = due.with_timezone(&now.timezone());
    local.month() == now.month() && local.year() == now.year()
}

/// Completed items are never overdue.
pub fn is_overdue<Tz: TimeZone>(due: DateTime<Utc>, completed: bool, now: &DateTime<Tz>) -> bool {
    !completed && due < now.with_timezone(&Utc)
}

/// Local midnight at the start of `now`'s day.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    midnight_in(&now.timezone(), now.date_naive())
}

/// Local midnight of `day` in `tz`.
pub fn midnight_in<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    local_instant(tz, day.and_time(NaiveTime::MIN))
}

/// Short label for how far away `due` is: `"2d overdue"`, `"Today"`, `"3d"`.
pub fn time_left<Tz: TimeZone>(due: DateTime<Utc>, now: &DateTime<Tz>) -> String {
    let due_day = due.with_timezone(&now.timezone()).date_naive();
    let days_left = (due_day - now.date_naive()).num_days();
    if days_left < 0 {
        format!("{}d overdue", days_left.abs())
    } else if days_left == 0 {
        "Today".to_string()
    } else {
        format!("{}d", days_left)
    }
}

/// `Wed, Jan 31, 09:00 AM` in the host's local time.
pub fn format_nice_date(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%a, %b %-d, %I:%M %p").to_string()
}

/// Parses a due date typed by the user.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM` (local) and `YYYY-MM-DD` (local
/// midnight).
pub fn parse_due(input: &str) -> Result<DateTime<Utc>> {
    parse_due_in(input, &Local)
}

pub fn parse_due_in<Tz: TimeZone>(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(local_instant(tz, naive));
        }
    }
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(day) => Ok(midnight_in(tz, day)),
        Err(e) => Err(Error::InvalidDate { input: input.to_string(), reason: e.to_string() }),
    }
}

// Wall-clock times inside a DST gap are read as UTC.
fn local_instant<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
