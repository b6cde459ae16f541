//! Expansion of reminder templates into the occurrences that fall inside a
//! time window.
//!
//! The walk keeps its cursor as a local wall-clock date-time in the supplied
//! time zone and only converts to an instant when emitting an occurrence, so
//! a 09:00 daily reminder stays at 09:00 across DST changes. A wall-clock
//! time skipped by a DST gap is emitted an hour later for that day only.
//! Day-of-month overflow follows chrono: adding a month to Jan 31 lands on
//! the last day of February, and the walk continues from there.

use chrono::{DateTime, Datelike, Days, Duration, Local, Months, NaiveDateTime, TimeZone, Utc, Weekday};
use tracing::trace;

use crate::models::{Recurrence, RecurrenceKind, Reminder};
use crate::occurrence::Occurrence;

/// Upper bound on cadence steps walked per expansion.
pub const SAFETY_CAP: usize = 400;

/// Occurrences of `template` within `[range_start, range_end]`, using the
/// host's local calendar.
pub fn expand(template: &Reminder, range_start: DateTime<Utc>, range_end: DateTime<Utc>) -> Vec<Occurrence<'_>> {
    expand_in(template, range_start, range_end, &Local)
}

/// Occurrences of `template` within `[range_start, range_end]`, stepping on
/// the calendar of `tz`.
///
/// Non-recurring templates yield themselves when their due date is in range.
/// Recurring templates are walked from their anchor one cadence step at a
/// time, stopping at the earlier of `range_end` and the recurrence end date,
/// or after [`SAFETY_CAP`] steps. The result is in ascending order.
pub fn expand_in<'a, Tz: TimeZone>(
    template: &'a Reminder,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Occurrence<'a>> {
    if range_start > range_end {
        return Vec::new();
    }

    let rule = match template.repeat_rule() {
        Some(rule) => rule,
        None => {
            let due = template.due_date;
            return if range_start <= due && due <= range_end {
                vec![Occurrence::of_template(template)]
            } else {
                Vec::new()
            };
        }
    };

    if rule.kind == RecurrenceKind::Unknown {
        trace!(id = %template.id, "unknown cadence, nothing to expand");
    }

    let effective_end = rule.end_date.map_or(range_end, |end| end.min(range_end));
    let mut local = template.due_date.with_timezone(tz).naive_local();
    let anchor_weekday = local.weekday();

    let mut occurrences = Vec::new();
    // The anchor keeps its stored instant even when its wall-clock time is ambiguous.
    let mut at = template.due_date;
    let mut steps = 0;

    loop {
        if at > effective_end {
            break;
        }
        if steps >= SAFETY_CAP {
            trace!(id = %template.id, steps, "safety cap reached");
            break;
        }
        if at >= range_start && qualifies(rule, local.weekday()) {
            occurrences.push(Occurrence::instance(template, at));
        }
        steps += 1;

        let Some(next) = next_candidate(rule.kind, anchor_weekday, local, effective_end, tz) else {
            break;
        };
        let Some(resolved) = resolve_local(tz, next) else {
            break;
        };
        local = next;
        at = resolved;
    }

    occurrences
}

/// The local wall-clock position after `cursor` for the given cadence.
///
/// Positions are naive date-times in `tz`; the time of day never changes.
/// `Weekly` moves at least one day and then keeps going until it is back on
/// `anchor_weekday` or past `effective_end`. Returns `None` when the cadence
/// has no successor (`None`, `Unknown`) or the calendar runs out.
pub fn next_candidate<Tz: TimeZone>(
    kind: RecurrenceKind,
    anchor_weekday: Weekday,
    cursor: NaiveDateTime,
    effective_end: DateTime<Utc>,
    tz: &Tz,
) -> Option<NaiveDateTime> {
    match kind {
        RecurrenceKind::Daily | RecurrenceKind::Custom => cursor.checked_add_days(Days::new(1)),
        RecurrenceKind::Weekly => {
            let mut next = cursor.checked_add_days(Days::new(1))?;
            loop {
                if next.weekday() == anchor_weekday || resolve_local(tz, next)? > effective_end {
                    return Some(next);
                }
                next = next.checked_add_days(Days::new(1))?;
            }
        }
        RecurrenceKind::Monthly => cursor.checked_add_months(Months::new(1)),
        RecurrenceKind::Yearly => cursor.checked_add_months(Months::new(12)),
        RecurrenceKind::None | RecurrenceKind::Unknown => None,
    }
}

fn qualifies(rule: &Recurrence, weekday: Weekday) -> bool {
    match rule.kind {
        RecurrenceKind::Daily | RecurrenceKind::Weekly | RecurrenceKind::Monthly | RecurrenceKind::Yearly => true,
        RecurrenceKind::Custom => rule.allows(weekday),
        RecurrenceKind::None | RecurrenceKind::Unknown => false,
    }
}

/// The instant a local wall-clock position refers to in `tz`.
///
/// Ambiguous times take the earlier instant; times skipped by a DST gap move
/// forward an hour.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
