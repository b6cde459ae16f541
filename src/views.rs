//! Views over the reminder collection: time windows, category routing,
//! dashboard figures and the complete/delete actions.

use std::fmt;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Days, Months, TimeZone, Utc};
use clap::ValueEnum;
use tracing::debug;

use crate::dates::{self, is_this_month, is_this_week, is_today};
use crate::error::{Error, Result};
use crate::models::{Priority, RecurrenceKind, Reminder};
use crate::occurrence::{Occurrence, OccurrenceId};
use crate::recurrence::expand_in;

const SHOPPING_CATEGORIES: [&str; 2] = ["shopping", "things to buy"];
const WORK_CATEGORY: &str = "work";
const BIRTHDAY_CATEGORY: &str = "birthday";
const EVENT_CATEGORIES: [&str; 2] = ["event", "classes"];

/// How long the dashboard stays up before the carousel moves on.
pub const DASHBOARD_INTERVAL: StdDuration = StdDuration::from_secs(10);
/// How long every other view stays up.
pub const STANDARD_INTERVAL: StdDuration = StdDuration::from_secs(8);

/// Number of entries in the birthday and important-event panels.
pub const PANEL_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum View {
    Dashboard,
    Today,
    Week,
    Month,
    Works,
    Shopping,
    Outstanding,
    Habits,
}

impl View {
    /// Rotation order of the dashboard carousel.
    pub const CAROUSEL: [View; 8] = [
        View::Dashboard,
        View::Today,
        View::Week,
        View::Month,
        View::Works,
        View::Shopping,
        View::Outstanding,
        View::Habits,
    ];

    pub fn next(self) -> View {
        let i = Self::position(self);
        Self::CAROUSEL[(i + 1) % Self::CAROUSEL.len()]
    }

    pub fn previous(self) -> View {
        let i = Self::position(self);
        Self::CAROUSEL[(i + Self::CAROUSEL.len() - 1) % Self::CAROUSEL.len()]
    }

    fn position(view: View) -> usize {
        Self::CAROUSEL.iter().position(|v| *v == view).unwrap_or(0)
    }

    pub fn interval(self) -> StdDuration {
        match self {
            View::Dashboard => DASHBOARD_INTERVAL,
            _ => STANDARD_INTERVAL,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Today => "Today",
            View::Week => "This Week",
            View::Month => "This Month",
            View::Works => "Works",
            View::Shopping => "Shopping",
            View::Outstanding => "Outstanding",
            View::Habits => "Habits",
        }
    }

    /// The expansion window of a time-based view, starting at local midnight.
    ///
    /// `Today` ends one millisecond before the next midnight; `Week` and
    /// `Month` end at midnight seven days and one calendar month later.
    pub fn window<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let tz = now.timezone();
        let today = now.date_naive();
        let start = dates::start_of_day(now);
        let end = match self {
            View::Today => {
                let tomorrow = today.checked_add_days(Days::new(1))?;
                dates::midnight_in(&tz, tomorrow) - chrono::Duration::milliseconds(1)
            }
            View::Week => dates::midnight_in(&tz, today.checked_add_days(Days::new(7))?),
            View::Month => dates::midnight_in(&tz, today.checked_add_months(Months::new(1))?),
            _ => return None,
        };
        Some((start, end))
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

pub fn is_shopping(reminder: &Reminder) -> bool {
    SHOPPING_CATEGORIES.iter().any(|c| reminder.is_category(c))
}

pub fn is_work(reminder: &Reminder) -> bool {
    reminder.is_category(WORK_CATEGORY)
}

pub fn is_yearly(reminder: &Reminder) -> bool {
    reminder.repeat_rule().is_some_and(|r| r.kind == RecurrenceKind::Yearly)
}

/// Occurrences of `template` in range that the user has not dismissed.
pub fn visible_occurrences<'a, Tz: TimeZone>(
    template: &'a Reminder,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    tz: &Tz,
) -> Vec<Occurrence<'a>> {
    expand_in(template, range_start, range_end, tz)
        .into_iter()
        .filter(|o| !o.is_dismissed())
        .collect()
}

/// Visible occurrences of every template, merged and sorted by due date.
pub fn agenda<'a, Tz, I>(templates: I, range_start: DateTime<Utc>, range_end: DateTime<Utc>, tz: &Tz) -> Vec<Occurrence<'a>>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a Reminder>,
{
    let mut merged: Vec<Occurrence<'a>> = templates
        .into_iter()
        .filter(|r| !r.completed)
        .flat_map(|r| visible_occurrences(r, range_start, range_end, tz))
        .collect();
    merged.sort_by_key(|o| o.due_date);
    merged
}

/// The items listed by `view`.
///
/// Category views list their templates unexpanded; time views expand every
/// template outside the shopping and work categories over the view window.
/// The dashboard and habit views carry no reminder list.
pub fn view_items<'a, Tz: TimeZone>(view: View, reminders: &'a [Reminder], now: &DateTime<Tz>) -> Vec<Occurrence<'a>> {
    let open = reminders.iter().filter(|r| !r.completed);
    match view {
        View::Dashboard | View::Habits => Vec::new(),
        View::Outstanding => open.filter(|r| is_yearly(r)).map(Occurrence::of_template).collect(),
        View::Shopping => open.filter(|r| is_shopping(r)).map(Occurrence::of_template).collect(),
        View::Works => open.filter(|r| is_work(r)).map(Occurrence::of_template).collect(),
        View::Today | View::Week | View::Month => match view.window(now) {
            Some((start, end)) => agenda(
                open.filter(|r| !is_shopping(r) && !is_work(r)),
                start,
                end,
                &now.timezone(),
            ),
            None => Vec::new(),
        },
    }
}

/// Counters shown on the dashboard and next to each view name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub today: usize,
    pub week: usize,
    pub month: usize,
    pub shopping: usize,
    pub works: usize,
    pub outstanding: usize,
    pub habits: usize,
}

impl DashboardStats {
    /// Counts open templates by their own due date; nothing is expanded.
    pub fn compute<Tz: TimeZone>(reminders: &[Reminder], habit_count: usize, now: &DateTime<Tz>) -> Self {
        let open = || reminders.iter().filter(|r| !r.completed);
        DashboardStats {
            today: open().filter(|r| is_today(r.due_date, now)).count(),
            week: open().filter(|r| is_this_week(r.due_date, now)).count(),
            month: open().filter(|r| is_this_month(r.due_date, now)).count(),
            shopping: open().filter(|r| is_shopping(r)).count(),
            works: open().filter(|r| is_work(r)).count(),
            outstanding: open().filter(|r| is_yearly(r)).count(),
            habits: habit_count,
        }
    }

    pub fn count_for(&self, view: View) -> Option<usize> {
        match view {
            View::Dashboard => None,
            View::Today => Some(self.today),
            View::Week => Some(self.week),
            View::Month => Some(self.month),
            View::Works => Some(self.works),
            View::Shopping => Some(self.shopping),
            View::Outstanding => Some(self.outstanding),
            View::Habits => Some(self.habits),
        }
    }
}

/// The next few birthday occurrences within three months of `now`.
pub fn upcoming_birthdays<'a, Tz: TimeZone>(reminders: &'a [Reminder], now: &DateTime<Tz>) -> Vec<Occurrence<'a>> {
    let start = now.with_timezone(&Utc);
    let Some(end) = now.naive_local().checked_add_months(Months::new(3)) else {
        return Vec::new();
    };
    let end = now
        .timezone()
        .from_local_datetime(&end)
        .earliest()
        .map_or(start, |dt| dt.with_timezone(&Utc));

    let mut birthdays: Vec<Occurrence<'a>> = reminders
        .iter()
        .filter(|r| !r.completed && r.is_category(BIRTHDAY_CATEGORY))
        .flat_map(|r| expand_in(r, start, end, &now.timezone()))
        .collect();
    birthdays.sort_by_key(|o| o.due_date);
    birthdays.truncate(PANEL_LIMIT);
    birthdays
}

/// High-priority reminders, events and classes, soonest first.
pub fn important_events(reminders: &[Reminder]) -> Vec<Occurrence<'_>> {
    let mut events: Vec<&Reminder> = reminders
        .iter()
        .filter(|r| !r.completed)
        .filter(|r| r.priority == Priority::High || EVENT_CATEGORIES.iter().any(|c| r.is_category(c)))
        .collect();
    events.sort_by_key(|r| r.due_date);
    events.into_iter().take(PANEL_LIMIT).map(Occurrence::of_template).collect()
}

/// What completing an id did to the collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// A recurring occurrence was added to its template's dismissed set.
    Dismissed { template_id: String, instance: String },
    /// The occurrence was already dismissed.
    AlreadyDismissed { template_id: String, instance: String },
    /// A bare template id was completed, which removes the template.
    Removed(Reminder),
}

/// Completes the occurrence with the flattened id `id`.
///
/// Instance ids are recorded on their template; bare ids remove the template.
pub fn complete(reminders: &mut Vec<Reminder>, id: &str) -> Result<Completion> {
    let parsed: OccurrenceId = id.parse()?;
    match parsed {
        OccurrenceId::Instance { ref template_id, .. } => {
            let template = reminders
                .iter_mut()
                .find(|r| r.id == *template_id)
                .ok_or_else(|| Error::not_found("reminder", template_id.clone()))?;
            let instance = parsed.to_string();
            if template.dismiss_instance(&instance) {
                debug!(%instance, "dismissed occurrence");
                Ok(Completion::Dismissed { template_id: template_id.clone(), instance })
            } else {
                Ok(Completion::AlreadyDismissed { template_id: template_id.clone(), instance })
            }
        }
        OccurrenceId::Template(template_id) => {
            let removed = delete(reminders, &template_id)?;
            Ok(Completion::Removed(removed))
        }
    }
}

/// Removes the template owning `id`; instance ids resolve to their template.
pub fn delete(reminders: &mut Vec<Reminder>, id: &str) -> Result<Reminder> {
    let parsed: OccurrenceId = id.parse()?;
    let base = parsed.template_id();
    let idx = reminders
        .iter()
        .position(|r| r.id == base)
        .ok_or_else(|| Error::not_found("reminder", base))?;
    debug!(id = base, "removed reminder");
    Ok(reminders.remove(idx))
}
