use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Separator between a template id and an occurrence timestamp.
pub const INSTANCE_SEPARATOR: &str = "::";

/// How important a reminder is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" => Ok(Priority::Low),
            "medium" | "med" | "m" | "" => Ok(Priority::Medium),
            "high" | "h" => Ok(Priority::High),
            other => Err(format!("unknown priority '{}'. Supported: low, medium, high.", other)),
        }
    }
}

/// The cadence of a repeating reminder.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceKind {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
    /// Any tag this build does not recognise. Expands to nothing.
    #[serde(other)]
    Unknown,
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecurrenceKind::None => "none",
            RecurrenceKind::Daily => "daily",
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::Monthly => "monthly",
            RecurrenceKind::Yearly => "yearly",
            RecurrenceKind::Custom => "custom",
            RecurrenceKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

impl FromStr for RecurrenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(RecurrenceKind::None),
            "daily" => Ok(RecurrenceKind::Daily),
            "weekly" => Ok(RecurrenceKind::Weekly),
            "monthly" => Ok(RecurrenceKind::Monthly),
            "yearly" => Ok(RecurrenceKind::Yearly),
            "custom" => Ok(RecurrenceKind::Custom),
            other => Err(format!(
                "unknown recurrence '{}'. Supported: none, daily, weekly, monthly, yearly, custom.",
                other
            )),
        }
    }
}

/// Repeat configuration attached to a reminder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recurrence {
    #[serde(rename = "type")]
    pub kind: RecurrenceKind,
    /// Weekday indices (0=Sunday..6=Saturday). Only read for `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<u8>>,
    /// No occurrence is produced after this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl Recurrence {
    pub fn new(kind: RecurrenceKind) -> Self {
        Recurrence { kind, days_of_week: None, end_date: None }
    }

    /// A `Custom` recurrence on the given weekday indices.
    pub fn custom(days: impl IntoIterator<Item = u8>) -> Result<Self, Error> {
        let mut days: Vec<u8> = days.into_iter().collect();
        if let Some(bad) = days.iter().find(|d| **d > 6) {
            return Err(Error::InvalidWeekday(*bad));
        }
        days.sort_unstable();
        days.dedup();
        Ok(Recurrence { kind: RecurrenceKind::Custom, days_of_week: Some(days), end_date: None })
    }

    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn is_repeating(&self) -> bool {
        self.kind != RecurrenceKind::None
    }

    /// Whether `weekday` passes the `daysOfWeek` filter.
    ///
    /// A missing filter lets every day through; an empty one blocks all.
    pub fn allows(&self, weekday: Weekday) -> bool {
        match &self.days_of_week {
            Some(days) => days.contains(&(weekday.num_days_from_sunday() as u8)),
            None => true,
        }
    }
}

/// A stored reminder. Recurring reminders act as templates for occurrences.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: String,
    /// Only meaningful for non-recurring reminders.
    #[serde(default)]
    pub completed: bool,
    /// Flattened ids of dismissed occurrences, e.g. `"abc::1706691600000"`.
    #[serde(default)]
    pub completed_instances: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
}

impl Reminder {
    /// Creates a non-recurring reminder with default fields.
    pub fn new(id: impl Into<String>, title: impl Into<String>, due_date: DateTime<Utc>) -> Self {
        Reminder {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            due_date,
            priority: Priority::default(),
            category: String::new(),
            completed: false,
            completed_instances: Vec::new(),
            created_at: Utc::now(),
            cost: None,
            recurrence: None,
        }
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// The active repeat rule, if any. `NONE` counts as no rule.
    pub fn repeat_rule(&self) -> Option<&Recurrence> {
        self.recurrence.as_ref().filter(|r| r.is_repeating())
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat_rule().is_some()
    }

    pub fn is_category(&self, name: &str) -> bool {
        self.category.eq_ignore_ascii_case(name)
    }

    /// Records a dismissed occurrence. Returns `false` if it was already there.
    pub fn dismiss_instance(&mut self, instance_id: &str) -> bool {
        if self.completed_instances.iter().any(|i| i == instance_id) {
            return false;
        }
        self.completed_instances.push(instance_id.to_string());
        true
    }

    pub fn is_instance_dismissed(&self, instance_id: &str) -> bool {
        self.completed_instances.iter().any(|i| i == instance_id)
    }
}

/// A daily habit and the days it was done.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed_dates: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A labelled personal value kept alongside reminders (licence numbers etc).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VaultField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub value: String,
}
