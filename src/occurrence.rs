use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{Reminder, INSTANCE_SEPARATOR};

/// Identity of one occurrence.
///
/// Flattened to a string only when it crosses into storage or the CLI:
/// `Template` prints as the bare template id, `Instance` as
/// `"<template_id>::<epoch millis>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OccurrenceId {
    /// A non-recurring reminder standing for itself.
    Template(String),
    /// One materialised slot of a recurring reminder.
    Instance { template_id: String, at_millis: i64 },
}

impl OccurrenceId {
    pub fn instance(template_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        OccurrenceId::Instance { template_id: template_id.into(), at_millis: at.timestamp_millis() }
    }

    pub fn template_id(&self) -> &str {
        match self {
            OccurrenceId::Template(id) => id,
            OccurrenceId::Instance { template_id, .. } => template_id,
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, OccurrenceId::Instance { .. })
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceId::Template(id) => f.write_str(id),
            OccurrenceId::Instance { template_id, at_millis } => {
                write!(f, "{}{}{}", template_id, INSTANCE_SEPARATOR, at_millis)
            }
        }
    }
}

impl FromStr for OccurrenceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(INSTANCE_SEPARATOR) {
            None if s.is_empty() => Err(Error::InvalidId(s.to_string())),
            None => Ok(OccurrenceId::Template(s.to_string())),
            Some((template_id, millis)) => {
                if template_id.is_empty() {
                    return Err(Error::InvalidId(s.to_string()));
                }
                let at_millis = millis.parse::<i64>().map_err(|_| Error::InvalidId(s.to_string()))?;
                Ok(OccurrenceId::Instance { template_id: template_id.to_string(), at_millis })
            }
        }
    }
}

/// A reminder as it appears at one point in time.
///
/// Borrows its template: every field except `id` and `due_date` is read
/// straight from there.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence<'a> {
    pub id: OccurrenceId,
    pub due_date: DateTime<Utc>,
    pub template: &'a Reminder,
}

impl<'a> Occurrence<'a> {
    /// The template standing in for itself.
    pub fn of_template(template: &'a Reminder) -> Self {
        Occurrence {
            id: OccurrenceId::Template(template.id.clone()),
            due_date: template.due_date,
            template,
        }
    }

    pub fn instance(template: &'a Reminder, at: DateTime<Utc>) -> Self {
        Occurrence { id: OccurrenceId::instance(template.id.clone(), at), due_date: at, template }
    }

    /// Whether the user has already dismissed this occurrence.
    pub fn is_dismissed(&self) -> bool {
        match &self.id {
            OccurrenceId::Template(_) => self.template.completed,
            OccurrenceId::Instance { .. } => self.template.is_instance_dismissed(&self.id.to_string()),
        }
    }

    /// Clones the template with this occurrence's id and due date.
    pub fn to_reminder(&self) -> Reminder {
        Reminder { id: self.id.to_string(), due_date: self.due_date, ..self.template.clone() }
    }
}
