//! Reminder manager with recurring-event expansion, habit tracking and
//! local JSON persistence.
//!
//! The heart of the crate is [`recurrence::expand`], which turns a reminder
//! template into the concrete occurrences inside a time window. Each
//! occurrence carries an [`occurrence::OccurrenceId`] that stays stable
//! across runs, so single occurrences can be completed without touching the
//! template's schedule.

pub mod commands;
pub mod dates;
pub mod error;
pub mod habits;
pub mod models;
pub mod occurrence;
pub mod recurrence;
pub mod storage;
pub mod tui;
pub mod views;

pub use error::{Error, Result};
