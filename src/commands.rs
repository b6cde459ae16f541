use std::io::{self, Write};

use chrono::{Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use tracing::{debug, warn};

use crate::dates::{format_nice_date, is_overdue, parse_due, time_left};
use crate::error::{Error, Result};
use crate::habits::{current_run, recent_days, streak, toggle_date};
use crate::models::{Habit, Priority, Recurrence, RecurrenceKind, Reminder, VaultField};
use crate::occurrence::{Occurrence, OccurrenceId};
use crate::storage::Store;
use crate::views::{self, important_events, upcoming_birthdays, view_items, Completion, DashboardStats, View};

/// Optional reminder fields given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ReminderDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub cost: Option<f64>,
    pub recur: Option<RecurrenceKind>,
    /// Weekday indices for `custom`, 0=Sunday..6=Saturday.
    pub days: Vec<u8>,
    pub until: Option<String>,
}

/// Next free numeric id. Non-numeric ids from older data are skipped.
fn next_id<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    let max = ids.filter_map(|id| id.parse::<u64>().ok()).max().unwrap_or(0);
    (max + 1).to_string()
}

fn build_recurrence(kind: RecurrenceKind, days: &[u8], until: Option<&str>) -> Result<Option<Recurrence>> {
    let recurrence = match kind {
        RecurrenceKind::None => return Ok(None),
        RecurrenceKind::Custom => {
            if days.is_empty() {
                return Err(Error::InvalidRecurrence("custom recurrence needs at least one weekday".into()));
            }
            Recurrence::custom(days.iter().copied())?
        }
        RecurrenceKind::Unknown => return Err(Error::InvalidRecurrence("unknown cadence".into())),
        other => {
            if !days.is_empty() {
                warn!(cadence = %other, "weekdays are only used by custom recurrences");
            }
            Recurrence::new(other)
        }
    };
    match until {
        Some(u) => Ok(Some(recurrence.until(parse_due(u)?))),
        None => Ok(Some(recurrence)),
    }
}

/// Adds a new reminder and returns its id.
pub fn cmd_add(store: &Store, title: String, due: &str, draft: ReminderDraft, silent: bool) -> Result<String> {
    let due_date = parse_due(due)?;
    let recurrence = match draft.recur {
        Some(kind) => build_recurrence(kind, &draft.days, draft.until.as_deref())?,
        None => None,
    };

    let mut reminders = store.load_reminders()?;
    let id = next_id(reminders.iter().map(|r| r.id.as_str()));
    let reminder = Reminder {
        id: id.clone(),
        title,
        description: draft.description.unwrap_or_default(),
        due_date,
        priority: draft.priority.unwrap_or_default(),
        category: draft.category.unwrap_or_default(),
        completed: false,
        completed_instances: Vec::new(),
        created_at: Utc::now(),
        cost: draft.cost,
        recurrence,
    };
    reminders.push(reminder);
    store.save_reminders(&reminders)?;
    debug!(%id, "added reminder");
    if !silent {
        println!("Reminder added (id = {})", id);
    }
    Ok(id)
}

/// Completes a reminder or one occurrence of a recurring reminder.
///
/// Occurrence ids (`<id>::<millis>`) hide that occurrence only; a bare id
/// completes the reminder, which removes it.
pub fn cmd_complete(store: &Store, id: &str, silent: bool) -> Result<()> {
    let mut reminders = store.load_reminders()?;
    let outcome = views::complete(&mut reminders, id)?;
    match outcome {
        Completion::Dismissed { instance, .. } => {
            store.save_reminders(&reminders)?;
            if !silent {
                println!("Occurrence {} marked as complete.", instance);
            }
        }
        Completion::AlreadyDismissed { instance, .. } => {
            if !silent {
                println!("Occurrence {} was already complete.", instance);
            }
        }
        Completion::Removed(r) => {
            store.save_reminders(&reminders)?;
            if !silent {
                println!("Reminder {} completed and removed.", r.id);
            }
        }
    }
    Ok(())
}

/// Removes a reminder. Occurrence ids remove their whole template.
pub fn cmd_remove(store: &Store, id: &str, silent: bool) -> Result<()> {
    let mut reminders = store.load_reminders()?;
    let removed = views::delete(&mut reminders, id)?;
    store.save_reminders(&reminders)?;
    if !silent {
        println!("Reminder {} removed.", removed.id);
    }
    Ok(())
}

/// Edits an existing reminder's details.
pub fn cmd_edit(store: &Store, id: &str, draft: ReminderDraft, silent: bool) -> Result<()> {
    let parsed: OccurrenceId = id.parse()?;
    let base = parsed.template_id();
    let mut reminders = store.load_reminders()?;
    let r = reminders
        .iter_mut()
        .find(|r| r.id == base)
        .ok_or_else(|| Error::not_found("reminder", base))?;

    if let Some(t) = draft.title { r.title = t; }
    if let Some(d) = draft.description { r.description = d; }
    if let Some(c) = draft.category { r.category = c; }
    if let Some(p) = draft.priority { r.priority = p; }
    if let Some(c) = draft.cost { r.cost = Some(c); }
    if let Some(d) = &draft.due { r.due_date = parse_due(d)?; }

    match draft.recur {
        Some(kind) => {
            let existing = r.recurrence.as_ref();
            let days = if draft.days.is_empty() {
                existing.and_then(|e| e.days_of_week.clone()).unwrap_or_default()
            } else {
                draft.days.clone()
            };
            let mut recurrence = build_recurrence(kind, &days, draft.until.as_deref())?;
            if let (Some(new), None) = (recurrence.as_mut(), draft.until.as_ref()) {
                new.end_date = existing.and_then(|e| e.end_date);
            }
            r.recurrence = recurrence;
        }
        None if !draft.days.is_empty() || draft.until.is_some() => {
            let existing = r
                .recurrence
                .as_mut()
                .filter(|e| e.is_repeating())
                .ok_or_else(|| Error::InvalidRecurrence(format!("reminder {} does not repeat", base)))?;
            if !draft.days.is_empty() {
                existing.days_of_week = Recurrence::custom(draft.days.iter().copied())?.days_of_week;
            }
            if let Some(u) = &draft.until {
                existing.end_date = Some(parse_due(u)?);
            }
        }
        None => {}
    }

    store.save_reminders(&reminders)?;
    if !silent {
        println!("Reminder {} updated.", base);
    }
    Ok(())
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn repeat_label(reminder: &Reminder) -> String {
    match reminder.repeat_rule() {
        Some(r) if r.kind == RecurrenceKind::Custom => {
            let names = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
            let days: Vec<&str> = r
                .days_of_week
                .iter()
                .flatten()
                .filter_map(|d| names.get(*d as usize).copied())
                .collect();
            format!("custom ({})", days.join(","))
        }
        Some(r) => r.kind.to_string(),
        None => "-".to_string(),
    }
}

fn occurrence_table(items: &[Occurrence<'_>]) -> Table {
    let now = Local::now();
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("Title").add_attribute(Attribute::Bold),
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Priority").add_attribute(Attribute::Bold),
            Cell::new("Due").add_attribute(Attribute::Bold),
            Cell::new("Time Left").add_attribute(Attribute::Bold),
            Cell::new("Repeats").add_attribute(Attribute::Bold),
            Cell::new("Cost").add_attribute(Attribute::Bold),
        ]);

    for o in items {
        let t = o.template;
        let overdue = is_overdue(o.due_date, false, &now);
        table.add_row(vec![
            Cell::new(o.id.to_string()),
            Cell::new(&t.title),
            Cell::new(&t.category),
            Cell::new(t.priority).fg(priority_color(t.priority)),
            Cell::new(format_nice_date(o.due_date)),
            Cell::new(time_left(o.due_date, &now)).fg(if overdue { Color::Red } else { Color::Reset }),
            Cell::new(repeat_label(t)),
            Cell::new(t.cost.map(|c| format!("{:.2}", c)).unwrap_or_default()),
        ]);
    }
    table
}

/// Prints the items of a view.
pub fn cmd_list(store: &Store, view: View) -> Result<()> {
    match view {
        View::Dashboard => return cmd_stats(store),
        View::Habits => return cmd_habit_list(store, HABIT_WEEK),
        _ => {}
    }
    let reminders = store.load_reminders()?;
    let items = view_items(view, &reminders, &Local::now());
    if items.is_empty() {
        println!("No reminders in {}.", view);
        return Ok(());
    }
    println!("{}", view);
    println!("{}", occurrence_table(&items));
    Ok(())
}

/// Prints dashboard counters, upcoming birthdays and important events.
pub fn cmd_stats(store: &Store) -> Result<()> {
    let reminders = store.load_reminders()?;
    let habits = store.load_habits()?;
    let now = Local::now();
    let stats = DashboardStats::compute(&reminders, habits.len(), &now);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["View", "Open"]);
    for view in View::CAROUSEL {
        if let Some(n) = stats.count_for(view) {
            table.add_row(vec![view.title().to_string(), n.to_string()]);
        }
    }
    println!("{table}");

    let birthdays = upcoming_birthdays(&reminders, &now);
    if !birthdays.is_empty() {
        println!("Upcoming birthdays");
        println!("{}", occurrence_table(&birthdays));
    }
    let events = important_events(&reminders);
    if !events.is_empty() {
        println!("Important events");
        println!("{}", occurrence_table(&events));
    }
    Ok(())
}

/// Adds a new habit.
pub fn cmd_habit_add(store: &Store, title: String, silent: bool) -> Result<String> {
    let mut habits = store.load_habits()?;
    let id = next_id(habits.iter().map(|h| h.id.as_str()));
    habits.push(Habit {
        id: id.clone(),
        title,
        completed_dates: Default::default(),
        created_at: Utc::now(),
    });
    store.save_habits(&habits)?;
    if !silent {
        println!("Habit added (id = {})", id);
    }
    Ok(id)
}

/// Days shown by `list habits` and the TUI grid.
pub const HABIT_WEEK: usize = 7;

/// Lists habits with a grid of their last `days` days.
pub fn cmd_habit_list(store: &Store, days: usize) -> Result<()> {
    let habits = store.load_habits()?;
    if habits.is_empty() {
        println!("No habits found.");
        return Ok(());
    }
    let today = Local::now().date_naive();
    let days = recent_days(today, days.max(1));

    let mut header = vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Habit").add_attribute(Attribute::Bold),
    ];
    header.extend(days.iter().map(|d| Cell::new(d.format("%a %-d")).add_attribute(Attribute::Bold)));
    header.push(Cell::new("Run").add_attribute(Attribute::Bold));
    header.push(Cell::new("Streak").add_attribute(Attribute::Bold));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    for h in &habits {
        let mut row = vec![Cell::new(&h.id), Cell::new(&h.title)];
        for d in &days {
            if h.completed_dates.contains(d) {
                row.push(Cell::new("✔").fg(Color::Green));
            } else {
                row.push(Cell::new("·").fg(Color::DarkGrey));
            }
        }
        row.push(Cell::new(current_run(h, today)));
        row.push(Cell::new(streak(h)).fg(Color::Yellow));
        table.add_row(row);
    }
    println!("{table}");
    Ok(())
}

/// Toggles a habit for `day` (defaults to today).
pub fn cmd_habit_toggle(store: &Store, id: &str, day: Option<&str>, silent: bool) -> Result<bool> {
    let day = match day {
        Some(d) => parse_due(d)?.with_timezone(&Local).date_naive(),
        None => Local::now().date_naive(),
    };
    let mut habits = store.load_habits()?;
    let habit = habits
        .iter_mut()
        .find(|h| h.id == id)
        .ok_or_else(|| Error::not_found("habit", id))?;
    let done = toggle_date(habit, day);
    store.save_habits(&habits)?;
    if !silent {
        let state = if done { "done" } else { "not done" };
        println!("Habit {} marked {} on {}.", id, state, day);
    }
    Ok(done)
}

/// Removes a habit.
pub fn cmd_habit_remove(store: &Store, id: &str, silent: bool) -> Result<()> {
    let mut habits = store.load_habits()?;
    let len_before = habits.len();
    habits.retain(|h| h.id != id);
    if habits.len() == len_before {
        return Err(Error::not_found("habit", id));
    }
    store.save_habits(&habits)?;
    if !silent {
        println!("Habit {} removed.", id);
    }
    Ok(())
}

/// Lists vault fields.
pub fn cmd_vault_list(store: &Store) -> Result<()> {
    let fields = store.load_vault()?;
    if fields.is_empty() {
        println!("Vault is empty.");
        return Ok(());
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["ID", "Label", "Value"]);
    for f in fields {
        let value = if f.value.is_empty() { "-".to_string() } else { f.value };
        table.add_row(vec![f.id, f.label, value]);
    }
    println!("{table}");
    Ok(())
}

/// Adds a vault field and returns its id.
pub fn cmd_vault_add(store: &Store, label: String, value: Option<String>, silent: bool) -> Result<String> {
    let mut fields = store.load_vault()?;
    let id = next_id(fields.iter().map(|f| f.id.as_str()));
    fields.push(VaultField { id: id.clone(), label, value: value.unwrap_or_default() });
    store.save_vault(&fields)?;
    if !silent {
        println!("Vault field added (id = {})", id);
    }
    Ok(id)
}

/// Updates the label and/or value of a vault field.
pub fn cmd_vault_set(store: &Store, id: &str, label: Option<String>, value: Option<String>, silent: bool) -> Result<()> {
    let mut fields = store.load_vault()?;
    let field = fields
        .iter_mut()
        .find(|f| f.id == id)
        .ok_or_else(|| Error::not_found("vault field", id))?;
    if let Some(l) = label { field.label = l; }
    if let Some(v) = value { field.value = v; }
    store.save_vault(&fields)?;
    if !silent {
        println!("Vault field {} updated.", id);
    }
    Ok(())
}

/// Removes a vault field.
pub fn cmd_vault_remove(store: &Store, id: &str, silent: bool) -> Result<()> {
    let mut fields = store.load_vault()?;
    let len_before = fields.len();
    fields.retain(|f| f.id != id);
    if fields.len() == len_before {
        return Err(Error::not_found("vault field", id));
    }
    store.save_vault(&fields)?;
    if !silent {
        println!("Vault field {} removed.", id);
    }
    Ok(())
}

/// Resets the store by deleting reminders, habits and vault fields.
pub fn cmd_reset(store: &Store, force: bool) -> Result<()> {
    if !force {
        print!("Are you sure you want to delete all reminders, habits and vault fields? This cannot be undone. [y/N] ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if input.trim().to_lowercase() != "y" {
            return Err(Error::Aborted);
        }
    }
    store.reset()?;
    println!("Database reset successfully.");
    Ok(())
}
