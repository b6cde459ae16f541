use std::time::Duration;

use chrono::Local;
use ratatui::widgets::TableState;

use crate::commands::{cmd_add, ReminderDraft};
use crate::error::Result;
use crate::habits::toggle_date;
use crate::models::{Habit, Reminder};
use crate::occurrence::Occurrence;
use crate::storage::Store;
use crate::views::{self, view_items, Completion, DashboardStats, View};

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Adding,
}

/// State for the multi-step "Add Reminder" wizard.
#[derive(Default)]
pub struct AddState {
    pub title: String,
    pub due: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub step: usize, // 0: Title, 1: Due, 2: Category, 3: Priority, 4: Recurrence
}

pub struct App {
    store: Store,
    pub reminders: Vec<Reminder>,
    pub habits: Vec<Habit>,
    pub view: View,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub add_state: AddState,
    pub paused: bool,
    /// Time until the carousel moves to the next view.
    pub time_left: Duration,
    /// Last error or confirmation, shown in the help bar.
    pub status: Option<String>,
}

impl App {
    /// Creates a new App instance and loads initial data.
    pub fn new(store: Store) -> Result<App> {
        let mut app = App {
            store,
            reminders: Vec::new(),
            habits: Vec::new(),
            view: View::Dashboard,
            state: TableState::default(),
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            add_state: AddState::default(),
            paused: false,
            time_left: View::Dashboard.interval(),
            status: None,
        };
        app.reload()?;
        Ok(app)
    }

    /// Reloads reminders and habits from storage and clamps the selection.
    pub fn reload(&mut self) -> Result<()> {
        self.reminders = self.store.load_reminders()?;
        self.habits = self.store.load_habits()?;
        self.clamp_selection();
        Ok(())
    }

    /// Items listed by the active view.
    pub fn items(&self) -> Vec<Occurrence<'_>> {
        view_items(self.view, &self.reminders, &Local::now())
    }

    pub fn stats(&self) -> DashboardStats {
        DashboardStats::compute(&self.reminders, self.habits.len(), &Local::now())
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::Habits => self.habits.len(),
            View::Dashboard => 0,
            _ => self.items().len(),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    /// Selects the next row in the current view.
    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous row in the current view.
    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn show_view(&mut self, view: View) {
        self.view = view;
        self.time_left = view.interval();
        self.state.select(None);
        self.clamp_selection();
    }

    pub fn next_view(&mut self) {
        self.show_view(self.view.next());
    }

    pub fn previous_view(&mut self) {
        self.show_view(self.view.previous());
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Advances the carousel clock. Rotation halts while paused or typing.
    pub fn on_tick(&mut self, elapsed: Duration) {
        if self.paused || self.input_mode != InputMode::Normal {
            return;
        }
        self.time_left = self.time_left.saturating_sub(elapsed);
        if self.time_left.is_zero() {
            self.next_view();
        }
    }

    /// Share of the current view's interval already used, for the progress bar.
    pub fn progress(&self) -> f64 {
        let total = self.view.interval().as_secs_f64();
        if total == 0.0 {
            return 0.0;
        }
        (1.0 - self.time_left.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    fn selected_occurrence_id(&self) -> Option<String> {
        let i = self.state.selected()?;
        self.items().get(i).map(|o| o.id.to_string())
    }

    fn report<T>(&mut self, result: Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.status = Some(e.to_string());
                None
            }
        }
    }

    /// Completes the selected occurrence.
    pub fn complete_selected(&mut self) {
        if matches!(self.view, View::Dashboard | View::Habits) { return; }
        let Some(id) = self.selected_occurrence_id() else { return };
        let outcome = views::complete(&mut self.reminders, &id);
        if let Some(outcome) = self.report(outcome) {
            self.status = Some(match outcome {
                Completion::Dismissed { instance, .. } => format!("Completed {}", instance),
                Completion::AlreadyDismissed { instance, .. } => format!("{} was already complete", instance),
                Completion::Removed(r) => format!("Completed '{}'", r.title),
            });
            let saved = self.store.save_reminders(&self.reminders);
            self.report(saved);
        }
        self.clamp_selection();
    }

    /// Deletes the selected reminder series, or the selected habit.
    pub fn delete_selected(&mut self) {
        match self.view {
            View::Dashboard => {}
            View::Habits => {
                let Some(i) = self.state.selected() else { return };
                if i < self.habits.len() {
                    let habit = self.habits.remove(i);
                    self.status = Some(format!("Removed habit '{}'", habit.title));
                    let saved = self.store.save_habits(&self.habits);
                    self.report(saved);
                }
            }
            _ => {
                let Some(id) = self.selected_occurrence_id() else { return };
                let removed = views::delete(&mut self.reminders, &id);
                if let Some(r) = self.report(removed) {
                    self.status = Some(format!("Removed '{}'", r.title));
                    let saved = self.store.save_reminders(&self.reminders);
                    self.report(saved);
                }
            }
        }
        self.clamp_selection();
    }

    /// Ticks today's box for the selected habit, or clears it.
    pub fn toggle_selected_habit(&mut self) {
        if self.view != View::Habits { return; }
        let Some(i) = self.state.selected() else { return };
        let today = Local::now().date_naive();
        if let Some(habit) = self.habits.get_mut(i) {
            toggle_date(habit, today);
            let saved = self.store.save_habits(&self.habits);
            self.report(saved);
        }
    }

    /// Initiates the "Add Reminder" wizard.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.status = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Handles Enter in the "Add Reminder" wizard.
    pub fn handle_input(&mut self) {
        if self.input_mode != InputMode::Adding { return; }
        let input = std::mem::take(&mut self.input_buffer);
        let value = input.trim();
        match self.add_state.step {
            0 => { // Title
                if !value.is_empty() {
                    self.add_state.title = value.to_string();
                    self.add_state.step += 1;
                }
            }
            1 => { // Due
                if !value.is_empty() {
                    self.add_state.due = value.to_string();
                    self.add_state.step += 1;
                }
            }
            2 => { // Category
                if !value.is_empty() {
                    self.add_state.category = Some(value.to_string());
                }
                self.add_state.step += 1;
            }
            3 => { // Priority
                if !value.is_empty() {
                    self.add_state.priority = Some(value.to_string());
                }
                self.add_state.step += 1;
            }
            4 => { // Recurrence, then finish
                self.finish_add(value);
            }
            _ => {}
        }
    }

    fn finish_add(&mut self, recur: &str) {
        self.input_mode = InputMode::Normal;
        let draft = match self.parse_draft(recur) {
            Ok(d) => d,
            Err(msg) => {
                self.status = Some(msg);
                return;
            }
        };
        let title = std::mem::take(&mut self.add_state.title);
        let added = cmd_add(&self.store, title, &self.add_state.due, draft, true);
        if let Some(id) = self.report(added) {
            self.status = Some(format!("Added reminder {}", id));
            let reloaded = self.reload();
            self.report(reloaded);
        }
    }

    // Recurrence input is a cadence name, optionally followed by weekdays
    // for custom: "custom 1,3,5".
    fn parse_draft(&self, recur: &str) -> std::result::Result<ReminderDraft, String> {
        let priority = match &self.add_state.priority {
            Some(p) => Some(p.parse()?),
            None => None,
        };
        let mut parts = recur.splitn(2, ' ');
        let kind = parts.next().unwrap_or_default();
        let days = match parts.next() {
            Some(list) => list
                .split(',')
                .map(|d| d.trim().parse::<u8>().map_err(|e| format!("invalid weekday '{}': {}", d.trim(), e)))
                .collect::<std::result::Result<Vec<u8>, String>>()?,
            None => Vec::new(),
        };
        Ok(ReminderDraft {
            category: self.add_state.category.clone(),
            priority,
            recur: if kind.is_empty() { None } else { Some(kind.parse()?) },
            days,
            ..ReminderDraft::default()
        })
    }
}
