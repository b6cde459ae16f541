use chrono::{TimeZone, Utc};
use remindust::commands::*;
use remindust::error::Error;
use remindust::models::{Priority, RecurrenceKind};
use remindust::storage::{Store, DB_ENV};
use std::env;
use std::fs;
use tempfile::TempDir;

fn with_test_store<F>(f: F)
where
    F: FnOnce(&Store),
{
    let dir = TempDir::new().unwrap();
    let store = Store::at(dir.path());
    f(&store);
}

fn draft() -> ReminderDraft {
    ReminderDraft::default()
}

#[test]
fn test_add_and_load() {
    with_test_store(|store| {
        let id = cmd_add(
            store,
            "Dentist".into(),
            "2025-12-01T10:30:00Z",
            ReminderDraft {
                category: Some("Health".into()),
                priority: Some(Priority::High),
                cost: Some(40.0),
                ..draft()
            },
            true,
        )
        .unwrap();

        let reminders = store.load_reminders().unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, id);
        assert_eq!(reminders[0].title, "Dentist");
        assert_eq!(reminders[0].category, "Health");
        assert_eq!(reminders[0].priority, Priority::High);
        assert_eq!(reminders[0].cost, Some(40.0));
        assert_eq!(reminders[0].due_date, Utc.with_ymd_and_hms(2025, 12, 1, 10, 30, 0).unwrap());
        assert!(reminders[0].recurrence.is_none());
    });
}

#[test]
fn test_ids_are_sequential() {
    with_test_store(|store| {
        let a = cmd_add(store, "A".into(), "2025-12-01", draft(), true).unwrap();
        let b = cmd_add(store, "B".into(), "2025-12-01", draft(), true).unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("1", "2"));
    });
}

#[test]
fn test_add_rejects_bad_date() {
    with_test_store(|store| {
        let err = cmd_add(store, "A".into(), "31/12/2025", draft(), true).unwrap_err();
        assert!(matches!(err, Error::InvalidDate { .. }));
        assert!(store.load_reminders().unwrap().is_empty());
    });
}

#[test]
fn test_add_custom_recurrence() {
    with_test_store(|store| {
        let recur = ReminderDraft {
            recur: Some(RecurrenceKind::Custom),
            days: vec![5, 1, 3, 1],
            until: Some("2026-06-30T00:00:00Z".into()),
            ..draft()
        };
        cmd_add(store, "Gym".into(), "2026-01-05T07:00:00Z", recur, true).unwrap();

        let r = store.load_reminder("1").unwrap().unwrap();
        let recurrence = r.recurrence.unwrap();
        assert_eq!(recurrence.kind, RecurrenceKind::Custom);
        assert_eq!(recurrence.days_of_week, Some(vec![1, 3, 5]));
        assert_eq!(recurrence.end_date, Some(Utc.with_ymd_and_hms(2026, 6, 30, 0, 0, 0).unwrap()));
    });
}

#[test]
fn test_custom_recurrence_needs_days() {
    with_test_store(|store| {
        let recur = ReminderDraft { recur: Some(RecurrenceKind::Custom), ..draft() };
        let err = cmd_add(store, "Gym".into(), "2026-01-05", recur, true).unwrap_err();
        assert!(matches!(err, Error::InvalidRecurrence(_)));
    });
}

#[test]
fn test_complete_one_off_removes_it() {
    with_test_store(|store| {
        let id = cmd_add(store, "Call".into(), "2025-12-01", draft(), true).unwrap();
        cmd_complete(store, &id, true).unwrap();
        assert!(store.load_reminders().unwrap().is_empty());
    });
}

#[test]
fn test_complete_occurrence_keeps_series() {
    with_test_store(|store| {
        let recur = ReminderDraft { recur: Some(RecurrenceKind::Daily), ..draft() };
        let id = cmd_add(store, "Water plants".into(), "2025-12-01T08:00:00Z", recur, true).unwrap();
        let instance = format!("{}::{}", id, Utc.with_ymd_and_hms(2025, 12, 3, 8, 0, 0).unwrap().timestamp_millis());

        cmd_complete(store, &instance, true).unwrap();
        cmd_complete(store, &instance, true).unwrap();

        let reminders = store.load_reminders().unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].completed_instances, vec![instance]);
    });
}

#[test]
fn test_complete_unknown_id() {
    with_test_store(|store| {
        assert!(matches!(cmd_complete(store, "42", true), Err(Error::NotFound { .. })));
        assert!(matches!(cmd_complete(store, "42::oops", true), Err(Error::InvalidId(_))));
    });
}

#[test]
fn test_remove_by_occurrence_id() {
    with_test_store(|store| {
        let recur = ReminderDraft { recur: Some(RecurrenceKind::Weekly), ..draft() };
        let id = cmd_add(store, "Bins".into(), "2025-12-01T19:00:00Z", recur, true).unwrap();
        cmd_add(store, "Other".into(), "2025-12-01", draft(), true).unwrap();

        cmd_remove(store, &format!("{}::1764615600000", id), true).unwrap();

        let reminders = store.load_reminders().unwrap();
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].title, "Other");
    });
}

#[test]
fn test_edit_fields() {
    with_test_store(|store| {
        let id = cmd_add(store, "Old".into(), "2025-12-01", draft(), true).unwrap();
        cmd_edit(
            store,
            &id,
            ReminderDraft {
                title: Some("New".into()),
                due: Some("2025-12-24T18:00:00Z".into()),
                category: Some("event".into()),
                ..draft()
            },
            true,
        )
        .unwrap();

        let r = store.load_reminder(&id).unwrap().unwrap();
        assert_eq!(r.title, "New");
        assert_eq!(r.category, "event");
        assert_eq!(r.due_date, Utc.with_ymd_and_hms(2025, 12, 24, 18, 0, 0).unwrap());
    });
}

#[test]
fn test_edit_recurrence_keeps_end_date() {
    with_test_store(|store| {
        let recur = ReminderDraft {
            recur: Some(RecurrenceKind::Daily),
            until: Some("2026-01-31T00:00:00Z".into()),
            ..draft()
        };
        let id = cmd_add(store, "Stretch".into(), "2026-01-01T07:00:00Z", recur, true).unwrap();

        let to_weekly = ReminderDraft { recur: Some(RecurrenceKind::Weekly), ..draft() };
        cmd_edit(store, &id, to_weekly, true).unwrap();

        let recurrence = store.load_reminder(&id).unwrap().unwrap().recurrence.unwrap();
        assert_eq!(recurrence.kind, RecurrenceKind::Weekly);
        assert_eq!(recurrence.end_date, Some(Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap()));

        let stop = ReminderDraft { recur: Some(RecurrenceKind::None), ..draft() };
        cmd_edit(store, &id, stop, true).unwrap();
        assert!(store.load_reminder(&id).unwrap().unwrap().recurrence.is_none());
    });
}

#[test]
fn test_edit_days_on_one_off_fails() {
    with_test_store(|store| {
        let id = cmd_add(store, "Once".into(), "2026-01-01", draft(), true).unwrap();
        let days = ReminderDraft { days: vec![1], ..draft() };
        assert!(matches!(cmd_edit(store, &id, days, true), Err(Error::InvalidRecurrence(_))));
    });
}

#[test]
fn test_habits() {
    with_test_store(|store| {
        let id = cmd_habit_add(store, "Read".into(), true).unwrap();
        assert!(cmd_habit_toggle(store, &id, Some("2025-12-01T12:00:00Z"), true).unwrap());

        let habits = store.load_habits().unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].completed_dates.len(), 1);

        assert!(!cmd_habit_toggle(store, &id, Some("2025-12-01T12:00:00Z"), true).unwrap());
        assert!(store.load_habits().unwrap()[0].completed_dates.is_empty());

        cmd_habit_remove(store, &id, true).unwrap();
        assert!(store.load_habits().unwrap().is_empty());
        assert!(matches!(cmd_habit_remove(store, &id, true), Err(Error::NotFound { .. })));
    });
}

#[test]
fn test_habit_list_month_grid() {
    with_test_store(|store| {
        let id = cmd_habit_add(store, "Stretch".into(), true).unwrap();
        cmd_habit_toggle(store, &id, None, true).unwrap();

        cmd_habit_list(store, 28).unwrap();
        cmd_habit_list(store, HABIT_WEEK).unwrap();
        cmd_habit_list(store, 0).unwrap();
    });
}

#[test]
fn test_vault_defaults_and_edits() {
    with_test_store(|store| {
        let fields = store.load_vault().unwrap();
        let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["License ID", "Membership No"]);

        cmd_vault_set(store, "1", None, Some("D1234567".into()), true).unwrap();
        let id = cmd_vault_add(store, "Passport".into(), None, true).unwrap();
        assert_eq!(id, "3");
        cmd_vault_remove(store, "2", true).unwrap();

        let fields = store.load_vault().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].value, "D1234567");
        assert_eq!(fields[1].label, "Passport");
    });
}

#[test]
fn test_reset_deletes_files() {
    with_test_store(|store| {
        cmd_add(store, "A".into(), "2025-12-01", draft(), true).unwrap();
        cmd_habit_add(store, "Read".into(), true).unwrap();
        cmd_reset(store, true).unwrap();

        assert!(!store.reminders_path().exists());
        assert!(store.load_reminders().unwrap().is_empty());
        assert!(store.load_habits().unwrap().is_empty());
    });
}

#[test]
fn test_malformed_file_is_an_error() {
    with_test_store(|store| {
        fs::write(store.reminders_path(), "{ not json").unwrap();
        assert!(matches!(store.load_reminders(), Err(Error::Json(_))));
    });
}

#[test]
fn test_env_var_selects_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("mine.json");
    env::set_var(DB_ENV, &path);

    let store = Store::open_default().unwrap();
    env::remove_var(DB_ENV);

    assert_eq!(store.reminders_path(), path.as_path());
    cmd_add(&store, "A".into(), "2025-12-01", draft(), true).unwrap();
    assert!(path.exists());
}
