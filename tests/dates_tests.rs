use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use remindust::dates::{is_overdue, is_this_month, is_this_week, is_today, parse_due_in, start_of_day, time_left};
use remindust::error::Error;
use remindust::habits::{current_run, recent_days, streak, toggle_date};
use remindust::models::Habit;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_time_left_labels() {
    let now = at(2024, 5, 15, 10, 0);
    assert_eq!(time_left(at(2024, 5, 15, 23, 0), &now), "Today");
    assert_eq!(time_left(at(2024, 5, 18, 1, 0), &now), "3d");
    assert_eq!(time_left(at(2024, 5, 13, 9, 0), &now), "2d overdue");
}

#[test]
fn test_overdue() {
    let now = at(2024, 5, 15, 10, 0);
    assert!(is_overdue(now - Duration::minutes(1), false, &now));
    assert!(!is_overdue(now - Duration::days(3), true, &now));
    assert!(!is_overdue(now + Duration::minutes(1), false, &now));
}

#[test]
fn test_today_week_month_predicates() {
    let now = at(2024, 5, 15, 10, 0);
    assert!(is_today(at(2024, 5, 15, 0, 0), &now));
    assert!(!is_today(at(2024, 5, 16, 0, 0), &now));

    assert!(is_this_week(now, &now));
    assert!(is_this_week(now + Duration::days(7), &now));
    assert!(!is_this_week(now + Duration::days(7) + Duration::seconds(1), &now));
    assert!(!is_this_week(now - Duration::seconds(1), &now));

    assert!(is_this_month(at(2024, 5, 1, 0, 0), &now));
    assert!(!is_this_month(at(2023, 5, 15, 0, 0), &now));
    assert!(!is_this_month(at(2024, 6, 1, 0, 0), &now));
}

#[test]
fn test_today_uses_local_day() {
    // 23:30 UTC is already tomorrow in UTC+2
    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    let now = plus_two.with_ymd_and_hms(2024, 5, 16, 8, 0, 0).unwrap();
    assert!(is_today(at(2024, 5, 15, 23, 30), &now));
    assert_eq!(start_of_day(&now), at(2024, 5, 15, 22, 0));
}

#[test]
fn test_parse_due_formats() {
    assert_eq!(parse_due_in("2024-05-15", &Utc).unwrap(), at(2024, 5, 15, 0, 0));
    assert_eq!(parse_due_in("2024-05-15T09:30", &Utc).unwrap(), at(2024, 5, 15, 9, 30));
    assert_eq!(parse_due_in("2024-05-15 09:30", &Utc).unwrap(), at(2024, 5, 15, 9, 30));
    assert_eq!(parse_due_in("2024-05-15T09:30:00.000Z", &Utc).unwrap(), at(2024, 5, 15, 9, 30));

    let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
    assert_eq!(parse_due_in("2024-05-15T09:30", &plus_two).unwrap(), at(2024, 5, 15, 7, 30));
}

#[test]
fn test_parse_due_rejects_garbage() {
    let err = parse_due_in("next tuesday", &Utc).unwrap_err();
    assert!(matches!(err, Error::InvalidDate { ref input, .. } if input == "next tuesday"));
}

fn habit() -> Habit {
    Habit { id: "1".into(), title: "Read".into(), completed_dates: Default::default(), created_at: Utc::now() }
}

#[test]
fn test_toggle_twice_restores() {
    let mut h = habit();
    assert!(toggle_date(&mut h, day(2024, 5, 15)));
    assert_eq!(streak(&h), 1);
    assert!(!toggle_date(&mut h, day(2024, 5, 15)));
    assert!(h.completed_dates.is_empty());
}

#[test]
fn test_current_run() {
    let mut h = habit();
    for d in [12, 13, 14] {
        toggle_date(&mut h, day(2024, 5, d));
    }
    toggle_date(&mut h, day(2024, 5, 1));

    // today not ticked yet: the run up to yesterday still counts
    assert_eq!(current_run(&h, day(2024, 5, 15)), 3);
    toggle_date(&mut h, day(2024, 5, 15));
    assert_eq!(current_run(&h, day(2024, 5, 15)), 4);
    assert_eq!(current_run(&h, day(2024, 5, 20)), 0);
    assert_eq!(streak(&h), 5);
}

#[test]
fn test_recent_days_oldest_first() {
    let days = recent_days(day(2024, 3, 2), 3);
    assert_eq!(days, vec![day(2024, 2, 29), day(2024, 3, 1), day(2024, 3, 2)]);
}

#[test]
fn test_recent_days_month_grid() {
    let days = recent_days(day(2024, 3, 15), 28);
    assert_eq!(days.len(), 28);
    assert_eq!(days.first(), Some(&day(2024, 2, 17)));
    assert_eq!(days.last(), Some(&day(2024, 3, 15)));
}

#[test]
fn test_habit_dates_serialize_as_plain_days() {
    let mut h = habit();
    toggle_date(&mut h, day(2024, 5, 15));
    let json = serde_json::to_value(&h).unwrap();
    assert_eq!(json["completedDates"][0], "2024-05-15");
}
