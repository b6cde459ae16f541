use chrono::{Days, NaiveDate};

use crate::models::Habit;

/// Marks `day` done, or undone if it already was. Returns the new state.
pub fn toggle_date(habit: &mut Habit, day: NaiveDate) -> bool {
    if habit.completed_dates.remove(&day) {
        false
    } else {
        habit.completed_dates.insert(day);
        true
    }
}

/// Total number of days the habit was done.
pub fn streak(habit: &Habit) -> usize {
    habit.completed_dates.len()
}

/// Consecutive done days ending at `today` (or yesterday, if today is not
/// done yet).
pub fn current_run(habit: &Habit, today: NaiveDate) -> usize {
    let mut day = if habit.completed_dates.contains(&today) {
        today
    } else {
        match today.checked_sub_days(Days::new(1)) {
            Some(d) => d,
            None => return 0,
        }
    };
    let mut run = 0;
    while habit.completed_dates.contains(&day) {
        run += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(d) => day = d,
            None => break,
        }
    }
    run
}

/// The `n` days ending at `today`, oldest first.
pub fn recent_days(today: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n as u64)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect()
}
