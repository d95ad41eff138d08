//! Progress summaries over habits and tasks.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::types::{format_day, Habit, Task};
use super::AppState;

/// Progress for a single day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub task_progress: u32,
    pub active_habits: usize,
    pub habits_done: usize,
    pub habit_progress: u32,
}

/// Completions on one day of a trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayActivity {
    pub date: String,
    pub habits_done: usize,
    pub tasks_done: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthProgress {
    pub days_done: usize,
    pub days_in_month: usize,
    pub percent: u32,
}

/// Rounded percentage; zero when there is nothing to count.
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

pub fn tasks_on<'a>(state: &'a AppState, day: NaiveDate) -> Vec<&'a Task> {
    let date = format_day(day);
    state.tasks.iter().filter(|t| t.date == date).collect()
}

pub fn day_summary(state: &AppState, day: NaiveDate) -> DaySummary {
    let date = format_day(day);
    let todays = tasks_on(state, day);
    let completed_tasks = todays.iter().filter(|t| t.completed).count();
    let habits_done = state.habits.iter().filter(|h| h.is_done_on(&date)).count();

    DaySummary {
        total_tasks: todays.len(),
        completed_tasks,
        task_progress: percent(completed_tasks, todays.len()),
        active_habits: state.habits.len(),
        habits_done,
        habit_progress: percent(habits_done, state.habits.len()),
        date,
    }
}

/// The `days` days ending at `today`, oldest first.
pub fn last_days(state: &AppState, today: NaiveDate, days: u32) -> Vec<DayActivity> {
    (0..days)
        .rev()
        .map(|back| {
            let date = format_day(today - Duration::days(i64::from(back)));
            DayActivity {
                habits_done: state.habits.iter().filter(|h| h.is_done_on(&date)).count(),
                tasks_done: state
                    .tasks
                    .iter()
                    .filter(|t| t.date == date && t.completed)
                    .count(),
                date,
            }
        })
        .collect()
}

/// Completed days in the given calendar month. `None` for an invalid month.
pub fn habit_month_progress(habit: &Habit, year: i32, month: u32) -> Option<MonthProgress> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let days_in_month = (next - first).num_days() as usize;

    let days_done = first
        .iter_days()
        .take(days_in_month)
        .filter(|d| habit.is_done_on(&format_day(*d)))
        .count();

    Some(MonthProgress {
        days_done,
        days_in_month,
        percent: percent(days_done, days_in_month),
    })
}

/// Consecutive completed days ending today, or ending yesterday when today
/// has not been logged yet.
pub fn current_streak(habit: &Habit, today: NaiveDate) -> u32 {
    let mut day = if habit.is_done_on(&format_day(today)) {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0;
    while habit.is_done_on(&format_day(day)) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}

pub fn month_of(day: NaiveDate) -> (i32, u32) {
    (day.year(), day.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state_with_logs(days: &[&str]) -> AppState {
        let mut state = AppState::empty();
        let habit = state.add_habit("Gym", "Health", "💪");
        for d in days {
            state.toggle_habit_log(&habit.id, d).unwrap();
        }
        state
    }

    #[test]
    fn day_summary_rounds_progress() {
        let mut state = AppState::empty();
        state.add_task("a", "2024-01-05").unwrap();
        state.add_task("b", "2024-01-05").unwrap();
        let c = state.add_task("c", "2024-01-05").unwrap();
        state.add_task("other day", "2024-01-06").unwrap();
        state.toggle_task(&c.id).unwrap();

        let summary = day_summary(&state, day(2024, 1, 5));
        assert_eq!(summary.total_tasks, 3);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.task_progress, 33);
        assert_eq!(summary.habit_progress, 0);
    }

    #[test]
    fn empty_day_has_zero_progress() {
        let summary = day_summary(&AppState::empty(), day(2024, 1, 5));
        assert_eq!(summary.task_progress, 0);
        assert_eq!(summary.habit_progress, 0);
    }

    #[test]
    fn last_days_is_oldest_first() {
        let state = state_with_logs(&["2024-01-05", "2024-01-01"]);
        let week = last_days(&state, day(2024, 1, 5), 7);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, "2023-12-30");
        assert_eq!(week[6].date, "2024-01-05");
        assert_eq!(week[6].habits_done, 1);
        assert_eq!(week[2].habits_done, 1);
    }

    #[test]
    fn month_progress_counts_days_in_month() {
        let state = state_with_logs(&["2024-02-01", "2024-02-29", "2024-03-01"]);
        let progress = habit_month_progress(&state.habits[0], 2024, 2).unwrap();
        assert_eq!(progress.days_in_month, 29);
        assert_eq!(progress.days_done, 2);
        assert_eq!(progress.percent, 7);
        assert!(habit_month_progress(&state.habits[0], 2024, 13).is_none());
    }

    #[test]
    fn streak_tolerates_unlogged_today() {
        let state = state_with_logs(&["2024-01-02", "2024-01-03", "2024-01-04"]);
        assert_eq!(current_streak(&state.habits[0], day(2024, 1, 5)), 3);
        assert_eq!(current_streak(&state.habits[0], day(2024, 1, 4)), 3);
        assert_eq!(current_streak(&state.habits[0], day(2024, 1, 7)), 0);
    }
}
