use anyhow::Result;

use elevate::config::ElevateConfig;
use elevate::store::stats::{current_streak, day_summary, last_days};

use super::{day_arg, open_store};

/// Print the daily summary, the last seven days of activity, and habit streaks.
pub fn stats(config: &ElevateConfig, date: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let state = store.state();
    let day = day_arg(date)?;
    let summary = day_summary(state, day);

    println!("Progress for {}", summary.date);
    println!("{}", "=".repeat(40));
    println!(
        "  Tasks:     {}/{} ({}%)",
        summary.completed_tasks, summary.total_tasks, summary.task_progress
    );
    println!(
        "  Habits:    {}/{} ({}%)",
        summary.habits_done, summary.active_habits, summary.habit_progress
    );
    println!();

    println!("Last 7 days:");
    println!("  {:<12} {:>7} {:>7}", "date", "habits", "tasks");
    for activity in last_days(state, day, 7) {
        println!(
            "  {:<12} {:>7} {:>7}",
            activity.date, activity.habits_done, activity.tasks_done
        );
    }

    if !state.habits.is_empty() {
        println!();
        println!("Streaks:");
        for habit in &state.habits {
            println!("  {:<24} {}", habit.name, current_streak(habit, day));
        }
    }

    println!();
    println!("Memories stored:       {}", state.ai_memory.len());
    Ok(())
}
