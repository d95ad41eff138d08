//! CLI `habit` commands.

use anyhow::Result;

use elevate::config::ElevateConfig;
use elevate::store::stats::{current_streak, habit_month_progress, month_of};
use elevate::store::types::{format_day, HabitUpdate};

use super::{check, day_arg, open_store};

pub fn add(config: &ElevateConfig, name: &str, category: &str, icon: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let habit = store.add_habit(name, category, icon)?;
    println!("Added habit {} ({})", habit.name, habit.id);
    Ok(())
}

/// List habits with their status for `date`, the month's progress, and the streak.
pub fn list(config: &ElevateConfig, date: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let day = day_arg(date)?;
    let key = format_day(day);
    let (year, month) = month_of(day);

    let habits = &store.state().habits;
    if habits.is_empty() {
        println!("No habits yet. Add one with `elevate habit add <name>`.");
        return Ok(());
    }

    println!("Habits for {key}");
    println!("{}", "=".repeat(40));
    for habit in habits {
        let progress = habit_month_progress(habit, year, month)
            .map(|p| format!("{}/{} ({}%)", p.days_done, p.days_in_month, p.percent))
            .unwrap_or_default();
        println!(
            "  {} {} {:<24} {:<10} month {:<14} streak {}",
            check(habit.is_done_on(&key)),
            habit.icon,
            habit.name,
            habit.category,
            progress,
            current_streak(habit, day),
        );
        println!("      id: {}", habit.id);
    }
    Ok(())
}

pub fn update(
    config: &ElevateConfig,
    id: &str,
    name: Option<String>,
    category: Option<String>,
    icon: Option<String>,
) -> Result<()> {
    let mut store = open_store(config)?;
    let habit = store.update_habit(
        id,
        HabitUpdate {
            name,
            category,
            icon,
            logs: None,
        },
    )?;
    println!("Updated habit {} ({})", habit.name, habit.id);
    Ok(())
}

pub fn delete(config: &ElevateConfig, id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let habit = store.delete_habit(id)?;
    println!("Deleted habit {}", habit.name);
    Ok(())
}

pub fn toggle(config: &ElevateConfig, id: &str, date: Option<&str>) -> Result<()> {
    let mut store = open_store(config)?;
    let key = format_day(day_arg(date)?);
    let done = store.toggle_habit_log(id, &key)?;
    println!("{} {key}", if done { "Done" } else { "Not done" });
    Ok(())
}
