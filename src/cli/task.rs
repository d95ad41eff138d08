//! CLI `task` commands.

use anyhow::Result;

use elevate::config::ElevateConfig;
use elevate::store::stats::tasks_on;
use elevate::store::types::{format_day, TaskUpdate};

use super::{check, day_arg, open_store};

pub fn add(config: &ElevateConfig, name: &str, date: Option<&str>) -> Result<()> {
    let mut store = open_store(config)?;
    let date = match date {
        Some(d) => d.to_string(),
        None => format_day(super::today()),
    };
    let task = store.add_task(name, &date)?;
    println!("Added task {} on {} ({})", task.name, task.date, task.id);
    Ok(())
}

/// Tasks for one day, or every task with `all`.
pub fn list(config: &ElevateConfig, date: Option<&str>, all: bool) -> Result<()> {
    let store = open_store(config)?;
    let tasks: Vec<_> = if all {
        store.state().tasks.iter().collect()
    } else {
        tasks_on(store.state(), day_arg(date)?)
    };

    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    for task in tasks {
        println!("  {} {} {:<32} {}", check(task.completed), task.date, task.name, task.id);
    }
    Ok(())
}

pub fn update(
    config: &ElevateConfig,
    id: &str,
    name: Option<String>,
    date: Option<String>,
) -> Result<()> {
    let mut store = open_store(config)?;
    let task = store.update_task(
        id,
        TaskUpdate {
            name,
            date,
            completed: None,
        },
    )?;
    println!("Updated task {} on {}", task.name, task.date);
    Ok(())
}

pub fn delete(config: &ElevateConfig, id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let task = store.delete_task(id)?;
    println!("Deleted task {}", task.name);
    Ok(())
}

pub fn toggle(config: &ElevateConfig, id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let completed = store.toggle_task(id)?;
    println!("{}", if completed { "Completed" } else { "Reopened" });
    Ok(())
}
