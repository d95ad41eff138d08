//! System instruction assembly.

use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

use crate::store::types::{format_day, parse_day, UserProfile};
use crate::store::AppState;

/// Approximate age: calendar-year difference, no birthday adjustment.
/// `None` when `dob` is empty or not a `YYYY-MM-DD` date.
pub fn approximate_age(dob: &str, today: NaiveDate) -> Option<i32> {
    if dob.is_empty() {
        return None;
    }
    let born = parse_day(dob).ok()?;
    Some(today.year() - born.year())
}

fn user_context(profile: &UserProfile, today: NaiveDate) -> String {
    let name = if profile.name.is_empty() {
        "User"
    } else {
        profile.name.as_str()
    };

    let mut out = format!("User Name: {name}\n");
    if let Some(age) = approximate_age(&profile.dob, today) {
        let _ = writeln!(out, "User Age: Approx {age}");
    }
    if !profile.about.is_empty() {
        let _ = writeln!(out, "About User: {}", profile.about);
    }
    if !profile.goals.is_empty() {
        let _ = writeln!(out, "User Goals: {}", profile.goals);
    }
    out
}

/// Build the preamble sent with every chat request: who the assistant is,
/// who the user is, and a snapshot of habits, tasks, and memory.
pub fn build_system_instruction(state: &AppState, today: NaiveDate) -> String {
    let settings = &state.ai_settings;

    let habits = state
        .habits
        .iter()
        .map(|h| format!("- {} ({})", h.name, h.category))
        .collect::<Vec<_>>()
        .join("\n");
    let tasks = state
        .tasks
        .iter()
        .map(|t| format!("- {} (Date: {}, Completed: {})", t.name, t.date, t.completed))
        .collect::<Vec<_>>()
        .join("\n");
    let memory = state
        .ai_memory
        .iter()
        .map(|m| format!("- {}", m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are {name}, an AI assistant with the persona of a {persona}.
Your behavior is: {behavior}.

USER PROFILE:
{user}
You have access to the user's progress tracker data:

HABITS:
{habits}

TASKS:
{tasks}

MEMORY:
{memory}

Current Date: {date}

Your goals:
1. Motivate the user to complete their habits and tasks.
2. Be disciplined and hold the user accountable.
3. You can suggest adding or removing tasks if the user asks.
4. If the user mentions something important, you should acknowledge it.
5. Always stay in character as a {persona}.

When the user asks to \"add a task\", \"complete a habit\", etc., respond naturally and confirm you've noted it.
",
        name = settings.name,
        persona = settings.persona,
        behavior = settings.behavior,
        user = user_context(&state.user_profile, today),
        date = format_day(today),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::types::MemoryKind;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn age_is_year_difference() {
        assert_eq!(approximate_age("1990-12-31", today()), Some(34));
        assert_eq!(approximate_age("", today()), None);
        assert_eq!(approximate_age("someday", today()), None);
    }

    #[test]
    fn instruction_embeds_state_snapshot() {
        let mut state = AppState::empty();
        state.add_habit("Gym", "Health", "💪");
        let task = state.add_task("Pay bills", "2024-01-05").unwrap();
        state.toggle_task(&task.id).unwrap();
        state.add_memory("Prefers mornings", MemoryKind::Manual);
        state.user_profile.name = "Sam".into();
        state.user_profile.dob = "1994-06-01".into();
        state.user_profile.goals = "Run a marathon".into();

        let text = build_system_instruction(&state, today());
        assert!(text.starts_with("You are Elevate AI, an AI assistant with the persona of a Coach."));
        assert!(text.contains("Your behavior is: Motivating, direct, and disciplined.."));
        assert!(text.contains("User Name: Sam\n"));
        assert!(text.contains("User Age: Approx 30\n"));
        assert!(text.contains("User Goals: Run a marathon\n"));
        assert!(!text.contains("About User:"));
        assert!(text.contains("- Gym (Health)"));
        assert!(text.contains("- Pay bills (Date: 2024-01-05, Completed: true)"));
        assert!(text.contains("- Prefers mornings"));
        assert!(text.contains("Current Date: 2024-01-05"));
        assert!(text.contains("5. Always stay in character as a Coach."));
    }

    #[test]
    fn blank_profile_name_reads_as_user() {
        let mut state = AppState::empty();
        state.user_profile.name.clear();
        let text = build_system_instruction(&state, today());
        assert!(text.contains("User Name: User\n"));
    }
}
