//! In-memory application state and its mutations.
//!
//! Nothing here touches storage. [`super::AppStore`] calls these and then
//! persists whichever record changed.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use super::types::{
    format_day, new_id, parse_day, AiMemory, AiSettings, AiSettingsUpdate, Habit, HabitUpdate,
    MemoryKind, Task, TaskUpdate, UserProfile, UserProfileUpdate,
};
use super::StoreError;

/// The five records the application tracks.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub habits: Vec<Habit>,
    pub tasks: Vec<Task>,
    pub ai_memory: Vec<AiMemory>,
    pub ai_settings: AiSettings,
    pub user_profile: UserProfile,
}

/// First-run habits.
pub fn seed_habits() -> Vec<Habit> {
    [
        ("Wake up at 05:00", "Morning", "⏰"),
        ("Gym", "Health", "💪"),
        ("Reading / Learning", "Mind", "📖"),
        ("Budget Tracking", "Finance", "💰"),
    ]
    .into_iter()
    .map(|(name, category, icon)| Habit {
        id: new_id(),
        name: name.into(),
        category: category.into(),
        icon: icon.into(),
        logs: Default::default(),
    })
    .collect()
}

/// First-run tasks, both dated `today`.
pub fn seed_tasks(today: NaiveDate) -> Vec<Task> {
    let date = format_day(today);
    vec![
        Task {
            id: new_id(),
            name: "Review financial report".into(),
            date: date.clone(),
            completed: false,
        },
        Task {
            id: new_id(),
            name: "Team meeting".into(),
            date,
            completed: true,
        },
    ]
}

impl AppState {
    /// State after a reset: empty collections, default settings and profile.
    pub fn empty() -> Self {
        Self::default()
    }

    /// State on a first run with nothing persisted.
    pub fn seeded(today: NaiveDate) -> Self {
        Self {
            habits: seed_habits(),
            tasks: seed_tasks(today),
            ..Self::default()
        }
    }

    // ── Habits ───────────────────────────────────────────────────────

    pub fn add_habit(&mut self, name: &str, category: &str, icon: &str) -> Habit {
        let habit = Habit {
            id: new_id(),
            name: name.to_string(),
            category: category.to_string(),
            icon: icon.to_string(),
            logs: Default::default(),
        };
        self.habits.push(habit.clone());
        habit
    }

    pub fn update_habit(&mut self, id: &str, update: HabitUpdate) -> Result<Habit, StoreError> {
        let habit = self.habit_mut(id)?;
        if let Some(name) = update.name {
            habit.name = name;
        }
        if let Some(category) = update.category {
            habit.category = category;
        }
        if let Some(icon) = update.icon {
            habit.icon = icon;
        }
        if let Some(logs) = update.logs {
            habit.logs = logs;
        }
        Ok(habit.clone())
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<Habit, StoreError> {
        let pos = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| StoreError::not_found("habit", id))?;
        Ok(self.habits.remove(pos))
    }

    /// Mark `date` done, or clear it if it already was. Returns the new state of the day.
    pub fn toggle_habit_log(&mut self, id: &str, date: &str) -> Result<bool, StoreError> {
        parse_day(date)?;
        let habit = self.habit_mut(id)?;
        if habit.is_done_on(date) {
            habit.logs.remove(date);
            Ok(false)
        } else {
            habit.logs.insert(date.to_string(), true);
            Ok(true)
        }
    }

    fn habit_mut(&mut self, id: &str) -> Result<&mut Habit, StoreError> {
        self.habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| StoreError::not_found("habit", id))
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, name: &str, date: &str) -> Result<Task, StoreError> {
        parse_day(date)?;
        let task = Task {
            id: new_id(),
            name: name.to_string(),
            date: date.to_string(),
            completed: false,
        };
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, StoreError> {
        if let Some(ref date) = update.date {
            parse_day(date)?;
        }
        let task = self.task_mut(id)?;
        if let Some(name) = update.name {
            task.name = name;
        }
        if let Some(date) = update.date {
            task.date = date;
        }
        if let Some(completed) = update.completed {
            task.completed = completed;
        }
        Ok(task.clone())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, StoreError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("task", id))?;
        Ok(self.tasks.remove(pos))
    }

    /// Flip `completed`. Returns the new value.
    pub fn toggle_task(&mut self, id: &str) -> Result<bool, StoreError> {
        let task = self.task_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found("task", id))
    }

    // ── AI memory ────────────────────────────────────────────────────

    /// Insert at the front; the collection is kept most-recent-first.
    pub fn add_memory(&mut self, content: &str, kind: MemoryKind) -> AiMemory {
        let memory = AiMemory {
            id: new_id(),
            date: Utc::now().to_rfc3339(),
            content: content.to_string(),
            kind,
        };
        self.ai_memory.insert(0, memory.clone());
        memory
    }

    pub fn update_memory(&mut self, id: &str, content: &str) -> Result<AiMemory, StoreError> {
        let memory = self
            .ai_memory
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("memory", id))?;
        memory.content = content.to_string();
        Ok(memory.clone())
    }

    pub fn delete_memory(&mut self, id: &str) -> Result<AiMemory, StoreError> {
        let pos = self
            .ai_memory
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("memory", id))?;
        Ok(self.ai_memory.remove(pos))
    }

    // ── Singletons ───────────────────────────────────────────────────

    pub fn update_ai_settings(&mut self, update: AiSettingsUpdate) -> &AiSettings {
        let s = &mut self.ai_settings;
        if let Some(v) = update.api_key {
            s.api_key = v;
        }
        if let Some(v) = update.name {
            s.name = v;
        }
        if let Some(v) = update.persona {
            s.persona = v;
        }
        if let Some(v) = update.behavior {
            s.behavior = v;
        }
        if let Some(v) = update.model {
            s.model = v;
        }
        if let Some(v) = update.voice {
            s.voice = v;
        }
        if let Some(v) = update.avatar {
            s.avatar = v;
        }
        &self.ai_settings
    }

    pub fn update_user_profile(&mut self, update: UserProfileUpdate) -> &UserProfile {
        let p = &mut self.user_profile;
        if let Some(v) = update.name {
            p.name = v;
        }
        if let Some(v) = update.dob {
            p.dob = v;
        }
        if let Some(v) = update.about {
            p.about = v;
        }
        if let Some(v) = update.goals {
            p.goals = v;
        }
        if let Some(v) = update.avatar {
            p.avatar = v;
        }
        &self.user_profile
    }
}
