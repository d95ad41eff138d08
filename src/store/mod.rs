//! The application state store.
//!
//! [`AppStore`] owns an [`AppState`] and an injected [`Storage`]. Every mutator
//! changes the in-memory record first and then synchronously re-serializes the
//! whole affected record under its own key. The five keys are independent:
//! there is no batching and no transaction spanning more than one of them.

pub mod backup;
pub mod state;
pub mod stats;
pub mod types;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::{
    Storage, AI_MEMORY_KEY, AI_SETTINGS_KEY, CHAT_HISTORY_KEY, HABITS_KEY, TASKS_KEY,
    USER_PROFILE_KEY,
};
pub use state::AppState;
use types::{
    AiMemory, AiSettings, AiSettingsUpdate, ChatMessage, Habit, HabitUpdate, MemoryKind, Task,
    TaskUpdate, UserProfile, UserProfileUpdate,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// State plus the storage it is mirrored into.
pub struct AppStore<S: Storage> {
    state: AppState,
    storage: S,
}

impl<S: Storage> AppStore<S> {
    /// Load every record from `storage`, dating first-run seed tasks today.
    pub fn load(storage: S) -> Result<Self, StoreError> {
        let today = chrono::Local::now().date_naive();
        Self::load_at(storage, today)
    }

    /// Load every record from `storage`.
    ///
    /// An absent key gets its first-run value (seed habits and tasks, empty
    /// memory, default settings and profile), which is written back so the
    /// generated ids are stable from then on. A value that does not parse is
    /// copied to `{key}_corrupt`, logged, and replaced in memory by the same
    /// first-run value; the original key is left as it was until the next write.
    pub fn load_at(mut storage: S, today: NaiveDate) -> Result<Self, StoreError> {
        let mut absent = Vec::new();
        let habits = load_record(&mut storage, HABITS_KEY, &mut absent)?;
        let tasks = load_record(&mut storage, TASKS_KEY, &mut absent)?;
        let ai_memory = load_record(&mut storage, AI_MEMORY_KEY, &mut absent)?;
        let ai_settings = load_record(&mut storage, AI_SETTINGS_KEY, &mut absent)?;
        let user_profile = load_record(&mut storage, USER_PROFILE_KEY, &mut absent)?;

        let state = AppState {
            habits: habits.unwrap_or_else(state::seed_habits),
            tasks: tasks.unwrap_or_else(|| state::seed_tasks(today)),
            ai_memory: ai_memory.unwrap_or_default(),
            ai_settings: ai_settings.unwrap_or_default(),
            user_profile: user_profile.unwrap_or_default(),
        };
        tracing::info!(
            habits = state.habits.len(),
            tasks = state.tasks.len(),
            memories = state.ai_memory.len(),
            initialized = absent.len(),
            "state loaded"
        );

        let mut store = Self { state, storage };
        for key in absent {
            store.persist_key(key)?;
        }
        Ok(store)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // ── Habits ───────────────────────────────────────────────────────

    pub fn add_habit(&mut self, name: &str, category: &str, icon: &str) -> Result<Habit, StoreError> {
        let habit = self.state.add_habit(name, category, icon);
        self.persist_habits()?;
        Ok(habit)
    }

    pub fn update_habit(&mut self, id: &str, update: HabitUpdate) -> Result<Habit, StoreError> {
        let habit = self.state.update_habit(id, update)?;
        self.persist_habits()?;
        Ok(habit)
    }

    pub fn delete_habit(&mut self, id: &str) -> Result<Habit, StoreError> {
        let habit = self.state.delete_habit(id)?;
        self.persist_habits()?;
        Ok(habit)
    }

    pub fn toggle_habit_log(&mut self, id: &str, date: &str) -> Result<bool, StoreError> {
        let done = self.state.toggle_habit_log(id, date)?;
        self.persist_habits()?;
        Ok(done)
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn add_task(&mut self, name: &str, date: &str) -> Result<Task, StoreError> {
        let task = self.state.add_task(name, date)?;
        self.persist_tasks()?;
        Ok(task)
    }

    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<Task, StoreError> {
        let task = self.state.update_task(id, update)?;
        self.persist_tasks()?;
        Ok(task)
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Task, StoreError> {
        let task = self.state.delete_task(id)?;
        self.persist_tasks()?;
        Ok(task)
    }

    pub fn toggle_task(&mut self, id: &str) -> Result<bool, StoreError> {
        let completed = self.state.toggle_task(id)?;
        self.persist_tasks()?;
        Ok(completed)
    }

    // ── AI memory ────────────────────────────────────────────────────

    pub fn add_memory(&mut self, content: &str, kind: MemoryKind) -> Result<AiMemory, StoreError> {
        let memory = self.state.add_memory(content, kind);
        self.persist_memory()?;
        tracing::debug!(id = %memory.id, kind = %kind, "memory added");
        Ok(memory)
    }

    pub fn update_memory(&mut self, id: &str, content: &str) -> Result<AiMemory, StoreError> {
        let memory = self.state.update_memory(id, content)?;
        self.persist_memory()?;
        Ok(memory)
    }

    pub fn delete_memory(&mut self, id: &str) -> Result<AiMemory, StoreError> {
        let memory = self.state.delete_memory(id)?;
        self.persist_memory()?;
        Ok(memory)
    }

    // ── Singletons ───────────────────────────────────────────────────

    pub fn update_ai_settings(&mut self, update: AiSettingsUpdate) -> Result<AiSettings, StoreError> {
        let settings = self.state.update_ai_settings(update).clone();
        self.persist_settings()?;
        Ok(settings)
    }

    pub fn update_user_profile(
        &mut self,
        update: UserProfileUpdate,
    ) -> Result<UserProfile, StoreError> {
        let profile = self.state.update_user_profile(update).clone();
        self.persist_profile()?;
        Ok(profile)
    }

    // ── Whole-state operations ───────────────────────────────────────

    /// Clear everything back to an empty state and drop the chat transcript.
    ///
    /// Confirmation is the caller's job. The in-memory state is replaced in
    /// place, so the store is immediately usable afterwards.
    pub fn reset_data(&mut self) -> Result<(), StoreError> {
        self.state = AppState::empty();
        self.persist_all()?;
        self.storage.remove(CHAT_HISTORY_KEY)?;
        tracing::warn!("all data reset");
        Ok(())
    }

    fn persist_key(&mut self, key: &'static str) -> Result<(), StoreError> {
        match key {
            HABITS_KEY => self.persist_habits(),
            TASKS_KEY => self.persist_tasks(),
            AI_MEMORY_KEY => self.persist_memory(),
            AI_SETTINGS_KEY => self.persist_settings(),
            USER_PROFILE_KEY => self.persist_profile(),
            _ => Ok(()),
        }
    }

    pub(crate) fn persist_all(&mut self) -> Result<(), StoreError> {
        self.persist_habits()?;
        self.persist_tasks()?;
        self.persist_memory()?;
        self.persist_settings()?;
        self.persist_profile()
    }

    // ── Chat transcript (separate key, not part of the backup) ───────

    /// Persisted transcript, or `None` if nothing usable is stored.
    pub fn chat_history(&self) -> Result<Option<Vec<ChatMessage>>, StoreError> {
        read_key(&self.storage, CHAT_HISTORY_KEY)
    }

    pub fn save_chat_history(&mut self, messages: &[ChatMessage]) -> Result<(), StoreError> {
        write_key(&mut self.storage, CHAT_HISTORY_KEY, messages)
    }

    pub fn clear_chat_history(&mut self) -> Result<(), StoreError> {
        self.storage.remove(CHAT_HISTORY_KEY)?;
        Ok(())
    }

    fn persist_habits(&mut self) -> Result<(), StoreError> {
        write_key(&mut self.storage, HABITS_KEY, &self.state.habits)
    }

    fn persist_tasks(&mut self) -> Result<(), StoreError> {
        write_key(&mut self.storage, TASKS_KEY, &self.state.tasks)
    }

    fn persist_memory(&mut self) -> Result<(), StoreError> {
        write_key(&mut self.storage, AI_MEMORY_KEY, &self.state.ai_memory)
    }

    fn persist_settings(&mut self) -> Result<(), StoreError> {
        write_key(&mut self.storage, AI_SETTINGS_KEY, &self.state.ai_settings)
    }

    fn persist_profile(&mut self) -> Result<(), StoreError> {
        write_key(&mut self.storage, USER_PROFILE_KEY, &self.state.user_profile)
    }
}

/// What a storage key held at load time.
enum Stored<T> {
    Absent,
    Malformed(String, serde_json::Error),
    Value(T),
}

fn read_stored<S: Storage, T: DeserializeOwned>(
    storage: &S,
    key: &'static str,
) -> Result<Stored<T>, StoreError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Stored::Absent);
    };
    Ok(match serde_json::from_str(&raw) {
        Ok(value) => Stored::Value(value),
        Err(e) => Stored::Malformed(raw, e),
    })
}

fn read_key<S: Storage, T: DeserializeOwned>(
    storage: &S,
    key: &'static str,
) -> Result<Option<T>, StoreError> {
    match read_stored(storage, key)? {
        Stored::Value(value) => Ok(Some(value)),
        Stored::Absent => Ok(None),
        Stored::Malformed(_, e) => {
            tracing::warn!(key, error = %e, "stored value is malformed, ignoring it");
            Ok(None)
        }
    }
}

/// Key a malformed value is copied to before it is replaced.
pub fn corrupt_key(key: &str) -> String {
    format!("{key}_corrupt")
}

/// Read one record for [`AppStore::load_at`]. Absent keys are noted in
/// `absent`; malformed values are stashed under [`corrupt_key`].
fn load_record<S: Storage, T: DeserializeOwned>(
    storage: &mut S,
    key: &'static str,
    absent: &mut Vec<&'static str>,
) -> Result<Option<T>, StoreError> {
    match read_stored(&*storage, key)? {
        Stored::Value(value) => Ok(Some(value)),
        Stored::Absent => {
            absent.push(key);
            Ok(None)
        }
        Stored::Malformed(raw, e) => {
            let backup = corrupt_key(key);
            storage.set(&backup, &raw)?;
            tracing::warn!(key, backup = %backup, error = %e, "stored value is malformed, using default");
            Ok(None)
        }
    }
}

fn write_key<S: Storage, T: Serialize + ?Sized>(
    storage: &mut S,
    key: &'static str,
    value: &T,
) -> Result<(), StoreError> {
    let json =
        serde_json::to_string(value).map_err(|source| StoreError::Serialize { key, source })?;
    storage.set(key, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    #[test]
    fn first_load_seeds_collections() {
        let store = AppStore::load_at(MemoryStorage::new(), today()).unwrap();
        assert_eq!(store.state().habits.len(), 4);
        assert_eq!(store.state().tasks.len(), 2);
        assert_eq!(store.state().user_profile.name, "User");
    }

    #[test]
    fn first_load_persists_every_record() {
        let store = AppStore::load_at(MemoryStorage::new(), today()).unwrap();
        let storage = store.storage();
        for key in [HABITS_KEY, TASKS_KEY, AI_MEMORY_KEY, AI_SETTINGS_KEY, USER_PROFILE_KEY] {
            assert!(storage.get(key).unwrap().is_some(), "missing {key}");
        }
        assert!(storage.get(CHAT_HISTORY_KEY).unwrap().is_none());

        let seed_id = store.state().habits[0].id.clone();
        let reloaded = AppStore::load_at(store.into_storage(), today()).unwrap();
        assert_eq!(reloaded.state().habits[0].id, seed_id);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(HABITS_KEY, "{not json").unwrap();
        storage.set(AI_SETTINGS_KEY, "42").unwrap();
        storage.set(TASKS_KEY, "[]").unwrap();

        let store = AppStore::load_at(storage, today()).unwrap();
        assert_eq!(store.state().habits.len(), 4);
        assert_eq!(store.state().ai_settings, AiSettings::default());
        assert!(store.state().tasks.is_empty());
    }

    #[test]
    fn malformed_values_are_stashed_and_not_overwritten_on_load() {
        let raw = r#"{"name": "Gym"}"#;
        let mut storage = MemoryStorage::new();
        storage.set(HABITS_KEY, raw).unwrap();

        let store = AppStore::load_at(storage, today()).unwrap();

        let storage = store.storage();
        assert_eq!(storage.get(HABITS_KEY).unwrap().as_deref(), Some(raw));
        assert_eq!(
            storage.get(&corrupt_key(HABITS_KEY)).unwrap().as_deref(),
            Some(raw)
        );
        // Absent keys were still initialized.
        assert!(storage.get(TASKS_KEY).unwrap().is_some());
    }

    #[test]
    fn mutation_writes_only_the_affected_key() {
        let mut store = AppStore::load_at(MemoryStorage::new(), today()).unwrap();
        let before = store.storage().clone();

        store.add_task("Pay bills", "2024-01-05").unwrap();

        let after = store.storage();
        assert_ne!(after.get(TASKS_KEY).unwrap(), before.get(TASKS_KEY).unwrap());
        for key in [HABITS_KEY, AI_MEMORY_KEY, AI_SETTINGS_KEY, USER_PROFILE_KEY] {
            assert_eq!(after.get(key).unwrap(), before.get(key).unwrap());
        }
        assert_eq!(after.len(), before.len());
    }

    #[test]
    fn failed_mutation_does_not_write() {
        let mut store = AppStore::load_at(MemoryStorage::new(), today()).unwrap();
        let before = store.storage().clone();
        assert!(store.toggle_task("missing").is_err());
        assert_eq!(store.storage(), &before);
    }
}
