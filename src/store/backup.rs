//! Backup export and import.
//!
//! A backup is one pretty-printed JSON document
//! `{habits, tasks, aiMemory, aiSettings, userProfile}`. Importing replaces each
//! record that is present in the document and leaves the others alone.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{format_day, AiMemory, AiSettings, Habit, Task, UserProfile};
use super::{write_key, AppStore, StoreError};
use crate::storage::{
    Storage, AI_MEMORY_KEY, AI_SETTINGS_KEY, HABITS_KEY, TASKS_KEY, USER_PROFILE_KEY,
};

/// Full export document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub habits: Vec<Habit>,
    pub tasks: Vec<Task>,
    pub ai_memory: Vec<AiMemory>,
    pub ai_settings: AiSettings,
    pub user_profile: UserProfile,
}

/// Import document. Every section is optional; `null` counts as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    habits: Option<Vec<Habit>>,
    tasks: Option<Vec<Task>>,
    ai_memory: Option<Vec<AiMemory>>,
    ai_settings: Option<AiSettings>,
    user_profile: Option<UserProfile>,
}

/// Which sections an import replaced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub habits: Option<usize>,
    pub tasks: Option<usize>,
    pub ai_memory: Option<usize>,
    pub ai_settings: bool,
    pub user_profile: bool,
}

impl ImportSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("backup is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("backup must be a JSON object")]
    NotAnObject,

    #[error("backup has an unexpected shape: {0}")]
    Invalid(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// File name offered for an export made on `today`.
pub fn backup_file_name(today: NaiveDate) -> String {
    format!("elevate-backup-{}.json", format_day(today))
}

impl<S: Storage> AppStore<S> {
    pub fn export_data(&self) -> BackupDocument {
        let state = &self.state;
        BackupDocument {
            habits: state.habits.clone(),
            tasks: state.tasks.clone(),
            ai_memory: state.ai_memory.clone(),
            ai_settings: state.ai_settings.clone(),
            user_profile: state.user_profile.clone(),
        }
    }

    pub fn export_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(&self.export_data()).map_err(|source| StoreError::Serialize {
            key: "backup",
            source,
        })
    }

    /// Replace each record present in `json` wholesale.
    ///
    /// The whole document is parsed and checked before anything changes, so a
    /// document that fails to parse, or parses into the wrong shape (for
    /// example `"tasks": "oops"`), leaves every record untouched.
    ///
    /// Sections are then written one key at a time, each to storage before
    /// memory. If a write fails, the sections before it stay imported, the
    /// failed one and those after it keep their old values, and memory still
    /// matches storage.
    pub fn import_data(&mut self, json: &str) -> Result<ImportSummary, ImportError> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(ImportError::Parse)?;
        if !value.is_object() {
            return Err(ImportError::NotAnObject);
        }
        let doc: ImportDocument = serde_json::from_value(value).map_err(ImportError::Invalid)?;

        let mut summary = ImportSummary::default();
        if let Some(habits) = doc.habits {
            write_key(&mut self.storage, HABITS_KEY, &habits)?;
            summary.habits = Some(habits.len());
            self.state.habits = habits;
        }
        if let Some(tasks) = doc.tasks {
            write_key(&mut self.storage, TASKS_KEY, &tasks)?;
            summary.tasks = Some(tasks.len());
            self.state.tasks = tasks;
        }
        if let Some(memory) = doc.ai_memory {
            write_key(&mut self.storage, AI_MEMORY_KEY, &memory)?;
            summary.ai_memory = Some(memory.len());
            self.state.ai_memory = memory;
        }
        if let Some(settings) = doc.ai_settings {
            write_key(&mut self.storage, AI_SETTINGS_KEY, &settings)?;
            summary.ai_settings = true;
            self.state.ai_settings = settings;
        }
        if let Some(profile) = doc.user_profile {
            write_key(&mut self.storage, USER_PROFILE_KEY, &profile)?;
            summary.user_profile = true;
            self.state.user_profile = profile;
        }

        tracing::info!(?summary, "backup imported");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> AppStore<MemoryStorage> {
        AppStore::load_at(
            MemoryStorage::new(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn backup_file_name_uses_date() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(backup_file_name(day), "elevate-backup-2024-03-09.json");
    }

    #[test]
    fn export_uses_camel_case_field_names() {
        let store = store();
        let json: serde_json::Value = serde_json::from_str(&store.export_json().unwrap()).unwrap();
        for key in ["habits", "tasks", "aiMemory", "aiSettings", "userProfile"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["aiSettings"]["name"], "Elevate AI");
    }

    #[test]
    fn null_sections_count_as_absent() {
        let mut store = store();
        let before = store.state().clone();
        let summary = store.import_data(r#"{"habits": null}"#).unwrap();
        assert!(summary.is_empty());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn non_object_document_is_rejected() {
        let mut store = store();
        assert!(matches!(
            store.import_data("[1, 2, 3]"),
            Err(ImportError::NotAnObject)
        ));
    }

    #[test]
    fn wrong_shape_is_rejected_before_any_change() {
        let mut store = store();
        let before = store.state().clone();
        let stored = store.storage().clone();
        let result = store.import_data(r#"{"habits": [], "tasks": "oops"}"#);
        assert!(matches!(result, Err(ImportError::Invalid(_))));
        assert_eq!(store.state(), &before);
        assert_eq!(store.storage(), &stored);
    }

    /// Accepts every write except to one key.
    #[derive(Default)]
    struct RejectingStorage {
        inner: MemoryStorage,
        reject: Option<&'static str>,
    }

    impl Storage for RejectingStorage {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
            if self.reject == Some(key) {
                anyhow::bail!("disk full");
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> anyhow::Result<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn failed_write_keeps_memory_in_step_with_storage() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut store = AppStore::load_at(RejectingStorage::default(), day).unwrap();
        let old_tasks = store.state().tasks.clone();
        store.storage.reject = Some(TASKS_KEY);

        let result = store.import_data(
            r#"{"habits": [], "tasks": [], "aiSettings": {"name": "Max"}}"#,
        );

        assert!(matches!(result, Err(ImportError::Store(_))));
        assert!(store.state().habits.is_empty());
        assert_eq!(store.storage().get(HABITS_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(store.state().tasks, old_tasks);
        assert_eq!(store.state().ai_settings.name, "Elevate AI");

        let reloaded = AppStore::load_at(store.into_storage(), day).unwrap();
        assert!(reloaded.state().habits.is_empty());
        assert_eq!(reloaded.state().tasks, old_tasks);
    }
}
