//! Record types held by the state store.
//!
//! Field names serialize in camelCase so persisted values and backup files
//! keep the same shape as the documents the web client wrote.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::StoreError;

/// Canonical calendar-day format for task dates and habit log keys.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// A recurring habit with a sparse completion log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub category: String,
    pub icon: String,
    /// `YYYY-MM-DD` → `true` for each completed day. Never holds an explicit `false`
    /// unless one was imported.
    #[serde(default)]
    pub logs: BTreeMap<String, bool>,
}

impl Habit {
    pub fn is_done_on(&self, day: &str) -> bool {
        self.logs.get(day).copied().unwrap_or(false)
    }
}

/// A one-shot item scoped to a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub date: String,
    #[serde(default)]
    pub completed: bool,
}

/// Where a memory entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryKind {
    /// Written by the memory-capture policy after a chat exchange.
    Auto,
    /// Written by the user.
    #[default]
    Manual,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            _ => Err(format!("unknown memory kind: {s}")),
        }
    }
}

/// A free-text note folded verbatim into every system instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiMemory {
    pub id: String,
    /// RFC 3339 creation timestamp.
    pub date: String,
    pub content: String,
    #[serde(rename = "type", default)]
    pub kind: MemoryKind,
}

/// Suggested personas. Other values are accepted.
pub const PERSONAS: [&str; 7] = [
    "Coach",
    "Teacher",
    "Trainer",
    "Partner",
    "Friend",
    "Wife",
    "Girlfriend",
];

pub const MODELS: [&str; 3] = [
    "gemini-3-flash-preview",
    "gemini-3.1-pro-preview",
    "gemini-2.5-flash",
];

pub const VOICES: [&str; 3] = ["Puck", "Kore", "Zephyr"];

/// Identity and remote-call parameters of the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    pub api_key: String,
    pub name: String,
    pub persona: String,
    pub behavior: String,
    pub model: String,
    pub voice: String,
    /// Image as a `data:` URL, or empty.
    pub avatar: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            name: "Elevate AI".into(),
            persona: "Coach".into(),
            behavior: "Motivating, direct, and disciplined.".into(),
            model: "gemini-3-flash-preview".into(),
            voice: "Zephyr".into(),
            avatar: String::new(),
        }
    }
}

impl AiSettings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub name: String,
    /// Date of birth as `YYYY-MM-DD`, or empty.
    pub dob: String,
    pub about: String,
    pub goals: String,
    pub avatar: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "User".into(),
            dob: String::new(),
            about: String::new(),
            goals: String::new(),
            avatar: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// Partial updates. `None` leaves the field as it is.

#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub logs: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub date: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct AiSettingsUpdate {
    pub api_key: Option<String>,
    pub name: Option<String>,
    pub persona: Option<String>,
    pub behavior: Option<String>,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserProfileUpdate {
    pub name: Option<String>,
    pub dob: Option<String>,
    pub about: Option<String>,
    pub goals: Option<String>,
    pub avatar: Option<String>,
}

/// Generate a fresh record id (UUID v7, time-sortable).
pub fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Parse a `YYYY-MM-DD` day, rejecting non-canonical spellings like `2024-1-5`.
pub fn parse_day(s: &str) -> Result<NaiveDate, StoreError> {
    let day = NaiveDate::parse_from_str(s, DAY_FORMAT)
        .map_err(|_| StoreError::InvalidDate(s.to_string()))?;
    if format_day(day) != s {
        return Err(StoreError::InvalidDate(s.to_string()));
    }
    Ok(day)
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}
