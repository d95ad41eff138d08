pub mod chat;
pub mod doctor;
pub mod export;
pub mod habit;
pub mod import;
pub mod memory;
pub mod reset;
pub mod settings;
pub mod speak;
pub mod stats;
pub mod task;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use elevate::ai::gemini::GeminiClient;
use elevate::ai::GenerativeClient;
use elevate::config::ElevateConfig;
use elevate::storage::SqliteStorage;
use elevate::store::types::parse_day;
use elevate::store::AppStore;

pub type CliStore = AppStore<SqliteStorage>;

/// Open the configured database and load the store from it.
pub fn open_store(config: &ElevateConfig) -> Result<CliStore> {
    let db_path = config.resolved_db_path();
    let storage = SqliteStorage::open(&db_path)
        .with_context(|| format!("failed to open database: {}", db_path.display()))?;
    Ok(AppStore::load(storage)?)
}

pub fn build_client(config: &ElevateConfig) -> Result<Arc<dyn GenerativeClient>> {
    let client = GeminiClient::new(&config.ai).context("failed to build HTTP client")?;
    Ok(Arc::new(client))
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// `--date` argument, or today when absent.
pub fn day_arg(date: Option<&str>) -> Result<NaiveDate> {
    match date {
        Some(d) => Ok(parse_day(d)?),
        None => Ok(today()),
    }
}

/// Spinner on stderr while a remote call is pending.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn check(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}
