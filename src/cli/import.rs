use anyhow::{Context, Result};
use std::path::Path;

use elevate::config::ElevateConfig;

use super::open_store;

/// Import a backup file. Sections present in the file replace the stored ones;
/// absent sections are left alone.
pub fn import(config: &ElevateConfig, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read import file: {}", file.display()))?;

    let mut store = open_store(config)?;
    let summary = store
        .import_data(&json)
        .context("Invalid backup file. Nothing was imported.")?;

    if summary.is_empty() {
        println!("Backup contained no recognized sections. Nothing changed.");
        return Ok(());
    }

    println!("Data imported successfully!");
    if let Some(n) = summary.habits {
        println!("  Habits:        {n}");
    }
    if let Some(n) = summary.tasks {
        println!("  Tasks:         {n}");
    }
    if let Some(n) = summary.ai_memory {
        println!("  Memories:      {n}");
    }
    if summary.ai_settings {
        println!("  AI settings:   replaced");
    }
    if summary.user_profile {
        println!("  Profile:       replaced");
    }
    Ok(())
}
