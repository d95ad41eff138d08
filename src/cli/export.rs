use anyhow::{Context, Result};
use std::path::PathBuf;

use elevate::config::ElevateConfig;
use elevate::store::backup::backup_file_name;

use super::{open_store, today};

/// Write the backup document to `output`, `-` for stdout, or
/// `elevate-backup-YYYY-MM-DD.json` in the current directory by default.
pub fn export(config: &ElevateConfig, output: Option<&str>) -> Result<()> {
    let store = open_store(config)?;
    let json = store.export_json()?;
    let state = store.state();

    match output {
        Some("-") => println!("{json}"),
        other => {
            let path = other
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(backup_file_name(today())));
            std::fs::write(&path, &json)
                .with_context(|| format!("failed to write backup: {}", path.display()))?;
            eprintln!("Backup written to {}", path.display());
        }
    }

    eprintln!(
        "Exported {} habits, {} tasks, and {} memories.",
        state.habits.len(),
        state.tasks.len(),
        state.ai_memory.len()
    );
    Ok(())
}
