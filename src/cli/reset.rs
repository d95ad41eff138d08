//! CLI `reset` command: wipe all data after confirmation.

use anyhow::{bail, Result};
use std::io::Write;

use elevate::config::ElevateConfig;

use super::open_store;

/// Clear habits, tasks, memories, settings, profile, and the chat transcript.
pub fn reset(config: &ElevateConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("WARNING: This will permanently delete ALL habits, tasks, memories, settings, and chat history.");
    println!("Database: {}", db_path.display());
    print!("\nType YES to confirm: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    if input.trim() != "YES" {
        bail!("reset cancelled");
    }

    let mut store = open_store(config)?;
    store.reset_data()?;

    println!("All data deleted. Reset complete.");
    Ok(())
}
