//! CLI `doctor` command: database diagnostics.

use anyhow::{Context, Result};

use elevate::config::ElevateConfig;
use elevate::db;
use elevate::storage::ALL_KEYS;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &ElevateConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Any `elevate` command that touches data will create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Elevate Health Report");
    println!("=====================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Stored keys:");
    for key in ALL_KEYS {
        match report.keys.iter().find(|(k, _, _)| k == key) {
            Some((_, size, updated)) => {
                let updated = if updated.is_empty() { "-" } else { updated.as_str() };
                println!("  {:<24} {:>10}  {updated}", key, format_bytes(*size));
            }
            None => println!("  {:<24} {:>10}", key, "(absent)"),
        }
    }
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore the database file from a copy, or");
        println!("  2. elevate reset && elevate import elevate-backup-YYYY-MM-DD.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
