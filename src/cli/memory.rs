//! CLI `memory` commands: the facts the coach keeps about the user.

use anyhow::Result;

use elevate::config::ElevateConfig;
use elevate::store::types::MemoryKind;

use super::open_store;

pub fn add(config: &ElevateConfig, content: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let memory = store.add_memory(content, MemoryKind::Manual)?;
    println!("Stored memory {}", memory.id);
    Ok(())
}

pub fn list(config: &ElevateConfig) -> Result<()> {
    let store = open_store(config)?;
    let memories = &store.state().ai_memory;
    if memories.is_empty() {
        println!("No memories yet.");
        return Ok(());
    }

    println!("AI Memory ({} entries, newest first)", memories.len());
    println!("{}", "=".repeat(40));
    for m in memories {
        println!("  [{}] {} {}", m.kind, m.date, m.id);
        println!("      {}", m.content);
    }
    Ok(())
}

pub fn update(config: &ElevateConfig, id: &str, content: &str) -> Result<()> {
    let mut store = open_store(config)?;
    store.update_memory(id, content)?;
    println!("Updated memory {id}");
    Ok(())
}

pub fn delete(config: &ElevateConfig, id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    store.delete_memory(id)?;
    println!("Deleted memory {id}");
    Ok(())
}
