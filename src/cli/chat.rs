//! CLI `chat` commands.

use anyhow::Result;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};

use elevate::chat::capture::policy_from_config;
use elevate::chat::{ChatError, Coach, ExchangeOutcome};
use elevate::config::ElevateConfig;
use elevate::storage::SqliteStorage;
use elevate::store::types::ChatRole;

use super::{build_client, open_store, spinner};

fn coach(config: &ElevateConfig) -> Result<Coach<SqliteStorage>> {
    let store = Arc::new(Mutex::new(open_store(config)?));
    let client = build_client(config)?;
    let policy = Arc::from(policy_from_config(&config.memory_capture));
    Ok(Coach::new(store, client, policy, config.ai.default_model.clone())?)
}

fn print_outcome(outcome: &ExchangeOutcome) {
    println!();
    println!("{}", outcome.reply);
    if let Some(ref memory) = outcome.memory {
        eprintln!("(remembered: {})", memory.id);
    }
    println!();
}

/// Send one message. Ctrl-C cancels the pending reply.
async fn exchange(coach: &Coach<SqliteStorage>, input: &str) -> Result<()> {
    let handle = match coach.spawn_send(input) {
        Ok(handle) => handle,
        Err(ChatError::EmptyInput) => return Ok(()),
        Err(ChatError::MissingApiKey) => {
            eprintln!("No API key configured. Run `elevate settings ai --api-key <KEY>`.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let abort = handle.abort_handle();
    let pb = spinner("Thinking...");
    let result = tokio::select! {
        result = handle.join() => result,
        _ = tokio::signal::ctrl_c() => {
            abort.abort();
            Err(ChatError::Cancelled)
        }
    };
    pb.finish_and_clear();

    match result {
        Ok(outcome) => print_outcome(&outcome),
        Err(ChatError::Cancelled) => eprintln!("(cancelled)"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// One-shot when `message` is given, otherwise an interactive prompt until EOF
/// or `/exit`.
pub async fn chat(config: &ElevateConfig, message: Option<&str>) -> Result<()> {
    let coach = coach(config)?;

    if let Some(message) = message {
        return exchange(&coach, message).await;
    }

    let name = coach
        .store()
        .lock()
        .map_err(|_| ChatError::Poisoned("store"))?
        .state()
        .ai_settings
        .name
        .clone();
    if let Some(greeting) = coach.transcript()?.last_assistant() {
        println!("{name}: {}", greeting.content);
    }
    println!("(type /exit to leave)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line == "/exit" || line == "/quit" {
            break;
        }
        exchange(&coach, line).await?;
    }
    Ok(())
}

pub fn history(config: &ElevateConfig) -> Result<()> {
    let coach = coach(config)?;
    let transcript = coach.transcript()?;
    for message in transcript.messages() {
        let who = match message.role {
            ChatRole::User => "You",
            ChatRole::Assistant => "AI",
        };
        println!(
            "[{}] {who}: {}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            message.content
        );
    }
    Ok(())
}

pub fn clear(config: &ElevateConfig) -> Result<()> {
    let coach = coach(config)?;
    coach.clear_transcript()?;
    println!("Chat history cleared.");
    Ok(())
}
