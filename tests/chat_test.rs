mod helpers;

use std::sync::{Arc, Mutex};

use elevate::chat::capture::NeverCapture;
use elevate::chat::transcript::Transcript;
use elevate::chat::{ChatError, Coach, EMPTY_REPLY};
use elevate::storage::CHAT_HISTORY_KEY;
use elevate::store::types::{ChatRole, MemoryKind};
use elevate::store::AppStore;

use helpers::{coach_with, day, keyed_store, test_store, PendingClient, ScriptedClient};

#[tokio::test]
async fn long_reply_captures_one_auto_memory() {
    let reply = "a".repeat(120);
    let client = Arc::new(ScriptedClient::new().reply(reply.clone()));
    let coach = coach_with(keyed_store(), client);

    let outcome = coach.send("remind me to call mom").await.unwrap();

    assert!(!outcome.failed);
    assert_eq!(outcome.reply, reply);
    let memory = outcome.memory.expect("memory captured");

    let store = coach.store().lock().unwrap();
    let memories = &store.state().ai_memory;
    assert_eq!(memories.len(), 1);
    assert_eq!(memories[0].id, memory.id);
    assert_eq!(memories[0].kind, MemoryKind::Auto);
    assert_eq!(
        memories[0].content,
        format!("User said: \"remind me to call mom\". AI responded: \"{}...\"", "a".repeat(50))
    );
}

#[tokio::test]
async fn short_reply_without_keyword_captures_nothing() {
    let client = Arc::new(ScriptedClient::new().reply("b".repeat(40)));
    let coach = coach_with(keyed_store(), client);

    let outcome = coach.send("how am I doing?").await.unwrap();

    assert!(outcome.memory.is_none());
    assert!(coach.store().lock().unwrap().state().ai_memory.is_empty());
}

#[tokio::test]
async fn keyword_triggers_capture_on_short_reply() {
    let client = Arc::new(ScriptedClient::new().reply("Noted."));
    let coach = coach_with(keyed_store(), client);

    let outcome = coach.send("please remember I hate running").await.unwrap();

    assert!(outcome.memory.is_some());
}

#[tokio::test]
async fn disabled_capture_never_writes_memory() {
    let client = Arc::new(ScriptedClient::new().reply("c".repeat(500)));
    let coach = Coach::new(
        Arc::new(Mutex::new(keyed_store())),
        client,
        Arc::new(NeverCapture),
        "gemini-3-flash-preview",
    )
    .unwrap();

    let outcome = coach.send("remember this").await.unwrap();
    assert!(outcome.memory.is_none());
}

#[tokio::test]
async fn request_carries_instruction_and_role_mapped_history() {
    let client = Arc::new(ScriptedClient::new().reply("first").reply("second"));
    let coach = coach_with(keyed_store(), client.clone());

    coach.send("hello").await.unwrap();
    coach.send("again").await.unwrap();

    let request = client.last_request();
    assert_eq!(request.api_key, helpers::API_KEY);
    assert_eq!(request.model, "gemini-3-flash-preview");
    assert!(request
        .system_instruction
        .starts_with("You are Elevate AI, an AI assistant with the persona of a Coach."));
    assert!(request.system_instruction.contains("- Gym (Health)"));

    let roles: Vec<_> = request.history.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![
            ChatRole::Assistant,
            ChatRole::User,
            ChatRole::Assistant,
            ChatRole::User
        ]
    );
    assert_eq!(request.history.last().unwrap().text, "again");
}

#[tokio::test]
async fn empty_input_and_missing_key_have_no_side_effects() {
    let client = Arc::new(ScriptedClient::new().reply("unused"));
    let coach = coach_with(keyed_store(), client.clone());
    assert!(matches!(coach.send("   ").await, Err(ChatError::EmptyInput)));

    let unkeyed = coach_with(test_store(), client.clone());
    assert!(matches!(
        unkeyed.send("hello").await,
        Err(ChatError::MissingApiKey)
    ));

    assert!(client.requests.lock().unwrap().is_empty());
    assert_eq!(coach.transcript().unwrap().len(), 1);
    assert_eq!(unkeyed.transcript().unwrap().len(), 1);
}

#[tokio::test]
async fn remote_failure_is_recorded_as_error_message() {
    let client = Arc::new(ScriptedClient::new().fail(403, "API key not valid"));
    let coach = coach_with(keyed_store(), client);

    let outcome = coach.send("hi").await.unwrap();

    assert!(outcome.failed);
    assert!(outcome.reply.starts_with("Error: "));
    assert!(outcome.reply.contains("API key not valid"));
    let transcript = coach.transcript().unwrap();
    let last = transcript.messages().last().unwrap();
    assert_eq!(last.role, ChatRole::Assistant);
    assert_eq!(last.content, outcome.reply);
    assert!(!coach.is_in_flight());
}

#[tokio::test]
async fn blank_model_reply_is_replaced() {
    let client = Arc::new(ScriptedClient::new().reply("  "));
    let coach = coach_with(keyed_store(), client);

    let outcome = coach.send("hi").await.unwrap();
    assert_eq!(outcome.reply, EMPTY_REPLY);
}

#[tokio::test]
async fn transcript_persists_across_reload() {
    let client = Arc::new(ScriptedClient::new().reply("Keep going!"));
    let store = Arc::new(Mutex::new(keyed_store()));
    let coach = Coach::new(
        Arc::clone(&store),
        client,
        helpers::default_capture(),
        "gemini-3-flash-preview",
    )
    .unwrap();
    coach.send("I did the gym").await.unwrap();
    drop(coach);

    let store = Arc::try_unwrap(store).ok().unwrap().into_inner().unwrap();
    let reloaded = AppStore::load_at(store.into_storage(), day("2024-03-16")).unwrap();
    let transcript = Transcript::load(&reloaded).unwrap();

    let contents: Vec<_> = transcript.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents.len(), 3);
    assert!(contents[0].starts_with("Hello! I am Elevate AI"));
    assert_eq!(contents[1], "I did the gym");
    assert_eq!(contents[2], "Keep going!");
}

#[tokio::test]
async fn clearing_the_transcript_drops_the_stored_key() {
    let client = Arc::new(ScriptedClient::new().reply("ok"));
    let coach = coach_with(keyed_store(), client);
    coach.send("hi").await.unwrap();

    coach.clear_transcript().unwrap();

    assert_eq!(coach.transcript().unwrap().len(), 1);
    let store = coach.store().lock().unwrap();
    assert!(elevate::storage::Storage::get(store.storage(), CHAT_HISTORY_KEY)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn second_send_while_pending_is_busy() {
    let coach = coach_with(keyed_store(), Arc::new(PendingClient));

    let handle = coach.spawn_send("first").unwrap();
    assert!(coach.is_in_flight());

    assert!(matches!(coach.send("second").await, Err(ChatError::Busy)));
    assert!(matches!(coach.spawn_send("third"), Err(ChatError::Busy)));

    handle.abort();
    let _ = handle.join().await;
}

#[tokio::test]
async fn aborting_an_exchange_releases_the_flag() {
    let coach = coach_with(keyed_store(), Arc::new(PendingClient));

    let handle = coach.spawn_send("first").unwrap();
    // Let the task record the user message and reach the pending call.
    while coach.transcript().unwrap().len() < 2 {
        tokio::task::yield_now().await;
    }
    handle.abort();
    assert!(matches!(handle.join().await, Err(ChatError::Cancelled)));

    assert!(!coach.is_in_flight());
    let transcript = coach.transcript().unwrap();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.messages()[1].content, "first");

    // A fresh exchange can start again.
    let again = coach.spawn_send("second").unwrap();
    again.abort();
    let _ = again.join().await;
}
