//! The persisted chat transcript.

use crate::ai::Turn;
use crate::storage::Storage;
use crate::store::types::{AiSettings, ChatMessage, ChatRole};
use crate::store::{AppStore, StoreError};

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Opening line used when there is no stored transcript.
    pub fn greeting(settings: &AiSettings) -> ChatMessage {
        ChatMessage::assistant(format!(
            "Hello! I am {}, your {}. I'm here to help you stay disciplined and reach your goals. How can I assist you today?",
            settings.name, settings.persona
        ))
    }

    pub fn fresh(settings: &AiSettings) -> Self {
        Self {
            messages: vec![Self::greeting(settings)],
        }
    }

    /// Stored transcript, or a fresh one holding just the greeting.
    pub fn load<S: Storage>(store: &AppStore<S>) -> Result<Self, StoreError> {
        Ok(match store.chat_history()? {
            Some(messages) => Self { messages },
            None => Self::fresh(&store.state().ai_settings),
        })
    }

    pub fn save<S: Storage>(&self, store: &mut AppStore<S>) -> Result<(), StoreError> {
        store.save_chat_history(&self.messages)
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn last_assistant(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
    }

    /// Whole history as model turns, greeting included.
    pub fn turns(&self) -> Vec<Turn> {
        self.messages
            .iter()
            .map(|m| Turn {
                role: m.role,
                text: m.content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn store() -> AppStore<MemoryStorage> {
        AppStore::load_at(
            MemoryStorage::new(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn fresh_transcript_greets_with_settings() {
        let transcript = Transcript::load(&store()).unwrap();
        assert_eq!(transcript.len(), 1);
        let greeting = &transcript.messages()[0];
        assert_eq!(greeting.role, ChatRole::Assistant);
        assert!(greeting.content.starts_with("Hello! I am Elevate AI, your Coach."));
    }

    #[test]
    fn saved_transcript_reloads() {
        let mut store = store();
        let mut transcript = Transcript::load(&store).unwrap();
        transcript.push(ChatMessage::user("hi"));
        transcript.save(&mut store).unwrap();

        let reloaded = Transcript::load(&store).unwrap();
        assert_eq!(reloaded, transcript);
        assert_eq!(reloaded.turns()[1].text, "hi");
    }

    #[test]
    fn last_assistant_skips_user_messages() {
        let mut transcript = Transcript::fresh(&AiSettings::default());
        transcript.push(ChatMessage::assistant("reply"));
        transcript.push(ChatMessage::user("thanks"));
        assert_eq!(transcript.last_assistant().unwrap().content, "reply");
    }
}
