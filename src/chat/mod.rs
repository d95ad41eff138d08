//! The AI chat flow.
//!
//! [`Coach`] turns a user utterance plus a snapshot of the store into an
//! assistant reply. One exchange moves `idle → awaiting-reply → idle`; the
//! in-flight flag lives inside the service, so a second send while a reply is
//! pending is rejected with [`ChatError::Busy`] no matter who calls.

pub mod capture;
pub mod prompt;
pub mod transcript;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::ai::{GenerateRequest, GenerativeClient};
use crate::storage::Storage;
use crate::store::types::{AiMemory, ChatMessage, MemoryKind};
use crate::store::{AppStore, StoreError};
use capture::MemoryCapturePolicy;
use transcript::Transcript;

/// Substituted when the model answers with no text.
pub const EMPTY_REPLY: &str = "I'm sorry, I couldn't process that.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,

    #[error("no API key configured")]
    MissingApiKey,

    #[error("a reply is already pending")]
    Busy,

    #[error("exchange was cancelled")]
    Cancelled,

    #[error("{0} lock poisoned")]
    Poisoned(&'static str),

    #[error("exchange task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a completed exchange produced.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    /// Assistant text appended to the transcript (an `Error: …` line on failure).
    pub reply: String,
    /// Memory written by the capture policy, if it fired.
    pub memory: Option<AiMemory>,
    /// `true` when the remote call failed.
    pub failed: bool,
}

/// Clears the in-flight flag when dropped, including on cancellation.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A running exchange started by [`Coach::spawn_send`].
pub struct ExchangeHandle {
    handle: tokio::task::JoinHandle<Result<ExchangeOutcome, ChatError>>,
}

impl ExchangeHandle {
    /// Cancel the exchange. The user message stays in the transcript; no reply is added.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Detached handle for cancelling while [`join`](Self::join) is pending.
    pub fn abort_handle(&self) -> tokio::task::AbortHandle {
        self.handle.abort_handle()
    }

    pub async fn join(self) -> Result<ExchangeOutcome, ChatError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ChatError::Cancelled),
            Err(e) => Err(ChatError::Task(e.to_string())),
        }
    }
}

/// Chat service over a shared store.
pub struct Coach<S: Storage> {
    store: Arc<Mutex<AppStore<S>>>,
    transcript: Arc<Mutex<Transcript>>,
    client: Arc<dyn GenerativeClient>,
    policy: Arc<dyn MemoryCapturePolicy>,
    in_flight: Arc<AtomicBool>,
    default_model: String,
}

impl<S: Storage> Clone for Coach<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            transcript: Arc::clone(&self.transcript),
            client: Arc::clone(&self.client),
            policy: Arc::clone(&self.policy),
            in_flight: Arc::clone(&self.in_flight),
            default_model: self.default_model.clone(),
        }
    }
}

impl<S: Storage> Coach<S> {
    /// Build the service, loading the stored transcript.
    pub fn new(
        store: Arc<Mutex<AppStore<S>>>,
        client: Arc<dyn GenerativeClient>,
        policy: Arc<dyn MemoryCapturePolicy>,
        default_model: impl Into<String>,
    ) -> Result<Self, ChatError> {
        let transcript = {
            let store = store.lock().map_err(|_| ChatError::Poisoned("store"))?;
            Transcript::load(&*store)?
        };
        Ok(Self {
            store,
            transcript: Arc::new(Mutex::new(transcript)),
            client,
            policy,
            in_flight: Arc::new(AtomicBool::new(false)),
            default_model: default_model.into(),
        })
    }

    pub fn store(&self) -> &Arc<Mutex<AppStore<S>>> {
        &self.store
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Copy of the current transcript.
    pub fn transcript(&self) -> Result<Transcript, ChatError> {
        Ok(self.lock_transcript()?.clone())
    }

    /// Drop the stored transcript and start over from the greeting.
    pub fn clear_transcript(&self) -> Result<(), ChatError> {
        let mut store = self.lock_store()?;
        let mut transcript = self.lock_transcript()?;
        store.clear_chat_history()?;
        *transcript = Transcript::fresh(&store.state().ai_settings);
        Ok(())
    }

    /// Send `input` and wait for the reply.
    ///
    /// Empty input and a missing API key are rejected before anything changes.
    /// A remote failure is not an error here: it is recorded in the transcript
    /// as an `Error: …` assistant message and reported through
    /// [`ExchangeOutcome::failed`]. Nothing is retried.
    pub async fn send(&self, input: &str) -> Result<ExchangeOutcome, ChatError> {
        let guard = self.begin(input)?;
        self.exchange(guard, input.to_string()).await
    }

    /// Like [`send`](Self::send) but runs on a tokio task that can be aborted.
    ///
    /// Validation and the in-flight check happen before this returns.
    pub fn spawn_send(&self, input: &str) -> Result<ExchangeHandle, ChatError>
    where
        S: 'static,
    {
        let guard = self.begin(input)?;
        let coach = self.clone();
        let input = input.to_string();
        let handle = tokio::spawn(async move { coach.exchange(guard, input).await });
        Ok(ExchangeHandle { handle })
    }

    fn begin(&self, input: &str) -> Result<InFlightGuard, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if !self.lock_store()?.state().ai_settings.has_api_key() {
            return Err(ChatError::MissingApiKey);
        }
        InFlightGuard::acquire(&self.in_flight).ok_or(ChatError::Busy)
    }

    async fn exchange(
        &self,
        _guard: InFlightGuard,
        input: String,
    ) -> Result<ExchangeOutcome, ChatError> {
        self.record(ChatMessage::user(input.as_str()))?;

        let request = {
            let store = self.lock_store()?;
            let transcript = self.lock_transcript()?;
            let state = store.state();
            let today = chrono::Local::now().date_naive();
            let model = if state.ai_settings.model.is_empty() {
                self.default_model.clone()
            } else {
                state.ai_settings.model.clone()
            };
            GenerateRequest {
                api_key: state.ai_settings.api_key.clone(),
                model,
                system_instruction: prompt::build_system_instruction(state, today),
                history: transcript.turns(),
            }
        };

        tracing::info!(
            model = %request.model,
            turns = request.history.len(),
            "awaiting reply"
        );

        match self.client.generate_text(request).await {
            Ok(text) => {
                let reply = if text.trim().is_empty() {
                    EMPTY_REPLY.to_string()
                } else {
                    text
                };
                self.record(ChatMessage::assistant(reply.as_str()))?;

                let memory = match self.policy.capture(&input, &reply) {
                    Some(content) => {
                        let memory = self.lock_store()?.add_memory(&content, MemoryKind::Auto)?;
                        tracing::info!(id = %memory.id, "captured memory from exchange");
                        Some(memory)
                    }
                    None => None,
                };

                Ok(ExchangeOutcome {
                    reply,
                    memory,
                    failed: false,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "chat request failed");
                let reply = format!("Error: {e}");
                self.record(ChatMessage::assistant(reply.as_str()))?;
                Ok(ExchangeOutcome {
                    reply,
                    memory: None,
                    failed: true,
                })
            }
        }
    }

    /// Append to the transcript and persist it. Locks store before transcript.
    fn record(&self, message: ChatMessage) -> Result<(), ChatError> {
        let mut store = self.lock_store()?;
        let mut transcript = self.lock_transcript()?;
        transcript.push(message);
        transcript.save(&mut *store)?;
        Ok(())
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, AppStore<S>>, ChatError> {
        self.store.lock().map_err(|_| ChatError::Poisoned("store"))
    }

    fn lock_transcript(&self) -> Result<MutexGuard<'_, Transcript>, ChatError> {
        self.transcript
            .lock()
            .map_err(|_| ChatError::Poisoned("transcript"))
    }
}
