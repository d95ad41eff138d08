//! Reading assistant messages aloud.

pub mod audio;

use std::sync::{Arc, Mutex, PoisonError};

use crate::ai::{ClientError, GenerativeClient, SpeechRequest};
use crate::store::types::AiSettings;
use audio::{decode_audio, AudioError, AudioSink};

/// Voice used when settings leave it blank.
pub const DEFAULT_VOICE: &str = "Zephyr";

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis failed: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Audio(#[from] AudioError),

    #[error("playback task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// No API key configured; nothing was requested.
    Skipped,
    Played,
}

/// Holds the speaking indicator and clears it when dropped.
struct SpeakingGuard<'a> {
    speaking: &'a Mutex<Option<String>>,
}

impl<'a> SpeakingGuard<'a> {
    fn set(speaking: &'a Mutex<Option<String>>, text: &str) -> Self {
        *speaking.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Self { speaking }
    }
}

impl Drop for SpeakingGuard<'_> {
    fn drop(&mut self) {
        *self.speaking.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Synthesizes, decodes, and plays text, tracking what is currently being spoken.
pub struct Speaker {
    client: Arc<dyn GenerativeClient>,
    sink: Arc<dyn AudioSink>,
    tts_model: String,
    speaking: Mutex<Option<String>>,
}

impl Speaker {
    pub fn new(
        client: Arc<dyn GenerativeClient>,
        sink: Arc<dyn AudioSink>,
        tts_model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            sink,
            tts_model: tts_model.into(),
            speaking: Mutex::new(None),
        }
    }

    /// Text currently being spoken, if any.
    pub fn currently_speaking(&self) -> Option<String> {
        self.speaking.lock().ok().and_then(|s| s.clone())
    }

    /// Speak `text` with the configured voice.
    ///
    /// The speaking indicator is set for the duration of the call and cleared
    /// when playback ends, anything fails, or the future is dropped. Failures
    /// are returned, not retried.
    pub async fn speak(&self, settings: &AiSettings, text: &str) -> Result<SpeakOutcome, SpeechError> {
        if !settings.has_api_key() {
            return Ok(SpeakOutcome::Skipped);
        }

        let result = {
            let _speaking = SpeakingGuard::set(&self.speaking, text);
            self.synthesize_and_play(settings, text).await
        };

        if let Err(ref e) = result {
            tracing::error!(error = %e, "speech playback failed");
        }
        result.map(|_| SpeakOutcome::Played)
    }

    async fn synthesize_and_play(&self, settings: &AiSettings, text: &str) -> Result<(), SpeechError> {
        let voice = if settings.voice.is_empty() {
            DEFAULT_VOICE
        } else {
            settings.voice.as_str()
        };

        let payload = self
            .client
            .synthesize_speech(SpeechRequest {
                api_key: settings.api_key.clone(),
                model: self.tts_model.clone(),
                voice: voice.to_string(),
                text: text.to_string(),
            })
            .await?;
        tracing::debug!(mime = %payload.mime_type, bytes = payload.data.len(), "speech received");

        let decoded = decode_audio(&payload.data)?;
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || sink.play(&decoded))
            .await
            .map_err(|e| SpeechError::Task(e.to_string()))??;
        Ok(())
    }
}
