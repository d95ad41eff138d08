#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use elevate::ai::{
    ClientError, GenerateRequest, GenerativeClient, ImageRequest, InlineData, SpeechRequest,
};
use elevate::chat::capture::{HeuristicCapture, MemoryCapturePolicy};
use elevate::chat::Coach;
use elevate::config::MemoryCaptureConfig;
use elevate::speech::audio::{AudioError, AudioSink, DecodedAudio};
use elevate::storage::MemoryStorage;
use elevate::store::types::AiSettingsUpdate;
use elevate::store::AppStore;

pub const API_KEY: &str = "test-key";

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Fresh seeded store on in-memory storage.
pub fn test_store() -> AppStore<MemoryStorage> {
    AppStore::load_at(MemoryStorage::new(), day("2024-03-15")).unwrap()
}

/// Seeded store with an API key set.
pub fn keyed_store() -> AppStore<MemoryStorage> {
    let mut store = test_store();
    store
        .update_ai_settings(AiSettingsUpdate {
            api_key: Some(API_KEY.into()),
            ..Default::default()
        })
        .unwrap();
    store
}

pub fn default_capture() -> Arc<dyn MemoryCapturePolicy> {
    Arc::new(HeuristicCapture::from_config(&MemoryCaptureConfig::default()))
}

pub fn coach_with(
    store: AppStore<MemoryStorage>,
    client: Arc<dyn GenerativeClient>,
) -> Coach<MemoryStorage> {
    Coach::new(
        Arc::new(Mutex::new(store)),
        client,
        default_capture(),
        "gemini-3-flash-preview",
    )
    .unwrap()
}

/// Replies from a queue and records every request.
#[derive(Default)]
pub struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    speech: Mutex<VecDeque<Result<InlineData, ClientError>>>,
    pub requests: Mutex<Vec<GenerateRequest>>,
    pub speech_requests: Mutex<Vec<SpeechRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
        self
    }

    pub fn fail(self, status: u16, message: &str) -> Self {
        self.replies.lock().unwrap().push_back(Err(ClientError::Api {
            status,
            message: message.into(),
        }));
        self
    }

    pub fn speech(self, data: Vec<u8>) -> Self {
        self.speech.lock().unwrap().push_back(Ok(InlineData {
            mime_type: "audio/L16;rate=24000".into(),
            data,
        }));
        self
    }

    pub fn speech_fails(self) -> Self {
        self.speech
            .lock()
            .unwrap()
            .push_back(Err(ClientError::EmptyResponse));
        self
    }

    pub fn last_request(&self) -> GenerateRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl GenerativeClient for ScriptedClient {
    async fn generate_text(&self, request: GenerateRequest) -> Result<String, ClientError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::EmptyResponse))
    }

    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<InlineData, ClientError> {
        self.speech_requests.lock().unwrap().push(request);
        self.speech
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::EmptyResponse))
    }

    async fn generate_image(&self, _request: ImageRequest) -> Result<Option<InlineData>, ClientError> {
        Ok(Some(InlineData {
            mime_type: "image/png".into(),
            data: vec![0x89, b'P', b'N', b'G'],
        }))
    }
}

/// Never answers; for exercising the in-flight flag.
pub struct PendingClient;

#[async_trait]
impl GenerativeClient for PendingClient {
    async fn generate_text(&self, _request: GenerateRequest) -> Result<String, ClientError> {
        std::future::pending().await
    }

    async fn synthesize_speech(&self, _request: SpeechRequest) -> Result<InlineData, ClientError> {
        std::future::pending().await
    }

    async fn generate_image(&self, _request: ImageRequest) -> Result<Option<InlineData>, ClientError> {
        std::future::pending().await
    }
}

/// Keeps everything it is asked to play.
#[derive(Default)]
pub struct RecordingSink {
    pub played: Mutex<Vec<DecodedAudio>>,
}

impl AudioSink for RecordingSink {
    fn play(&self, audio: &DecodedAudio) -> Result<(), AudioError> {
        self.played.lock().unwrap().push(audio.clone());
        Ok(())
    }
}

/// Always fails playback.
pub struct BrokenSink;

impl AudioSink for BrokenSink {
    fn play(&self, _audio: &DecodedAudio) -> Result<(), AudioError> {
        Err(AudioError::Playback("device unavailable".into()))
    }
}
