//! Remote generative-AI calls.
//!
//! [`GenerativeClient`] is the seam the chat flow, speech playback, and avatar
//! generation talk through. [`gemini::GeminiClient`] is the HTTP implementation.

pub mod gemini;

use async_trait::async_trait;

use crate::store::types::ChatRole;

/// One turn of conversation history sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub api_key: String,
    pub model: String,
    pub system_instruction: String,
    pub history: Vec<Turn>,
}

#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub api_key: String,
    pub model: String,
    pub voice: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub api_key: String,
    pub model: String,
    pub prompt: String,
}

/// Binary payload returned inline by the API.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response contained no usable content")]
    EmptyResponse,

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Text, speech, and image generation against a remote model.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Produce one text reply for the conversation so far.
    async fn generate_text(&self, request: GenerateRequest) -> Result<String, ClientError>;

    /// Synthesize `request.text` and return the raw audio payload.
    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<InlineData, ClientError>;

    /// Generate an image. `Ok(None)` when the model answered without one.
    async fn generate_image(&self, request: ImageRequest)
        -> Result<Option<InlineData>, ClientError>;
}
