//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    ClientError, GenerateRequest, GenerativeClient, ImageRequest, InlineData, SpeechRequest,
};
use crate::config::AiConfig;
use crate::store::types::ChatRole;

const CONNECT_TIMEOUT_SECS: u64 = 10;

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: Vec<&'a str>,
    speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseInlineData {
    #[serde(default)]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter())
            .into_iter()
            .flatten()
    }

    /// Concatenated non-thought text of the first candidate.
    fn text(&self) -> String {
        self.parts()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    fn first_inline_data(&self) -> Option<&ResponseInlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "model",
    }
}

fn decode_inline(inline: &ResponseInlineData) -> Result<InlineData, ClientError> {
    let data = base64::engine::general_purpose::STANDARD
        .decode(inline.data.as_bytes())
        .map_err(|e| ClientError::Decode(format!("invalid base64 payload: {e}")))?;
    Ok(InlineData {
        mime_type: inline.mime_type.clone(),
        data,
    })
}

// ── Client ───────────────────────────────────────────────────────────

pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: &GenerateContentBody<'_>,
    ) -> Result<GenerateContentResponse, ClientError> {
        let url = self.endpoint(model);
        tracing::debug!(model, contents = body.contents.len(), "calling generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            tracing::error!(status = status.as_u16(), %message, "generateContent failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, request: GenerateRequest) -> Result<String, ClientError> {
        let body = GenerateContentBody {
            contents: request
                .history
                .iter()
                .map(|turn| Content {
                    role: Some(role_name(turn.role)),
                    parts: vec![TextPart { text: &turn.text }],
                })
                .collect(),
            system_instruction: Some(Content {
                role: None,
                parts: vec![TextPart {
                    text: &request.system_instruction,
                }],
            }),
            generation_config: None,
        };

        let response = self
            .generate_content(&request.api_key, &request.model, &body)
            .await?;
        Ok(response.text())
    }

    async fn synthesize_speech(&self, request: SpeechRequest) -> Result<InlineData, ClientError> {
        let body = GenerateContentBody {
            contents: vec![Content {
                role: None,
                parts: vec![TextPart {
                    text: &request.text,
                }],
            }],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: &request.voice,
                        },
                    },
                },
            }),
        };

        let response = self
            .generate_content(&request.api_key, &request.model, &body)
            .await?;
        let inline = response
            .first_inline_data()
            .ok_or(ClientError::EmptyResponse)?;
        decode_inline(inline)
    }

    async fn generate_image(
        &self,
        request: ImageRequest,
    ) -> Result<Option<InlineData>, ClientError> {
        let body = GenerateContentBody {
            contents: vec![Content {
                role: None,
                parts: vec![TextPart {
                    text: &request.prompt,
                }],
            }],
            system_instruction: None,
            generation_config: None,
        };

        let response = self
            .generate_content(&request.api_key, &request.model, &body)
            .await?;
        response.first_inline_data().map(decode_inline).transpose()
    }
}
