use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::error::ServiceError;
use tracing::{debug, warn};

use crate::{config::Settings, error::GenerationError};

/// One prompt for the generative service. The response is always requested as
/// JSON text.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub contents: String,
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            system_instruction: None,
            temperature: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Returns the non-empty text body produced for `request`.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

/// Builds a backend from settings, or `None` when no API key is configured.
pub fn client_from_settings(settings: &Settings) -> Option<Arc<dyn GenerativeBackend>> {
    let Some(api_key) = settings.api_key() else {
        warn!("API key not found in environment or config; using fallback data");
        return None;
    };

    match GeminiClient::new(settings, api_key) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            warn!(error = %err, "failed to build generative client; using fallback data");
            None
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<ContentPayload<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ContentPayload<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentPayload<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings, api_key: &str) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![ContentPayload {
                role: Some("user"),
                parts: vec![TextPart {
                    text: &request.contents,
                }],
            }],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(|text| ContentPayload {
                    role: None,
                    parts: vec![TextPart { text }],
                }),
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: request.temperature,
            },
        };

        debug!(model = %self.model, "sending generateContent request");
        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let raw = res.text().await.unwrap_or_default();
            return Err(ServiceError::from_response(status.as_u16(), &raw).into());
        }

        let payload: GenerateContentResponse = serde_json::from_slice(&res.bytes().await?)?;
        payload.text().ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
#[path = "tests/generative_tests.rs"]
mod tests;
