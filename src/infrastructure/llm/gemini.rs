//! Gemini `generateContent` client (single-shot, multimodal).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::{non_empty_text, translate_error_body};
use crate::core::{ChatModel, ChatPrompt};
use crate::errors::UpstreamError;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            top_k: 20,
            top_p: 0.7,
            max_output_tokens: 1024,
        }
    }
}

/// One named model behind the Gemini API
#[derive(Clone)]
pub struct GeminiModel {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    generation: GenerationConfig,
}

impl GeminiModel {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(&self, prompt: &ChatPrompt) -> GenerateRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &prompt.image {
            parts.push(Part {
                inline_data: Some(InlineData {
                    data: image.data.clone(),
                    mime_type: image.mime_type.clone(),
                }),
                text: None,
            });
        }
        parts.push(Part {
            inline_data: None,
            text: Some(prompt.single_shot_text()),
        });

        GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: self.generation,
        }
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, UpstreamError> {
        let request = self.build_request(prompt);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(model = %self.model, error = %e, "Gemini request failed (transport)");
                UpstreamError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.without_url().to_string()))?;

        if !status.is_success() {
            error!(model = %self.model, %status, body = %body, "Gemini API error");
            return Err(translate_error_body(status, &body));
        }

        debug!(model = %self.model, body = %body, "raw Gemini response");

        let data: Value = serde_json::from_str(&body).map_err(|e| {
            error!(model = %self.model, error = %e, "failed to parse Gemini response");
            UpstreamError::MalformedBody
        })?;

        let part = data
            .pointer("/candidates/0/content/parts/0")
            .ok_or(UpstreamError::UnexpectedShape)?;

        non_empty_text(part.get("text").and_then(Value::as_str))
    }
}

// ── wire types ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    data: String,
    mime_type: String,
}
