//! OpenAI 兼容的 `/chat/completions` 客户端

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::{non_empty_text, translate_error_body};
use crate::core::{ChatModel, ChatPrompt};
use crate::errors::UpstreamError;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
struct Message {
    role: &'static str,
    content: String,
}

/// OpenAI 兼容模型
#[derive(Clone)]
pub struct OpenAiCompatibleModel {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompatibleModel {
    /// 创建客户端，`base_url` 形如 `https://api.openai.com/v1`
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
        }
    }

    fn build_request(&self, prompt: &ChatPrompt) -> ChatRequest {
        let messages = prompt
            .role_messages()
            .into_iter()
            .map(|m| Message {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect();

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, UpstreamError> {
        let request = self.build_request(prompt);
        debug!(model = %self.model, messages = request.messages.len(), "sending chat completion");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(model = %self.model, error = %e, "chat completion failed (transport)");
                UpstreamError::Unavailable(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.without_url().to_string()))?;

        if !status.is_success() {
            error!(model = %self.model, %status, body = %body, "chat completion API error");
            return Err(translate_error_body(status, &body));
        }

        let data: Value = serde_json::from_str(&body).map_err(|_| UpstreamError::MalformedBody)?;
        let message = data
            .pointer("/choices/0/message")
            .ok_or(UpstreamError::UnexpectedShape)?;

        non_empty_text(message.get("content").and_then(Value::as_str))
    }
}
