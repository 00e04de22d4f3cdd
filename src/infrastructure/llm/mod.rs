//! LLM 客户端
//!
//! 两类供应商：
//! - [`GeminiModel`]：单次多模态 `generateContent` 接口
//! - [`OpenAiCompatibleModel`]：`/chat/completions` 接口
//!
//! 两者都实现 [`crate::core::ChatModel`]，错误统一翻译为 [`UpstreamError`]。

mod gemini;
mod openai;

pub use gemini::{GeminiModel, GenerationConfig};
pub use openai::OpenAiCompatibleModel;

use std::sync::OnceLock;

use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value;

use crate::errors::UpstreamError;

fn image_rejection() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)unable to process input image").expect("image rejection pattern is valid")
    })
}

/// 翻译非 2xx 响应
///
/// 只有 JSON 错误体里的 `error.message` 会透传给用户。
pub(crate) fn translate_error_body(status: StatusCode, body: &str) -> UpstreamError {
    let message = body
        .trim_start()
        .starts_with('{')
        .then(|| serde_json::from_str::<Value>(body).ok())
        .flatten()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        });

    match message {
        Some(m) if image_rejection().is_match(&m) => UpstreamError::ImageRejected,
        Some(m) => UpstreamError::Provider(m),
        None => UpstreamError::Unavailable(format!("HTTP {}", status)),
    }
}

/// 取出回复文本，空白文本视为空响应
pub(crate) fn non_empty_text(text: Option<&str>) -> Result<String, UpstreamError> {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(UpstreamError::EmptyResponse);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_provider_message() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted"}}"#;
        assert_eq!(
            translate_error_body(StatusCode::TOO_MANY_REQUESTS, body),
            UpstreamError::Provider("Resource has been exhausted".into())
        );
    }

    #[test]
    fn test_translate_image_rejection() {
        let body = r#"{"error":{"message":"Unable to process input image. Please retry."}}"#;
        assert_eq!(
            translate_error_body(StatusCode::BAD_REQUEST, body),
            UpstreamError::ImageRejected
        );
    }

    #[test]
    fn test_translate_non_json_body() {
        let err = translate_error_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, UpstreamError::Unavailable(_)));
        assert_eq!(err.localized(), "שגיאה בתקשורת עם מנוע ה-AI");
    }

    #[test]
    fn test_non_empty_text() {
        assert_eq!(non_empty_text(Some("  hi \n")).unwrap(), "hi");
        assert_eq!(non_empty_text(Some("   ")), Err(UpstreamError::EmptyResponse));
        assert_eq!(non_empty_text(None), Err(UpstreamError::EmptyResponse));
    }
}
