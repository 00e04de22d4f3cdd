//! AI 助教服务
//!
//! 两个入口：
//! - 通用聊天：调用方提供 system prompt，主模型失败后回退到备用模型
//! - 会计助教（旧接口）：固定 system prompt，额外解析六条追问建议

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::core::{split_suggestions, ChatPrompt, FallbackChain};
use crate::domain::{ChatReply, ChatRequest, ImageAttachment};
use crate::errors::{PortalError, Result, UpstreamError};
use crate::infrastructure::llm::{GeminiModel, OpenAiCompatibleModel};

/// 会计助教的固定 system prompt
pub const ACCOUNTING_TUTOR_PROMPT: &str = "\
אתה מורה פרטי מומחה לחשבונאות, המלווה סטודנטים לתואר ראשון בחשבונאות בישראל.
ענה תמיד בעברית, בצורה ברורה, מדורגת וידידותית.
אתה עוזר בהסבר מושגים בחשבונאות, בפתרון תרגילים צעד אחר צעד, בהכנה לבחינות, ובתקני IFRS וחוקי מס ישראליים.
כאשר השאלה כוללת חישוב, הצג את כל שלבי החישוב ואת הנוסחאות שבהן השתמשת.
אם צורפה תמונה של תרגיל, קרא אותה בעיון והתייחס לנתונים שבה.

בסוף כל תשובה הוסף שורה נפרדת שבה מופיע בדיוק הסימון [SUGGESTED_QUESTIONS],
ומתחתיה בדיוק שש שאלות המשך קצרות שהסטודנט עשוי לשאול, כל שאלה בשורה נפרדת וממוספרת מ-1 עד 6.";

/// AI 助教服务
#[derive(Clone)]
pub struct TutorService {
    generic: FallbackChain,
    tutor: FallbackChain,
}

impl TutorService {
    pub fn new(generic: FallbackChain, tutor: FallbackChain) -> Self {
        Self { generic, tutor }
    }

    /// 按配置组装两条回退链
    ///
    /// 通用聊天：主模型 → 备用模型；会计助教额外追加 OpenAI 兼容模型（需配置密钥）。
    pub fn from_config(config: &AppConfig, http: reqwest::Client) -> Self {
        let delay = Duration::from_millis(config.fallback_delay_ms);
        let mut generic = FallbackChain::new(delay);
        let mut tutor = FallbackChain::new(delay);

        if let Some(key) = config.gemini_api_key.as_deref().filter(|k| !k.is_empty()) {
            for model in [&config.primary_model, &config.fallback_model] {
                let model = Arc::new(GeminiModel::new(
                    http.clone(),
                    &config.gemini_base_url,
                    key,
                    model.as_str(),
                ));
                generic = generic.then(model.clone());
                tutor = tutor.then(model);
            }
        }

        if let Some(key) = config.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
            tutor = tutor.then(Arc::new(OpenAiCompatibleModel::new(
                http,
                &config.openai_base_url,
                key,
                config.openai_model.as_str(),
            )));
        }

        info!(
            generic = ?generic.model_names(),
            tutor = ?tutor.model_names(),
            delay_ms = config.fallback_delay_ms,
            "tutor fallback chains ready"
        );
        Self::new(generic, tutor)
    }

    /// 通用聊天
    pub async fn generic_chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let request = request.normalized();
        require_input(&request)?;
        let system_prompt = request
            .system_prompt
            .clone()
            .ok_or(PortalError::MissingSystemPrompt)?;
        require_models(&self.generic)?;

        let prompt = build_prompt(request, system_prompt)?;
        let completion = self.generic.run(&prompt).await?;

        Ok(ChatReply {
            response: completion.text,
            suggested_questions: None,
        })
    }

    /// 会计助教聊天，忽略调用方的 system prompt
    pub async fn tutor_chat(&self, request: ChatRequest) -> Result<ChatReply> {
        let request = request.normalized();
        require_input(&request)?;
        require_models(&self.tutor)?;

        let prompt = build_prompt(request, ACCOUNTING_TUTOR_PROMPT.to_string())?;
        let completion = self.tutor.run(&prompt).await?;

        let split = split_suggestions(&completion.text);
        if split.answer.is_empty() {
            return Err(UpstreamError::EmptyResponse.into());
        }
        debug!(
            model = %completion.model,
            suggestions = split.suggestions.as_ref().map_or(0, Vec::len),
            "parsed tutor reply"
        );

        Ok(ChatReply {
            response: split.answer,
            suggested_questions: split.suggestions,
        })
    }
}

fn require_input(request: &ChatRequest) -> Result<()> {
    if request.message.is_none() && request.image.is_none() {
        return Err(PortalError::MissingInput);
    }
    Ok(())
}

fn require_models(chain: &FallbackChain) -> Result<()> {
    if chain.is_empty() {
        return Err(PortalError::Configuration("no chat model API key configured".to_string()));
    }
    Ok(())
}

/// 校验图片并组装提示词
fn build_prompt(request: ChatRequest, system_prompt: String) -> Result<ChatPrompt> {
    let image = request
        .image
        .as_deref()
        .map(ImageAttachment::from_data_url)
        .transpose()?;

    Ok(ChatPrompt::new(system_prompt, request.message.unwrap_or_default())
        .with_history(request.history.unwrap_or_default())
        .with_image(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SUGGESTIONS_MARKER;

    #[test]
    fn test_tutor_prompt_mentions_marker() {
        assert!(ACCOUNTING_TUTOR_PROMPT.contains(SUGGESTIONS_MARKER));
    }

    #[tokio::test]
    async fn test_missing_input_checked_before_configuration() {
        let service = TutorService::new(
            FallbackChain::new(Duration::ZERO),
            FallbackChain::new(Duration::ZERO),
        );
        let err = service.generic_chat(ChatRequest::default()).await.unwrap_err();
        assert!(matches!(err, PortalError::MissingInput));
    }

    #[tokio::test]
    async fn test_no_models_is_configuration_error() {
        let service = TutorService::new(
            FallbackChain::new(Duration::ZERO),
            FallbackChain::new(Duration::ZERO),
        );
        let request = ChatRequest {
            message: Some("hi".into()),
            ..Default::default()
        };
        let err = service.tutor_chat(request).await.unwrap_err();
        assert!(matches!(err, PortalError::Configuration(_)));
    }
}
