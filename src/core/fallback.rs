//! 模型回退链
//!
//! 按顺序尝试各个模型，两次尝试之间固定等待一段时间。
//! 第一个成功的结果直接返回；全部失败时返回最后一个模型的错误。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use super::prompt::ChatPrompt;
use crate::errors::{PortalError, UpstreamError};

/// 可生成回复的模型端点
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 模型名称（用于日志）
    fn name(&self) -> &str;

    /// 生成一次回复，返回去除首尾空白的文本
    async fn generate(&self, prompt: &ChatPrompt) -> Result<String, UpstreamError>;
}

/// 成功结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    /// 实际给出回复的模型
    pub model: String,
    /// 第几次尝试成功（从 1 开始）
    pub attempt: usize,
}

/// 回退链
#[derive(Clone)]
pub struct FallbackChain {
    models: Vec<Arc<dyn ChatModel>>,
    delay: Duration,
}

impl FallbackChain {
    pub fn new(delay: Duration) -> Self {
        Self {
            models: Vec::new(),
            delay,
        }
    }

    /// 在链尾追加模型
    pub fn then(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.models.push(model);
        self
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// 模型名称，按尝试顺序
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name().to_string()).collect()
    }

    /// 执行回退链
    pub async fn run(&self, prompt: &ChatPrompt) -> Result<Completion, PortalError> {
        let mut last_error = None;

        for (index, model) in self.models.iter().enumerate() {
            if let Some(previous) = &last_error {
                warn!(
                    model = %model.name(),
                    delay_ms = self.delay.as_millis() as u64,
                    error = %previous,
                    "previous model failed, waiting before fallback"
                );
                tokio::time::sleep(self.delay).await;
            }

            let started = tokio::time::Instant::now();
            info!(model = %model.name(), attempt = index + 1, "requesting completion");

            match model.generate(prompt).await {
                Ok(text) => {
                    info!(
                        model = %model.name(),
                        attempt = index + 1,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "model succeeded"
                    );
                    return Ok(Completion {
                        text,
                        model: model.name().to_string(),
                        attempt: index + 1,
                    });
                }
                Err(e) => {
                    warn!(model = %model.name(), attempt = index + 1, error = %e, "model failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(PortalError::Upstream(e)),
            None => Err(PortalError::Configuration("no chat model configured".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str, Result<&'static str, UpstreamError>);

    #[async_trait]
    impl ChatModel for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        async fn generate(&self, _prompt: &ChatPrompt) -> Result<String, UpstreamError> {
            self.1.clone().map(str::to_string)
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_configuration_error() {
        let chain = FallbackChain::new(Duration::ZERO);
        let err = chain.run(&ChatPrompt::default()).await.unwrap_err();
        assert!(matches!(err, PortalError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = FallbackChain::new(Duration::ZERO)
            .then(Arc::new(Fixed("a", Ok("from a"))))
            .then(Arc::new(Fixed("b", Ok("from b"))));

        let completion = chain.run(&ChatPrompt::default()).await.unwrap();
        assert_eq!(completion.text, "from a");
        assert_eq!(completion.model, "a");
        assert_eq!(completion.attempt, 1);
        assert_eq!(chain.model_names(), vec!["a", "b"]);
    }
}
