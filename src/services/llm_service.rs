//! LLM 服务 - 业务能力层
//!
//! 持有注入的 provider 句柄和模型名，是所有生成能力共用的调用入口。
//! 句柄为空时不是错误，而是"兜底模式"。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clients::{Completion, CompletionProvider, CompletionRequest, ProviderHandle};
use crate::error::LlmError;

/// 单次调用参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallOptions {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl CallOptions {
    pub const fn new(max_tokens: u32, temperature: Option<f32>) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

/// 默认单次调用超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// LLM 服务
///
/// 职责：
/// - 组装 [`CompletionRequest`]
/// - 区分"未启用"和"调用失败"
/// - 对任何 provider 施加超时，超时按调用失败处理
/// - 不解析响应，不做兜底
#[derive(Clone)]
pub struct LlmService {
    provider: ProviderHandle,
    model_name: String,
    timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(provider: ProviderHandle, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// 设置单次调用超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 使用指定 provider 创建
    pub fn with_provider(provider: Arc<dyn CompletionProvider>, model_name: impl Into<String>) -> Self {
        Self::new(Some(provider), model_name)
    }

    /// 兜底模式（不调用任何 provider）
    pub fn disabled() -> Self {
        Self::new(None, String::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息
    /// - `options`: token 上限与温度
    ///
    /// # 返回
    /// 未启用时返回 [`LlmError::ProviderDisabled`]
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: &str,
        options: CallOptions,
    ) -> Result<Completion, LlmError> {
        let provider = self.provider.as_ref().ok_or(LlmError::ProviderDisabled)?;

        debug!(
            "调用 LLM，模型: {}，max_tokens: {}",
            self.model_name, options.max_tokens
        );

        let request = CompletionRequest {
            system_prompt: system_message.to_string(),
            user_prompt: user_message.to_string(),
            model: self.model_name.clone(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        tokio::time::timeout(self.timeout, provider.complete(&request))
            .await
            .map_err(|_| {
                warn!("LLM 调用超时 ({:?})", self.timeout);
                LlmError::Timeout {
                    model: self.model_name.clone(),
                    timeout_secs: self.timeout.as_secs(),
                }
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockProvider;

    #[tokio::test]
    async fn test_disabled_service_reports_mode() {
        let service = LlmService::disabled();
        assert!(!service.is_enabled());

        let result = service
            .send_to_llm("bonjour", "système", CallOptions::new(10, None))
            .await;
        assert!(matches!(result, Err(LlmError::ProviderDisabled)));
    }

    #[tokio::test]
    async fn test_request_is_forwarded() {
        let provider = Arc::new(MockProvider::replying("ok"));
        let service = LlmService::with_provider(provider.clone(), "test-model");

        let completion = service
            .send_to_llm("question", "consigne", CallOptions::new(42, Some(0.2)))
            .await
            .unwrap();
        assert_eq!(completion.content, "ok");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "test-model");
        assert_eq!(requests[0].system_prompt, "consigne");
        assert_eq!(requests[0].user_prompt, "question");
        assert_eq!(requests[0].max_tokens, 42);
        assert_eq!(requests[0].temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let provider =
            Arc::new(MockProvider::replying("trop tard").with_delay(Duration::from_secs(5)));
        let service = LlmService::with_provider(provider.clone(), "test-model")
            .with_timeout(Duration::from_millis(50));

        let result = service
            .send_to_llm("question", "consigne", CallOptions::new(10, None))
            .await;
        assert!(matches!(
            result,
            Err(LlmError::Timeout { ref model, .. }) if model == "test-model"
        ));
        assert_eq!(provider.call_count(), 1);
    }
}
