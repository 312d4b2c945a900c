//! LLM API 客户端 - 基础设施层
//!
//! 只暴露"补全"这一个能力，并把第三方响应统一成 [`Completion`]
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（自定义 base url / 模型）

use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::LlmError;

/// 一次补全请求
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// 归一化后的补全响应
///
/// 下游只依赖文本内容和可选的 token 用量
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub total_tokens: Option<u32>,
}

impl Completion {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            total_tokens: None,
        }
    }

    pub fn with_tokens(mut self, total_tokens: u32) -> Self {
        self.total_tokens = Some(total_tokens);
        self
    }
}

/// 补全服务提供方
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

/// 进程级共享的 provider 句柄，None 表示兜底模式
pub type ProviderHandle = Option<Arc<dyn CompletionProvider>>;

/// 初始化 provider
///
/// 未配置 API 密钥时返回 None 并记录日志，调用方据此进入兜底模式
pub fn initialize(config: &Config) -> ProviderHandle {
    match config.llm_api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            info!(
                "LLM 已启用，模型: {}，地址: {}",
                config.llm_model_name, config.llm_api_base_url
            );
            Some(Arc::new(OpenAiClient::new(key, &config.llm_api_base_url)))
        }
        _ => {
            warn!("⚠️ 未配置 OPENAI_API_KEY，所有操作将使用启发式兜底");
            None
        }
    }
}

/// OpenAI 兼容客户端
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiClient {
    /// 创建新的客户端
    pub fn new(api_key: &str, api_base_url: &str) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base_url);

        Self {
            client: Client::with_config(openai_config),
        }
    }

    fn build_request(
        request: &CompletionRequest,
    ) -> Result<async_openai::types::chat::CreateChatCompletionRequest, LlmError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt.as_str())
            .build()
            .map_err(LlmError::request_build_failed)?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_prompt.as_str())
            .build()
            .map_err(LlmError::request_build_failed)?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(request.model.as_str())
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .max_completion_tokens(request.max_tokens);

        if let Some(temperature) = request.temperature {
            builder.temperature(temperature);
        }

        builder.build().map_err(LlmError::request_build_failed)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        debug!("调用 LLM API，模型: {}", request.model);
        debug!("用户消息长度: {} 字符", request.user_prompt.len());

        let chat_request = Self::build_request(request)?;

        // 超时由 LlmService 统一施加
        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                LlmError::api_call_failed(&request.model, e)
            })?;

        debug!("LLM API 调用成功");

        let choice = response
            .choices
            .first()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: request.model.clone(),
            })?;

        let content = choice
            .message
            .content
            .as_deref()
            .unwrap_or_default()
            .trim()
            .to_string();

        Ok(Completion {
            content,
            total_tokens: response.usage.as_ref().map(|usage| usage.total_tokens),
        })
    }
}
