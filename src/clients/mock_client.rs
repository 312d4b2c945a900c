//! 脚本化的 provider，用于离线测试

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::llm_client::{Completion, CompletionProvider, CompletionRequest};
use crate::error::LlmError;

/// 按顺序回放预设响应；队列耗尽后重复最后一个响应
pub struct MockProvider {
    responses: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Content(Completion),
    Failure,
}

impl MockProvider {
    fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            responses: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// 每次响应前先等待，用于模拟卡住的 provider
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 每次都返回同一段文本
    pub fn replying(content: impl Into<String>) -> Self {
        Self::with_replies(vec![MockReply::Content(Completion::new(content))])
    }

    /// 返回带 token 用量的响应
    pub fn replying_with_usage(content: impl Into<String>, total_tokens: u32) -> Self {
        Self::with_replies(vec![MockReply::Content(
            Completion::new(content).with_tokens(total_tokens),
        )])
    }

    /// 按顺序返回多段文本
    pub fn replying_in_order<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_replies(
            contents
                .into_iter()
                .map(|c| MockReply::Content(Completion::new(c)))
                .collect(),
        )
    }

    /// 每次调用都失败
    pub fn failing() -> Self {
        Self::with_replies(vec![MockReply::Failure])
    }

    /// 已收到的请求数
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// 已收到的请求（按顺序）
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().ok().and_then(|mut q| q.pop_front());
        let reply = match next {
            Some(reply) => {
                if let Ok(mut last) = self.last.lock() {
                    *last = Some(reply.clone());
                }
                Some(reply)
            }
            None => self.last.lock().ok().and_then(|last| last.clone()),
        };

        match reply {
            Some(MockReply::Content(completion)) => Ok(completion),
            Some(MockReply::Failure) | None => Err(LlmError::api_call_failed(
                &request.model,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "mock provider failure"),
            )),
        }
    }
}
