//! 全文讲解 - 业务能力层

use tracing::warn;

use crate::models::{ExplanationResult, LearnerContext};
use crate::services::fallback;
use crate::services::llm_service::{CallOptions, LlmService};

const EXPLANATION_OPTIONS: CallOptions = CallOptions::new(600, Some(0.3));

const SYSTEM_PROMPT: &str = "Tu es un excellent pédagogue. Explique le texte de manière claire, simple, et adaptée à l'âge et à la classe. \
Utilise un ton bienveillant, accessible, et évite le jargon. Réponds en français en 5 à 7 phrases maximum. \
N'utilise pas de liste, pas de code, pas de balises.";

/// 全文讲解服务
pub struct ExplanationService {
    llm_service: LlmService,
}

impl ExplanationService {
    pub fn new(llm_service: LlmService) -> Self {
        Self { llm_service }
    }

    /// 生成讲解，LLM 不可用或返回空内容时截取原文句子
    pub async fn generate(
        &self,
        processed_text: &str,
        learner: &LearnerContext,
    ) -> ExplanationResult {
        if !self.llm_service.is_enabled() {
            return Self::fallback(processed_text);
        }

        let user_message = format!(
            "Texte à expliquer :\n\n{}\n\nContexte élève → Âge: {} | Classe: {}.\nFournis une explication claire et adaptée.",
            processed_text,
            learner.age(),
            learner.grade()
        );

        match self
            .llm_service
            .send_to_llm(&user_message, SYSTEM_PROMPT, EXPLANATION_OPTIONS)
            .await
        {
            Ok(completion) => {
                let explanation = completion.content.trim();
                if explanation.is_empty() {
                    warn!("⚠️ LLM 返回的讲解为空，使用兜底");
                    return Self::fallback(processed_text);
                }
                ExplanationResult {
                    explanation: explanation.to_string(),
                    tokens_used: completion.total_tokens.unwrap_or(0),
                }
            }
            Err(e) => {
                warn!("⚠️ 讲解调用失败，使用兜底: {}", e);
                Self::fallback(processed_text)
            }
        }
    }

    fn fallback(processed_text: &str) -> ExplanationResult {
        ExplanationResult {
            explanation: fallback::explanation(processed_text),
            tokens_used: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockProvider;
    use std::sync::Arc;

    const TEXT: &str = "Les volcans crachent de la lave. La lave vient du magma. Le magma est très chaud.";

    fn learner() -> LearnerContext {
        LearnerContext::new(12, "5ème").unwrap()
    }

    fn service_with(provider: MockProvider) -> ExplanationService {
        ExplanationService::new(LlmService::with_provider(Arc::new(provider), "test-model"))
    }

    #[tokio::test]
    async fn test_provider_explanation_with_usage() {
        let service = service_with(MockProvider::replying_with_usage(
            "  Un volcan est une montagne qui laisse sortir de la roche fondue.  ",
            137,
        ));

        let result = service.generate(TEXT, &learner()).await;
        assert_eq!(
            result.explanation,
            "Un volcan est une montagne qui laisse sortir de la roche fondue."
        );
        assert_eq!(result.tokens_used, 137);
    }

    #[tokio::test]
    async fn test_missing_usage_defaults_to_zero() {
        let service = service_with(MockProvider::replying("Explication."));
        let result = service.generate(TEXT, &learner()).await;
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_blank_content_uses_fallback() {
        let service = service_with(MockProvider::replying_with_usage("   ", 12));

        let result = service.generate(TEXT, &learner()).await;
        assert_eq!(
            result.explanation,
            "Les volcans crachent de la lave. La lave vient du magma. Le magma est très chaud"
        );
        assert_eq!(result.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_failure_and_disabled_use_fallback() {
        let failing = service_with(MockProvider::failing());
        let disabled = ExplanationService::new(LlmService::disabled());

        let a = failing.generate(TEXT, &learner()).await;
        let b = disabled.generate(TEXT, &learner()).await;
        assert_eq!(a, b);
        assert_eq!(a.tokens_used, 0);
    }

    #[tokio::test]
    async fn test_prompt_carries_learner_context() {
        let provider = Arc::new(MockProvider::replying("ok"));
        let service =
            ExplanationService::new(LlmService::with_provider(provider.clone(), "test-model"));

        service.generate(TEXT, &learner()).await;

        let request = &provider.requests()[0];
        assert!(request.user_prompt.contains("Âge: 12 | Classe: 5ème"));
        assert_eq!(request.max_tokens, 600);
        assert_eq!(request.temperature, Some(0.3));
    }
}
