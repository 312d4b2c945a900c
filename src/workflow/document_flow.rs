//! 文档处理流程 - 流程层
//!
//! 核心职责：定义"一份扫描文本"的完整生命周期
//!
//! 状态：
//! 1. created：保存原始 OCR 文本
//! 2. classified：清洗 + 分类，只发生一次
//! 3. 生成：难词 / 讲解 / 步骤 / 测验，可重复调用，不修改文档

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::clients::ProviderHandle;
use crate::config::Config;
use crate::error::{AppResult, ValidationError};
use crate::models::{
    Document, DocumentType, Enrichment, EnrichmentKind, ExplanationResult, GlossaryResult,
    LearnerContext, QuizResult, StepsResult,
};
use crate::services::{
    ExplanationService, GlossaryService, LlmService, QuizService, StepsService, TextClassifier,
};
use crate::store::{DocumentStore, LearnerDirectory};

/// 文档处理流程
///
/// - 校验前置条件，把违反的情况作为 [`ValidationError`] 返回
/// - 只依赖存储接口和业务能力（services）
/// - 生成结果不落库，由调用方决定如何展示或保存
pub struct DocumentFlow {
    documents: Arc<dyn DocumentStore>,
    learners: Arc<dyn LearnerDirectory>,
    classifier: TextClassifier,
    glossary_service: GlossaryService,
    explanation_service: ExplanationService,
    steps_service: StepsService,
    quiz_service: QuizService,
}

/// 生成前已校验过的输入
struct Prepared {
    document: Document,
    processed_text: String,
    learner: LearnerContext,
}

impl DocumentFlow {
    /// 创建新的文档处理流程，所有能力共享同一个 LLM 服务
    pub fn new(
        llm_service: LlmService,
        processed_text_max_chars: usize,
        documents: Arc<dyn DocumentStore>,
        learners: Arc<dyn LearnerDirectory>,
    ) -> Self {
        Self {
            documents,
            learners,
            classifier: TextClassifier::new(llm_service.clone(), processed_text_max_chars),
            glossary_service: GlossaryService::new(llm_service.clone()),
            explanation_service: ExplanationService::new(llm_service.clone()),
            steps_service: StepsService::new(llm_service.clone()),
            quiz_service: QuizService::new(llm_service),
        }
    }

    pub fn from_config(
        config: &Config,
        provider: ProviderHandle,
        documents: Arc<dyn DocumentStore>,
        learners: Arc<dyn LearnerDirectory>,
    ) -> Self {
        Self::new(
            LlmService::new(provider, config.llm_model_name.clone())
                .with_timeout(config.llm_timeout()),
            config.processed_text_max_chars,
            documents,
            learners,
        )
    }

    /// 提交原始文本：创建文档 → 分类 → 写回分类结果
    ///
    /// 去掉空白后为空的文本直接拒绝，不会创建文档
    pub async fn submit(&self, owner_id: Uuid, original_text: &str) -> AppResult<Document> {
        if original_text.trim().is_empty() {
            return Err(ValidationError::EmptyText.into());
        }

        let document = self.documents.create(owner_id, original_text).await?;
        let classification = self.classifier.classify(original_text).await;
        info!(
            "文档 {} 分类完成: {}",
            document.id, classification.detected_type
        );

        self.documents
            .apply_classification(document.id, classification)
            .await
    }

    pub async fn glossary(&self, id: Uuid) -> AppResult<GlossaryResult> {
        let prepared = self.prepare(id).await?;
        Ok(self
            .glossary_service
            .generate(&prepared.processed_text, &prepared.learner)
            .await)
    }

    pub async fn explanation(&self, id: Uuid) -> AppResult<ExplanationResult> {
        let prepared = self.prepare(id).await?;
        Ok(self
            .explanation_service
            .generate(&prepared.processed_text, &prepared.learner)
            .await)
    }

    /// 解题步骤，仅限练习题
    pub async fn steps(&self, id: Uuid) -> AppResult<StepsResult> {
        let prepared = self.prepare(id).await?;
        let detected = prepared.document.detected_type();
        if detected != DocumentType::Exercise {
            return Err(ValidationError::NotAnExercise { detected }.into());
        }
        Ok(self
            .steps_service
            .generate(&prepared.processed_text, &prepared.learner)
            .await)
    }

    pub async fn quiz(&self, id: Uuid) -> AppResult<QuizResult> {
        let prepared = self.prepare(id).await?;
        Ok(self
            .quiz_service
            .generate(&prepared.processed_text, &prepared.learner)
            .await)
    }

    /// 按类型分派
    pub async fn enrich(&self, id: Uuid, kind: EnrichmentKind) -> AppResult<Enrichment> {
        debug!("文档 {} 生成 {}", id, kind);
        Ok(match kind {
            EnrichmentKind::Glossary => Enrichment::Glossary(self.glossary(id).await?),
            EnrichmentKind::Explanation => Enrichment::Explanation(self.explanation(id).await?),
            EnrichmentKind::Steps => Enrichment::Steps(self.steps(id).await?),
            EnrichmentKind::Quiz => Enrichment::Quiz(self.quiz(id).await?),
        })
    }

    /// 读取文档、检查 processed_text、解析学生上下文
    async fn prepare(&self, id: Uuid) -> AppResult<Prepared> {
        let document = self.documents.get(id).await?;
        let processed_text = document
            .processed_text()
            .ok_or(ValidationError::MissingProcessedText)?
            .to_string();
        let learner = self.learners.learner_context(document.owner_id).await?;

        Ok(Prepared {
            document,
            processed_text,
            learner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockProvider;
    use crate::error::{AppError, StoreError};
    use crate::models::LearnerProfile;
    use crate::store::InMemoryStore;

    fn profile() -> LearnerProfile {
        LearnerProfile {
            name: None,
            age: 10,
            grade: "CM2".to_string(),
        }
    }

    async fn offline_flow() -> (DocumentFlow, Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::new());
        let owner = store.register(profile()).await.unwrap();
        let flow = DocumentFlow::new(LlmService::disabled(), 400, store.clone(), store.clone());
        (flow, store, owner)
    }

    #[tokio::test]
    async fn test_submit_rejects_blank_text() {
        let (flow, store, owner) = offline_flow().await;

        let result = flow.submit(owner, "   \n\t").await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::EmptyText))
        ));
        assert_eq!(store.document_count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_classifies_once() {
        let (flow, store, owner) = offline_flow().await;

        let document = flow.submit(owner, "Exercice 1 : calcule 3 x 4").await.unwrap();
        assert!(document.is_classified());
        assert_eq!(document.detected_type(), DocumentType::Exercise);

        let stored = store.get(document.id).await.unwrap();
        assert_eq!(stored.processed_text(), Some("Exercice 1 : calcule 3 x 4"));
    }

    #[tokio::test]
    async fn test_steps_rejected_for_text() {
        let (flow, _store, owner) = offline_flow().await;
        let document = flow
            .submit(owner, "Ceci est un résumé du chapitre 1")
            .await
            .unwrap();

        let result = flow.steps(document.id).await;
        assert!(matches!(
            result,
            Err(AppError::Validation(ValidationError::NotAnExercise {
                detected: DocumentType::Text
            }))
        ));
    }

    #[tokio::test]
    async fn test_enrichment_requires_processed_text() {
        let (flow, store, owner) = offline_flow().await;
        // 绕过 submit，文档停留在 created 状态
        let document = store.create(owner, "Exercice 1").await.unwrap();

        for kind in EnrichmentKind::ALL {
            let result = flow.enrich(document.id, kind).await;
            assert!(
                matches!(
                    result,
                    Err(AppError::Validation(ValidationError::MissingProcessedText))
                ),
                "{} should require processed text",
                kind
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let (flow, _store, _owner) = offline_flow().await;
        let result = flow.glossary(Uuid::new_v4()).await;
        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::DocumentNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_unknown_learner() {
        let (flow, _store, _owner) = offline_flow().await;
        let document = flow.submit(Uuid::new_v4(), "Exercice 2").await.unwrap();

        let result = flow.explanation(document.id).await;
        assert!(matches!(
            result,
            Err(AppError::Store(StoreError::LearnerNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_enrich_dispatches_by_kind() {
        let store = Arc::new(InMemoryStore::new());
        let owner = store.register(profile()).await.unwrap();
        let provider = Arc::new(MockProvider::replying_in_order(vec![
            r#"{"processed_text": "Exercice 3 : Combien font 7 + 8 ?", "detected_type": "exercice"}"#,
            r#"{"0": "Lire l'énoncé", "1": "Additionner les deux nombres"}"#,
        ]));
        let flow = DocumentFlow::new(
            LlmService::with_provider(provider.clone(), "test-model"),
            400,
            store.clone(),
            store,
        );

        let document = flow.submit(owner, "Exercice 3 Combien font 7+8").await.unwrap();
        let enrichment = flow.enrich(document.id, EnrichmentKind::Steps).await.unwrap();

        assert_eq!(enrichment.kind(), EnrichmentKind::Steps);
        match enrichment {
            Enrichment::Steps(steps) => assert_eq!(steps[&1], "Additionner les deux nombres"),
            other => panic!("unexpected enrichment: {:?}", other),
        }
        assert_eq!(provider.call_count(), 2);
        assert!(provider.requests()[1]
            .user_prompt
            .contains("Exercice 3 : Combien font 7 + 8 ?"));
    }

    #[tokio::test]
    async fn test_enrichment_does_not_mutate_document() {
        let (flow, store, owner) = offline_flow().await;
        let document = flow.submit(owner, "Exercice 5 : trouve x").await.unwrap();

        flow.glossary(document.id).await.unwrap();
        flow.quiz(document.id).await.unwrap();

        let stored = store.get(document.id).await.unwrap();
        assert_eq!(stored.updated_at, document.updated_at);
        assert_eq!(stored.classification(), document.classification());
    }
}
