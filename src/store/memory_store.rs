use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{DocumentStore, LearnerDirectory};
use crate::error::{AppResult, StoreError};
use crate::models::{Classification, Document, LearnerContext, LearnerProfile};

/// 进程内存储
///
/// 同时实现文档存储和学生档案，读多写少，使用读写锁
#[derive(Default)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<Uuid, Document>>,
    learners: RwLock<HashMap<Uuid, LearnerProfile>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已保存的文档数量
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, owner_id: Uuid, original_text: &str) -> AppResult<Document> {
        let document = Document::new(owner_id, original_text);
        debug!("创建文档 {}", document.id);
        self.documents
            .write()
            .await
            .insert(document.id, document.clone());
        Ok(document)
    }

    async fn get(&self, id: Uuid) -> AppResult<Document> {
        self.documents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::DocumentNotFound { id }.into())
    }

    async fn apply_classification(
        &self,
        id: Uuid,
        classification: Classification,
    ) -> AppResult<Document> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(&id)
            .ok_or(StoreError::DocumentNotFound { id })?;
        document.apply_classification(classification)?;
        Ok(document.clone())
    }
}

#[async_trait]
impl LearnerDirectory for InMemoryStore {
    async fn register(&self, profile: LearnerProfile) -> AppResult<Uuid> {
        // 注册时就校验，避免之后每次生成才发现年龄非法
        profile.context()?;
        let id = Uuid::new_v4();
        self.learners.write().await.insert(id, profile);
        Ok(id)
    }

    async fn learner_context(&self, owner_id: Uuid) -> AppResult<LearnerContext> {
        let learners = self.learners.read().await;
        let profile = learners
            .get(&owner_id)
            .ok_or(StoreError::LearnerNotFound { id: owner_id })?;
        Ok(profile.context()?)
    }
}
