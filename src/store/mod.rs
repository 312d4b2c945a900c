//! 存储边界
//!
//! 文档与学生档案的持久化由外部系统负责，这里只定义能力接口，
//! 并提供一个进程内实现用于离线运行和测试。

pub mod memory_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Classification, Document, LearnerContext, LearnerProfile};

pub use memory_store::InMemoryStore;

/// 文档存储
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 创建未分类的文档
    async fn create(&self, owner_id: Uuid, original_text: &str) -> AppResult<Document>;

    /// 按 ID 读取文档
    async fn get(&self, id: Uuid) -> AppResult<Document>;

    /// 写入分类结果（一次性）
    async fn apply_classification(
        &self,
        id: Uuid,
        classification: Classification,
    ) -> AppResult<Document>;
}

/// 学生档案来源
#[async_trait]
pub trait LearnerDirectory: Send + Sync {
    /// 注册学生，返回其 ID
    async fn register(&self, profile: LearnerProfile) -> AppResult<Uuid>;

    /// 按文档所有者解析学生上下文
    async fn learner_context(&self, owner_id: Uuid) -> AppResult<LearnerContext>;
}
