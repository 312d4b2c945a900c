//! # Scan Tutor
//!
//! 把学生扫描的 OCR 文本变成学习辅助内容：清洗分类、难词释义、讲解、
//! 解题步骤和测验。LLM 不可用时每一步都有确定性的兜底。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 唯一接触第三方 API 的地方
//! - `CompletionProvider` - 补全能力接口，`OpenAiClient` / `MockProvider` 两个实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理一段 processed_text
//! - `TextClassifier` - 清洗 + 分类
//! - `GlossaryService` / `ExplanationService` / `StepsService` / `QuizService`
//! - `json_extractor` / `fallback` - 共用的解析与兜底
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份文档"的生命周期与前置条件
//! - `DocumentFlow` - submit → classify → enrich
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理 TOML 扫描文件，管理并发
//! - `orchestrator/scan_processor` - 单个扫描：生成全部内容并写出报告
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod store;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionProvider, MockProvider, ProviderHandle};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Document, DocumentType, Enrichment, EnrichmentKind, LearnerContext, ScanPage};
pub use orchestrator::{process_scan, App};
pub use store::{DocumentStore, InMemoryStore, LearnerDirectory};
pub use workflow::DocumentFlow;
