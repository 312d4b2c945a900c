//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载扫描文本（Vec<ScanPage>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `scan_processor` - 单个扫描文本处理器
//! - 注册学生、提交文本
//! - 并发运行各项内容生成
//! - 写出 JSON 报告
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ScanPage>)
//!     ↓
//! scan_processor (处理单个 ScanPage)
//!     ↓
//! workflow::DocumentFlow (文档生命周期)
//!     ↓
//! services (能力层：classifier / glossary / explanation / steps / quiz)
//!     ↓
//! clients (基础设施：CompletionProvider)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod scan_processor;

pub use batch_processor::App;
pub use scan_processor::{process_scan, ScanReport};
