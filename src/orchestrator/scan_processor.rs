//! 单个扫描文本处理器 - 编排层
//!
//! 1. 注册学生
//! 2. 提交文本（创建 + 分类）
//! 3. 并发生成难词 / 讲解 / 测验，练习题额外生成步骤
//! 4. 写出 JSON 报告

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppResult, FileError};
use crate::models::{
    DocumentType, ExplanationResult, GlossaryResult, LearnerProfile, QuizResult, ScanPage,
    StepsResult,
};
use crate::store::LearnerDirectory;
use crate::utils::logging;
use crate::workflow::DocumentFlow;

/// 单个扫描文本的输出报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub name: String,
    pub document_id: Uuid,
    pub learner: LearnerProfile,
    pub detected_type: DocumentType,
    pub processed_text: String,
    pub glossary: GlossaryResult,
    pub explanation: ExplanationResult,
    /// 仅练习题才有
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<StepsResult>,
    pub quiz: QuizResult,
    pub generated_at: DateTime<Utc>,
}

/// 处理单个扫描文本
///
/// # 参数
/// - `flow`: 文档处理流程
/// - `learners`: 学生档案（用于注册本次扫描的学生）
/// - `scan`: 扫描数据
/// - `scan_index`: 扫描索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 成功时返回写出的报告路径
pub async fn process_scan(
    flow: &DocumentFlow,
    learners: &dyn LearnerDirectory,
    scan: ScanPage,
    scan_index: usize,
    config: &Config,
) -> AppResult<PathBuf> {
    logging::log_scan_start(scan_index, &scan.name, &scan.original_text);

    let owner_id = learners.register(scan.learner.clone()).await?;
    let document = flow.submit(owner_id, &scan.original_text).await?;
    let detected_type = document.detected_type();
    info!("[扫描 {}] ✓ 分类完成: {}", scan_index, detected_type);

    let steps = async {
        if detected_type == DocumentType::Exercise {
            flow.steps(document.id).await.map(Some)
        } else {
            Ok(None)
        }
    };
    let (glossary, explanation, steps, quiz) = futures::join!(
        flow.glossary(document.id),
        flow.explanation(document.id),
        steps,
        flow.quiz(document.id)
    );

    let quiz = quiz?;
    if quiz.is_empty() {
        warn!("[扫描 {}] ⚠️ 测验为空（LLM 不可用或结果无效）", scan_index);
    }

    let report = ScanReport {
        name: scan.name.clone(),
        document_id: document.id,
        learner: scan.learner.clone(),
        detected_type,
        processed_text: document.processed_text().unwrap_or_default().to_string(),
        glossary: glossary?,
        explanation: explanation?,
        steps: steps?,
        quiz,
        generated_at: Utc::now(),
    };

    let output_path = Path::new(&config.output_folder).join(scan.output_file_name());
    write_report(&output_path, &report).await?;
    info!("[扫描 {}] 💾 报告已写入: {}", scan_index, output_path.display());

    Ok(output_path)
}

/// 写出 JSON 报告，必要时创建输出目录
async fn write_report(path: &Path, report: &ScanReport) -> AppResult<()> {
    let write_failed = |source| FileError::WriteFailed {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(write_failed)?;
    }

    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json).await.map_err(write_failed)?;
    Ok(())
}
