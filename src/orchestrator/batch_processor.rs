//! 批量扫描处理器 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：日志文件、LLM provider、存储、文档流程
//! 2. **批量加载**：扫描并加载所有待处理的 TOML 文件
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总所有扫描的处理结果
//!
//! 单个扫描失败只计数，不会中断整个批次

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ScanPage;
use crate::orchestrator::scan_processor;
use crate::store::InMemoryStore;
use crate::utils::logging;
use crate::workflow::DocumentFlow;

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<InMemoryStore>,
    flow: Arc<DocumentFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        logging::init_log_file(&config.output_log_file)?;

        let provider = clients::initialize(&config);
        logging::log_startup(
            config.max_concurrent_scans,
            provider.is_some(),
            &config.llm_model_name,
        );

        let store = Arc::new(InMemoryStore::new());
        let flow = Arc::new(DocumentFlow::from_config(
            &config,
            provider,
            store.clone(),
            store.clone(),
        ));

        Ok(Self {
            config,
            store,
            flow,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<ProcessingStats> {
        let all_scans = self.load_scans().await?;

        if all_scans.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_scans_loaded(all_scans.len(), self.batch_size());

        let stats = self.process_all_scans(all_scans).await?;

        logging::print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    async fn load_scans(&self) -> AppResult<Vec<ScanPage>> {
        info!("\n📁 正在扫描待处理的文本: {}", self.config.scan_folder);
        crate::models::load_all_toml_files(&self.config.scan_folder).await
    }

    /// 并发数至少为 1
    fn batch_size(&self) -> usize {
        self.config.max_concurrent_scans.max(1)
    }

    async fn process_all_scans(&self, all_scans: Vec<ScanPage>) -> AppResult<ProcessingStats> {
        let batch_size = self.batch_size();
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total = all_scans.len();
        let total_batches = total.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for (batch_idx, batch) in all_scans.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total,
            );

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        Ok(stats)
    }

    async fn process_batch(
        &self,
        batch: &[ScanPage],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> AppResult<BatchResult> {
        let mut handles = Vec::with_capacity(batch.len());

        for (idx, scan) in batch.iter().enumerate() {
            let scan_index = batch_start + idx + 1;
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(e.to_string()))?;

            let flow = self.flow.clone();
            let store = self.store.clone();
            let config = self.config.clone();
            let scan = scan.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                scan_processor::process_scan(&flow, store.as_ref(), scan, scan_index, &config)
                    .await
            });
            handles.push((scan_index, handle));
        }

        let mut result = BatchResult::default();
        for (scan_index, handle) in handles {
            match handle.await {
                Ok(Ok(_)) => result.success += 1,
                Ok(Err(e)) => {
                    error!("[扫描 {}] ❌ 处理失败: {}", scan_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[扫描 {}] 任务执行失败: {}", scan_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}
