//! 日志工具模块
//!
//! 订阅器初始化，以及批处理过程中的格式化输出

use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::FileError;
use crate::utils::text::truncate_text;

const RULE_WIDTH: usize = 60;

/// 初始化 tracing 订阅器
///
/// 优先读取 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用是安全的（测试里会多次调用）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件，写入带时间的表头
pub fn init_log_file(log_file_path: &str) -> Result<(), FileError> {
    let log_header = format!(
        "{}\n扫描文本处理日志 - {}\n{}\n\n",
        "=".repeat(RULE_WIDTH),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(RULE_WIDTH)
    );
    std::fs::write(Path::new(log_file_path), log_header).map_err(|source| {
        FileError::WriteFailed {
            path: log_file_path.to_string(),
            source,
        }
    })
}

/// 记录程序启动信息
pub fn log_startup(max_concurrent: usize, llm_enabled: bool, model_name: &str) {
    info!("{}", "=".repeat(RULE_WIDTH));
    info!("🚀 程序启动 - 扫描文本辅导模式");
    info!("📊 最大并发数: {}", max_concurrent);
    if llm_enabled {
        info!("🤖 LLM 模型: {}", model_name);
    } else {
        info!("🧩 未配置 LLM，全部使用离线兜底");
    }
    info!("{}", "=".repeat(RULE_WIDTH));
}

/// 记录扫描文本加载信息
pub fn log_scans_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 个待处理的扫描文本", total);
    info!("📋 将以每批 {} 个的方式处理\n", max_concurrent);
}

/// 记录单个扫描文本开始处理
pub fn log_scan_start(scan_index: usize, name: &str, original_text: &str) {
    info!(
        "[扫描 {}] 📄 {} | {}",
        scan_index,
        name,
        truncate_text(original_text.trim(), 40)
    );
}

/// 记录批次开始信息
pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("\n{}", "=".repeat(RULE_WIDTH));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批扫描: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(RULE_WIDTH));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(RULE_WIDTH));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(RULE_WIDTH));
}

/// 打印最终统计信息
pub fn print_final_stats(success: usize, failed: usize, total: usize, log_file_path: &str) {
    info!("\n{}", "=".repeat(RULE_WIDTH));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(RULE_WIDTH));
    info!("✅ 成功: {}/{}", success, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(RULE_WIDTH));
    info!("\n日志已保存至: {}", log_file_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(false);
        init(true);
    }

    #[test]
    fn test_init_log_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let path_str = path.to_str().unwrap();

        init_log_file(path_str).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("扫描文本处理日志"));
        assert!(content.starts_with(&"=".repeat(RULE_WIDTH)));
    }

    #[test]
    fn test_init_log_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("output.txt");
        let path_str = path.to_str().unwrap().to_string();

        let err = init_log_file(&path_str).unwrap_err();
        assert!(matches!(err, FileError::WriteFailed { path, .. } if path == path_str));
    }
}
