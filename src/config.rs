use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的扫描文本数量
    pub max_concurrent_scans: usize,
    /// 扫描文本（TOML）存放目录
    pub scan_folder: String,
    /// 结果 JSON 输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// processed_text 兜底截断长度（字符数）
    pub processed_text_max_chars: usize,
    // --- LLM 配置 ---
    /// 为空时整个进程进入兜底模式
    pub llm_api_key: Option<String>,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub llm_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_scans: 4,
            scan_folder: "scans".to_string(),
            output_folder: "output_json".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            processed_text_max_chars: 400,
            llm_api_key: None,
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "chatgpt-4o-latest".to_string(),
            llm_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            max_concurrent_scans: parse_var("MAX_CONCURRENT_SCANS")?
                .unwrap_or(default.max_concurrent_scans)
                .max(1),
            scan_folder: std::env::var("SCAN_FOLDER").unwrap_or(default.scan_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: parse_var("VERBOSE_LOGGING")?.unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            processed_text_max_chars: parse_var("PROCESSED_TEXT_MAX_CHARS")?
                .unwrap_or(default.processed_text_max_chars),
            llm_api_key: api_key_from_env(),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_timeout_secs: parse_var("LLM_TIMEOUT_SECS")?.unwrap_or(default.llm_timeout_secs),
        })
    }

    /// LLM 单次调用超时时间
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}

/// `OPENAI_API_KEY` 优先，其次 `LLM_API_KEY`；空白视为未配置
fn api_key_from_env() -> Option<String> {
    ["OPENAI_API_KEY", "LLM_API_KEY"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(var_name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(None),
    }
}
