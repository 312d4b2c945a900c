use thiserror::Error;

use crate::models::DocumentType;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 前置条件不满足
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 存储相关错误
    #[error("存储错误: {0}")]
    Store(#[from] StoreError),
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 校验错误
///
/// 直接反馈给调用方，不做重试
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 原始文本为空
    #[error("original_text 不能为空")]
    EmptyText,
    /// 文档尚未生成 processed_text
    #[error("扫描文本没有 processed_text")]
    MissingProcessedText,
    /// 文档类型不是练习题
    #[error("扫描文本不是 'exercise' 类型 (当前: {detected})")]
    NotAnExercise { detected: DocumentType },
    /// 年龄必须为正整数
    #[error("年龄必须为正整数 (当前: {age})")]
    InvalidAge { age: u32 },
    /// 文档已经分类过
    #[error("文档已完成分类，不能重复分类")]
    AlreadyClassified,
}

/// 存储相关错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// 文档不存在
    #[error("文档不存在: {id}")]
    DocumentNotFound { id: uuid::Uuid },
    /// 学生不存在
    #[error("学生不存在: {id}")]
    LearnerNotFound { id: uuid::Uuid },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 未配置 API 密钥，处于兜底模式
    #[error("LLM 未启用")]
    ProviderDisabled,
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求构建失败
    #[error("LLM 请求构建失败: {source}")]
    RequestBuildFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 调用超时
    #[error("LLM 调用超时 (模型: {model}, {timeout_secs}秒)")]
    Timeout { model: String, timeout_secs: u64 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON序列化失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl LlmError {
    /// 创建LLM API调用错误
    pub fn api_call_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// 创建请求构建错误
    pub fn request_build_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        LlmError::RequestBuildFailed {
            source: Box::new(source),
        }
    }
}

impl AppError {
    /// 是否为调用方输入问题（而非系统故障）
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
