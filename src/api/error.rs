// ==========================================
// 学院日程同步系统 - API层错误类型
// ==========================================
// 职责: 将导入/同步/配置层错误转换为面向用户的单条消息
// 红线: 致命错误整体中止;单条失败只出现在批次计数中,不会到达这里
// ==========================================

use crate::calendar::SyncError;
use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("文件不存在: {0}")]
    NotFound(String),

    /// 文件格式/结构错误,不产生任何事件
    #[error("文件解析失败: {0}")]
    ParseError(String),

    // ==========================================
    // 配置错误（批次开始前检查）
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigurationError(String),

    // ==========================================
    // 外部日历错误
    // ==========================================
    #[error("外部日历调用失败: {0}")]
    ExternalCallError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::FileNotFound(path) => ApiError::NotFound(path),
            ImportError::UnsupportedFormat(ext) => {
                ApiError::InvalidInput(format!("不支持的文件格式: {}", ext))
            }
            ImportError::ExportError(msg) => {
                ApiError::InternalError(format!("CSV 导出失败: {}", msg))
            }
            other => ApiError::ParseError(other.to_string()),
        }
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Configuration(msg) => ApiError::ConfigurationError(msg),
            other => ApiError::ExternalCallError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigurationError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
