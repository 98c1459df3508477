// ==========================================
// 学院日程同步系统 - 同步层错误类型
// ==========================================
// 分级:
// - Configuration: 批次开始前检查,致命
// - ExternalCall / Http / Decode: 单条调用失败,批次内捕获计数,不向外传播
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("外部日历调用失败 ({operation}): {message}")]
    ExternalCall { operation: String, message: String },

    #[error("HTTP 请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl SyncError {
    pub fn external(operation: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::ExternalCall {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// 是否需要在批次开始前中止
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyncError::Configuration(_))
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
