//! 错误类型
//!
//! 应用边缘（配置文件加载等）使用 `anyhow::Result`，通过 `.context()` 添加上下文；
//! 可以被调用方匹配的错误使用 `thiserror` 定义的 [`CoreError`]。

use thiserror::Error;

pub use anyhow::Result;

/// 核心层错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// 日志系统初始化失败（通常是重复初始化）
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),

    /// 无法识别的日志级别
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),

    /// 无法识别的日志格式
    #[error("Invalid log format: {0}")]
    InvalidLogFormat(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
