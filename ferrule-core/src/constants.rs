//! 核心配置常量定义

// ==================== Logging 配置 ====================

/// 日志级别配置键
pub const LOGGING_LEVEL: &str = "logging.level";

/// 日志格式配置键
pub const LOGGING_FORMAT: &str = "logging.format";

/// 自定义过滤器配置键，例如 "ferrule_web=debug"
pub const LOGGING_FILTER: &str = "logging.filter";

// ==================== 环境变量 ====================

/// 日志级别环境变量
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// 日志格式环境变量
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
