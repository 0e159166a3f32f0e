use crate::config::Environment;
use crate::constants::{ENV_LOG_FORMAT, ENV_LOG_LEVEL, LOGGING_FILTER, LOGGING_FORMAT, LOGGING_LEVEL};
use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(CoreError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 紧凑格式（默认）
    Compact,
    /// 完整格式（带时间、级别、目标）
    Full,
    /// JSON 格式
    Json,
    /// 美化格式（适合开发）
    Pretty,
}

impl FromStr for LogFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(CoreError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// 日志配置，可以直接从 TOML 的 `[logging]` 段反序列化
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（默认：Info）
    pub level: LogLevel,

    /// 日志格式（默认：Compact）
    pub format: LogFormat,

    /// 是否显示目标（模块路径）（默认：false）
    pub show_target: bool,

    /// 是否显示线程 ID（默认：false）
    pub show_thread_ids: bool,

    /// 自定义过滤器（可选）
    /// 例如："ferrule_web=debug,hyper=warn"
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            show_target: false,
            show_thread_ids: false,
            filter: None,
        }
    }
}

impl LoggingConfig {
    /// 创建新的日志配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置日志级别
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// 设置日志格式
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 设置是否显示目标
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// 设置自定义过滤器
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// 从环境变量读取配置
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            config.filter = Some(rust_log);
        }

        if let Some(level) = std::env::var(ENV_LOG_LEVEL).ok().and_then(|s| s.parse().ok()) {
            config.level = level;
        }

        if let Some(format) = std::env::var(ENV_LOG_FORMAT).ok().and_then(|s| s.parse().ok()) {
            config.format = format;
        }

        config
    }

    /// 从 Environment 读取配置，无法识别的值会被忽略并保留默认值
    pub fn from_environment(env: &Environment) -> Self {
        let mut config = Self::default();

        if let Some(level) = env.get_string(LOGGING_LEVEL) {
            match level.parse() {
                Ok(level) => config.level = level,
                Err(e) => tracing::warn!(error = %e, "Ignoring logging level from configuration"),
            }
        }

        if let Some(format) = env.get_string(LOGGING_FORMAT) {
            match format.parse() {
                Ok(format) => config.format = format,
                Err(e) => tracing::warn!(error = %e, "Ignoring logging format from configuration"),
            }
        }

        config.filter = env.get_string(LOGGING_FILTER);
        config
    }

    fn env_filter(&self) -> EnvFilter {
        let fallback = || EnvFilter::new(self.level.to_string());
        match &self.filter {
            Some(filter) => EnvFilter::try_new(filter).unwrap_or_else(|_| fallback()),
            // 优先使用 RUST_LOG 环境变量，否则使用配置的级别
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback()),
        }
    }

    /// 初始化日志系统
    pub fn init(self) -> CoreResult<()> {
        let env_filter = self.env_filter();
        let init_failed = |e: Box<dyn std::error::Error + Send + Sync>| {
            CoreError::LoggingInitFailed(e.to_string())
        };

        match self.format {
            LogFormat::Compact => fmt()
                .with_env_filter(env_filter)
                .compact()
                .with_target(self.show_target)
                .with_thread_ids(self.show_thread_ids)
                .try_init()
                .map_err(init_failed),
            LogFormat::Full => fmt()
                .with_env_filter(env_filter)
                .with_target(self.show_target)
                .with_thread_ids(self.show_thread_ids)
                .try_init()
                .map_err(init_failed),
            LogFormat::Json => fmt()
                .with_env_filter(env_filter)
                .json()
                .with_target(self.show_target)
                .try_init()
                .map_err(init_failed),
            LogFormat::Pretty => fmt()
                .with_env_filter(env_filter)
                .pretty()
                .with_target(self.show_target)
                .try_init()
                .map_err(init_failed),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => write!(f, "compact"),
            LogFormat::Full => write!(f, "full"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, MapPropertySource};

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err(CoreError::InvalidLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .level(LogLevel::Debug)
            .format(LogFormat::Json)
            .show_target(true)
            .filter("ferrule_web=trace");

        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.show_target);
        assert_eq!(config.filter.as_deref(), Some("ferrule_web=trace"));
    }

    #[test]
    fn test_logging_config_deserialize() {
        let config: LoggingConfig = toml::from_str(
            r#"
            level = "warn"
            format = "json"
            show_target = true
            "#,
        )
        .unwrap();

        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.show_target);
        assert!(!config.show_thread_ids);
    }

    #[test]
    fn test_logging_config_from_environment() {
        let env = Environment::new().with_property_source(Box::new(
            MapPropertySource::new("test")
                .with_property(LOGGING_LEVEL, ConfigValue::String("debug".into()))
                .with_property(LOGGING_FORMAT, ConfigValue::String("nonsense".into())),
        ));

        let config = LoggingConfig::from_environment(&env);
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.filter.is_none());
    }
}
