//! 配置管理
//!
//! `Environment` 聚合多个按优先级排序的配置源，按 `a.b.c` 形式的扁平键查找配置值。

use anyhow::Context;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 配置值类型
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Array(Vec<ConfigValue>),
    Object(HashMap<String, ConfigValue>),
}

impl ConfigValue {
    /// 转换为字符串
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// 转换为整数
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 转换为无符号整数，负数视为无效
    pub fn as_u64(&self) -> Option<u64> {
        self.as_i64().and_then(|v| u64::try_from(v).ok())
    }

    /// 转换为布尔值
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// 配置源 trait
pub trait PropertySource: Send + Sync {
    /// 获取配置源名称
    fn name(&self) -> &str;

    /// 获取配置值
    fn get(&self, key: &str) -> Option<ConfigValue>;

    /// 获取所有配置键
    fn keys(&self) -> Vec<String>;

    /// 配置源优先级（数字越大优先级越高）
    fn priority(&self) -> i32 {
        0
    }
}

/// Environment - 配置管理器
///
/// 提供统一的配置访问接口。同一个键在多个配置源中存在时，优先级高的配置源生效。
pub struct Environment {
    /// 配置源列表（按优先级降序排列）
    sources: RwLock<Vec<Box<dyn PropertySource>>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sources = self.sources.read();
        f.debug_struct("Environment")
            .field(
                "sources",
                &sources.iter().map(|s| s.name().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Environment {
    /// 创建新的环境
    pub fn new() -> Self {
        Self {
            sources: RwLock::new(Vec::new()),
        }
    }

    /// 添加配置源
    pub fn add_property_source(&self, source: Box<dyn PropertySource>) {
        let mut sources = self.sources.write();
        tracing::debug!(
            source = source.name(),
            priority = source.priority(),
            "Adding property source"
        );
        sources.push(source);
        // 按优先级降序排序，稳定排序保证同优先级时先添加的先生效
        sources.sort_by(|a, b| b.priority().cmp(&a.priority()));
    }

    /// 链式添加配置源
    pub fn with_property_source(self, source: Box<dyn PropertySource>) -> Self {
        self.add_property_source(source);
        self
    }

    /// 获取配置值
    pub fn get(&self, key: &str) -> Option<ConfigValue> {
        let sources = self.sources.read();
        for source in sources.iter() {
            if let Some(value) = source.get(key) {
                tracing::trace!(key, source = source.name(), "Config value resolved");
                return Some(value);
            }
        }
        None
    }

    /// 获取字符串配置
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|v| v.as_str().map(String::from))
    }

    /// 获取整数配置
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.as_i64())
    }

    /// 获取整数配置（带默认值）
    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        self.get_i64(key).unwrap_or(default)
    }

    /// 获取无符号整数配置
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.as_u64())
    }

    /// 获取无符号整数配置（带默认值）
    pub fn get_u64_or(&self, key: &str, default: u64) -> u64 {
        self.get_u64(key).unwrap_or(default)
    }

    /// 获取布尔值配置
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }

    /// 获取布尔值配置（带默认值）
    pub fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }

    /// 获取字符串数组配置
    ///
    /// 支持两种格式:
    /// 1. TOML数组: key = ["a", "b", "c"]
    /// 2. 逗号分隔字符串: key = "a, b, c"
    pub fn get_string_array(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            ConfigValue::Array(arr) => Some(
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            ConfigValue::String(s) => Some(
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

// ========== Property Sources ==========

/// 环境变量配置源
pub struct EnvironmentPropertySource {
    prefix: String,
    priority: i32,
}

impl EnvironmentPropertySource {
    /// 创建环境变量配置源
    ///
    /// # 参数
    /// * `prefix` - 环境变量前缀，例如 "FERRULE_"
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            priority: 100, // 环境变量优先级较高
        }
    }

    /// 将环境变量名转换为配置键
    /// 例如: FERRULE_WEB_FORM_BUFFER__BODY -> web.form.buffer-body
    fn env_to_key(&self, env_key: &str) -> String {
        let stripped = env_key.strip_prefix(&self.prefix).unwrap_or(env_key);
        stripped
            .to_lowercase()
            .replace("__", "-")
            .replace('_', ".")
    }

    /// 将配置键转换为环境变量名
    /// 例如: web.form.buffer-body -> FERRULE_WEB_FORM_BUFFER__BODY
    fn key_to_env(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.prefix,
            key.replace('-', "__").replace('.', "_").to_uppercase()
        )
    }
}

impl PropertySource for EnvironmentPropertySource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        std::env::var(self.key_to_env(key))
            .ok()
            .map(ConfigValue::String)
    }

    fn keys(&self) -> Vec<String> {
        std::env::vars()
            .filter(|(k, _)| k.starts_with(&self.prefix))
            .map(|(k, _)| self.env_to_key(&k))
            .collect()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// TOML 文件配置源
pub struct TomlPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl TomlPropertySource {
    /// 从文件加载 TOML 配置
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Self::parse(&content, path.to_string_lossy().to_string())
    }

    /// 从字符串解析 TOML 配置
    pub fn parse(content: &str, name: impl Into<String>) -> crate::Result<Self> {
        let name = name.into();
        let value: toml::Value = toml::from_str(content)
            .with_context(|| format!("Failed to parse TOML config '{}'", name))?;

        let mut properties = HashMap::new();
        Self::flatten_toml(&value, String::new(), &mut properties);

        Ok(Self {
            name,
            properties,
            priority: 0, // 文件配置优先级最低
        })
    }

    /// 展平 TOML 结构
    /// 例如: { web: { form: { buffer-body = true } } } -> { "web.form.buffer-body": true }
    fn flatten_toml(value: &toml::Value, prefix: String, result: &mut HashMap<String, ConfigValue>) {
        match value {
            toml::Value::Table(table) => {
                for (key, val) in table {
                    let new_prefix = if prefix.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", prefix, key)
                    };
                    Self::flatten_toml(val, new_prefix, result);
                }
            }
            other => {
                result.insert(prefix, Self::toml_value_to_config(other));
            }
        }
    }

    /// 转换 TOML 值为 ConfigValue
    fn toml_value_to_config(value: &toml::Value) -> ConfigValue {
        match value {
            toml::Value::String(s) => ConfigValue::String(s.clone()),
            toml::Value::Integer(i) => ConfigValue::Int(*i),
            toml::Value::Float(f) => ConfigValue::Float(*f),
            toml::Value::Boolean(b) => ConfigValue::Bool(*b),
            toml::Value::Array(arr) => {
                ConfigValue::Array(arr.iter().map(Self::toml_value_to_config).collect())
            }
            toml::Value::Table(table) => ConfigValue::Object(
                table
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::toml_value_to_config(v)))
                    .collect(),
            ),
            toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        }
    }

    /// 设置优先级
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for TomlPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// 内存配置源（用于测试或运行时配置）
pub struct MapPropertySource {
    name: String,
    properties: HashMap<String, ConfigValue>,
    priority: i32,
}

impl MapPropertySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
            priority: 50,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: ConfigValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PropertySource for MapPropertySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<ConfigValue> {
        self.properties.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_higher_priority_source_wins() {
        let env = Environment::new()
            .with_property_source(Box::new(
                MapPropertySource::new("low")
                    .with_priority(10)
                    .with_property("web.form.value-count-limit", ConfigValue::Int(10)),
            ))
            .with_property_source(Box::new(
                MapPropertySource::new("high")
                    .with_priority(90)
                    .with_property("web.form.value-count-limit", ConfigValue::Int(20)),
            ));

        assert_eq!(env.get_i64("web.form.value-count-limit"), Some(20));
        assert_eq!(env.get_i64_or("missing", 7), 7);
    }

    #[test]
    fn test_string_values_are_coerced() {
        let env = Environment::new().with_property_source(Box::new(
            MapPropertySource::new("map")
                .with_property("flag", ConfigValue::String("yes".into()))
                .with_property("size", ConfigValue::String(" 42 ".into()))
                .with_property("negative", ConfigValue::Int(-1)),
        ));

        assert_eq!(env.get_bool("flag"), Some(true));
        assert_eq!(env.get_u64("size"), Some(42));
        assert_eq!(env.get_u64("negative"), None);
    }

    #[test]
    fn test_toml_is_flattened() {
        let source = TomlPropertySource::parse(
            r#"
            [ferrule.web.form]
            value-count-limit = 5
            buffer-body = true

            [ferrule.web]
            tags = ["a", "b"]
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(
            source.get("ferrule.web.form.value-count-limit"),
            Some(ConfigValue::Int(5))
        );
        assert_eq!(
            source.get("ferrule.web.form.buffer-body"),
            Some(ConfigValue::Bool(true))
        );

        let env = Environment::new().with_property_source(Box::new(source));
        assert_eq!(
            env.get_string_array("ferrule.web.tags"),
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_toml_file_errors_carry_context() {
        let err = TomlPropertySource::from_file("/definitely/not/here.toml")
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read config file"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not = [valid").unwrap();
        let err = TomlPropertySource::from_file(file.path()).err().unwrap();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_env_key_mapping() {
        let source = EnvironmentPropertySource::new("FERRULE_");
        assert_eq!(
            source.key_to_env("web.form.buffer-body"),
            "FERRULE_WEB_FORM_BUFFER__BODY"
        );
        assert_eq!(
            source.env_to_key("FERRULE_WEB_FORM_BUFFER__BODY"),
            "web.form.buffer-body"
        );
    }
}
