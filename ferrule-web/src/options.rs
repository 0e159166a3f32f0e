//! Web 层选项
//!
//! 选项在应用启动时从 [`Environment`] 读取一次，之后只读。

use ferrule_core::Environment;

use crate::constants::{
    BINDING_SUPPRESS_INFERENCE, FORM_BUFFER_BODY, FORM_KEY_LENGTH_LIMIT,
    FORM_MULTIPART_BODY_LENGTH_LIMIT, FORM_VALUE_COUNT_LIMIT, FORM_VALUE_LENGTH_LIMIT,
    REQUEST_MAX_BODY_SIZE,
};

/// 默认请求体上限，约 28.6 MB
pub const DEFAULT_MAX_REQUEST_BODY_SIZE: u64 = 30_000_000;

/// 表单读取限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOptions {
    /// 值数量上限，默认 1024
    pub value_count_limit: usize,

    /// 键长度上限，默认 2KB
    pub key_length_limit: usize,

    /// 值长度上限，默认 4MB
    pub value_length_limit: usize,

    /// multipart 请求体上限，默认 128MB
    pub multipart_body_length_limit: u64,

    /// 是否缓冲请求体以便重复读取，默认 false
    pub buffer_body: bool,
}

fn default_value_count_limit() -> usize {
    1024
}

fn default_key_length_limit() -> usize {
    1024 * 2
}

fn default_value_length_limit() -> usize {
    1024 * 1024 * 4
}

fn default_multipart_body_length_limit() -> u64 {
    1024 * 1024 * 128
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            value_count_limit: default_value_count_limit(),
            key_length_limit: default_key_length_limit(),
            value_length_limit: default_value_length_limit(),
            multipart_body_length_limit: default_multipart_body_length_limit(),
            buffer_body: false,
        }
    }
}

impl FormOptions {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            value_count_limit: env
                .get_u64(FORM_VALUE_COUNT_LIMIT)
                .map(|v| v as usize)
                .unwrap_or_else(default_value_count_limit),
            key_length_limit: env
                .get_u64(FORM_KEY_LENGTH_LIMIT)
                .map(|v| v as usize)
                .unwrap_or_else(default_key_length_limit),
            value_length_limit: env
                .get_u64(FORM_VALUE_LENGTH_LIMIT)
                .map(|v| v as usize)
                .unwrap_or_else(default_value_length_limit),
            multipart_body_length_limit: env.get_u64_or(
                FORM_MULTIPART_BODY_LENGTH_LIMIT,
                default_multipart_body_length_limit(),
            ),
            buffer_body: env.get_bool_or(FORM_BUFFER_BODY, false),
        }
    }
}

/// Web 层全局选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MvcOptions {
    /// 关闭数据源推断
    pub suppress_inferred_binding_sources: bool,

    /// 请求体上限，`None` 表示不限制
    pub max_request_body_size: Option<u64>,

    pub form: FormOptions,
}

impl Default for MvcOptions {
    fn default() -> Self {
        Self {
            suppress_inferred_binding_sources: false,
            max_request_body_size: Some(DEFAULT_MAX_REQUEST_BODY_SIZE),
            form: FormOptions::default(),
        }
    }
}

impl MvcOptions {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        let max_request_body_size = match env.get_u64(REQUEST_MAX_BODY_SIZE) {
            Some(0) => None,
            Some(size) => Some(size),
            None => Some(DEFAULT_MAX_REQUEST_BODY_SIZE),
        };

        let options = Self {
            suppress_inferred_binding_sources: env.get_bool_or(BINDING_SUPPRESS_INFERENCE, false),
            max_request_body_size,
            form: FormOptions::from_environment(env),
        };

        tracing::debug!(
            suppress_inference = options.suppress_inferred_binding_sources,
            max_request_body_size = ?options.max_request_body_size,
            "Web options loaded"
        );
        options
    }
}
