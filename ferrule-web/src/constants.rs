//! 框架配置常量定义
//!
//! 定义 Web 层使用的配置键名称

// ==================== Binding 配置 ====================

/// 是否关闭数据源推断，关闭后没有显式注解的成员使用 ModelBinding
pub const BINDING_SUPPRESS_INFERENCE: &str = "ferrule.web.binding.suppress-inference";

// ==================== Request 配置 ====================

/// 请求体最大字节数，0 表示不限制
pub const REQUEST_MAX_BODY_SIZE: &str = "ferrule.web.request.max-body-size";

// ==================== Form 配置 ====================

/// 表单值数量上限
pub const FORM_VALUE_COUNT_LIMIT: &str = "ferrule.web.form.value-count-limit";

/// 表单键长度上限（字节）
pub const FORM_KEY_LENGTH_LIMIT: &str = "ferrule.web.form.key-length-limit";

/// 表单值长度上限（字节）
pub const FORM_VALUE_LENGTH_LIMIT: &str = "ferrule.web.form.value-length-limit";

/// multipart 请求体长度上限（字节）
pub const FORM_MULTIPART_BODY_LENGTH_LIMIT: &str = "ferrule.web.form.multipart-body-length-limit";

/// 是否缓冲请求体
pub const FORM_BUFFER_BODY: &str = "ferrule.web.form.buffer-body";
