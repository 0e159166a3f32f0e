//! Web 层错误类型
//!
//! 错误分为两个层级：
//!
//! 1. **注册期** - [`ConfigurationError`]，在处理器注册、绑定元数据解析时产生，
//!    不可恢复，必须在服务任何请求之前暴露
//! 2. **请求期** - [`ExecutionError`]，执行结果时产生，交给调用方的管线处理
//!
//! 值转换失败、响应写入的 I/O 失败等属于外部 binder / 传输层，本层只负责如实上报。

use thiserror::Error;

/// 注册期配置错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// 同一个成员上声明了多个数据源注解
    #[error("Ambiguous binding source for '{member}': found {}", .sources.join(", "))]
    AmbiguousBindingSource {
        member: String,
        sources: Vec<String>,
    },

    /// 多个数据源无法组合（例如 Body 与 Query）
    #[error("Binding sources cannot be combined for '{member}': {reason}")]
    IncompatibleBindingSources { member: String, reason: String },

    /// 组合数据源定义非法
    #[error("Invalid composite binding source '{display_name}': {reason}")]
    InvalidCompositeSource {
        display_name: String,
        reason: String,
    },

    /// 同一个处理器有多个成员从请求体绑定
    #[error(
        "Handler '{handler}' has more than one parameter bound from request body: {}. \
         Only one parameter per handler may be bound from body",
        .members.join(", ")
    )]
    MultipleBodyParameters {
        handler: String,
        members: Vec<String>,
    },

    /// 状态码不在 [100, 599] 范围内
    #[error("Invalid HTTP status code {0}: must be within 100..=599")]
    InvalidStatusCode(u16),
}

/// 请求期执行错误
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// 响应已经开始发送，不能再修改状态码、响应头
    #[error("The response has already started; cannot apply {result}")]
    ResponseAlreadyStarted { result: &'static str },

    /// 请求已被取消
    #[error("The request was cancelled while executing {result}")]
    Cancelled { result: &'static str },

    /// 写入响应体失败
    #[error("Failed to write response body: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

pub type ExecutionResult<T> = Result<T, ExecutionError>;
