//! # Ferrule Web
//!
//! 处理器结果与输入数据源元数据，基于 Axum 构建
//!
//! ## 核心特性
//!
//! - **结果抽象** - 处理器返回 [`ActionResult`](result::ActionResult)，与响应的写入方式解耦
//! - **数据源注册表** - Query、Header、Path、Body 等数据源及其兼容规则
//! - **绑定元数据** - 注解驱动的数据源声明、推断与注册期校验
//! - **过滤器标记** - 请求体大小、表单限制、防伪失败等策略的分类
//! - **泛型适配器** - `ServiceFilter`、`TypeFilter`、`ModelBinder`、`ProducesResponseType`

pub mod adapters;
pub mod binding;
pub mod constants;
pub mod context;
pub mod error;
pub mod filters;
pub mod options;
pub mod result;

// submit_binding_source! 展开需要
#[doc(hidden)]
pub use inventory;

pub mod prelude {
    //! 预导入模块

    pub use crate::adapters::*;
    pub use crate::binding::*;
    pub use crate::context::*;
    pub use crate::error::*;
    pub use crate::filters::*;
    pub use crate::options::*;
    pub use crate::result::*;

    pub use async_trait::async_trait;
    pub use axum::response::{IntoResponse, Response};
    pub use axum::http::StatusCode;
    pub use tokio_util::sync::CancellationToken;
}
