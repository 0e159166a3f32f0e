//! 状态码结果
//!
//! 只写状态码、不写响应体的结果。所有成员共用 [`apply_status_code`]。

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use once_cell::sync::Lazy;

use super::{ensure_writable, ActionResult, TypedStatusCode};
use crate::context::HttpContext;
use crate::error::{ConfigurationError, ConfigurationResult, ExecutionResult};

/// 检查响应状态后设置状态码
pub(crate) fn apply_status_code(
    ctx: &mut HttpContext<'_>,
    status: StatusCode,
    result: &'static str,
) -> ExecutionResult<()> {
    ensure_writable(ctx, result)?;

    tracing::debug!(
        status_code = status.as_u16(),
        result,
        "Setting HTTP status code"
    );
    ctx.response_mut().set_status_code(status);
    Ok(())
}

macro_rules! status_code_results {
    ($($(#[$meta:meta])* $name:ident => $status:ident = $code:literal;)*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            impl $name {
                pub const fn new() -> Self {
                    Self
                }
            }

            impl TypedStatusCode for $name {
                const STATUS_CODE: u16 = $code;
            }

            #[async_trait]
            impl ActionResult for $name {
                async fn execute(&self, ctx: &mut HttpContext<'_>) -> ExecutionResult<()> {
                    apply_status_code(ctx, StatusCode::$status, stringify!($name))
                }

                fn status_code(&self) -> Option<u16> {
                    Some($code)
                }
            }

            impl IntoResponse for $name {
                fn into_response(self) -> Response {
                    StatusCode::$status.into_response()
                }
            }
        )*
    };
}

status_code_results! {
    /// 200 OK
    OkResult => OK = 200;

    /// 204 No Content
    NoContentResult => NO_CONTENT = 204;

    /// 400 Bad Request
    BadRequestResult => BAD_REQUEST = 400;

    /// 401 Unauthorized
    UnauthorizedResult => UNAUTHORIZED = 401;

    /// 404 Not Found
    NotFoundResult => NOT_FOUND = 404;

    /// 409 Conflict
    ConflictResult => CONFLICT = 409;

    /// 415 Unsupported Media Type
    UnsupportedMediaTypeResult => UNSUPPORTED_MEDIA_TYPE = 415;
}

/// 什么都不做的结果
///
/// 不写状态码、响应头和响应体，响应保持未开始。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EmptyResult;

#[async_trait]
impl ActionResult for EmptyResult {
    async fn execute(&self, ctx: &mut HttpContext<'_>) -> ExecutionResult<()> {
        ensure_writable(ctx, "EmptyResult")
    }
}

impl IntoResponse for EmptyResult {
    fn into_response(self) -> Response {
        ().into_response()
    }
}

/// 任意状态码的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCodeResult {
    status: StatusCode,
}

impl StatusCodeResult {
    /// 创建结果，状态码必须在 100..=599 之间
    pub fn new(code: u16) -> ConfigurationResult<Self> {
        if !(100..=599).contains(&code) {
            return Err(ConfigurationError::InvalidStatusCode(code));
        }
        let status =
            StatusCode::from_u16(code).map_err(|_| ConfigurationError::InvalidStatusCode(code))?;
        Ok(Self { status })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

#[async_trait]
impl ActionResult for StatusCodeResult {
    async fn execute(&self, ctx: &mut HttpContext<'_>) -> ExecutionResult<()> {
        apply_status_code(ctx, self.status, "StatusCodeResult")
    }

    fn status_code(&self) -> Option<u16> {
        Some(self.status.as_u16())
    }
}

impl IntoResponse for StatusCodeResult {
    fn into_response(self) -> Response {
        self.status.into_response()
    }
}

/// 常用状态码的预建结果
static STATUS_CODE_CACHE: Lazy<Vec<StatusCodeResult>> = Lazy::new(|| {
    [
        StatusCode::CONTINUE,
        StatusCode::SWITCHING_PROTOCOLS,
        StatusCode::OK,
        StatusCode::CREATED,
        StatusCode::ACCEPTED,
        StatusCode::NO_CONTENT,
        StatusCode::RESET_CONTENT,
        StatusCode::PARTIAL_CONTENT,
        StatusCode::MOVED_PERMANENTLY,
        StatusCode::FOUND,
        StatusCode::SEE_OTHER,
        StatusCode::NOT_MODIFIED,
        StatusCode::TEMPORARY_REDIRECT,
        StatusCode::PERMANENT_REDIRECT,
        StatusCode::BAD_REQUEST,
        StatusCode::UNAUTHORIZED,
        StatusCode::FORBIDDEN,
        StatusCode::NOT_FOUND,
        StatusCode::METHOD_NOT_ALLOWED,
        StatusCode::NOT_ACCEPTABLE,
        StatusCode::REQUEST_TIMEOUT,
        StatusCode::CONFLICT,
        StatusCode::GONE,
        StatusCode::PRECONDITION_FAILED,
        StatusCode::PAYLOAD_TOO_LARGE,
        StatusCode::UNSUPPORTED_MEDIA_TYPE,
        StatusCode::UNPROCESSABLE_ENTITY,
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::NOT_IMPLEMENTED,
        StatusCode::BAD_GATEWAY,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::GATEWAY_TIMEOUT,
    ]
    .into_iter()
    .map(|status| StatusCodeResult { status })
    .collect()
});

/// 结果工厂
pub struct Results;

impl Results {
    pub const fn ok() -> OkResult {
        OkResult
    }

    pub const fn no_content() -> NoContentResult {
        NoContentResult
    }

    pub const fn bad_request() -> BadRequestResult {
        BadRequestResult
    }

    pub const fn unauthorized() -> UnauthorizedResult {
        UnauthorizedResult
    }

    pub const fn not_found() -> NotFoundResult {
        NotFoundResult
    }

    pub const fn conflict() -> ConflictResult {
        ConflictResult
    }

    pub const fn unsupported_media_type() -> UnsupportedMediaTypeResult {
        UnsupportedMediaTypeResult
    }

    pub const fn empty() -> EmptyResult {
        EmptyResult
    }

    /// 任意状态码，常用状态码直接取预建实例
    pub fn status_code(code: u16) -> ConfigurationResult<StatusCodeResult> {
        match STATUS_CODE_CACHE
            .iter()
            .find(|r| r.status.as_u16() == code)
        {
            Some(cached) => Ok(*cached),
            None => StatusCodeResult::new(code),
        }
    }
}
