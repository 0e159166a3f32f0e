//! 文本内容结果

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};

use super::{ensure_writable, ActionResult};
use crate::context::{HttpContext, ResponseFeature};
use crate::error::{ConfigurationResult, ExecutionError, ExecutionResult};
use crate::result::StatusCodeResult;

/// 每次写入的最大字节数
const WRITE_CHUNK_SIZE: usize = 16 * 1024;

/// 写出文本内容的结果
///
/// 响应体分块写入，每块之前检查取消信号；请求被取消时返回
/// [`ExecutionError::Cancelled`]，不会把写了一半的响应报告为成功。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResult {
    status: Option<StatusCode>,
    content_type: Option<HeaderValue>,
    content: Bytes,
}

impl ContentResult {
    pub fn new(content: impl Into<Bytes>) -> Self {
        Self {
            status: None,
            content_type: None,
            content: content.into(),
        }
    }

    /// `text/plain; charset=utf-8`
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content.into())
            .with_content_type(HeaderValue::from_static("text/plain; charset=utf-8"))
    }

    /// `text/html; charset=utf-8`
    pub fn html(content: impl Into<String>) -> Self {
        Self::new(content.into())
            .with_content_type(HeaderValue::from_static("text/html; charset=utf-8"))
    }

    pub fn with_content_type(mut self, content_type: HeaderValue) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// 设置状态码，校验规则与 [`StatusCodeResult::new`] 相同
    pub fn with_status(mut self, code: u16) -> ConfigurationResult<Self> {
        self.status = Some(StatusCodeResult::new(code)?.status());
        Ok(self)
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn content_type(&self) -> Option<&HeaderValue> {
        self.content_type.as_ref()
    }

    fn write_head(&self, response: &mut dyn ResponseFeature) {
        if let Some(status) = self.status {
            response.set_status_code(status);
        }
        if let Some(content_type) = &self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type.clone());
        }
        response
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(self.content.len()));

        tracing::debug!(
            status_code = self.status.map(|s| s.as_u16()),
            length = self.content.len(),
            "Writing content result"
        );
    }
}

#[async_trait]
impl ActionResult for ContentResult {
    async fn execute(&self, ctx: &mut HttpContext<'_>) -> ExecutionResult<()> {
        const RESULT: &str = "ContentResult";

        ensure_writable(ctx, RESULT)?;

        let token = ctx.cancellation().clone();
        let length = self.content.len();
        let mut offset = 0;
        loop {
            if token.is_cancelled() {
                tracing::debug!(written = offset, "Request cancelled while writing content");
                return Err(ExecutionError::Cancelled { result: RESULT });
            }

            // 响应头在第一块写出之前才设置
            if offset == 0 {
                self.write_head(ctx.response_mut());
            }
            if offset == length {
                break;
            }

            let end = (offset + WRITE_CHUNK_SIZE).min(length);
            let chunk = self.content.slice(offset..end);
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!(written = offset, "Request cancelled while writing content");
                    return Err(ExecutionError::Cancelled { result: RESULT });
                }
                written = ctx.response_mut().write_body(chunk) => written?,
            }
            offset = end;
            if offset == length {
                break;
            }
        }

        Ok(())
    }

    fn status_code(&self) -> Option<u16> {
        self.status.map(|s| s.as_u16())
    }
}

impl IntoResponse for ContentResult {
    fn into_response(self) -> Response {
        let mut response = self.content.into_response();
        if let Some(status) = self.status {
            *response.status_mut() = status;
        }
        if let Some(content_type) = self.content_type {
            response.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        response
    }
}
