//! 请求 / 响应上下文
//!
//! 结果只通过 [`HttpContext`] 接触传输层：读取请求、修改响应、观察取消信号。
//! 上下文以借用的形式传入 `execute`，结果无法在执行结束后持有它。

use std::collections::HashMap;

use async_trait::async_trait;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::binding::RequestValues;
use crate::options::{FormOptions, MvcOptions};

/// 响应写入接口
#[async_trait]
pub trait ResponseFeature: Send {
    fn status_code(&self) -> StatusCode;

    /// 设置状态码，响应开始后调用无效
    fn set_status_code(&mut self, status: StatusCode);

    /// 状态码与响应头是否已经发出
    fn has_started(&self) -> bool;

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// 写入一段响应体，第一次写入会开始响应
    async fn write_body(&mut self, chunk: Bytes) -> std::io::Result<()>;
}

/// 内存缓冲的响应
#[derive(Debug, Default)]
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    started: bool,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// 标记响应已经开始，用于模拟已经刷新了响应头的连接
    pub fn start(&mut self) {
        self.started = true;
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[async_trait]
impl ResponseFeature for BufferedResponse {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn set_status_code(&mut self, status: StatusCode) {
        if self.started {
            tracing::warn!(
                status_code = status.as_u16(),
                "Ignoring status code change after the response has started"
            );
            return;
        }
        self.status = status;
    }

    fn has_started(&self) -> bool {
        self.started
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    async fn write_body(&mut self, chunk: Bytes) -> std::io::Result<()> {
        self.started = true;
        self.body.extend_from_slice(&chunk);
        Ok(())
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// 当前请求的可调整限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    /// 请求体上限，`None` 表示不限制
    pub max_request_body_size: Option<u64>,

    /// 请求体已经开始读取，上限不能再修改
    pub is_read_only: bool,

    pub form_options: FormOptions,

    /// 表单已经读取，表单限制不能再修改
    pub has_form_been_read: bool,
}

impl RequestLimits {
    pub fn from_options(options: &MvcOptions) -> Self {
        Self {
            max_request_body_size: options.max_request_body_size,
            is_read_only: false,
            form_options: options.form,
            has_form_been_read: false,
        }
    }
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self::from_options(&MvcOptions::default())
    }
}

/// 请求数据
///
/// 由管线在进入处理器之前构建：路由值来自路由器，查询和表单值已经解码。
#[derive(Debug, Clone, Default)]
pub struct RequestData {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    route_values: HashMap<String, String>,
    form: HashMap<String, String>,
    limits: RequestLimits,
}

impl RequestData {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_route_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_values.insert(name.into(), value.into());
        self
    }

    pub fn with_form_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn limits(&self) -> &RequestLimits {
        &self.limits
    }

    pub fn limits_mut(&mut self) -> &mut RequestLimits {
        &mut self.limits
    }
}

impl RequestValues for RequestData {
    fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn route_value(&self, name: &str) -> Option<&str> {
        self.route_values.get(name).map(String::as_str)
    }

    fn form_value(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }
}

/// 一次请求的执行上下文
pub struct HttpContext<'a> {
    request: &'a RequestData,
    response: &'a mut dyn ResponseFeature,
    cancellation: CancellationToken,
}

impl<'a> HttpContext<'a> {
    pub fn new(request: &'a RequestData, response: &'a mut dyn ResponseFeature) -> Self {
        Self {
            request,
            response,
            cancellation: CancellationToken::new(),
        }
    }

    /// 使用管线提供的取消令牌
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn request(&self) -> &RequestData {
        self.request
    }

    pub fn response(&self) -> &(dyn ResponseFeature + 'a) {
        &*self.response
    }

    pub fn response_mut(&mut self) -> &mut (dyn ResponseFeature + 'a) {
        &mut *self.response
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_values() {
        let request = RequestData::new(Method::GET, "/orders/7")
            .with_query("page", "2")
            .with_route_value("id", "7")
            .with_form_value("note", "hello")
            .with_header(
                HeaderName::from_static("x-trace"),
                HeaderValue::from_static("abc"),
            );

        assert_eq!(request.query_value("page"), Some("2"));
        assert_eq!(request.route_value("id"), Some("7"));
        assert_eq!(request.form_value("note"), Some("hello"));
        assert_eq!(request.header_value("X-Trace"), Some("abc"));
        assert_eq!(request.header_value("not a header"), None);
        assert_eq!(request.path(), "/orders/7");
    }

    #[test]
    fn test_request_limits_default_from_options() {
        let request = RequestData::new(Method::POST, "/upload");
        assert_eq!(request.limits().max_request_body_size, Some(30_000_000));
        assert!(!request.limits().is_read_only);
    }

    #[tokio::test]
    async fn test_buffered_response_write_starts_response() {
        let mut response = BufferedResponse::new();
        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(!response.has_started());

        response.write_body(Bytes::from_static(b"hello ")).await.unwrap();
        response.write_body(Bytes::from_static(b"world")).await.unwrap();
        assert!(response.has_started());
        assert_eq!(response.body(), b"hello world");

        response.set_status_code(StatusCode::NOT_FOUND);
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_buffered_response_into_axum_response() {
        let mut response = BufferedResponse::new();
        response.set_status_code(StatusCode::CREATED);
        response
            .headers_mut()
            .insert(http::header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        response.write_body(Bytes::from_static(b"done")).await.unwrap();

        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[http::header::CONTENT_TYPE], "text/plain");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"done");
    }

    #[test]
    fn test_context_cancellation() {
        let request = RequestData::default();
        let mut response = BufferedResponse::new();
        let token = CancellationToken::new();
        let ctx = HttpContext::new(&request, &mut response).with_cancellation(token.clone());

        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
    }
}
