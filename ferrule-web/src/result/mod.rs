//! 处理器结果
//!
//! 处理器返回一个 [`ActionResult`]，描述"发生了什么"；如何写到传输层的响应上
//! 由结果自己的 `execute` 决定。所有结果都是不可变的，同一个实例可以被并发执行。
//!
//! # 执行约定
//!
//! - 响应已经开始时返回 [`ExecutionError::ResponseAlreadyStarted`]，不做任何修改
//! - 请求已经取消时返回 [`ExecutionError::Cancelled`]，不做任何修改

mod content;
mod status;

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};

use crate::adapters::TypeDescriptor;
use crate::context::{BufferedResponse, HttpContext, RequestData};
use crate::error::{ExecutionError, ExecutionResult};

pub use content::ContentResult;
pub(crate) use status::apply_status_code;
pub use status::{
    BadRequestResult, ConflictResult, EmptyResult, NoContentResult, NotFoundResult, OkResult,
    Results, StatusCodeResult, UnauthorizedResult, UnsupportedMediaTypeResult,
};

/// 处理器结果
#[async_trait]
pub trait ActionResult: Send + Sync {
    /// 将结果写到响应上
    async fn execute(&self, ctx: &mut HttpContext<'_>) -> ExecutionResult<()>;

    /// 该实例会写出的状态码，不写状态码的结果返回 `None`
    fn status_code(&self) -> Option<u16> {
        None
    }

    /// 是否表示防伪校验失败
    fn is_antiforgery_failure(&self) -> bool {
        false
    }
}

/// 类型级别的默认状态码，无需实例即可读取
pub trait TypedStatusCode {
    const STATUS_CODE: u16;
}

/// 端点可能产生的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducesResponseTypeMetadata {
    pub status_code: u16,
    pub response_type: Option<TypeDescriptor>,
    pub content_types: Vec<String>,
}

impl ProducesResponseTypeMetadata {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            response_type: None,
            content_types: Vec::new(),
        }
    }
}

/// 端点元数据集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMetadata {
    items: Vec<ProducesResponseTypeMetadata>,
}

impl EndpointMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ProducesResponseTypeMetadata) {
        self.items.push(item);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProducesResponseTypeMetadata> {
        self.items.iter()
    }

    pub fn status_codes(&self) -> Vec<u16> {
        self.items.iter().map(|i| i.status_code).collect()
    }
}

/// 在端点注册时贡献元数据的结果类型
pub trait EndpointMetadataProvider {
    fn populate_metadata(metadata: &mut EndpointMetadata);
}

impl<T: TypedStatusCode> EndpointMetadataProvider for T {
    fn populate_metadata(metadata: &mut EndpointMetadata) {
        metadata.push(ProducesResponseTypeMetadata::new(T::STATUS_CODE));
    }
}

/// 检查响应是否仍可修改
pub(crate) fn ensure_writable(
    ctx: &HttpContext<'_>,
    result: &'static str,
) -> ExecutionResult<()> {
    if ctx.response().has_started() {
        return Err(ExecutionError::ResponseAlreadyStarted { result });
    }
    if ctx.is_cancelled() {
        return Err(ExecutionError::Cancelled { result });
    }
    Ok(())
}

/// 在内存响应上执行结果并转换为 axum 响应
pub async fn execute_to_response(
    result: &dyn ActionResult,
    request: &RequestData,
) -> ExecutionResult<Response> {
    let mut response = BufferedResponse::new();
    {
        let mut ctx = HttpContext::new(request, &mut response);
        result.execute(&mut ctx).await?;
    }
    Ok(response.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_typed_status_codes_without_instance() {
        assert_eq!(OkResult::STATUS_CODE, 200);
        assert_eq!(NoContentResult::STATUS_CODE, 204);
        assert_eq!(BadRequestResult::STATUS_CODE, 400);
        assert_eq!(UnauthorizedResult::STATUS_CODE, 401);
        assert_eq!(NotFoundResult::STATUS_CODE, 404);
        assert_eq!(ConflictResult::STATUS_CODE, 409);
        assert_eq!(UnsupportedMediaTypeResult::STATUS_CODE, 415);
    }

    #[test]
    fn test_endpoint_metadata_from_result_types() {
        let mut metadata = EndpointMetadata::new();
        OkResult::populate_metadata(&mut metadata);
        NotFoundResult::populate_metadata(&mut metadata);

        assert_eq!(metadata.status_codes(), vec![200, 404]);
        assert!(metadata.iter().all(|m| m.response_type.is_none()));
    }

    #[tokio::test]
    async fn test_execute_to_response() {
        let request = RequestData::default();
        let response = execute_to_response(&ConflictResult, &request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_results_are_object_safe() {
        let results: Vec<Box<dyn ActionResult>> = vec![
            Box::new(OkResult),
            Box::new(EmptyResult),
            Box::new(ContentResult::text("hi")),
        ];
        let codes: Vec<_> = results.iter().map(|r| r.status_code()).collect();
        assert_eq!(codes, vec![Some(200), None, None]);
    }
}
