//! 过滤器元数据
//!
//! 过滤器通过能力标记声明自己属于哪类策略，管线据此找到"生效"的那一个：
//! 同一能力有多个过滤器时，最后注册（离处理器最近）的生效，其它的什么都不做。

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::context::{HttpContext, RequestData};
use crate::error::ExecutionResult;
use crate::options::FormOptions;
use crate::result::{apply_status_code, ActionResult, TypedStatusCode};

/// 过滤器能力标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterCapability {
    /// 请求体大小策略
    RequestSizePolicy,
    /// 表单限制策略
    RequestFormLimitsPolicy,
    /// 防伪校验失败
    AntiforgeryValidationFailure,
}

/// 过滤器元数据
pub trait FilterMetadata: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &'static [FilterCapability] {
        &[]
    }

    fn order(&self) -> i32 {
        0
    }

    fn has_capability(&self, capability: FilterCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    fn is_request_size_policy(&self) -> bool {
        self.has_capability(FilterCapability::RequestSizePolicy)
    }

    fn is_form_limits_policy(&self) -> bool {
        self.has_capability(FilterCapability::RequestFormLimitsPolicy)
    }

    fn is_antiforgery_failure(&self) -> bool {
        self.has_capability(FilterCapability::AntiforgeryValidationFailure)
    }

    /// 在读取请求体之前调用
    fn on_authorization(&self, _filters: &FilterCollection, _request: &mut RequestData) {}
}

/// 一个处理器上的过滤器，按注册顺序排列
#[derive(Debug, Clone, Default)]
pub struct FilterCollection {
    filters: Vec<Arc<dyn FilterMetadata>>,
}

impl FilterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F: FilterMetadata + 'static>(&mut self, filter: F) {
        self.filters.push(Arc::new(filter));
    }

    pub fn with<F: FilterMetadata + 'static>(mut self, filter: F) -> Self {
        self.add(filter);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn FilterMetadata>> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// 具有指定能力的生效过滤器
    pub fn effective_policy(&self, capability: FilterCapability) -> Option<&Arc<dyn FilterMetadata>> {
        self.filters
            .iter()
            .rev()
            .find(|f| f.has_capability(capability))
    }

    /// `filter` 是否为指定能力的生效过滤器
    pub fn is_effective(&self, filter: &dyn FilterMetadata, capability: FilterCapability) -> bool {
        self.effective_policy(capability).is_some_and(|effective| {
            std::ptr::eq(
                Arc::as_ptr(effective) as *const (),
                filter as *const dyn FilterMetadata as *const (),
            )
        })
    }

    /// 依次执行所有过滤器的 `on_authorization`
    pub fn run_authorization(&self, request: &mut RequestData) {
        for filter in &self.filters {
            filter.on_authorization(self, request);
        }
    }
}

/// 设置请求体上限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSizeLimitFilter {
    pub bytes: u64,
}

impl RequestSizeLimitFilter {
    pub fn new(bytes: u64) -> Self {
        Self { bytes }
    }
}

impl FilterMetadata for RequestSizeLimitFilter {
    fn name(&self) -> &str {
        "RequestSizeLimit"
    }

    fn capabilities(&self) -> &'static [FilterCapability] {
        &[FilterCapability::RequestSizePolicy]
    }

    fn order(&self) -> i32 {
        900
    }

    fn on_authorization(&self, filters: &FilterCollection, request: &mut RequestData) {
        set_max_request_body_size(self, filters, request, Some(self.bytes));
    }
}

/// 取消请求体上限
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisableRequestSizeLimitFilter;

impl FilterMetadata for DisableRequestSizeLimitFilter {
    fn name(&self) -> &str {
        "DisableRequestSizeLimit"
    }

    fn capabilities(&self) -> &'static [FilterCapability] {
        &[FilterCapability::RequestSizePolicy]
    }

    fn order(&self) -> i32 {
        900
    }

    fn on_authorization(&self, filters: &FilterCollection, request: &mut RequestData) {
        set_max_request_body_size(self, filters, request, None);
    }
}

fn set_max_request_body_size(
    filter: &dyn FilterMetadata,
    filters: &FilterCollection,
    request: &mut RequestData,
    limit: Option<u64>,
) {
    if !filters.is_effective(filter, FilterCapability::RequestSizePolicy) {
        tracing::debug!(
            filter = filter.name(),
            "Not the most effective request size policy, skipping"
        );
        return;
    }

    let limits = request.limits_mut();
    if limits.is_read_only {
        tracing::warn!(
            filter = filter.name(),
            "Request body size limit is read-only, it can no longer be changed"
        );
        return;
    }

    limits.max_request_body_size = limit;
    tracing::debug!(filter = filter.name(), max_request_body_size = ?limit, "Request body size limit set");
}

/// 设置表单读取限制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestFormLimitsFilter {
    pub options: FormOptions,
}

impl RequestFormLimitsFilter {
    pub fn new(options: FormOptions) -> Self {
        Self { options }
    }
}

impl FilterMetadata for RequestFormLimitsFilter {
    fn name(&self) -> &str {
        "RequestFormLimits"
    }

    fn capabilities(&self) -> &'static [FilterCapability] {
        &[FilterCapability::RequestFormLimitsPolicy]
    }

    fn order(&self) -> i32 {
        900
    }

    fn on_authorization(&self, filters: &FilterCollection, request: &mut RequestData) {
        if !filters.is_effective(self, FilterCapability::RequestFormLimitsPolicy) {
            tracing::debug!(filter = self.name(), "Not the most effective form limits policy, skipping");
            return;
        }

        let limits = request.limits_mut();
        if limits.has_form_been_read {
            tracing::debug!(filter = self.name(), "Form has already been read, limits not applied");
            return;
        }

        limits.form_options = self.options;
        tracing::debug!(
            filter = self.name(),
            value_count_limit = self.options.value_count_limit,
            multipart_body_length_limit = self.options.multipart_body_length_limit,
            "Form limits applied"
        );
    }
}

/// 防伪校验失败的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntiforgeryValidationFailedResult {
    message: String,
}

impl AntiforgeryValidationFailedResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl TypedStatusCode for AntiforgeryValidationFailedResult {
    const STATUS_CODE: u16 = 400;
}

#[async_trait]
impl ActionResult for AntiforgeryValidationFailedResult {
    async fn execute(&self, ctx: &mut HttpContext<'_>) -> ExecutionResult<()> {
        tracing::info!(message = %self.message, "Antiforgery token validation failed");
        apply_status_code(ctx, StatusCode::BAD_REQUEST, "AntiforgeryValidationFailedResult")
    }

    fn status_code(&self) -> Option<u16> {
        Some(Self::STATUS_CODE)
    }

    fn is_antiforgery_failure(&self) -> bool {
        true
    }
}

impl FilterMetadata for AntiforgeryValidationFailedResult {
    fn name(&self) -> &str {
        "AntiforgeryValidationFailed"
    }

    fn capabilities(&self) -> &'static [FilterCapability] {
        &[FilterCapability::AntiforgeryValidationFailure]
    }
}

impl IntoResponse for AntiforgeryValidationFailedResult {
    fn into_response(self) -> Response {
        StatusCode::BAD_REQUEST.into_response()
    }
}
