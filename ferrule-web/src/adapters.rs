//! 泛型注解适配器
//!
//! 每个注解既有接收 [`TypeDescriptor`] 的构造函数，也有等价的泛型构造函数
//! `of::<T>()`，两者构造出的值完全相同。

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::binding::BindingSource;
use crate::error::ConfigurationResult;
use crate::filters::FilterMetadata;
use crate::result::{ProducesResponseTypeMetadata, StatusCodeResult};

/// 运行时类型描述
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    name: &'static str,
    id: TypeId,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// 完整类型名
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 去掉模块路径的类型名
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// 从服务容器解析的过滤器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceFilterAttribute {
    service_type: TypeDescriptor,
    order: i32,
    is_reusable: bool,
}

impl ServiceFilterAttribute {
    pub fn new(service_type: TypeDescriptor) -> Self {
        Self {
            service_type,
            order: 0,
            is_reusable: false,
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn reusable(mut self) -> Self {
        self.is_reusable = true;
        self
    }

    pub fn service_type(&self) -> &TypeDescriptor {
        &self.service_type
    }

    pub fn is_reusable(&self) -> bool {
        self.is_reusable
    }
}

impl FilterMetadata for ServiceFilterAttribute {
    fn name(&self) -> &str {
        self.service_type.short_name()
    }

    fn order(&self) -> i32 {
        self.order
    }
}

/// 由类型直接实例化的过滤器，构造参数原样传递给实现类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeFilterAttribute {
    implementation_type: TypeDescriptor,
    arguments: Vec<String>,
    order: i32,
    is_reusable: bool,
}

impl TypeFilterAttribute {
    pub fn new(implementation_type: TypeDescriptor) -> Self {
        Self {
            implementation_type,
            arguments: Vec::new(),
            order: 0,
            is_reusable: false,
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn reusable(mut self) -> Self {
        self.is_reusable = true;
        self
    }

    pub fn implementation_type(&self) -> &TypeDescriptor {
        &self.implementation_type
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn is_reusable(&self) -> bool {
        self.is_reusable
    }
}

impl FilterMetadata for TypeFilterAttribute {
    fn name(&self) -> &str {
        self.implementation_type.short_name()
    }

    fn order(&self) -> i32 {
        self.order
    }
}

/// 为成员指定 binder
///
/// 指定了 binder 类型时数据源为 `CUSTOM`；只指定名称时不选择数据源。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelBinderAttribute {
    binder_type: Option<TypeDescriptor>,
    name: Option<String>,
}

impl ModelBinderAttribute {
    pub fn new(binder_type: TypeDescriptor) -> Self {
        Self {
            binder_type: Some(binder_type),
            name: None,
        }
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(TypeDescriptor::of::<T>())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn binder_type(&self) -> Option<TypeDescriptor> {
        self.binder_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn binding_source(&self) -> Option<BindingSource> {
        self.binder_type.map(|_| BindingSource::CUSTOM)
    }
}

/// 声明端点可能返回的响应类型与状态码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducesResponseTypeAttribute {
    response_type: Option<TypeDescriptor>,
    status_code: u16,
    content_types: Vec<String>,
}

impl ProducesResponseTypeAttribute {
    pub fn new(response_type: TypeDescriptor, status_code: u16) -> ConfigurationResult<Self> {
        Self::build(Some(response_type), status_code)
    }

    pub fn of<T: ?Sized + 'static>(status_code: u16) -> ConfigurationResult<Self> {
        Self::new(TypeDescriptor::of::<T>(), status_code)
    }

    /// 只有状态码、没有响应体
    pub fn status(status_code: u16) -> ConfigurationResult<Self> {
        Self::build(None, status_code)
    }

    fn build(response_type: Option<TypeDescriptor>, status_code: u16) -> ConfigurationResult<Self> {
        StatusCodeResult::new(status_code)?;
        Ok(Self {
            response_type,
            status_code,
            content_types: Vec::new(),
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    pub fn response_type(&self) -> Option<&TypeDescriptor> {
        self.response_type.as_ref()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn to_metadata(&self) -> ProducesResponseTypeMetadata {
        ProducesResponseTypeMetadata {
            status_code: self.status_code,
            response_type: self.response_type,
            content_types: self.content_types.clone(),
        }
    }
}
