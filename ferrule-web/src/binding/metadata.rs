//! 绑定元数据
//!
//! 处理器的每个输入成员可以携带若干 [`BindingAttribute`]，在注册期被解析为
//! 不可变的 [`ParameterBinding`]，之后所有请求共享同一份结果。

use std::borrow::Cow;

use super::inference::infer_binding_source;
use super::registry::BindingSourceRegistry;
use super::source::BindingSource;
use crate::adapters::{ModelBinderAttribute, TypeDescriptor};
use crate::error::{ConfigurationError, ConfigurationResult};
use crate::options::MvcOptions;

/// 请求体为空时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyBodyBehavior {
    /// 由 binder 根据成员是否可空决定
    #[default]
    Default,
    /// 允许空请求体
    Allow,
    /// 拒绝空请求体
    Disallow,
}

/// 成员类型的分类，用于推断数据源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// 可以从单个字符串转换的值（数字、字符串、布尔 ...）
    Simple,
    /// 复杂对象
    Complex,
    /// 集合
    Collection,
    /// 请求取消令牌
    CancellationToken,
}

/// 成员上的绑定注解
#[derive(Debug, Clone, PartialEq)]
pub enum BindingAttribute {
    FromQuery { name: Option<String> },
    FromHeader { name: Option<String> },
    FromRoute { name: Option<String> },
    FromForm { name: Option<String> },
    FromBody { empty_body_behavior: EmptyBodyBehavior },
    FromServices,
    /// 同时从多个非贪婪数据源读取，在注册期组合为一个组合数据源
    FromSources {
        sources: Vec<BindingSource>,
        name: Option<String>,
    },
    ModelBinder(ModelBinderAttribute),
    BindRequired,
}

impl BindingAttribute {
    pub fn from_query() -> Self {
        BindingAttribute::FromQuery { name: None }
    }

    pub fn from_header() -> Self {
        BindingAttribute::FromHeader { name: None }
    }

    pub fn from_route() -> Self {
        BindingAttribute::FromRoute { name: None }
    }

    pub fn from_form() -> Self {
        BindingAttribute::FromForm { name: None }
    }

    pub fn from_body() -> Self {
        BindingAttribute::FromBody {
            empty_body_behavior: EmptyBodyBehavior::Default,
        }
    }

    /// 设置名称覆盖，对不支持名称的注解无效
    pub fn named(self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self {
            BindingAttribute::FromQuery { .. } => BindingAttribute::FromQuery { name: Some(name) },
            BindingAttribute::FromHeader { .. } => BindingAttribute::FromHeader { name: Some(name) },
            BindingAttribute::FromRoute { .. } => BindingAttribute::FromRoute { name: Some(name) },
            BindingAttribute::FromForm { .. } => BindingAttribute::FromForm { name: Some(name) },
            BindingAttribute::FromSources { sources, .. } => BindingAttribute::FromSources {
                sources,
                name: Some(name),
            },
            BindingAttribute::ModelBinder(binder) => {
                BindingAttribute::ModelBinder(binder.with_name(name))
            }
            other => other,
        }
    }

    /// 注解选择的数据源
    ///
    /// `FromSources` 返回第一个成员作为代表，完整的组合在
    /// [`BindingInfo::from_attributes`] 中通过注册表校验。
    pub fn binding_source(&self) -> Option<BindingSource> {
        match self {
            BindingAttribute::FromQuery { .. } => Some(BindingSource::QUERY),
            BindingAttribute::FromHeader { .. } => Some(BindingSource::HEADER),
            BindingAttribute::FromRoute { .. } => Some(BindingSource::PATH),
            BindingAttribute::FromForm { .. } => Some(BindingSource::FORM),
            BindingAttribute::FromBody { .. } => Some(BindingSource::BODY),
            BindingAttribute::FromServices => Some(BindingSource::SERVICES),
            BindingAttribute::FromSources { sources, .. } => sources.first().cloned(),
            BindingAttribute::ModelBinder(binder) => binder.binding_source(),
            BindingAttribute::BindRequired => None,
        }
    }

    /// 名称覆盖
    pub fn name(&self) -> Option<&str> {
        match self {
            BindingAttribute::FromQuery { name }
            | BindingAttribute::FromHeader { name }
            | BindingAttribute::FromRoute { name }
            | BindingAttribute::FromForm { name }
            | BindingAttribute::FromSources { name, .. } => name.as_deref(),
            BindingAttribute::ModelBinder(binder) => binder.name(),
            _ => None,
        }
    }

    /// 是否为选择数据源的注解，空的 `FromSources` 也算，交给注册表报错
    fn selects_source(&self) -> bool {
        matches!(self, BindingAttribute::FromSources { .. }) || self.binding_source().is_some()
    }

    fn source_label(&self) -> String {
        match self {
            BindingAttribute::FromSources { sources, .. } => sources
                .iter()
                .map(|s| s.id())
                .collect::<Vec<_>>()
                .join("|"),
            other => other
                .binding_source()
                .map(|s| s.id().to_string())
                .unwrap_or_default(),
        }
    }
}

/// 单个成员的绑定信息
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindingInfo {
    binding_source: Option<BindingSource>,
    binder_model_name: Option<String>,
    is_required: bool,
    empty_body_behavior: EmptyBodyBehavior,
    binder_type: Option<TypeDescriptor>,
}

impl BindingInfo {
    /// 从注解构建
    ///
    /// 至多允许一个选择数据源的注解，名称覆盖取第一个提供名称的注解。
    pub fn from_attributes(
        member: &str,
        attributes: &[BindingAttribute],
    ) -> ConfigurationResult<Self> {
        let selecting: Vec<&BindingAttribute> = attributes
            .iter()
            .filter(|a| a.selects_source())
            .collect();

        if selecting.len() > 1 {
            return Err(ConfigurationError::AmbiguousBindingSource {
                member: member.to_string(),
                sources: selecting.iter().map(|a| a.source_label()).collect(),
            });
        }

        let mut info = BindingInfo::default();

        if let Some(attribute) = selecting.first() {
            info.binding_source = match attribute {
                BindingAttribute::FromSources { sources, .. } => {
                    Some(BindingSourceRegistry::global().combine(member, sources)?)
                }
                other => other.binding_source(),
            };
        }

        for attribute in attributes {
            match attribute {
                BindingAttribute::BindRequired => info.is_required = true,
                BindingAttribute::FromBody {
                    empty_body_behavior,
                } => info.empty_body_behavior = *empty_body_behavior,
                BindingAttribute::ModelBinder(binder) => {
                    if info.binder_type.is_none() {
                        info.binder_type = binder.binder_type();
                    }
                }
                _ => {}
            }

            if info.binder_model_name.is_none() {
                info.binder_model_name = attribute.name().map(str::to_string);
            }
        }

        Ok(info)
    }

    pub fn binding_source(&self) -> Option<&BindingSource> {
        self.binding_source.as_ref()
    }

    pub fn binder_model_name(&self) -> Option<&str> {
        self.binder_model_name.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn empty_body_behavior(&self) -> EmptyBodyBehavior {
        self.empty_body_behavior
    }

    pub fn binder_type(&self) -> Option<&TypeDescriptor> {
        self.binder_type.as_ref()
    }
}

/// 处理器成员描述，由 `#[derive(BindingMetadata)]` 生成或手写
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    pub name: Cow<'static, str>,
    pub kind: ParameterKind,
    pub attributes: Vec<BindingAttribute>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<Cow<'static, str>>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: BindingAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// 解析完成的成员绑定
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBinding {
    member_name: Cow<'static, str>,
    kind: ParameterKind,
    info: BindingInfo,
    binding_source: BindingSource,
    is_inferred: bool,
}

impl ParameterBinding {
    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// 读取值时使用的名称：名称覆盖，否则为声明名称
    pub fn binding_name(&self) -> &str {
        self.info
            .binder_model_name()
            .unwrap_or_else(|| self.member_name.as_ref())
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn binding_source(&self) -> &BindingSource {
        &self.binding_source
    }

    /// 数据源是否由推断得到
    pub fn is_inferred(&self) -> bool {
        self.is_inferred
    }

    pub fn is_required(&self) -> bool {
        self.info.is_required()
    }

    pub fn info(&self) -> &BindingInfo {
        &self.info
    }
}

/// 一个处理器的全部成员绑定
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerBindings {
    handler: Cow<'static, str>,
    parameters: Vec<ParameterBinding>,
}

impl HandlerBindings {
    /// 解析成员描述
    ///
    /// 没有显式数据源的成员按路由模板推断，推断被关闭时使用 `MODEL_BINDING`。
    /// 多于一个成员从请求体绑定时失败。
    pub fn build(
        handler: impl Into<Cow<'static, str>>,
        members: Vec<MemberDescriptor>,
        route_templates: &[&str],
        options: &MvcOptions,
    ) -> ConfigurationResult<Self> {
        let handler = handler.into();
        let mut parameters = Vec::with_capacity(members.len());

        for member in members {
            let info = BindingInfo::from_attributes(&member.name, &member.attributes)?;

            let (binding_source, is_inferred) = match info.binding_source() {
                Some(source) => (source.clone(), false),
                None if options.suppress_inferred_binding_sources => {
                    (BindingSource::MODEL_BINDING, false)
                }
                None => {
                    let name = info.binder_model_name().unwrap_or(&member.name);
                    let inferred = infer_binding_source(name, member.kind, route_templates);
                    tracing::debug!(
                        handler = %handler,
                        member = %member.name,
                        source = inferred.id(),
                        "Inferred binding source"
                    );
                    (inferred, true)
                }
            };

            parameters.push(ParameterBinding {
                member_name: member.name,
                kind: member.kind,
                info,
                binding_source,
                is_inferred,
            });
        }

        let body_members: Vec<String> = parameters
            .iter()
            .filter(|p| p.binding_source == BindingSource::BODY)
            .map(|p| p.member_name.to_string())
            .collect();

        if body_members.len() > 1 {
            return Err(ConfigurationError::MultipleBodyParameters {
                handler: handler.to_string(),
                members: body_members,
            });
        }

        Ok(Self {
            handler,
            parameters,
        })
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn get(&self, member: &str) -> Option<&ParameterBinding> {
        self.parameters.iter().find(|p| p.member_name == member)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterBinding> {
        self.parameters.iter()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// 从请求体绑定的成员
    pub fn body_parameter(&self) -> Option<&ParameterBinding> {
        self.parameters
            .iter()
            .find(|p| p.binding_source == BindingSource::BODY)
    }
}

/// 提供成员描述的处理器输入类型
pub trait BindingMetadataProvider {
    /// 处理器名称，用于错误信息
    fn handler_name() -> &'static str;

    fn member_descriptors() -> Vec<MemberDescriptor>;
}

/// 以默认选项解析处理器输入类型的绑定
pub fn describe<T: BindingMetadataProvider>(
    route_templates: &[&str],
) -> ConfigurationResult<HandlerBindings> {
    describe_with::<T>(route_templates, &MvcOptions::default())
}

pub fn describe_with<T: BindingMetadataProvider>(
    route_templates: &[&str],
    options: &MvcOptions,
) -> ConfigurationResult<HandlerBindings> {
    HandlerBindings::build(
        T::handler_name(),
        T::member_descriptors(),
        route_templates,
        options,
    )
}
