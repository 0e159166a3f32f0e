//! 数据源定义
//!
//! [`BindingSource`] 描述处理器输入值的来源（Query、Header、Path、Body ...），
//! 以及用于校验组合配置的两个能力标记：
//!
//! - `is_greedy` - 是否消费整个请求（例如 Body），而不是按名称读取其中一个片段
//! - `is_from_request` - 值是否真实地随请求传输（Services、Special 不是）

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{ConfigurationError, ConfigurationResult};

/// 组合数据源 id 的分隔符
const COMPOSITE_SEPARATOR: &str = "&";

/// 处理器输入值的来源
///
/// 两个数据源仅当 `id` 相同时才可互换，相等性和哈希只看 `id`。
#[derive(Clone)]
pub struct BindingSource {
    id: Cow<'static, str>,
    display_name: Cow<'static, str>,
    is_greedy: bool,
    is_from_request: bool,
    /// 组合数据源的成员，按解析优先级排序
    members: Option<Arc<[BindingSource]>>,
}

impl BindingSource {
    /// 请求体，整体消费
    pub const BODY: BindingSource = BindingSource::new_static("Body", "Body", true, true);

    /// 自定义 binder 负责读取
    pub const CUSTOM: BindingSource = BindingSource::new_static("Custom", "Custom", true, true);

    /// 表单字段
    pub const FORM: BindingSource = BindingSource::new_static("Form", "Form", false, true);

    /// 上传的文件
    pub const FORM_FILE: BindingSource =
        BindingSource::new_static("FormFile", "FormFile", true, true);

    /// 请求头
    pub const HEADER: BindingSource = BindingSource::new_static("Header", "Header", true, true);

    /// 通用数据源，可以接受任意非贪婪的请求内数据源
    pub const MODEL_BINDING: BindingSource =
        BindingSource::new_static("ModelBinding", "ModelBinding", false, true);

    /// 路由参数
    pub const PATH: BindingSource = BindingSource::new_static("Path", "Path", false, true);

    /// 路由参数，[`BindingSource::PATH`] 的别名
    pub const ROUTE: BindingSource = BindingSource::PATH;

    /// 查询字符串
    pub const QUERY: BindingSource = BindingSource::new_static("Query", "Query", false, true);

    /// 由服务容器提供
    pub const SERVICES: BindingSource =
        BindingSource::new_static("Services", "Services", true, false);

    /// 框架特殊值，例如取消令牌
    pub const SPECIAL: BindingSource = BindingSource::new_static("Special", "Special", true, false);

    /// 创建编译期常量数据源
    pub const fn new_static(
        id: &'static str,
        display_name: &'static str,
        is_greedy: bool,
        is_from_request: bool,
    ) -> Self {
        Self {
            id: Cow::Borrowed(id),
            display_name: Cow::Borrowed(display_name),
            is_greedy,
            is_from_request,
            members: None,
        }
    }

    /// 创建自定义数据源
    pub fn new(
        id: impl Into<Cow<'static, str>>,
        display_name: impl Into<Cow<'static, str>>,
        is_greedy: bool,
        is_from_request: bool,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            is_greedy,
            is_from_request,
            members: None,
        }
    }

    /// 将多个非贪婪、来自请求的数据源组合为一个
    ///
    /// 重复的成员会被去重，成员按 [`precedence`](Self::precedence) 排序。
    pub fn composite(
        sources: impl IntoIterator<Item = BindingSource>,
        display_name: impl Into<Cow<'static, str>>,
    ) -> ConfigurationResult<Self> {
        let display_name = display_name.into();
        let invalid = |reason: String| ConfigurationError::InvalidCompositeSource {
            display_name: display_name.to_string(),
            reason,
        };

        let mut members: Vec<BindingSource> = Vec::new();
        for source in sources {
            if source.is_composite() {
                return Err(invalid(format!("'{}' is already a composite source", source.id)));
            }
            if source.is_greedy {
                return Err(invalid(format!(
                    "'{}' is greedy and consumes the whole request",
                    source.id
                )));
            }
            if !source.is_from_request {
                return Err(invalid(format!("'{}' is not read from the request", source.id)));
            }
            if !members.contains(&source) {
                members.push(source);
            }
        }

        if members.is_empty() {
            return Err(invalid("no member sources".to_string()));
        }

        members.sort_by(|a, b| {
            a.precedence()
                .cmp(&b.precedence())
                .then_with(|| a.id.cmp(&b.id))
        });

        let id = members
            .iter()
            .map(|m| m.id.as_ref())
            .collect::<Vec<_>>()
            .join(COMPOSITE_SEPARATOR);

        Ok(Self {
            id: Cow::Owned(id),
            display_name,
            is_greedy: false,
            is_from_request: true,
            members: Some(members.into()),
        })
    }

    /// 替换显示名称
    pub(crate) fn with_display_name(mut self, display_name: impl Into<Cow<'static, str>>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_greedy(&self) -> bool {
        self.is_greedy
    }

    pub fn is_from_request(&self) -> bool {
        self.is_from_request
    }

    pub fn is_composite(&self) -> bool {
        self.members.is_some()
    }

    /// 组合数据源的成员（按解析顺序）；非组合数据源返回 `None`
    pub fn members(&self) -> Option<&[BindingSource]> {
        self.members.as_deref()
    }

    /// 当 binder 被配置为当前数据源时，是否可以接受来自 `other` 的数据
    ///
    /// - 自反：任何非组合数据源都接受自身
    /// - `MODEL_BINDING` 接受所有非贪婪、来自请求的数据源
    /// - 组合数据源接受其任一成员能接受的数据源
    /// - 其它情况一律不接受，因此 `BODY` 与其它任何数据源互不接受
    ///
    /// `other` 必须是具体的数据源，传入组合数据源时返回 `false`。
    pub fn can_accept_data_from(&self, other: &BindingSource) -> bool {
        if other.is_composite() {
            return false;
        }

        if let Some(members) = &self.members {
            return members.iter().any(|m| m.can_accept_data_from(other));
        }

        if self == other {
            return true;
        }

        if *self == Self::MODEL_BINDING {
            return !other.is_greedy && other.is_from_request;
        }

        false
    }

    /// 解析优先级，数值越小越先被查询
    ///
    /// 顺序：Path、Query、Form、FormFile、Header、Body、Custom、ModelBinding、
    /// Services、Special；未知的自定义数据源排在所有内置数据源之后。
    pub fn precedence(&self) -> u8 {
        match self.id.as_ref() {
            "Path" => 0,
            "Query" => 1,
            "Form" => 2,
            "FormFile" => 3,
            "Header" => 4,
            "Body" => 5,
            "Custom" => 6,
            "ModelBinding" => 7,
            "Services" => 8,
            "Special" => 9,
            _ => u8::MAX,
        }
    }
}

impl PartialEq for BindingSource {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BindingSource {}

impl Hash for BindingSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSource")
            .field("id", &self.id)
            .field("is_greedy", &self.is_greedy)
            .field("is_from_request", &self.is_from_request)
            .finish()
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtins() -> Vec<BindingSource> {
        vec![
            BindingSource::BODY,
            BindingSource::CUSTOM,
            BindingSource::FORM,
            BindingSource::FORM_FILE,
            BindingSource::HEADER,
            BindingSource::MODEL_BINDING,
            BindingSource::PATH,
            BindingSource::QUERY,
            BindingSource::SERVICES,
            BindingSource::SPECIAL,
        ]
    }

    #[test]
    fn test_can_accept_data_from_is_reflexive() {
        for source in builtins() {
            assert!(source.can_accept_data_from(&source), "{} should accept itself", source);
        }
    }

    #[test]
    fn test_body_is_exclusive_in_both_directions() {
        for other in builtins().into_iter().filter(|s| *s != BindingSource::BODY) {
            assert!(!BindingSource::BODY.can_accept_data_from(&other), "Body accepted {}", other);
            assert!(!other.can_accept_data_from(&BindingSource::BODY), "{} accepted Body", other);
        }
    }

    #[test]
    fn test_model_binding_accepts_non_greedy_request_sources() {
        let any = BindingSource::MODEL_BINDING;
        assert!(any.can_accept_data_from(&BindingSource::QUERY));
        assert!(any.can_accept_data_from(&BindingSource::PATH));
        assert!(any.can_accept_data_from(&BindingSource::FORM));
        assert!(!any.can_accept_data_from(&BindingSource::HEADER));
        assert!(!any.can_accept_data_from(&BindingSource::SERVICES));

        // 具体数据源只接受自身
        assert!(!BindingSource::QUERY.can_accept_data_from(&any));
        assert!(!BindingSource::QUERY.can_accept_data_from(&BindingSource::PATH));
    }

    #[test]
    fn test_route_is_an_alias_of_path() {
        assert_eq!(BindingSource::ROUTE, BindingSource::PATH);
        assert!(BindingSource::ROUTE.can_accept_data_from(&BindingSource::PATH));
    }

    #[test]
    fn test_equality_is_by_id() {
        let custom = BindingSource::new("Query", "Another query", true, false);
        assert_eq!(custom, BindingSource::QUERY);
        assert_ne!(BindingSource::QUERY, BindingSource::FORM);
    }

    #[test]
    fn test_composite_orders_members_by_precedence() {
        let composite = BindingSource::composite(
            [BindingSource::FORM, BindingSource::QUERY, BindingSource::PATH, BindingSource::QUERY],
            "FromAnywhere",
        )
        .unwrap();

        assert_eq!(composite.id(), "Path&Query&Form");
        assert_eq!(composite.display_name(), "FromAnywhere");
        assert!(!composite.is_greedy());
        assert!(composite.is_from_request());
        assert_eq!(
            composite.members().unwrap(),
            &[BindingSource::PATH, BindingSource::QUERY, BindingSource::FORM]
        );

        assert!(composite.can_accept_data_from(&BindingSource::QUERY));
        assert!(!composite.can_accept_data_from(&BindingSource::HEADER));
        assert!(!composite.can_accept_data_from(&composite));
    }

    #[test]
    fn test_composite_with_model_binding_accepts_what_model_binding_accepts() {
        let composite = BindingSource::composite(
            [BindingSource::MODEL_BINDING, BindingSource::QUERY],
            "QueryOrAny",
        )
        .unwrap();

        assert_eq!(composite.id(), "Query&ModelBinding");
        assert!(composite.can_accept_data_from(&BindingSource::PATH));
        assert!(composite.can_accept_data_from(&BindingSource::FORM));
        assert!(composite.can_accept_data_from(&BindingSource::MODEL_BINDING));
        assert!(!composite.can_accept_data_from(&BindingSource::BODY));
        assert!(!composite.can_accept_data_from(&BindingSource::HEADER));
    }

    #[test]
    fn test_composite_rejects_invalid_members() {
        let greedy = BindingSource::composite([BindingSource::QUERY, BindingSource::BODY], "x");
        assert!(matches!(
            greedy,
            Err(ConfigurationError::InvalidCompositeSource { ref reason, .. }) if reason.contains("'Body' is greedy")
        ));

        let not_from_request = BindingSource::composite(
            [BindingSource::new("Cache", "Cache", false, false)],
            "x",
        );
        assert!(not_from_request.is_err());

        let empty = BindingSource::composite(Vec::new(), "x");
        assert!(empty.is_err());

        let inner =
            BindingSource::composite([BindingSource::QUERY, BindingSource::FORM], "inner").unwrap();
        assert!(BindingSource::composite([inner], "outer").is_err());
    }

    #[test]
    fn test_precedence_is_total_for_builtins() {
        let mut sources = builtins();
        sources.sort_by_key(|s| s.precedence());
        let ids: Vec<_> = sources.iter().map(|s| s.id().to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "Path", "Query", "Form", "FormFile", "Header", "Body", "Custom",
                "ModelBinding", "Services", "Special"
            ]
        );
        assert_eq!(BindingSource::new("Cookie", "Cookie", false, true).precedence(), u8::MAX);
    }
}
