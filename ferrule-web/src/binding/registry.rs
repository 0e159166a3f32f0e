//! 数据源注册表
//!
//! 进程级只读表：内置数据源加上通过 [`submit_binding_source!`](crate::submit_binding_source)
//! 在编译期提交的自定义数据源，首次访问时构建一次，之后可以被任意多个请求并发读取。

use once_cell::sync::Lazy;

use super::source::BindingSource;
use crate::error::{ConfigurationError, ConfigurationResult};

/// 自定义数据源提交结构
pub struct BindingSourceSubmission {
    pub id: &'static str,
    pub display_name: &'static str,
    pub is_greedy: bool,
    pub is_from_request: bool,
}

inventory::collect!(BindingSourceSubmission);

/// 在编译期向全局注册表提交一个自定义数据源
///
/// ```ignore
/// ferrule_web::submit_binding_source!("Cookie", "Cookie", greedy = false, from_request = true);
/// ```
#[macro_export]
macro_rules! submit_binding_source {
    ($id:expr, $display_name:expr, greedy = $greedy:expr, from_request = $from_request:expr) => {
        $crate::inventory::submit! {
            $crate::binding::BindingSourceSubmission {
                id: $id,
                display_name: $display_name,
                is_greedy: $greedy,
                is_from_request: $from_request,
            }
        }
    };
}

static GLOBAL_REGISTRY: Lazy<BindingSourceRegistry> = Lazy::new(|| {
    let mut registry = BindingSourceRegistry::builtin();
    for submission in inventory::iter::<BindingSourceSubmission> {
        registry.register(BindingSource::new_static(
            submission.id,
            submission.display_name,
            submission.is_greedy,
            submission.is_from_request,
        ));
    }
    tracing::debug!(sources = registry.len(), "Binding source registry initialized");
    registry
});

/// 数据源注册表
#[derive(Debug, Clone)]
pub struct BindingSourceRegistry {
    /// 按解析优先级排序
    sources: Vec<BindingSource>,
}

impl BindingSourceRegistry {
    /// 全局注册表
    pub fn global() -> &'static BindingSourceRegistry {
        &GLOBAL_REGISTRY
    }

    /// 仅包含内置数据源的注册表
    pub fn builtin() -> Self {
        let mut registry = Self {
            sources: Vec::with_capacity(10),
        };
        for source in [
            BindingSource::PATH,
            BindingSource::QUERY,
            BindingSource::FORM,
            BindingSource::FORM_FILE,
            BindingSource::HEADER,
            BindingSource::BODY,
            BindingSource::CUSTOM,
            BindingSource::MODEL_BINDING,
            BindingSource::SERVICES,
            BindingSource::SPECIAL,
        ] {
            registry.register(source);
        }
        registry
    }

    /// 注册数据源，id 已存在时忽略并返回 `false`
    pub fn register(&mut self, source: BindingSource) -> bool {
        if source.is_composite() {
            tracing::warn!(id = source.id(), "Composite binding sources cannot be registered");
            return false;
        }
        if self.sources.contains(&source) {
            tracing::warn!(id = source.id(), "Duplicate binding source ignored");
            return false;
        }

        self.sources.push(source);
        self.sources.sort_by(|a, b| {
            a.precedence()
                .cmp(&b.precedence())
                .then_with(|| a.id().cmp(b.id()))
        });
        true
    }

    pub fn get(&self, id: &str) -> Option<&BindingSource> {
        self.sources.iter().find(|s| s.id() == id)
    }

    pub fn contains(&self, source: &BindingSource) -> bool {
        self.sources.contains(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BindingSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// 校验一个输入声明的多个数据源能否组合，在注册期调用
    ///
    /// 单个数据源原样返回；多个数据源组合为 [`BindingSource::composite`]。
    /// 贪婪或不来自请求的数据源不能与其它数据源组合，未注册的数据源直接拒绝。
    pub fn combine(
        &self,
        member: &str,
        sources: &[BindingSource],
    ) -> ConfigurationResult<BindingSource> {
        let incompatible = |reason: String| ConfigurationError::IncompatibleBindingSources {
            member: member.to_string(),
            reason,
        };

        if let Some(unknown) = sources.iter().find(|s| !self.contains(s)) {
            return Err(incompatible(format!(
                "'{}' is not a registered binding source",
                unknown.id()
            )));
        }

        match sources {
            [] => Err(incompatible("no binding source declared".to_string())),
            [single] => Ok(single.clone()),
            many => {
                if let Some(exclusive) = many
                    .iter()
                    .find(|s| s.is_greedy() || !s.is_from_request())
                {
                    let others = many
                        .iter()
                        .filter(|s| *s != exclusive)
                        .map(|s| s.id())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(incompatible(format!(
                        "'{}' cannot be combined with {}",
                        exclusive.id(),
                        others
                    )));
                }

                let composite = BindingSource::composite(many.iter().cloned(), "")?;
                let display_name = composite
                    .members()
                    .unwrap_or_default()
                    .iter()
                    .map(|s| s.display_name())
                    .collect::<Vec<_>>()
                    .join(" or ");
                Ok(composite.with_display_name(display_name))
            }
        }
    }
}

impl Default for BindingSourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::submit_binding_source!("Cookie", "Cookie", greedy = false, from_request = true);

    #[test]
    fn test_global_registry_contains_builtins_and_submissions() {
        let registry = BindingSourceRegistry::global();
        assert!(registry.get("Body").is_some());
        assert!(registry.get("Path").is_some());

        let cookie = registry.get("Cookie").unwrap();
        assert!(!cookie.is_greedy());
        assert_eq!(registry.iter().last(), Some(cookie));
    }

    #[test]
    fn test_every_registered_source_accepts_itself() {
        for source in BindingSourceRegistry::global().iter() {
            assert!(source.can_accept_data_from(source));
        }
    }

    #[test]
    fn test_builtin_is_ordered_by_precedence() {
        let registry = BindingSourceRegistry::builtin();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.iter().next(), Some(&BindingSource::PATH));
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut registry = BindingSourceRegistry::builtin();
        assert!(!registry.register(BindingSource::new("Query", "Other", true, true)));
        assert!(registry.register(BindingSource::new("Session", "Session", false, true)));
        assert_eq!(registry.len(), 11);
        assert!(!registry.get("Query").unwrap().is_greedy());
    }

    #[test]
    fn test_combine_single_and_many() {
        let registry = BindingSourceRegistry::builtin();

        let single = registry.combine("id", &[BindingSource::QUERY]).unwrap();
        assert_eq!(single, BindingSource::QUERY);

        let combined = registry
            .combine("id", &[BindingSource::QUERY, BindingSource::PATH])
            .unwrap();
        assert_eq!(combined.id(), "Path&Query");
        assert_eq!(combined.display_name(), "Path or Query");
    }

    #[test]
    fn test_combine_with_model_binding_accepts_path() {
        let registry = BindingSourceRegistry::builtin();
        let combined = registry
            .combine("x", &[BindingSource::MODEL_BINDING, BindingSource::QUERY])
            .unwrap();

        assert_eq!(combined.id(), "Query&ModelBinding");
        assert_eq!(combined.display_name(), "Query or ModelBinding");
        assert!(combined.can_accept_data_from(&BindingSource::PATH));
    }

    #[test]
    fn test_combine_rejects_body_with_anything() {
        let registry = BindingSourceRegistry::builtin();
        let err = registry
            .combine("payload", &[BindingSource::BODY, BindingSource::QUERY])
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::IncompatibleBindingSources {
                member: "payload".to_string(),
                reason: "'Body' cannot be combined with Query".to_string(),
            }
        );
    }

    #[test]
    fn test_combine_rejects_unknown_and_empty() {
        let registry = BindingSourceRegistry::builtin();
        let unknown = BindingSource::new("Session", "Session", false, true);
        assert!(registry.combine("x", &[unknown]).is_err());
        assert!(registry.combine("x", &[]).is_err());
    }
}
