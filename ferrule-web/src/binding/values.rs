//! 按数据源读取请求中的命名值
//!
//! 外部 binder 通过 [`select_value`] 拿到原始字符串，类型转换由 binder 完成。
//! 贪婪或不来自请求的数据源（Body、Services ...）在这里总是返回 `None`，
//! Header 虽然是贪婪数据源，但仍支持按名称读取单个请求头。

use super::metadata::ParameterBinding;
use super::source::BindingSource;

/// 请求中可以按名称读取的值
pub trait RequestValues {
    fn query_value(&self, name: &str) -> Option<&str>;

    fn header_value(&self, name: &str) -> Option<&str>;

    fn route_value(&self, name: &str) -> Option<&str>;

    fn form_value(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// 根据成员绑定读取值
pub fn select_value<'r, V>(binding: &ParameterBinding, values: &'r V) -> Option<&'r str>
where
    V: RequestValues + ?Sized,
{
    read_from(binding.binding_source(), binding.binding_name(), values)
}

/// 从指定数据源读取命名值
///
/// 组合数据源依次尝试成员，`MODEL_BINDING` 依次尝试 Path、Query、Form。
pub fn read_from<'r, V>(source: &BindingSource, name: &str, values: &'r V) -> Option<&'r str>
where
    V: RequestValues + ?Sized,
{
    if let Some(members) = source.members() {
        return members.iter().find_map(|m| read_from(m, name, values));
    }

    match source.id() {
        "Path" => values.route_value(name),
        "Query" => values.query_value(name),
        "Form" => values.form_value(name),
        "Header" => values.header_value(name),
        "ModelBinding" => [BindingSource::PATH, BindingSource::QUERY, BindingSource::FORM]
            .iter()
            .find_map(|s| read_from(s, name, values)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingAttribute, HandlerBindings, MemberDescriptor, ParameterKind};
    use crate::options::MvcOptions;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Values {
        query: HashMap<&'static str, &'static str>,
        headers: HashMap<&'static str, &'static str>,
        route: HashMap<&'static str, &'static str>,
    }

    impl RequestValues for Values {
        fn query_value(&self, name: &str) -> Option<&str> {
            self.query.get(name).copied()
        }

        fn header_value(&self, name: &str) -> Option<&str> {
            self.headers.get(name).copied()
        }

        fn route_value(&self, name: &str) -> Option<&str> {
            self.route.get(name).copied()
        }
    }

    fn values() -> Values {
        let mut values = Values::default();
        values.query.insert("id", "from-query");
        values.query.insert("page", "3");
        values.route.insert("id", "from-route");
        values.headers.insert("X-Trace", "abc");
        values
    }

    #[test]
    fn test_select_value_reads_named_header() {
        let bindings = HandlerBindings::build(
            "Trace",
            vec![MemberDescriptor::new("trace_id", ParameterKind::Simple)
                .with_attribute(BindingAttribute::from_header().named("X-Trace"))],
            &[],
            &MvcOptions::default(),
        )
        .unwrap();

        let binding = bindings.get("trace_id").unwrap();
        assert_eq!(select_value(binding, &values()), Some("abc"));
    }

    #[test]
    fn test_read_from_concrete_sources() {
        let values = values();
        assert_eq!(read_from(&BindingSource::QUERY, "id", &values), Some("from-query"));
        assert_eq!(read_from(&BindingSource::PATH, "id", &values), Some("from-route"));
        assert_eq!(read_from(&BindingSource::FORM, "id", &values), None);
        assert_eq!(read_from(&BindingSource::BODY, "id", &values), None);
        assert_eq!(read_from(&BindingSource::SERVICES, "id", &values), None);
    }

    #[test]
    fn test_read_from_composite_follows_precedence() {
        let values = values();
        let composite =
            BindingSource::composite([BindingSource::QUERY, BindingSource::PATH], "any").unwrap();

        assert_eq!(read_from(&composite, "id", &values), Some("from-route"));
        assert_eq!(read_from(&composite, "page", &values), Some("3"));
        assert_eq!(read_from(&composite, "missing", &values), None);
    }

    #[test]
    fn test_read_from_model_binding() {
        let values = values();
        assert_eq!(
            read_from(&BindingSource::MODEL_BINDING, "id", &values),
            Some("from-route")
        );
        assert_eq!(read_from(&BindingSource::MODEL_BINDING, "X-Trace", &values), None);
    }
}
