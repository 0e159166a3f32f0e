//! 数据源推断
//!
//! 没有显式数据源注解的成员按类型和路由模板推断：
//!
//! 1. 取消令牌 → `SPECIAL`
//! 2. 复杂类型、集合 → `BODY`
//! 3. 名称出现在每一个路由模板中的简单类型 → `PATH`
//! 4. 其它 → `QUERY`

use super::metadata::ParameterKind;
use super::source::BindingSource;

/// 推断成员的数据源
pub fn infer_binding_source(
    name: &str,
    kind: ParameterKind,
    route_templates: &[&str],
) -> BindingSource {
    match kind {
        ParameterKind::CancellationToken => BindingSource::SPECIAL,
        ParameterKind::Complex | ParameterKind::Collection => BindingSource::BODY,
        ParameterKind::Simple if exists_in_all_routes(name, route_templates) => {
            BindingSource::PATH
        }
        ParameterKind::Simple => BindingSource::QUERY,
    }
}

fn exists_in_all_routes(name: &str, route_templates: &[&str]) -> bool {
    !route_templates.is_empty()
        && route_templates.iter().all(|template| {
            route_parameter_names(template)
                .any(|parameter| parameter.eq_ignore_ascii_case(name))
        })
}

/// 提取路由模板中的参数名
///
/// 支持 `{id}`、`{id?}`、`{id:int}`、`{id=5}`、`{*path}`、`{**path}`，
/// `{{` `}}` 为转义的花括号。
pub fn route_parameter_names(template: &str) -> impl Iterator<Item = &str> {
    let mut rest = template;
    std::iter::from_fn(move || loop {
        let start = rest.find('{')?;
        if rest[start..].starts_with("{{") {
            rest = &rest[start + 2..];
            continue;
        }

        let end = start + rest[start..].find('}')?;
        let token = &rest[start + 1..end];
        rest = &rest[end + 1..];

        let name = token
            .trim_start_matches('*')
            .split(|c| matches!(c, ':' | '=' | '?'))
            .next()
            .unwrap_or_default()
            .trim();

        if !name.is_empty() {
            return Some(name);
        }
    })
}
