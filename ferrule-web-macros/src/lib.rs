//! Ferrule Web Macros
//!
//! 提供绑定元数据相关的过程宏

mod binding_metadata;
mod utils;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;

/// BindingMetadata 派生宏
///
/// 为处理器输入结构体生成 `BindingMetadataProvider` 实现，每个字段成为一个成员，
/// 字段上的注解声明数据源。
///
/// # 支持的注解
///
/// - `#[from_query]`、`#[from_header]`、`#[from_route]`、`#[from_form]` - 可选 `name = "..."`
/// - `#[from_body]` - 可选 `empty_body = "allow" | "disallow" | "default"`
/// - `#[from_services]`
/// - `#[from_sources(query, route, name = "...")]` - 从多个数据源读取
/// - `#[model_binder(binder = MyBinder, name = "...")]`
/// - `#[bind_required]`
/// - 结构体上的 `#[binding(handler = "...")]` - 覆盖错误信息中的处理器名称
///
/// 没有数据源注解的字段在注册期按类型和路由模板推断。
///
/// # 示例
///
/// ```ignore
/// #[derive(BindingMetadata)]
/// struct GetOrder {
///     #[from_route]
///     id: u64,
///
///     #[from_header(name = "X-Trace")]
///     trace_id: String,
///
///     page: Option<u32>,
/// }
/// ```
#[proc_macro_derive(
    BindingMetadata,
    attributes(
        binding,
        from_query,
        from_header,
        from_route,
        from_form,
        from_body,
        from_services,
        from_sources,
        model_binder,
        bind_required
    )
)]
#[proc_macro_error]
pub fn derive_binding_metadata(input: TokenStream) -> TokenStream {
    binding_metadata::derive_binding_metadata_impl(input)
}
