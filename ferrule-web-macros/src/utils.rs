//! 宏辅助工具函数

use syn::{GenericArgument, PathArguments, Type};

/// 字段类型的分类，对应 `ParameterKind`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Simple,
    Complex,
    Collection,
    CancellationToken,
}

/// 可以从单个字符串转换的类型
const SIMPLE_TYPES: &[&str] = &[
    "String", "str", "char", "bool", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "f32", "f64", "Uuid",
];

const COLLECTION_TYPES: &[&str] = &["Vec", "VecDeque", "HashSet", "BTreeSet", "LinkedList"];

/// 根据字段类型判断分类
pub fn classify_type(ty: &Type) -> FieldKind {
    match ty {
        Type::Reference(reference) => classify_type(&reference.elem),
        Type::Paren(paren) => classify_type(&paren.elem),
        Type::Group(group) => classify_type(&group.elem),
        Type::Array(_) | Type::Slice(_) => FieldKind::Collection,
        Type::Path(type_path) => {
            let Some(segment) = type_path.path.segments.last() else {
                return FieldKind::Complex;
            };
            let ident = segment.ident.to_string();

            if ident == "Option" {
                return first_type_argument(&segment.arguments)
                    .map(classify_type)
                    .unwrap_or(FieldKind::Complex);
            }
            if ident == "CancellationToken" {
                return FieldKind::CancellationToken;
            }
            if COLLECTION_TYPES.contains(&ident.as_str()) {
                return FieldKind::Collection;
            }
            if SIMPLE_TYPES.contains(&ident.as_str()) {
                return FieldKind::Simple;
            }
            FieldKind::Complex
        }
        _ => FieldKind::Complex,
    }
}

/// 提取 `Foo<T>` 中的 `T`
fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    if let PathArguments::AngleBracketed(args) = arguments {
        args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_classify_type() {
        assert_eq!(classify_type(&parse_quote!(u64)), FieldKind::Simple);
        assert_eq!(classify_type(&parse_quote!(Option<String>)), FieldKind::Simple);
        assert_eq!(classify_type(&parse_quote!(&'static str)), FieldKind::Simple);
        assert_eq!(classify_type(&parse_quote!(Vec<u32>)), FieldKind::Collection);
        assert_eq!(classify_type(&parse_quote!([u8; 4])), FieldKind::Collection);
        assert_eq!(
            classify_type(&parse_quote!(tokio_util::sync::CancellationToken)),
            FieldKind::CancellationToken
        );
        assert_eq!(classify_type(&parse_quote!(Order)), FieldKind::Complex);
        assert_eq!(classify_type(&parse_quote!(Option<Order>)), FieldKind::Complex);
    }
}
