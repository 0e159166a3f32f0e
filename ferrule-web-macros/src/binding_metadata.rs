//! BindingMetadata 派生宏实现

use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use proc_macro_error::abort;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Type};

use crate::utils::{classify_type, FieldKind};

pub fn derive_binding_metadata_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => {
                return expand(&input, Vec::new());
            }
            _ => abort!(
                name.span(),
                "BindingMetadata only supports structs with named fields"
            ),
        },
        _ => abort!(name.span(), "BindingMetadata can only be derived for structs"),
    };

    let mut members = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let member_name = ident.unraw().to_string();
        let kind = kind_tokens(classify_type(&field.ty));
        let attributes = field
            .attrs
            .iter()
            .filter_map(binding_attribute_tokens)
            .collect::<Vec<_>>();

        members.push(quote! {
            ::ferrule_web::binding::MemberDescriptor::new(#member_name, #kind)
                #(.with_attribute(#attributes))*
        });
    }

    expand(&input, members)
}

fn expand(input: &DeriveInput, members: Vec<TokenStream2>) -> TokenStream {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let handler = handler_name(input);

    let expanded = quote! {
        impl #impl_generics ::ferrule_web::binding::BindingMetadataProvider for #name #ty_generics #where_clause {
            fn handler_name() -> &'static str {
                #handler
            }

            fn member_descriptors() -> ::std::vec::Vec<::ferrule_web::binding::MemberDescriptor> {
                ::std::vec![#(#members),*]
            }
        }
    };

    TokenStream::from(expanded)
}

/// 处理器名称：`#[binding(handler = "...")]`，否则为结构体名
fn handler_name(input: &DeriveInput) -> LitStr {
    let mut handler = LitStr::new(&input.ident.to_string(), input.ident.span());

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("binding")) {
        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("handler") {
                handler = meta.value()?.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported binding option, expected `handler`"))
            }
        });
        if let Err(err) = result {
            abort!(err.span(), "{}", err);
        }
    }

    handler
}

fn kind_tokens(kind: FieldKind) -> TokenStream2 {
    let variant = match kind {
        FieldKind::Simple => quote!(Simple),
        FieldKind::Complex => quote!(Complex),
        FieldKind::Collection => quote!(Collection),
        FieldKind::CancellationToken => quote!(CancellationToken),
    };
    quote!(::ferrule_web::binding::ParameterKind::#variant)
}

/// 将字段注解转换为 `BindingAttribute` 表达式，非绑定注解返回 `None`
fn binding_attribute_tokens(attr: &Attribute) -> Option<TokenStream2> {
    let ident = attr.path().get_ident()?.to_string();
    let path = quote!(::ferrule_web::binding::BindingAttribute);

    let tokens = match ident.as_str() {
        "from_query" => {
            let name = option_tokens(parse_name_only(attr));
            quote!(#path::FromQuery { name: #name })
        }
        "from_header" => {
            let name = option_tokens(parse_name_only(attr));
            quote!(#path::FromHeader { name: #name })
        }
        "from_route" => {
            let name = option_tokens(parse_name_only(attr));
            quote!(#path::FromRoute { name: #name })
        }
        "from_form" => {
            let name = option_tokens(parse_name_only(attr));
            quote!(#path::FromForm { name: #name })
        }
        "from_body" => {
            let behavior = parse_empty_body(attr);
            quote!(#path::FromBody {
                empty_body_behavior: ::ferrule_web::binding::EmptyBodyBehavior::#behavior
            })
        }
        "from_services" => {
            ensure_no_arguments(attr);
            quote!(#path::FromServices)
        }
        "from_sources" => {
            let (sources, name) = parse_sources(attr);
            let name = option_tokens(name);
            quote!(#path::FromSources {
                sources: ::std::vec![#(::ferrule_web::binding::BindingSource::#sources),*],
                name: #name,
            })
        }
        "model_binder" => {
            let (binder, name) = parse_model_binder(attr);
            let base = match binder {
                Some(ty) => quote!(::ferrule_web::adapters::ModelBinderAttribute::of::<#ty>()),
                None => quote!(<::ferrule_web::adapters::ModelBinderAttribute as ::std::default::Default>::default()),
            };
            let with_name = name.map(|n| quote!(.with_name(#n)));
            quote!(#path::ModelBinder(#base #with_name))
        }
        "bind_required" => {
            ensure_no_arguments(attr);
            quote!(#path::BindRequired)
        }
        _ => return None,
    };

    Some(tokens)
}

fn option_tokens(value: Option<LitStr>) -> TokenStream2 {
    match value {
        Some(lit) => quote!(::std::option::Option::Some(::std::string::String::from(#lit))),
        None => quote!(::std::option::Option::None),
    }
}

fn has_arguments(attr: &Attribute) -> bool {
    matches!(attr.meta, syn::Meta::List(_))
}

fn ensure_no_arguments(attr: &Attribute) {
    if has_arguments(attr) {
        abort!(attr, "this attribute does not take arguments");
    }
}

/// `#[from_xxx]` 或 `#[from_xxx(name = "...")]`
fn parse_name_only(attr: &Attribute) -> Option<LitStr> {
    if !has_arguments(attr) {
        return None;
    }

    let mut name = None;
    let result = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            Err(meta.error("unsupported option, expected `name = \"...\"`"))
        }
    });
    if let Err(err) = result {
        abort!(err.span(), "{}", err);
    }
    name
}

/// `#[from_body(empty_body = "allow")]`
fn parse_empty_body(attr: &Attribute) -> TokenStream2 {
    let mut behavior = quote!(Default);
    if !has_arguments(attr) {
        return behavior;
    }

    let result = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("empty_body") {
            let value = meta.value()?.parse::<LitStr>()?;
            behavior = match value.value().as_str() {
                "default" => quote!(Default),
                "allow" => quote!(Allow),
                "disallow" => quote!(Disallow),
                other => {
                    return Err(syn::Error::new(
                        value.span(),
                        format!(
                            "unknown empty body behavior '{}', expected allow, disallow or default",
                            other
                        ),
                    ))
                }
            };
            Ok(())
        } else {
            Err(meta.error("unsupported option, expected `empty_body = \"...\"`"))
        }
    });
    if let Err(err) = result {
        abort!(err.span(), "{}", err);
    }
    behavior
}

/// `#[from_sources(query, route, name = "...")]`
fn parse_sources(attr: &Attribute) -> (Vec<syn::Ident>, Option<LitStr>) {
    let mut sources = Vec::new();
    let mut name = None;

    let result = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            return Ok(());
        }

        let source = meta
            .path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default();
        let constant = match source.as_str() {
            "query" => "QUERY",
            "route" | "path" => "PATH",
            "form" => "FORM",
            "form_file" => "FORM_FILE",
            "header" => "HEADER",
            "body" => "BODY",
            "custom" => "CUSTOM",
            "services" => "SERVICES",
            "special" => "SPECIAL",
            _ => return Err(meta.error("unknown binding source")),
        };
        sources.push(syn::Ident::new(constant, Span::call_site()));
        Ok(())
    });
    if let Err(err) = result {
        abort!(err.span(), "{}", err);
    }

    if sources.is_empty() {
        abort!(attr, "from_sources requires at least one source");
    }
    (sources, name)
}

/// `#[model_binder(binder = Type, name = "...")]`
fn parse_model_binder(attr: &Attribute) -> (Option<Type>, Option<LitStr>) {
    let mut binder = None;
    let mut name = None;
    if !has_arguments(attr) {
        return (binder, name);
    }

    let result = attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("binder") {
            binder = Some(meta.value()?.parse::<Type>()?);
            Ok(())
        } else if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else {
            Err(meta.error("unsupported option, expected `binder` or `name`"))
        }
    });
    if let Err(err) = result {
        abort!(err.span(), "{}", err);
    }
    (binder, name)
}
