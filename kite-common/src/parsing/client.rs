use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Ident, LitStr, Token, Type};

use crate::types::{ClientConfig, ComponentModel};

impl Parse for ClientConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut base_url = None;
        let mut suffix = None;
        let mut client = None;
        let mut converter = None;
        let mut component = None;

        let pairs = Punctuated::<syn::Meta, Token![,]>::parse_terminated(input)?;
        for meta in pairs {
            match meta {
                syn::Meta::NameValue(nv) => {
                    if nv.path.is_ident("base_url") {
                        base_url = Some(parse_string_value(&nv.value, "base_url")?);
                    } else if nv.path.is_ident("suffix") {
                        suffix = Some(parse_suffix_value(&nv.value)?);
                    } else if nv.path.is_ident("client") {
                        client = Some(parse_type_value(&nv.value, "client")?);
                    } else if nv.path.is_ident("converter") {
                        converter = Some(parse_type_value(&nv.value, "converter")?);
                    } else if nv.path.is_ident("component") {
                        component = Some(parse_component_value(&nv.value)?);
                    } else {
                        return Err(syn::Error::new_spanned(
                            nv.path,
                            "Only 'base_url', 'suffix', 'client', 'converter' or 'component' are supported",
                        ));
                    }
                }
                _ => {
                    return Err(syn::Error::new_spanned(meta, "Expected key-value pair"));
                }
            }
        }

        let converter =
            converter.ok_or_else(|| syn::Error::new(input.span(), "Missing required 'converter' parameter"))?;
        let (component, component_span) = component.unwrap_or((ComponentModel::Standalone, Span::call_site()));

        Ok(ClientConfig {
            base_url,
            suffix,
            client,
            converter,
            component,
            component_span,
        })
    }
}

fn parse_string_value(value: &syn::Expr, key: &str) -> syn::Result<LitStr> {
    if let syn::Expr::Lit(syn::ExprLit {
        lit: syn::Lit::Str(lit),
        ..
    }) = value
    {
        Ok(lit.clone())
    } else {
        Err(syn::Error::new_spanned(
            value,
            format!("{key} must be a string literal"),
        ))
    }
}

fn parse_suffix_value(value: &syn::Expr) -> syn::Result<LitStr> {
    let lit = parse_string_value(value, "suffix")?;
    let suffix = lit.value();
    // 后缀拼在 trait 名之后，必须仍是合法标识符
    if suffix.is_empty() || syn::parse_str::<Ident>(&format!("X{suffix}")).is_err() {
        return Err(syn::Error::new_spanned(
            &lit,
            "suffix must be a non-empty identifier fragment",
        ));
    }
    Ok(lit)
}

fn parse_type_value(value: &syn::Expr, key: &str) -> syn::Result<Type> {
    if let syn::Expr::Path(expr_path) = value {
        Ok(Type::Path(syn::TypePath {
            qself: expr_path.qself.clone(),
            path: expr_path.path.clone(),
        }))
    } else {
        Err(syn::Error::new_spanned(
            value,
            format!("{key} must be a type path"),
        ))
    }
}

fn parse_component_value(value: &syn::Expr) -> syn::Result<(ComponentModel, Span)> {
    let model = match value {
        syn::Expr::Path(expr_path) => expr_path
            .path
            .get_ident()
            .and_then(|ident| ComponentModel::from_name(&ident.to_string())),
        syn::Expr::Lit(syn::ExprLit {
            lit: syn::Lit::Str(lit),
            ..
        }) => ComponentModel::from_name(&lit.value()),
        _ => None,
    };
    model.map(|model| (model, value.span())).ok_or_else(|| {
        syn::Error::new_spanned(
            value,
            "component must be one of 'standalone', 'dagger', 'jsr330' or 'spring'",
        )
    })
}

/// 解析 `#[rest_client(...)]` 参数的公共函数
pub fn parse_client_config(input: ParseStream) -> syn::Result<ClientConfig> {
    ClientConfig::parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    #[test]
    fn test_parse_full_config() {
        let tokens = quote! {
            base_url = "https://api.example.com",
            suffix = "Client",
            client = my::Transport,
            converter = kite_common::JsonConverterFactory,
            component = standalone,
        };
        let config = syn::parse2::<ClientConfig>(tokens).unwrap();
        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.suffix(), "Client");
        let client = config.client_type();
        assert_eq!(quote!(#client).to_string(), quote!(my::Transport).to_string());
        let converter = &config.converter;
        assert_eq!(
            quote!(#converter).to_string(),
            quote!(kite_common::JsonConverterFactory).to_string()
        );
        assert_eq!(config.component, ComponentModel::Standalone);
    }

    #[test]
    fn test_converter_is_required() {
        let tokens = quote! { base_url = "https://api.example.com" };
        let result = syn::parse2::<ClientConfig>(tokens);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("Missing required 'converter' parameter"));
        }
    }

    #[test]
    fn test_component_models() {
        let tokens = quote! { converter = Json, component = spring };
        let config = syn::parse2::<ClientConfig>(tokens).unwrap();
        assert_eq!(config.component, ComponentModel::Spring);

        let tokens = quote! { converter = Json, component = "dagger" };
        let config = syn::parse2::<ClientConfig>(tokens).unwrap();
        assert_eq!(config.component, ComponentModel::Dagger);

        let tokens = quote! { converter = Json, component = guice };
        assert!(syn::parse2::<ClientConfig>(tokens).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let expr = parse_quote! { 123 };
        assert!(parse_string_value(&expr, "base_url").is_err());

        let expr = parse_quote! { "" };
        assert!(parse_suffix_value(&expr).is_err());
        let expr = parse_quote! { "-Impl" };
        assert!(parse_suffix_value(&expr).is_err());
        let expr = parse_quote! { "Service2" };
        assert_eq!(parse_suffix_value(&expr).unwrap().value(), "Service2");

        let tokens = quote! { converter = Json, timeout = 3 };
        let err = syn::parse2::<ClientConfig>(tokens).err().unwrap();
        assert!(err.to_string().contains("Only 'base_url'"));

        let tokens = quote! { converter = "Json" };
        assert!(syn::parse2::<ClientConfig>(tokens).is_err());
    }
}
