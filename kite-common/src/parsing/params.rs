use syn::parse::{Parse, ParseStream};
use syn::{Attribute, Expr, Ident, Lit, LitStr, Meta, Token, Type};

use crate::diagnostics::{Diagnostic, DiagnosticAnchor};
use crate::introspect::{TypeClass, TypeIntrospector};
use crate::types::{ParameterRole, RoleKind, ValueShape};

/// 参数角色标记的参数：`"name"`、`name = "name"`、`encoded`、`encoded = bool`
#[derive(Debug, Default)]
struct RoleArgs {
    name: Option<LitStr>,
    encoded: Option<Ident>,
}

impl Parse for RoleArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut args = RoleArgs::default();
        while !input.is_empty() {
            if input.peek(LitStr) {
                let lit: LitStr = input.parse()?;
                set_name(&mut args, lit)?;
            } else {
                let meta: Meta = input.parse()?;
                match meta {
                    Meta::Path(path) if path.is_ident("encoded") => {
                        args.encoded = path.get_ident().cloned();
                    }
                    Meta::NameValue(nv) if nv.path.is_ident("name") => match nv.value {
                        Expr::Lit(syn::ExprLit {
                            lit: Lit::Str(lit), ..
                        }) => set_name(&mut args, lit)?,
                        other => {
                            return Err(syn::Error::new_spanned(other, "name must be a string literal"));
                        }
                    },
                    Meta::NameValue(nv) if nv.path.is_ident("encoded") => match nv.value {
                        Expr::Lit(syn::ExprLit {
                            lit: Lit::Bool(flag), ..
                        }) => {
                            if flag.value {
                                args.encoded = nv.path.get_ident().cloned();
                            }
                        }
                        other => {
                            return Err(syn::Error::new_spanned(other, "encoded must be a boolean literal"));
                        }
                    },
                    other => {
                        return Err(syn::Error::new_spanned(
                            other,
                            "Only a name literal, 'name = \"...\"' or 'encoded' are supported",
                        ));
                    }
                }
            }
            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }
        Ok(args)
    }
}

fn set_name(args: &mut RoleArgs, lit: LitStr) -> syn::Result<()> {
    if args.name.is_some() {
        return Err(syn::Error::new_spanned(lit, "name specified more than once"));
    }
    if lit.value().trim().is_empty() {
        return Err(syn::Error::new_spanned(lit, "name must not be empty"));
    }
    args.name = Some(lit);
    Ok(())
}

/// 把参数上的角色标记解析成 `ParameterRole`
///
/// 未显式给出名称时使用参数名；`header` 必须带名称。
pub fn parse_role(attr: &Attribute, kind: RoleKind, param: &Ident) -> Result<ParameterRole, Diagnostic> {
    let args = match &attr.meta {
        Meta::Path(_) => RoleArgs::default(),
        Meta::List(list) => list.parse_args::<RoleArgs>().map_err(Diagnostic::from)?,
        Meta::NameValue(nv) => {
            return Err(Diagnostic::declaration(
                format!("{} does not take a value", kind.display_name()),
                DiagnosticAnchor::element(attr).with_value(&nv.value),
            ));
        }
    };

    let accepts_name = matches!(
        kind,
        RoleKind::Path | RoleKind::Query | RoleKind::Field | RoleKind::Part | RoleKind::Header
    );
    let accepts_encoded = matches!(
        kind,
        RoleKind::Path | RoleKind::Query | RoleKind::QueryMap | RoleKind::Field | RoleKind::FieldMap
    );
    if let Some(name) = args.name.as_ref().filter(|_| !accepts_name) {
        return Err(Diagnostic::declaration(
            format!("{} does not take a name", kind.display_name()),
            DiagnosticAnchor::element(attr).with_value(name),
        ));
    }
    if let Some(flag) = args.encoded.as_ref().filter(|_| !accepts_encoded) {
        return Err(Diagnostic::declaration(
            format!("{} does not support 'encoded'", kind.display_name()),
            DiagnosticAnchor::element(attr).with_value(flag),
        ));
    }

    let encoded = args.encoded.is_some();
    let explicit = args.name.as_ref().map(LitStr::value);
    let name = || explicit.clone().unwrap_or_else(|| param.to_string());

    let role = match kind {
        RoleKind::Path => ParameterRole::Path { name: name(), encoded },
        RoleKind::Query => ParameterRole::Query { name: name(), encoded },
        RoleKind::QueryMap => ParameterRole::QueryMap { encoded },
        RoleKind::Field => ParameterRole::Field { name: name(), encoded },
        RoleKind::FieldMap => ParameterRole::FieldMap { encoded },
        RoleKind::Part => ParameterRole::Part { name: name() },
        RoleKind::PartMap => ParameterRole::PartMap,
        RoleKind::Body => ParameterRole::Body,
        RoleKind::Url => ParameterRole::Url,
        RoleKind::Header => match explicit {
            Some(name) => ParameterRole::Header { name },
            None => {
                return Err(Diagnostic::declaration(
                    "@Header requires a header name",
                    DiagnosticAnchor::element(attr),
                ));
            }
        },
        RoleKind::HeaderMap => ParameterRole::HeaderMap,
    };
    Ok(role)
}

/// 判断参数值的形态和逐项转换的值类型
///
/// Map 角色要求字符串键的 Map，否则返回 `None`。
pub fn classify_value(types: &TypeIntrospector, ty: &Type, kind: RoleKind) -> Option<(ValueShape, Type)> {
    let ty = types.strip_reference(ty);

    if kind.is_map() {
        if !types.is_subtype(ty, TypeClass::Map) {
            return None;
        }
        let key = types.first_generic_argument(ty)?;
        if !types.is_subtype(key, TypeClass::Str) {
            return None;
        }
        let value = types.second_generic_argument(ty)?;
        return Some((ValueShape::Map, types.strip_reference(value).clone()));
    }

    let optional_roles = matches!(
        kind,
        RoleKind::Query | RoleKind::Field | RoleKind::Header | RoleKind::Part
    );
    if optional_roles && types.erasure_equals(ty, "Option") {
        let inner = types.first_generic_argument(ty)?;
        return Some((ValueShape::Optional, types.strip_reference(inner).clone()));
    }

    let repeated_roles = matches!(kind, RoleKind::Query | RoleKind::Field);
    if repeated_roles
        && types.is_subtype(ty, TypeClass::Sequence)
        && !types.is_subtype(ty, TypeClass::Bytes)
    {
        let element = types.element_type(ty)?;
        return Some((ValueShape::Repeated, types.strip_reference(element).clone()));
    }

    Some((ValueShape::Single, ty.clone()))
}

/// 参数属性中属于本库的标记以外的部分
pub fn retain_foreign_attributes(attrs: &[Attribute]) -> Vec<Attribute> {
    attrs
        .iter()
        .filter(|attr| crate::types::Marker::from_attribute(attr).is_none())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;
    use syn::parse_quote;

    fn ident(name: &str) -> Ident {
        Ident::new(name, proc_macro2::Span::call_site())
    }

    #[test]
    fn test_role_name_defaults_to_parameter() {
        let attr: Attribute = parse_quote! { #[path] };
        let role = parse_role(&attr, RoleKind::Path, &ident("user_id")).unwrap();
        assert_eq!(role, ParameterRole::Path { name: "user_id".to_string(), encoded: false });
    }

    #[test]
    fn test_role_arguments() {
        let attr: Attribute = parse_quote! { #[query("q")] };
        let role = parse_role(&attr, RoleKind::Query, &ident("term")).unwrap();
        assert_eq!(role, ParameterRole::Query { name: "q".to_string(), encoded: false });

        let attr: Attribute = parse_quote! { #[field(name = "f", encoded)] };
        let role = parse_role(&attr, RoleKind::Field, &ident("x")).unwrap();
        assert_eq!(role, ParameterRole::Field { name: "f".to_string(), encoded: true });

        let attr: Attribute = parse_quote! { #[query_map(encoded = true)] };
        let role = parse_role(&attr, RoleKind::QueryMap, &ident("m")).unwrap();
        assert_eq!(role, ParameterRole::QueryMap { encoded: true });

        let attr: Attribute = parse_quote! { #[header("X-Token")] };
        let role = parse_role(&attr, RoleKind::Header, &ident("token")).unwrap();
        assert_eq!(role, ParameterRole::Header { name: "X-Token".to_string() });
    }

    #[test]
    fn test_role_argument_errors() {
        let attr: Attribute = parse_quote! { #[header] };
        let err = parse_role(&attr, RoleKind::Header, &ident("token")).unwrap_err();
        assert_eq!(err.message(), "@Header requires a header name");

        let attr: Attribute = parse_quote! { #[body("x")] };
        let err = parse_role(&attr, RoleKind::Body, &ident("user")).unwrap_err();
        assert_eq!(err.message(), "@Body does not take a name");

        let attr: Attribute = parse_quote! { #[part(encoded)] };
        let err = parse_role(&attr, RoleKind::Part, &ident("file")).unwrap_err();
        assert_eq!(err.message(), "@Part does not support 'encoded'");

        let attr: Attribute = parse_quote! { #[query("a", "b")] };
        assert!(parse_role(&attr, RoleKind::Query, &ident("q")).is_err());

        let attr: Attribute = parse_quote! { #[query(limit = 3)] };
        assert!(parse_role(&attr, RoleKind::Query, &ident("q")).is_err());
    }

    #[test]
    fn test_classify_value_shapes() {
        let types = TypeIntrospector::new();

        let ty: Type = parse_quote! { Option<&str> };
        let (shape, value) = classify_value(&types, &ty, RoleKind::Query).unwrap();
        assert_eq!(shape, ValueShape::Optional);
        assert_eq!(quote!(#value).to_string(), quote!(str).to_string());

        let ty: Type = parse_quote! { &[i64] };
        let (shape, value) = classify_value(&types, &ty, RoleKind::Query).unwrap();
        assert_eq!(shape, ValueShape::Repeated);
        assert_eq!(quote!(#value).to_string(), quote!(i64).to_string());

        let ty: Type = parse_quote! { Vec<u8> };
        let (shape, _) = classify_value(&types, &ty, RoleKind::Field).unwrap();
        assert_eq!(shape, ValueShape::Single);

        let ty: Type = parse_quote! { Vec<String> };
        let (shape, _) = classify_value(&types, &ty, RoleKind::Path).unwrap();
        assert_eq!(shape, ValueShape::Single);

        let ty: Type = parse_quote! { &HashMap<String, i32> };
        let (shape, value) = classify_value(&types, &ty, RoleKind::QueryMap).unwrap();
        assert_eq!(shape, ValueShape::Map);
        assert_eq!(quote!(#value).to_string(), quote!(i32).to_string());
    }

    #[test]
    fn test_map_roles_need_string_keys() {
        let types = TypeIntrospector::new();
        let ty: Type = parse_quote! { HashMap<i64, String> };
        assert!(classify_value(&types, &ty, RoleKind::FieldMap).is_none());
        let ty: Type = parse_quote! { &HashMap<u32, String> };
        assert!(classify_value(&types, &ty, RoleKind::QueryMap).is_none());
        let ty: Type = parse_quote! { BTreeMap<i64, Vec<u8>> };
        assert!(classify_value(&types, &ty, RoleKind::PartMap).is_none());
        let ty: Type = parse_quote! { HashMap<String, Vec<u8>> };
        assert!(classify_value(&types, &ty, RoleKind::PartMap).is_some());
        let ty: Type = parse_quote! { Vec<(String, String)> };
        assert!(classify_value(&types, &ty, RoleKind::HeaderMap).is_none());
        let ty: Type = parse_quote! { BTreeMap<&'static str, String> };
        assert!(classify_value(&types, &ty, RoleKind::HeaderMap).is_some());
    }
}
