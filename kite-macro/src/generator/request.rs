use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use kite_common::types::{MethodDescriptor, ParameterDescriptor, RoleKind, ValueShape};
use kite_common::{ConverterKind, Diagnostic, TypeClass, TypeIntrospector};

use crate::generator::converters::{BodyValue, ConverterPlan, body_value};
use crate::generator::method::Locals;

/// 生成构建请求的闭包调用，求值结果为 `kite_common::Result<Request>`
///
/// 字面量请求头先于参数写入；参数按声明顺序逐个写入构建器。
/// 转换失败在闭包内用 `?` 返回，由调用约定决定如何交付。
pub fn generate_request(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    method: &MethodDescriptor,
    locals: &Locals,
) -> Result<TokenStream, Diagnostic> {
    let builder = &locals.builder;
    let verb = method.verb.variant_ident();
    let encoding = method.encoding.variant_ident();
    let template = method.template();

    let headers = method.headers.iter().map(|header| {
        let name = &header.name;
        let value = &header.value;
        quote! { #builder.header(#name, #value); }
    });

    let statements = method
        .parameters
        .iter()
        .map(|param| parameter_statement(types, plan, param, locals))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(quote! {
        (|| -> ::kite_common::Result<::kite_common::Request> {
            #[allow(unused_mut)]
            let mut #builder = ::kite_common::RequestBuilder::new(
                ::kite_common::HttpMethod::#verb,
                &self.base_url,
                #template,
                ::kite_common::Encoding::#encoding,
            );
            #(#headers)*
            #(#statements)*
            #builder.build()
        })()
    })
}

fn parameter_statement(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    param: &ParameterDescriptor,
    locals: &Locals,
) -> Result<TokenStream, Diagnostic> {
    let ident = &param.ident;
    let builder = &locals.builder;
    let value = &locals.value;
    let key = &locals.key;

    if param.role.kind() == RoleKind::Url {
        return Ok(quote! {
            #builder.url(::std::convert::AsRef::<str>::as_ref(&#ident));
        });
    }

    let item = match param.shape {
        ValueShape::Single => quote!(&#ident),
        _ => quote!(#value),
    };
    let call = builder_call(types, plan, param, locals, &item)?;

    Ok(match param.shape {
        ValueShape::Single => call,
        ValueShape::Optional => quote! {
            if let ::std::option::Option::Some(#value) = &#ident {
                #call
            }
        },
        ValueShape::Repeated => quote! {
            for #value in #ident.iter() {
                #call
            }
        },
        ValueShape::Map => quote! {
            for (#key, #value) in #ident.iter() {
                #call
            }
        },
    })
}

/// 单个值写入构建器的语句
fn builder_call(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    param: &ParameterDescriptor,
    locals: &Locals,
    value: &TokenStream,
) -> Result<TokenStream, Diagnostic> {
    let builder = &locals.builder;
    let key = &locals.key;
    let encoded = param.role.encoded();
    let name = match param.role.kind() {
        kind if kind.is_map() => quote!(::std::convert::AsRef::<str>::as_ref(#key)),
        _ => {
            let name = param.role.name().unwrap_or_default();
            quote!(#name)
        }
    };

    Ok(match param.role.kind() {
        RoleKind::Path => {
            let text = string_value(types, plan, &param.value_ty, value)?;
            quote! { #builder.path(#name, #text, #encoded)?; }
        }
        RoleKind::Query | RoleKind::QueryMap => {
            let text = string_value(types, plan, &param.value_ty, value)?;
            quote! { #builder.query(#name, #text, #encoded); }
        }
        RoleKind::Field | RoleKind::FieldMap => {
            let text = string_value(types, plan, &param.value_ty, value)?;
            quote! { #builder.field(#name, #text, #encoded); }
        }
        RoleKind::Header | RoleKind::HeaderMap => {
            let text = string_value(types, plan, &param.value_ty, value)?;
            quote! { #builder.header(#name, #text); }
        }
        RoleKind::Part | RoleKind::PartMap => {
            let body = body_expr(types, plan, &param.value_ty, value)?;
            quote! { #builder.part(#name, #body); }
        }
        RoleKind::Body => {
            let body = body_expr(types, plan, &param.value_ty, value)?;
            quote! { #builder.body(#body); }
        }
        RoleKind::Url => quote! { #builder.url(::std::convert::AsRef::<str>::as_ref(#value)); },
    })
}

/// 求值为 `&str` 的表达式
fn string_value(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    ty: &Type,
    value: &TokenStream,
) -> Result<TokenStream, Diagnostic> {
    if types.is_subtype(ty, TypeClass::Str) {
        return Ok(quote!(::std::convert::AsRef::<str>::as_ref(#value)));
    }
    let field = planned(plan, ConverterKind::String, ty)?;
    Ok(quote! {
        &::kite_common::StringConverter::<#ty>::convert(&*self.#field, #value)?
    })
}

/// 求值为 `RequestBody` 的表达式
fn body_expr(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    ty: &Type,
    value: &TokenStream,
) -> Result<TokenStream, Diagnostic> {
    Ok(match body_value(types, ty) {
        BodyValue::Bytes => quote! {
            ::kite_common::RequestBody::octet_stream(::std::convert::AsRef::<[u8]>::as_ref(#value).to_vec())
        },
        BodyValue::Text => quote! {
            ::kite_common::RequestBody::text(::std::convert::AsRef::<str>::as_ref(#value))
        },
        BodyValue::Converted => {
            let field = planned(plan, ConverterKind::RequestBody, ty)?;
            quote! {
                ::kite_common::RequestBodyConverter::<#ty>::convert(&*self.#field, #value)?
            }
        }
    })
}

fn planned<'a>(plan: &'a ConverterPlan, kind: ConverterKind, ty: &Type) -> Result<&'a syn::Ident, Diagnostic> {
    plan.field(kind, ty)
        .map(|field| &field.ident)
        .ok_or_else(|| Diagnostic::internal(format!("no {kind} converter planned for `{}`", quote!(#ty))))
}
