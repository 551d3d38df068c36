use proc_macro2::TokenStream;
use quote::quote;
use syn::{Ident, Type};

use kite_common::{ConverterKind, Diagnostic, TypeIntrospector};

use crate::generator::converters::{ConverterPlan, ResponseValue, response_value};

/// 响应体转换器在当前作用域中的访问方式
pub enum ConverterAccess<'a> {
    /// 同步调用直接读 `self` 上的字段
    SelfField,
    /// 回调和流在后台执行，使用事先克隆出来的局部 `Arc`
    Local(&'a Ident),
}

/// 把 `body`（`ResponseBody`）转换成 `ty` 的表达式
pub fn convert_body(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    ty: &Type,
    body: &Ident,
    access: ConverterAccess<'_>,
) -> Result<TokenStream, Diagnostic> {
    Ok(match response_value(types, ty) {
        ResponseValue::Unit => quote!(::std::mem::drop(#body)),
        ResponseValue::Text => quote!(#body.text()?),
        ResponseValue::Bytes => quote!(#body.into_bytes()),
        ResponseValue::Converted => {
            let field = plan
                .field(ConverterKind::ResponseBody, ty)
                .map(|field| &field.ident)
                .ok_or_else(|| {
                    Diagnostic::internal(format!("no response body converter planned for `{}`", quote!(#ty)))
                })?;
            let converter = match access {
                ConverterAccess::SelfField => quote!(self.#field),
                ConverterAccess::Local(local) => quote!(#local),
            };
            quote! {
                ::kite_common::ResponseBodyConverter::<#ty>::convert(&*#converter, #body)?
            }
        }
    })
}

/// `HttpInfo::from_response` 调用，非 2xx 时不做转换
pub fn http_info(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    ty: &Type,
    response: &Ident,
    body: &Ident,
    access: ConverterAccess<'_>,
) -> Result<TokenStream, Diagnostic> {
    let conversion = convert_body(types, plan, ty, body, access)?;
    Ok(quote! {
        ::kite_common::HttpInfo::from_response(#response, |#body| {
            ::kite_common::Result::<#ty>::Ok(#conversion)
        })
    })
}

/// 只接受 2xx 的响应，求值为转换后的值（已用 `?` 解开）
pub fn success_value(
    types: &TypeIntrospector,
    plan: &ConverterPlan,
    ty: &Type,
    response: &Ident,
    body: &Ident,
    access: ConverterAccess<'_>,
) -> Result<TokenStream, Diagnostic> {
    let conversion = convert_body(types, plan, ty, body, access)?;
    Ok(quote! {
        {
            let #body = #response.into_success_body()?;
            #conversion
        }
    })
}

/// 转换时是否需要响应体转换器
pub fn needs_converter(types: &TypeIntrospector, ty: &Type) -> bool {
    response_value(types, ty) == ResponseValue::Converted
}
