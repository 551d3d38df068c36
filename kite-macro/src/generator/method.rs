use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Ident, Type};

use kite_common::types::{InterfaceDescriptor, MethodDescriptor, ReturnShape};
use kite_common::{AnalysisContext, Diagnostic};

use crate::generator::converters::ConverterPlan;
use crate::generator::request::generate_request;
use crate::generator::response::{ConverterAccess, http_info, needs_converter, success_value};

/// 生成代码里的局部变量名
///
/// 参数名由用户决定，这些名字按固定顺序分配并避开所有参数名。
pub struct Locals {
    pub builder: Ident,
    pub request: Ident,
    pub response: Ident,
    pub body: Ident,
    pub http_client: Ident,
    pub converter: Ident,
    pub outcome: Ident,
    pub info: Ident,
    pub error: Ident,
    pub value: Ident,
    pub key: Ident,
    pub stream: Ident,
}

impl Locals {
    pub fn allocate(ctx: &mut AnalysisContext, method: &MethodDescriptor) -> Self {
        let mut taken = method.parameter_names();
        taken.push("self".to_string());
        let mut next = |preferred: &str| format_ident!("{}", ctx.names.allocate_into(preferred, &mut taken));
        Self {
            builder: next("builder"),
            request: next("request"),
            response: next("response"),
            body: next("body"),
            http_client: next("http_client"),
            converter: next("converter"),
            outcome: next("outcome"),
            info: next("info"),
            error: next("error"),
            value: next("value"),
            key: next("key"),
            stream: next("stream"),
        }
    }
}

/// 生成一个方法的实现
pub fn generate_method(
    ctx: &mut AnalysisContext,
    plan: &ConverterPlan,
    descriptor: &InterfaceDescriptor,
    method: &MethodDescriptor,
) -> Result<TokenStream, Diagnostic> {
    let locals = Locals::allocate(ctx, method);
    let types = &ctx.types;
    let signature = &method.signature;
    let request_expr = generate_request(types, plan, method, &locals)?;
    let log_format = format!("{}.{}: {{}} {{}}", descriptor.trait_ident, method.name());

    let Locals {
        request,
        response,
        body,
        http_client,
        converter,
        outcome,
        info,
        error,
        stream,
        ..
    } = &locals;

    let log_request = quote! {
        ::kite_common::log::debug!(#log_format, #request.method, #request.url);
    };

    let block = match &method.return_shape {
        ReturnShape::Void => quote! {
            #[allow(clippy::redundant_closure_call)]
            let #request = #request_expr?;
            #log_request
            let #response = ::kite_common::HttpClient::execute(&*self.http_client, #request).await?;
            #response.into_success_body()?;
            ::std::result::Result::Ok(())
        },
        ReturnShape::SyncValue(ty) => {
            let value = success_value(types, plan, ty, response, body, ConverterAccess::SelfField)?;
            quote! {
                #[allow(clippy::redundant_closure_call)]
                let #request = #request_expr?;
                #log_request
                let #response = ::kite_common::HttpClient::execute(&*self.http_client, #request).await?;
                ::std::result::Result::Ok(#value)
            }
        }
        ReturnShape::SyncHttpInfo(ty) => {
            let conversion = http_info(types, plan, ty, response, body, ConverterAccess::SelfField)?;
            quote! {
                #[allow(clippy::redundant_closure_call)]
                let #request = #request_expr?;
                #log_request
                let #response = ::kite_common::HttpClient::execute(&*self.http_client, #request).await?;
                let #info = #conversion?;
                ::std::result::Result::Ok(#info)
            }
        }
        ReturnShape::Callback(ty) => {
            let callback = method
                .callback
                .as_ref()
                .map(|callback| &callback.ident)
                .ok_or_else(|| Diagnostic::internal(format!("callback parameter missing on `{}`", method.name())))?;
            let converter_clone = clone_converter(types, plan, ty, converter);
            let conversion = http_info(types, plan, ty, response, body, ConverterAccess::Local(converter))?;
            quote! {
                #[allow(clippy::redundant_closure_call)]
                let #request = #request_expr;
                let #http_client = ::std::sync::Arc::clone(&self.http_client);
                #converter_clone
                ::kite_common::spawn(async move {
                    let #outcome: ::kite_common::Result<::kite_common::HttpInfo<#ty>> = async {
                        let #request = #request?;
                        #log_request
                        let #response = ::kite_common::HttpClient::execute(&*#http_client, #request).await?;
                        #conversion
                    }
                    .await;
                    match #outcome {
                        ::std::result::Result::Ok(#info) => {
                            ::kite_common::ResponseCallback::on_success(&#callback, #info)
                        }
                        ::std::result::Result::Err(#error) => {
                            ::kite_common::ResponseCallback::on_failure(&#callback, #error)
                        }
                    }
                });
            }
        }
        ReturnShape::Reactive { item, http_info: wrapped, boxed } => {
            let converter_clone = clone_converter(types, plan, item, converter);
            let tail = if *wrapped {
                http_info(types, plan, item, response, body, ConverterAccess::Local(converter))?
            } else {
                let value = success_value(types, plan, item, response, body, ConverterAccess::Local(converter))?;
                quote!(::kite_common::Result::<#item>::Ok(#value))
            };
            let output = if *boxed {
                quote!(#stream.into_inner())
            } else {
                quote!(#stream)
            };
            quote! {
                #[allow(clippy::redundant_closure_call)]
                let #request = #request_expr;
                let #http_client = ::std::sync::Arc::clone(&self.http_client);
                #converter_clone
                let #stream = ::kite_common::ResponseStream::once(async move {
                    let #request = #request?;
                    #log_request
                    let #response = ::kite_common::HttpClient::execute(&*#http_client, #request).await?;
                    #tail
                });
                #output
            }
        }
    };

    Ok(quote! {
        #signature {
            #block
        }
    })
}

fn clone_converter(
    types: &kite_common::TypeIntrospector,
    plan: &ConverterPlan,
    ty: &Type,
    local: &Ident,
) -> TokenStream {
    if !needs_converter(types, ty) {
        return TokenStream::new();
    }
    match plan.field(kite_common::ConverterKind::ResponseBody, ty) {
        Some(field) => {
            let field = &field.ident;
            quote! { let #local = ::std::sync::Arc::clone(&self.#field); }
        }
        None => TokenStream::new(),
    }
}
