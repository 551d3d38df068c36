use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use kite_common::types::InterfaceDescriptor;

use crate::generator::converters::ConverterPlan;

/// 生成实现类型、它的构建器和构造逻辑
///
/// 生成的结构如下（以 `trait GitHub` 为例）：
///
/// ```ignore
/// #[derive(Clone)]
/// pub struct GitHubImpl {
///     base_url: String,
///     http_client: Arc<ReqwestClient>,
///     converter_factory: Arc<JsonConverterFactory>,
///     user_response_body_converter: Arc<dyn ResponseBodyConverter<User>>,
/// }
///
/// #[derive(Default)]
/// pub struct GitHubImplBuilder { .. }
/// ```
///
/// 未通过构建器提供的传输层和转换器工厂用各自的 `Default` 创建；
/// 转换器在 `build()` 时一次性创建，之后所有调用共享。
pub fn generate_client_type(descriptor: &InterfaceDescriptor, plan: &ConverterPlan) -> TokenStream {
    let vis = &descriptor.vis;
    let impl_ident = &descriptor.impl_ident;
    let builder_ident = &descriptor.builder_ident;
    let client_ty = &descriptor.client_ty;
    let converter_ty = &descriptor.converter_ty;
    let base_url = &descriptor.base_url;
    let factory = format_ident!("converter_factory");

    let converter_fields = plan.fields().iter().map(|field| {
        let ident = &field.ident;
        let ty = field.field_type();
        quote! { #ident: #ty, }
    });
    let converter_inits = plan.fields().iter().map(|field| field.initializer(&factory));
    let converter_idents = plan.fields().iter().map(|field| &field.ident);
    let impl_name = impl_ident.to_string();

    quote! {
        #[derive(Clone)]
        #vis struct #impl_ident {
            base_url: ::std::string::String,
            http_client: ::std::sync::Arc<#client_ty>,
            converter_factory: ::std::sync::Arc<#converter_ty>,
            #(#converter_fields)*
        }

        #[derive(Default)]
        #vis struct #builder_ident {
            base_url: ::std::option::Option<::std::string::String>,
            http_client: ::std::option::Option<::std::sync::Arc<#client_ty>>,
            converter_factory: ::std::option::Option<::std::sync::Arc<#converter_ty>>,
        }

        impl #builder_ident {
            /// 覆盖声明中的 `base_url`
            pub fn base_url(mut self, base_url: impl ::std::convert::Into<::std::string::String>) -> Self {
                self.base_url = ::std::option::Option::Some(base_url.into());
                self
            }

            pub fn http_client(mut self, http_client: impl ::std::convert::Into<::std::sync::Arc<#client_ty>>) -> Self {
                self.http_client = ::std::option::Option::Some(http_client.into());
                self
            }

            pub fn converter_factory(
                mut self,
                converter_factory: impl ::std::convert::Into<::std::sync::Arc<#converter_ty>>,
            ) -> Self {
                self.converter_factory = ::std::option::Option::Some(converter_factory.into());
                self
            }

            /// 创建客户端；转换器工厂不支持某个用到的类型时返回 `Error::MissingConverter`
            pub fn build(self) -> ::kite_common::Result<#impl_ident> {
                #impl_ident::new(self)
            }
        }

        impl #impl_ident {
            pub fn builder() -> #builder_ident {
                <#builder_ident as ::std::default::Default>::default()
            }

            fn new(builder: #builder_ident) -> ::kite_common::Result<Self> {
                let base_url = builder.base_url.unwrap_or_else(|| ::std::string::String::from(#base_url));
                let http_client = builder
                    .http_client
                    .unwrap_or_else(|| ::std::sync::Arc::new(<#client_ty as ::std::default::Default>::default()));
                let #factory = builder
                    .converter_factory
                    .unwrap_or_else(|| ::std::sync::Arc::new(<#converter_ty as ::std::default::Default>::default()));
                #(#converter_inits)*
                ::kite_common::log::debug!("{} created for {:?}", #impl_name, base_url);
                ::std::result::Result::Ok(Self {
                    base_url,
                    http_client,
                    converter_factory,
                    #(#converter_idents,)*
                })
            }

            pub fn base_url(&self) -> &str {
                &self.base_url
            }

            pub fn http_client(&self) -> &::std::sync::Arc<#client_ty> {
                &self.http_client
            }

            pub fn converter_factory(&self) -> &::std::sync::Arc<#converter_ty> {
                &self.converter_factory
            }
        }
    }
}
