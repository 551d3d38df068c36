//! 代码生成
//!
//! 输入是分析阶段产出的 `InterfaceDescriptor`，输出依次是：去掉标记的 trait、
//! 实现类型及其构建器、trait 的实现。生成结果只依赖 `::kite_common` 下的路径。

mod client;
mod converters;
mod method;
mod request;
mod response;

use std::path::Path;

use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::quote;
use syn::ItemTrait;
use syn::parse::Parser;

use kite_common::types::{ComponentModel, InterfaceDescriptor};
use kite_common::{
    AnalysisContext, Diagnostic, DiagnosticAnchor, Diagnostics, build_interface_descriptor, parse_client_config,
};

use crate::generator::client::generate_client_type;
use crate::generator::converters::ConverterPlan;
use crate::generator::method::generate_method;

/// 设置后把每个接口生成的源码写到该目录，文件名为 trait 名的 snake_case
pub const EXPAND_DIR_ENV: &str = "KITE_EXPAND_DIR";

/// `#[rest_client]` 的完整展开；任何诊断都转成编译错误，不产出部分代码
pub fn expand_rest_client(args: TokenStream, item: TokenStream) -> TokenStream {
    match try_expand(args, item) {
        Ok(tokens) => tokens,
        Err(diagnostics) => diagnostics.to_compile_error(),
    }
}

pub fn try_expand(args: TokenStream, item: TokenStream) -> Result<TokenStream, Diagnostics> {
    let config = parse_client_config.parse2(args)?;
    let item: ItemTrait = syn::parse2(item).map_err(|err| {
        Diagnostic::declaration(
            "#[rest_client] can only be applied to a trait",
            DiagnosticAnchor::at(err.span()),
        )
    })?;

    let mut ctx = AnalysisContext::new();
    let descriptor = build_interface_descriptor(&ctx, config, item)?;
    let tokens = generate_client(&mut ctx, &descriptor)?;

    if let Some(dir) = std::env::var_os(EXPAND_DIR_ENV) {
        write_source(Path::new(&dir), &descriptor)?;
    }
    Ok(tokens)
}

/// 生成接口的全部代码
///
/// 同一个描述、同一个种子的上下文，输出逐字节一致。
pub fn generate_client(ctx: &mut AnalysisContext, descriptor: &InterfaceDescriptor) -> Result<TokenStream, Diagnostic> {
    if descriptor.component != ComponentModel::Standalone {
        return Err(Diagnostic::unimplemented(
            format!("component model `{}` is not implemented", descriptor.component.as_str()),
            DiagnosticAnchor::at(descriptor.component_span),
        ));
    }

    let plan = ConverterPlan::build(ctx, descriptor);
    let client = generate_client_type(descriptor, &plan);
    let methods = descriptor
        .methods
        .iter()
        .map(|method| generate_method(ctx, &plan, descriptor, method))
        .collect::<Result<Vec<_>, _>>()?;

    let item = &descriptor.item;
    let trait_ident = &descriptor.trait_ident;
    let impl_ident = &descriptor.impl_ident;

    Ok(quote! {
        #[allow(async_fn_in_trait)]
        #item

        #client

        impl #trait_ident for #impl_ident {
            #(#methods)*
        }
    })
}

/// 把生成的代码格式化成源码文本
pub fn generate_source(descriptor: &InterfaceDescriptor) -> Result<String, Diagnostic> {
    let tokens = generate_client(&mut AnalysisContext::new(), descriptor)?;
    let file: syn::File = syn::parse2(tokens)
        .map_err(|err| Diagnostic::internal(format!("generated code does not parse: {err}")))?;
    Ok(prettyplease::unparse(&file))
}

fn write_source(dir: &Path, descriptor: &InterfaceDescriptor) -> Result<(), Diagnostic> {
    let source = generate_source(descriptor)?;
    let file_name = format!("{}.rs", descriptor.trait_ident.to_string().to_snake_case());
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(dir.join(&file_name), source))
        .map_err(|err| Diagnostic::internal(format!("failed to write {}: {err}", dir.join(&file_name).display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_common::DiagnosticKind;

    fn expand(args: TokenStream, item: TokenStream) -> Result<String, Diagnostics> {
        let config = parse_client_config.parse2(args)?;
        let item: ItemTrait = syn::parse2(item)?;
        let ctx = AnalysisContext::new();
        let descriptor = build_interface_descriptor(&ctx, config, item)?;
        Ok(generate_source(&descriptor)?)
    }

    fn github() -> TokenStream {
        quote! {
            pub trait GitHub {
                #[get("users/{user}/repos")]
                #[headers("Accept: application/vnd.github+json")]
                async fn repos(&self, #[path] user: &str, #[query] per_page: Option<u32>) -> Result<Vec<Repo>>;

                #[post("repos")]
                async fn create(&self, #[body] repo: &Repo) -> Result<HttpInfo<Repo>>;

                #[delete("repos/{id}")]
                fn remove(&self, #[path] id: u64, callback: impl ResponseCallback<()>);

                #[get("events")]
                fn events(&self) -> ResponseStream<Vec<Event>>;
            }
        }
    }

    #[test]
    fn test_output_is_deterministic() {
        let args = quote!(base_url = "https://api.github.com", converter = JsonConverterFactory);
        let first = expand(args.clone(), github()).unwrap();
        let second = expand(args, github()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generated_structure() {
        let source = expand(
            quote!(base_url = "https://api.github.com", converter = JsonConverterFactory),
            github(),
        )
        .unwrap();

        assert!(source.contains("#[allow(async_fn_in_trait)]"));
        assert!(source.contains("pub trait GitHub"));
        assert!(source.contains("pub struct GitHubImpl"));
        assert!(source.contains("pub struct GitHubImplBuilder"));
        assert!(source.contains("impl GitHub for GitHubImpl"));
        assert!(source.contains("\"users/{user}/repos\""));
        assert!(source.contains("builder.header(\"Accept\", \"application/vnd.github+json\")"));
        assert!(source.contains("u32_string_converter"));
        assert!(source.contains("vec_repo_response_body_converter"));
        assert!(source.contains("repo_request_body_converter"));
        assert!(source.contains("repo_response_body_converter"));
        assert!(source.contains("vec_event_response_body_converter"));
        assert!(source.contains("::kite_common::spawn"));
        assert!(source.contains("::kite_common::ResponseStream::once"));
        // 标记不会留在输出的 trait 中
        assert!(!source.contains("#[path]"));
        assert!(!source.contains("#[get("));
    }

    #[test]
    fn test_custom_suffix_and_client() {
        let source = expand(
            quote!(suffix = "Client", client = my::Transport, converter = my::Codec),
            quote! {
                trait Ping {
                    #[head("ping")]
                    async fn ping(&self) -> Result<()>;
                }
            },
        )
        .unwrap();
        assert!(source.contains("struct PingClient"));
        assert!(source.contains("struct PingClientBuilder"));
        assert!(source.contains("::std::sync::Arc<my::Transport>"));
        assert!(source.contains("::std::sync::Arc<my::Codec>"));
        assert!(source.contains("::kite_common::HttpMethod::Head"));
    }

    #[test]
    fn test_locals_avoid_parameter_names() {
        let source = expand(
            quote!(converter = JsonConverterFactory),
            quote! {
                trait Search {
                    #[get("search")]
                    async fn search(&self, #[query] request: &str, #[query] builder: &str) -> Result<String>;
                }
            },
        )
        .unwrap();
        assert!(source.contains("let mut builder_"));
        assert!(source.contains("let request_"));
        assert!(source.contains("\"request\""));
        assert!(source.contains("as_ref(&request)"));
        assert!(source.contains("as_ref(&builder)"));
    }

    #[test]
    fn test_other_component_models_are_unimplemented() {
        let args = quote!(converter = JsonConverterFactory, component = spring);
        let config = parse_client_config.parse2(args).unwrap();
        let item: ItemTrait = syn::parse_quote! {
            trait Api {
                #[get("a")]
                async fn a(&self) -> Result<()>;
            }
        };
        let mut ctx = AnalysisContext::new();
        let descriptor = build_interface_descriptor(&ctx, config, item).unwrap();
        let err = generate_client(&mut ctx, &descriptor).unwrap_err();
        assert_eq!(err.kind(), DiagnosticKind::Unimplemented);
        assert_eq!(err.message(), "component model `spring` is not implemented");
    }

    #[test]
    fn test_declaration_errors_become_compile_errors() {
        let tokens = expand_rest_client(
            quote!(converter = JsonConverterFactory),
            quote! {
                trait Api {
                    async fn a(&self) -> Result<()>;
                }
            },
        );
        let rendered = tokens.to_string();
        assert!(rendered.contains("compile_error"));
        assert!(rendered.contains("Method not annotated"));
    }

    #[test]
    fn test_non_trait_item_is_rejected() {
        let tokens = expand_rest_client(quote!(converter = JsonConverterFactory), quote!(struct Api;));
        assert!(tokens.to_string().contains("can only be applied to a trait"));
    }

    #[test]
    fn test_expand_dir_writes_source() {
        let dir = std::env::temp_dir().join(format!("kite-expand-{}", std::process::id()));
        let config = parse_client_config.parse2(quote!(converter = JsonConverterFactory)).unwrap();
        let item: ItemTrait = syn::parse_quote! {
            trait StatusPage {
                #[get("status")]
                async fn status(&self) -> Result<String>;
            }
        };
        let descriptor = build_interface_descriptor(&AnalysisContext::new(), config, item).unwrap();
        write_source(&dir, &descriptor).unwrap();

        let written = std::fs::read_to_string(dir.join("status_page.rs")).unwrap();
        assert_eq!(written, generate_source(&descriptor).unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
