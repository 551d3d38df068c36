use quote::format_ident;
use syn::{ItemTrait, TraitItem};

use crate::context::AnalysisContext;
use crate::diagnostics::{Diagnostic, DiagnosticAnchor, Diagnostics};
use crate::parsing::method::analyze_method;
use crate::types::{ClientConfig, InterfaceDescriptor};

/// 由接口配置和 trait 构建接口描述
///
/// 每个方法独立分析，所有方法的诊断一起返回；只要有一个方法失败，就不产生描述。
pub fn build_interface_descriptor(
    ctx: &AnalysisContext,
    config: ClientConfig,
    item: ItemTrait,
) -> Result<InterfaceDescriptor, Diagnostics> {
    let mut diagnostics = Diagnostics::new();

    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        diagnostics.push(Diagnostic::declaration(
            "generic traits are not supported by rest_client",
            DiagnosticAnchor::element(&item.ident).with_annotation(&item.generics),
        ));
    }
    if !item.supertraits.is_empty() {
        diagnostics.push(Diagnostic::declaration(
            "supertraits are not supported by rest_client",
            DiagnosticAnchor::element(&item.ident).with_annotation(&item.supertraits),
        ));
    }

    let mut cleaned = item.clone();
    let mut methods = Vec::new();
    for trait_item in cleaned.items.iter_mut() {
        let TraitItem::Fn(method) = trait_item else {
            diagnostics.push(Diagnostic::declaration(
                "only methods are supported in a rest_client trait",
                DiagnosticAnchor::element(trait_item),
            ));
            continue;
        };
        if let Some(body) = &method.default {
            diagnostics.push(Diagnostic::declaration(
                "trait methods must not have a default body",
                DiagnosticAnchor::element(&method.sig.ident).with_annotation(body),
            ));
            continue;
        }
        match analyze_method(ctx, method) {
            Ok(descriptor) => {
                method.attrs = descriptor.attrs.clone();
                method.sig = descriptor.signature.clone();
                methods.push(descriptor);
            }
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    let impl_ident = format_ident!("{}{}", item.ident, config.suffix());
    let builder_ident = format_ident!("{}Builder", impl_ident);
    let descriptor = InterfaceDescriptor {
        vis: item.vis.clone(),
        trait_ident: item.ident.clone(),
        impl_ident,
        builder_ident,
        base_url: config.base_url(),
        client_ty: config.client_type(),
        converter_ty: config.converter,
        component: config.component,
        component_span: config.component_span,
        item: cleaned,
        methods,
    };
    diagnostics.finish(descriptor)
}
