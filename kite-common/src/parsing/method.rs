//! 单个 trait 方法的分析
//!
//! 按固定顺序检查：接收者、方法标记、动词、URL、编码、参数、路径占位符、调用约定。
//! 第一个不满足的规则即结束分析，返回锚定到具体属性、字面量、参数或类型的诊断。

use quote::ToTokens;
use syn::{Attribute, Expr, FnArg, Ident, Lit, LitStr, Meta, Pat, PatType, ReturnType, Signature, TraitItemFn, Type};

use crate::context::AnalysisContext;
use crate::diagnostics::{Diagnostic, DiagnosticAnchor};
use crate::introspect::TypeClass;
use crate::parsing::headers::parse_headers_attribute;
use crate::parsing::params::{classify_value, parse_role, retain_foreign_attributes};
use crate::parsing::template::extract_placeholders;
use crate::types::{
    CallbackDescriptor, Encoding, HttpMethod, Marker, MethodDescriptor, ParameterDescriptor, ParameterRole,
    ReturnShape, RoleKind, UrlSource,
};

pub const UNSUPPORTED_RETURN_TYPE: &str =
    "Unsupported return type, expected Result<T>, ResponseStream<T> or a trailing ResponseCallback parameter";

struct VerbMarker<'a> {
    method: HttpMethod,
    attr: &'a Attribute,
    template: Option<LitStr>,
}

/// 分析一个方法，得到方法描述或第一条诊断
pub fn analyze_method(ctx: &AnalysisContext, method: &TraitItemFn) -> Result<MethodDescriptor, Diagnostic> {
    let sig = &method.sig;
    check_receiver(sig)?;
    if !sig.generics.params.is_empty() {
        return Err(declaration(
            "generic methods are not supported in a rest_client trait",
            DiagnosticAnchor::element(&sig.ident).with_annotation(&sig.generics),
        ));
    }

    // 方法级标记，`#[headers]` 在收集时即解析
    let mut verbs: Vec<VerbMarker> = Vec::new();
    let mut headers = Vec::new();
    let mut encodings: Vec<(Encoding, &Attribute)> = Vec::new();
    let mut annotated = false;
    for attr in &method.attrs {
        let Some(marker) = Marker::from_attribute(attr) else {
            continue;
        };
        annotated = true;
        match marker {
            Marker::Verb(verb) => verbs.push(VerbMarker {
                method: verb,
                attr,
                template: parse_verb_template(attr, marker)?,
            }),
            Marker::Headers => headers.extend(parse_headers_attribute(attr)?),
            Marker::FormUrlEncoded => {
                expect_flag(attr, marker)?;
                encodings.push((Encoding::FormUrlEncoded, attr));
            }
            Marker::Multipart => {
                expect_flag(attr, marker)?;
                encodings.push((Encoding::Multipart, attr));
            }
            Marker::Role(kind) => {
                return Err(declaration(
                    format!("{} can only be used on parameters", kind.display_name()),
                    DiagnosticAnchor::element(&sig.ident).with_annotation(attr),
                ));
            }
        }
    }
    if !annotated {
        return Err(declaration("Method not annotated", DiagnosticAnchor::element(&sig.ident)));
    }

    if let [first, second, ..] = verbs.as_slice() {
        return Err(declaration(
            format!(
                "{} and {} founds, method can only contains one",
                Marker::Verb(first.method).display_name(),
                Marker::Verb(second.method).display_name()
            ),
            DiagnosticAnchor::element(&sig.ident).with_annotation(second.attr),
        ));
    }
    let Some(verb) = verbs.into_iter().next() else {
        return Err(declaration("Url not found", DiagnosticAnchor::element(&sig.ident)));
    };

    let has_url_parameter = typed_inputs(sig).any(|input| has_role(&input.attrs, RoleKind::Url));
    let template = verb
        .template
        .as_ref()
        .filter(|lit| !lit.value().trim().is_empty());
    match template {
        None if !has_url_parameter => {
            return Err(declaration(
                "Url not found",
                DiagnosticAnchor::element(&sig.ident).with_annotation(verb.attr),
            ));
        }
        Some(lit) if has_url_parameter => {
            return Err(declaration(
                format!("@Url cannot be used with a URL in {}", Marker::Verb(verb.method).display_name()),
                DiagnosticAnchor::element(&sig.ident).with_annotation(verb.attr).with_value(lit),
            ));
        }
        _ => {}
    }

    let encoding = match encodings.as_slice() {
        [] => Encoding::None,
        [(first, _), rest @ ..] => {
            if let Some((_, attr)) = rest.iter().find(|(other, _)| other != first) {
                return Err(declaration(
                    "@FormUlrEconded and @Multipart not supported together",
                    DiagnosticAnchor::element(&sig.ident).with_annotation(*attr),
                ));
            }
            *first
        }
    };

    let (parameters, callback) = analyze_parameters(ctx, sig, encoding)?;

    let url = match template {
        Some(lit) => {
            check_path_parameters(lit, verb.attr, &parameters)?;
            UrlSource::Template(lit.clone())
        }
        None => {
            if let Some(path) = parameters.iter().find(|p| p.role.kind() == RoleKind::Path) {
                return Err(declaration(
                    "The number of expressions in the url does not match with the number of @Path",
                    DiagnosticAnchor::element(&path.ident),
                ));
            }
            let url_parameter = parameters
                .iter()
                .find(|p| p.role.kind() == RoleKind::Url)
                .ok_or_else(|| declaration("Url not found", DiagnosticAnchor::element(&sig.ident)))?;
            UrlSource::Parameter(url_parameter.ident.clone())
        }
    };

    let return_shape = resolve_return_shape(ctx, sig, callback.as_ref())?;

    Ok(MethodDescriptor {
        signature: clean_signature(sig),
        attrs: retain_foreign_attributes(&method.attrs),
        verb: verb.method,
        url,
        encoding,
        headers,
        parameters,
        return_shape,
        callback,
    })
}

fn declaration(message: impl Into<String>, anchor: DiagnosticAnchor) -> Diagnostic {
    Diagnostic::declaration(message, anchor)
}

fn check_receiver(sig: &Signature) -> Result<(), Diagnostic> {
    match sig.inputs.first() {
        Some(FnArg::Receiver(receiver))
            if receiver.reference.is_some()
                && receiver.mutability.is_none()
                && receiver.colon_token.is_none() =>
        {
            Ok(())
        }
        Some(other) => Err(declaration(
            "first parameter must be '&self'",
            DiagnosticAnchor::element(&sig.ident).with_value(other),
        )),
        None => Err(declaration(
            "first parameter must be '&self'",
            DiagnosticAnchor::element(&sig.ident),
        )),
    }
}

fn parse_verb_template(attr: &Attribute, marker: Marker) -> Result<Option<LitStr>, Diagnostic> {
    let invalid = |value: &dyn ToTokens| {
        declaration(
            format!("{} expects a URL string literal", marker.display_name()),
            DiagnosticAnchor::element(attr).with_value(&value.to_token_stream()),
        )
    };
    match &attr.meta {
        Meta::Path(_) => Ok(None),
        Meta::List(list) => list
            .parse_args::<LitStr>()
            .map(Some)
            .map_err(|_| invalid(&list.tokens)),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(syn::ExprLit {
                lit: Lit::Str(lit), ..
            }) => Ok(Some(lit.clone())),
            other => Err(invalid(other)),
        },
    }
}

fn expect_flag(attr: &Attribute, marker: Marker) -> Result<(), Diagnostic> {
    match &attr.meta {
        Meta::Path(_) => Ok(()),
        _ => Err(declaration(
            format!("{} does not take arguments", marker.display_name()),
            DiagnosticAnchor::element(attr),
        )),
    }
}

fn typed_inputs(sig: &Signature) -> impl Iterator<Item = &PatType> {
    sig.inputs.iter().filter_map(|arg| match arg {
        FnArg::Typed(input) => Some(input),
        FnArg::Receiver(_) => None,
    })
}

fn has_role(attrs: &[Attribute], kind: RoleKind) -> bool {
    attrs
        .iter()
        .any(|attr| Marker::from_attribute(attr) == Some(Marker::Role(kind)))
}

fn parameter_ident(input: &PatType) -> Result<Ident, Diagnostic> {
    match &*input.pat {
        Pat::Ident(pat) if pat.by_ref.is_none() && pat.subpat.is_none() => Ok(pat.ident.clone()),
        other => Err(declaration(
            "parameter must be a simple identifier",
            DiagnosticAnchor::element(other),
        )),
    }
}

type AnalyzedParameters = (Vec<ParameterDescriptor>, Option<CallbackDescriptor>);

fn analyze_parameters(
    ctx: &AnalysisContext,
    sig: &Signature,
    encoding: Encoding,
) -> Result<AnalyzedParameters, Diagnostic> {
    let types = &ctx.types;
    let inputs: Vec<&PatType> = typed_inputs(sig).collect();
    let mut parameters: Vec<ParameterDescriptor> = Vec::new();
    let mut callback = None;

    for (index, input) in inputs.iter().enumerate() {
        let ident = parameter_ident(input)?;

        let mut roles: Vec<(RoleKind, &Attribute)> = Vec::new();
        for attr in &input.attrs {
            match Marker::from_attribute(attr) {
                Some(Marker::Role(kind)) => roles.push((kind, attr)),
                Some(other) => {
                    return Err(declaration(
                        format!("{} can only be used on methods", other.display_name()),
                        DiagnosticAnchor::element(*input).with_annotation(attr),
                    ));
                }
                None => {}
            }
        }

        if let [_, (_, second), ..] = roles.as_slice() {
            return Err(declaration(
                "Multiple annotations found on parameter",
                DiagnosticAnchor::element(*input).with_annotation(*second),
            ));
        }
        let Some(&(kind, attr)) = roles.first() else {
            if let Some(item) = types.bound_argument(&input.ty, "ResponseCallback", 0) {
                if is_borrowed(&input.ty) {
                    return Err(declaration(
                        "Callback must be passed by value",
                        DiagnosticAnchor::element(*input).with_value(&input.ty),
                    ));
                }
                if index + 1 != inputs.len() {
                    return Err(declaration(
                        "Callback must be the last parameter",
                        DiagnosticAnchor::element(*input),
                    ));
                }
                callback = Some(CallbackDescriptor {
                    ident,
                    item: item.clone(),
                });
                continue;
            }
            return Err(declaration(
                "No annotation found on parameter",
                DiagnosticAnchor::element(*input),
            ));
        };

        let anchor = DiagnosticAnchor::element(*input).with_annotation(attr);
        if types.is_impl_trait(&input.ty) {
            return Err(declaration(
                "impl Trait parameters are only supported for callbacks",
                anchor.with_value(&input.ty),
            ));
        }

        let role = parse_role(attr, kind, &ident)?;
        let Some((shape, value_ty)) = classify_value(types, &input.ty, kind) else {
            return Err(declaration(
                format!("{} must be a Map with a String key", kind.display_name()),
                anchor.with_value(&input.ty),
            ));
        };

        let rule = match kind {
            RoleKind::Field | RoleKind::FieldMap if encoding != Encoding::FormUrlEncoded => {
                Some("@Field(Map) only allowed in @FormUrlEncoded method")
            }
            RoleKind::Part | RoleKind::PartMap if encoding != Encoding::Multipart => {
                Some("@Part(Map) only allowed in @Multipart method")
            }
            RoleKind::Body if encoding == Encoding::FormUrlEncoded => {
                Some("@Body not allowed in @FormUrlEncoded method")
            }
            RoleKind::Body if encoding == Encoding::Multipart => Some("@Body not allowed in @Multipart method"),
            RoleKind::Body if parameters.iter().any(|p| p.role.kind() == RoleKind::Body) => {
                Some("Multiple @Body found")
            }
            RoleKind::Url if parameters.iter().any(|p| p.role.kind() == RoleKind::Url) => {
                Some("Multiple @Url found")
            }
            RoleKind::Url if !types.is_subtype(&input.ty, TypeClass::Str) => Some("@Url must be a String"),
            _ => None,
        };
        if let Some(message) = rule {
            return Err(declaration(message, anchor));
        }

        parameters.push(ParameterDescriptor {
            ident,
            ty: (*input.ty).clone(),
            role,
            shape,
            value_ty,
        });
    }

    Ok((parameters, callback))
}

/// 回调会被移入后台任务，借用的回调活不到那时
fn is_borrowed(ty: &Type) -> bool {
    match ty {
        Type::Reference(_) => true,
        Type::Paren(paren) => is_borrowed(&paren.elem),
        Type::Group(group) => is_borrowed(&group.elem),
        _ => false,
    }
}

/// 占位符与 `#[path]` 参数按名称一一对应
fn check_path_parameters(
    template: &LitStr,
    verb_attr: &Attribute,
    parameters: &[ParameterDescriptor],
) -> Result<(), Diagnostic> {
    let anchor = DiagnosticAnchor::element(verb_attr).with_value(template);
    let value = template.value();
    if let Some(query_start) = value.find('?') {
        if !extract_placeholders(&value[query_start..]).is_empty() {
            return Err(declaration(
                "URL query string must not have replace block. For dynamic query parameters use @Query",
                anchor,
            ));
        }
    }
    let placeholders = extract_placeholders(&value);
    let path_names: Vec<&str> = parameters
        .iter()
        .filter_map(|p| match &p.role {
            ParameterRole::Path { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();

    if let Some(missing) = placeholders
        .iter()
        .find(|placeholder| !path_names.contains(&placeholder.as_str()))
    {
        return Err(declaration(format!("@Path for {{{missing}}} not found"), anchor));
    }
    if path_names.len() != placeholders.len() {
        return Err(declaration(
            "The number of expressions in the url does not match with the number of @Path",
            anchor,
        ));
    }
    Ok(())
}

fn resolve_return_shape(
    ctx: &AnalysisContext,
    sig: &Signature,
    callback: Option<&CallbackDescriptor>,
) -> Result<ReturnShape, Diagnostic> {
    let types = &ctx.types;

    if let Some(callback) = callback {
        if let ReturnType::Type(_, ty) = &sig.output {
            if !types.is_subtype(ty, TypeClass::Unit) {
                return Err(declaration(
                    "Async with Callback need void in method return",
                    DiagnosticAnchor::element(&sig.ident).with_value(ty),
                ));
            }
        }
        reject_async(sig)?;
        return Ok(ReturnShape::Callback(callback.item.clone()));
    }

    let unsupported = |anchor: DiagnosticAnchor| declaration(UNSUPPORTED_RETURN_TYPE, anchor);
    let ReturnType::Type(_, ty) = &sig.output else {
        return Err(unsupported(DiagnosticAnchor::element(&sig.ident)));
    };
    let anchor = DiagnosticAnchor::element(&sig.ident).with_value(ty);

    if types.is_same_type_by_name(ty, "ResponseStream") {
        let item = types.first_generic_argument(ty).ok_or_else(|| unsupported(anchor))?;
        reject_async(sig)?;
        return Ok(reactive(ctx, item, false));
    }

    if types.is_same_type_by_name(ty, "BoxStream") {
        let item = types
            .first_generic_argument(ty)
            .filter(|result| types.is_same_type_by_name(result, "Result"))
            .and_then(|result| types.first_generic_argument(result))
            .ok_or_else(|| unsupported(anchor))?;
        reject_async(sig)?;
        return Ok(reactive(ctx, item, true));
    }

    if types.is_same_type_by_name(ty, "Result") {
        let value = types.first_generic_argument(ty).ok_or_else(|| unsupported(anchor))?;
        if sig.asyncness.is_none() {
            return Err(declaration(
                "Method returning Result must be async",
                DiagnosticAnchor::element(&sig.ident),
            ));
        }
        if types.is_same_type_by_name(value, "HttpInfo") {
            let inner = types.first_generic_argument(value).ok_or_else(|| unsupported(anchor))?;
            return Ok(ReturnShape::SyncHttpInfo(inner.clone()));
        }
        if types.is_subtype(value, TypeClass::Unit) {
            return Ok(ReturnShape::Void);
        }
        return Ok(ReturnShape::SyncValue(value.clone()));
    }

    Err(unsupported(anchor))
}

fn reactive(ctx: &AnalysisContext, item: &Type, boxed: bool) -> ReturnShape {
    let types = &ctx.types;
    match types
        .first_generic_argument(item)
        .filter(|_| types.is_same_type_by_name(item, "HttpInfo"))
    {
        Some(inner) => ReturnShape::Reactive {
            item: inner.clone(),
            http_info: true,
            boxed,
        },
        None => ReturnShape::Reactive {
            item: item.clone(),
            http_info: false,
            boxed,
        },
    }
}

fn reject_async(sig: &Signature) -> Result<(), Diagnostic> {
    match &sig.asyncness {
        Some(token) => Err(declaration(
            "Callback and stream methods must not be async",
            DiagnosticAnchor::element(&sig.ident).with_value(token),
        )),
        None => Ok(()),
    }
}

/// 去掉参数上的角色标记，其余属性保留
fn clean_signature(sig: &Signature) -> Signature {
    let mut cleaned = sig.clone();
    for input in cleaned.inputs.iter_mut() {
        if let FnArg::Typed(typed) = input {
            typed.attrs = retain_foreign_attributes(&typed.attrs);
        }
    }
    cleaned
}
