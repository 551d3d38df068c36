use heck::ToSnakeCase;
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Ident, Type};

use kite_common::types::{InterfaceDescriptor, ParameterDescriptor, RoleKind};
use kite_common::{AnalysisContext, ConverterKind, TypeClass, TypeIntrospector};

/// 实现类型上固定存在的字段名，转换器字段不能与之重名
const RESERVED_FIELDS: &[&str] = &["base_url", "http_client", "converter_factory", "builder"];

/// 请求体或 multipart 部件的值如何变成 `RequestBody`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyValue {
    /// 字节序列，原样作为 `application/octet-stream`
    Bytes,
    /// 字符串，作为 `text/plain`
    Text,
    Converted,
}

/// 响应体如何变成返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseValue {
    Unit,
    Text,
    Bytes,
    Converted,
}

pub fn body_value(types: &TypeIntrospector, ty: &Type) -> BodyValue {
    if types.is_subtype(ty, TypeClass::Bytes) {
        BodyValue::Bytes
    } else if types.is_subtype(ty, TypeClass::Str) {
        BodyValue::Text
    } else {
        BodyValue::Converted
    }
}

pub fn response_value(types: &TypeIntrospector, ty: &Type) -> ResponseValue {
    if types.is_subtype(ty, TypeClass::Unit) {
        ResponseValue::Unit
    } else if types.is_same_type(ty, "String") {
        ResponseValue::Text
    } else if types.is_same_type(ty, "Vec<u8>") {
        ResponseValue::Bytes
    } else {
        ResponseValue::Converted
    }
}

/// 参数需要的转换器种类，不需要转换时为 `None`
pub fn parameter_converter(types: &TypeIntrospector, param: &ParameterDescriptor) -> Option<ConverterKind> {
    match param.role.kind() {
        RoleKind::Url => None,
        RoleKind::Body | RoleKind::Part | RoleKind::PartMap => {
            (body_value(types, &param.value_ty) == BodyValue::Converted).then_some(ConverterKind::RequestBody)
        }
        _ => (!types.is_subtype(&param.value_ty, TypeClass::Str)).then_some(ConverterKind::String),
    }
}

#[derive(Debug, Clone)]
pub struct ConverterField {
    pub ident: Ident,
    pub kind: ConverterKind,
    pub ty: Type,
    key: String,
}

impl ConverterField {
    /// 字段类型 `Arc<dyn XxxConverter<T>>`
    pub fn field_type(&self) -> TokenStream {
        let ty = &self.ty;
        let converter = converter_trait(self.kind);
        quote! { ::std::sync::Arc<dyn ::kite_common::#converter<#ty>> }
    }

    /// 在构造函数里通过工厂创建转换器，工厂返回 `None` 时报错
    pub fn initializer(&self, factory: &Ident) -> TokenStream {
        let ident = &self.ident;
        let ty = &self.ty;
        let field_type = self.field_type();
        let factory_method = match self.kind {
            ConverterKind::String => format_ident!("string_converter"),
            ConverterKind::RequestBody => format_ident!("request_body_converter"),
            ConverterKind::ResponseBody => format_ident!("response_body_converter"),
        };
        let kind = match self.kind {
            ConverterKind::String => format_ident!("String"),
            ConverterKind::RequestBody => format_ident!("RequestBody"),
            ConverterKind::ResponseBody => format_ident!("ResponseBody"),
        };
        quote! {
            let #ident: #field_type = ::std::sync::Arc::from(
                ::kite_common::ConverterFactory::#factory_method::<#ty>(&*#factory).ok_or_else(|| {
                    ::kite_common::Error::missing_converter::<#ty>(::kite_common::ConverterKind::#kind)
                })?,
            );
        }
    }
}

pub fn converter_trait(kind: ConverterKind) -> Ident {
    match kind {
        ConverterKind::String => format_ident!("StringConverter"),
        ConverterKind::RequestBody => format_ident!("RequestBodyConverter"),
        ConverterKind::ResponseBody => format_ident!("ResponseBodyConverter"),
    }
}

/// 一个接口用到的全部转换器
///
/// 每个（种类，类型）组合一个字段，按首次使用的顺序排列；同一类型被多个方法
/// 使用时共享同一个字段。
#[derive(Debug, Clone, Default)]
pub struct ConverterPlan {
    fields: Vec<ConverterField>,
}

impl ConverterPlan {
    pub fn build(ctx: &mut AnalysisContext, descriptor: &InterfaceDescriptor) -> Self {
        let mut plan = Self::default();
        let mut taken: Vec<String> = RESERVED_FIELDS.iter().map(|name| name.to_string()).collect();

        for method in &descriptor.methods {
            for param in &method.parameters {
                if let Some(kind) = parameter_converter(&ctx.types, param) {
                    plan.add(ctx, &mut taken, kind, &param.value_ty);
                }
            }
            if let Some(ty) = method.return_shape.response_type() {
                if response_value(&ctx.types, ty) == ResponseValue::Converted {
                    plan.add(ctx, &mut taken, ConverterKind::ResponseBody, ty);
                }
            }
        }
        plan
    }

    fn add(&mut self, ctx: &mut AnalysisContext, taken: &mut Vec<String>, kind: ConverterKind, ty: &Type) {
        let key = type_key(ty);
        if self.fields.iter().any(|field| field.kind == kind && field.key == key) {
            return;
        }
        let preferred = format!("{}_{}_converter", type_stem(ty), kind_stem(kind));
        let name = ctx.names.allocate_into(&preferred, taken);
        self.fields.push(ConverterField {
            ident: format_ident!("{}", name),
            kind,
            ty: ty.clone(),
            key,
        });
    }

    pub fn fields(&self) -> &[ConverterField] {
        &self.fields
    }

    pub fn field(&self, kind: ConverterKind, ty: &Type) -> Option<&ConverterField> {
        let key = type_key(ty);
        self.fields
            .iter()
            .find(|field| field.kind == kind && field.key == key)
    }
}

fn type_key(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

fn type_stem(ty: &Type) -> String {
    let stem = type_key(ty).to_snake_case();
    if stem.is_empty() {
        "value".to_string()
    } else if stem.starts_with(|c: char| c.is_ascii_digit()) {
        format!("t{stem}")
    } else {
        stem
    }
}

fn kind_stem(kind: ConverterKind) -> &'static str {
    match kind {
        ConverterKind::String => "string",
        ConverterKind::RequestBody => "request_body",
        ConverterKind::ResponseBody => "response_body",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kite_common::types::ClientConfig;
    use kite_common::{build_interface_descriptor, parse_client_config};
    use syn::parse::Parser;
    use syn::parse_quote;

    fn plan_for(item: syn::ItemTrait) -> ConverterPlan {
        let config: ClientConfig = parse_client_config
            .parse2(quote!(base_url = "https://api.test", converter = ::kite_common::JsonConverterFactory))
            .unwrap();
        let mut ctx = AnalysisContext::new();
        let descriptor = build_interface_descriptor(&ctx, config, item).unwrap();
        ConverterPlan::build(&mut ctx, &descriptor)
    }

    fn names(plan: &ConverterPlan) -> Vec<String> {
        plan.fields().iter().map(|field| field.ident.to_string()).collect()
    }

    #[test]
    fn test_shared_types_use_one_field() {
        let plan = plan_for(parse_quote! {
            trait Users {
                #[get("users/{id}")]
                async fn user(&self, #[path] id: u64) -> Result<User>;

                #[get("users/{id}/friend")]
                async fn friend(&self, #[path] id: u64, #[query] limit: Option<u64>) -> Result<User>;

                #[post("users")]
                async fn create(&self, #[body] user: &User) -> Result<HttpInfo<User>>;
            }
        });

        assert_eq!(
            names(&plan),
            vec!["u64_string_converter", "user_response_body_converter", "user_request_body_converter"]
        );
        let response: Type = parse_quote!(User);
        assert_eq!(
            plan.field(ConverterKind::ResponseBody, &response).unwrap().ident,
            "user_response_body_converter"
        );
    }

    #[test]
    fn test_builtin_values_need_no_converter() {
        let plan = plan_for(parse_quote! {
            trait Files {
                #[multipart]
                #[post("upload")]
                async fn upload(&self, #[part] file: Vec<u8>, #[part] note: &str, #[header("X-Id")] id: String) -> Result<String>;

                #[get("raw")]
                async fn raw(&self, #[query_map] filters: HashMap<String, String>) -> Result<Vec<u8>>;

                #[delete("raw")]
                async fn clear(&self) -> Result<()>;
            }
        });
        assert!(plan.fields().is_empty());
    }

    #[test]
    fn test_colliding_stems_get_distinct_names() {
        let plan = plan_for(parse_quote! {
            trait Odd {
                #[get("a")]
                async fn a(&self) -> Result<Vec<User>>;

                #[get("b")]
                async fn b(&self) -> Result<VecUser>;
            }
        });
        let names = names(&plan);
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], "vec_user_response_body_converter");
        assert!(names[1].starts_with("vec_user_response_body_converter_"));
        assert_ne!(names[0], names[1]);
    }

    #[test]
    fn test_classification() {
        let types = TypeIntrospector::new();
        assert_eq!(body_value(&types, &parse_quote!(Vec<u8>)), BodyValue::Bytes);
        assert_eq!(body_value(&types, &parse_quote!(String)), BodyValue::Text);
        assert_eq!(body_value(&types, &parse_quote!(User)), BodyValue::Converted);
        assert_eq!(response_value(&types, &parse_quote!(())), ResponseValue::Unit);
        assert_eq!(response_value(&types, &parse_quote!(std::string::String)), ResponseValue::Text);
        assert_eq!(response_value(&types, &parse_quote!(Vec<u8>)), ResponseValue::Bytes);
        assert_eq!(response_value(&types, &parse_quote!(Vec<User>)), ResponseValue::Converted);
    }
}
