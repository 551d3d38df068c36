use proc_macro2::Span;
use syn::{Attribute, Ident, ItemTrait, LitStr, Signature, Type, Visibility};

use crate::types::http::{Encoding, HttpMethod};
use crate::types::marker::ParameterRole;

/// `#[headers]` 中的一条字面量请求头
#[derive(Debug, Clone)]
pub struct LiteralHeader {
    pub name: String,
    pub value: String,
    pub span: Span,
}

/// 请求 URL 的来源
#[derive(Debug, Clone)]
pub enum UrlSource {
    /// 动词标记中的 URL 模板
    Template(LitStr),
    /// 由 `#[url]` 参数在调用时提供
    Parameter(Ident),
}

/// 参数值的形态，决定生成代码如何展开
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Single,
    /// `Option<T>`，为 `None` 时跳过
    Optional,
    /// `Vec<T>` / 切片 / 数组，每个元素一项
    Repeated,
    /// 字符串键的 Map，每个键值对一项
    Map,
}

#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub ident: Ident,
    pub ty: Type,
    pub role: ParameterRole,
    pub shape: ValueShape,
    /// 逐项转换的值类型（已去掉引用、`Option`、容器与 Map 键）
    pub value_ty: Type,
}

/// 方法的调用约定
#[derive(Debug, Clone)]
pub enum ReturnShape {
    /// `Result<()>`
    Void,
    /// `Result<T>`
    SyncValue(Type),
    /// `Result<HttpInfo<T>>`
    SyncHttpInfo(Type),
    /// 末尾的 `ResponseCallback<T>` 参数，方法本身无返回值
    Callback(Type),
    /// `ResponseStream<T>` 或 `BoxStream<'static, Result<T>>`
    Reactive { item: Type, http_info: bool, boxed: bool },
}

impl ReturnShape {
    /// 需要由响应体转换得到的类型
    pub fn response_type(&self) -> Option<&Type> {
        match self {
            ReturnShape::Void => None,
            ReturnShape::SyncValue(ty)
            | ReturnShape::SyncHttpInfo(ty)
            | ReturnShape::Callback(ty)
            | ReturnShape::Reactive { item: ty, .. } => Some(ty),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallbackDescriptor {
    pub ident: Ident,
    pub item: Type,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    /// 去掉标记后的方法签名
    pub signature: Signature,
    pub attrs: Vec<Attribute>,
    pub verb: HttpMethod,
    pub url: UrlSource,
    pub encoding: Encoding,
    pub headers: Vec<LiteralHeader>,
    pub parameters: Vec<ParameterDescriptor>,
    pub return_shape: ReturnShape,
    pub callback: Option<CallbackDescriptor>,
}

impl MethodDescriptor {
    pub fn name(&self) -> &Ident {
        &self.signature.ident
    }

    /// URL 模板字面量，`#[url]` 参数提供地址时为空串
    pub fn template(&self) -> String {
        match &self.url {
            UrlSource::Template(lit) => lit.value(),
            UrlSource::Parameter(_) => String::new(),
        }
    }

    pub fn parameter_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.parameters.iter().map(|p| p.ident.to_string()).collect();
        if let Some(callback) = &self.callback {
            names.push(callback.ident.to_string());
        }
        names
    }
}

/// 实例化模型，目前仅实现 `Standalone`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComponentModel {
    #[default]
    Standalone,
    Dagger,
    Jsr330,
    Spring,
}

impl ComponentModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentModel::Standalone => "standalone",
            ComponentModel::Dagger => "dagger",
            ComponentModel::Jsr330 => "jsr330",
            ComponentModel::Spring => "spring",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standalone" => Some(ComponentModel::Standalone),
            "dagger" => Some(ComponentModel::Dagger),
            "jsr330" => Some(ComponentModel::Jsr330),
            "spring" => Some(ComponentModel::Spring),
            _ => None,
        }
    }
}

/// 整个接口的生成描述，构建一次、交给生成器后即丢弃
#[derive(Debug, Clone)]
pub struct InterfaceDescriptor {
    /// 去掉所有标记后的原始 trait
    pub item: ItemTrait,
    pub vis: Visibility,
    pub trait_ident: Ident,
    pub impl_ident: Ident,
    pub builder_ident: Ident,
    pub base_url: String,
    pub client_ty: Type,
    pub converter_ty: Type,
    pub component: ComponentModel,
    pub component_span: Span,
    pub methods: Vec<MethodDescriptor>,
}
