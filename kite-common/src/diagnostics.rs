//! 编译期诊断
//!
//! 分析器产生的每个错误都带锚点，最终转成 `syn::Error`，
//! 由宏展开为定位到源码行的 `compile_error!`。

use std::fmt;

use proc_macro2::{Span, TokenStream};
use syn::spanned::Spanned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// 声明错误：标记缺失、冲突、参数角色不合法等
    Declaration,
    /// 声明了但尚未实现的功能
    Unimplemented,
    /// 生成过程中的意外失败
    Internal,
}

/// 诊断锚点：元素本身，可选的标记和标记值
///
/// 报告时取最精确的一个：标记值 > 标记 > 元素。
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticAnchor {
    element: Span,
    annotation: Option<Span>,
    value: Option<Span>,
}

impl DiagnosticAnchor {
    pub fn element<T: Spanned>(element: &T) -> Self {
        Self::at(element.span())
    }

    pub fn at(span: Span) -> Self {
        Self {
            element: span,
            annotation: None,
            value: None,
        }
    }

    pub fn with_annotation<T: Spanned>(mut self, annotation: &T) -> Self {
        self.annotation = Some(annotation.span());
        self
    }

    pub fn with_value<T: Spanned>(mut self, value: &T) -> Self {
        self.value = Some(value.span());
        self
    }

    pub fn span(&self) -> Span {
        self.value.or(self.annotation).unwrap_or(self.element)
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    anchor: DiagnosticAnchor,
}

impl Diagnostic {
    pub fn declaration(message: impl Into<String>, anchor: DiagnosticAnchor) -> Self {
        Self {
            kind: DiagnosticKind::Declaration,
            message: message.into(),
            anchor,
        }
    }

    pub fn unimplemented(message: impl Into<String>, anchor: DiagnosticAnchor) -> Self {
        Self {
            kind: DiagnosticKind::Unimplemented,
            message: message.into(),
            anchor,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Internal,
            message: message.into(),
            anchor: DiagnosticAnchor::at(Span::call_site()),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Span {
        self.anchor.span()
    }

    pub fn to_syn_error(&self) -> syn::Error {
        match self.kind {
            DiagnosticKind::Internal => {
                syn::Error::new(self.span(), format!("kite internal error: {}", self.message))
            }
            _ => syn::Error::new(self.span(), &self.message),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<syn::Error> for Diagnostic {
    fn from(error: syn::Error) -> Self {
        Diagnostic::declaration(error.to_string(), DiagnosticAnchor::at(error.span()))
    }
}

impl From<Diagnostic> for syn::Error {
    fn from(diagnostic: Diagnostic) -> Self {
        diagnostic.to_syn_error()
    }
}

/// 一次展开中收集到的全部诊断
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn first(&self) -> Option<&Diagnostic> {
        self.items.first()
    }

    /// 没有诊断时返回 `value`
    pub fn finish<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    pub fn to_syn_error(&self) -> Option<syn::Error> {
        self.items
            .iter()
            .map(Diagnostic::to_syn_error)
            .reduce(|mut combined, next| {
                combined.combine(next);
                combined
            })
    }

    pub fn to_compile_error(&self) -> TokenStream {
        self.to_syn_error()
            .map(|error| error.to_compile_error())
            .unwrap_or_default()
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            items: vec![diagnostic],
        }
    }
}

impl From<syn::Error> for Diagnostics {
    fn from(error: syn::Error) -> Self {
        Self {
            items: error.into_iter().map(Diagnostic::from).collect(),
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::{LitStr, parse_quote};

    #[test]
    fn test_anchor_prefers_value_then_annotation() {
        let source = "trait Api {\n    #[get(\n        \"/x\")]\n    fn f(&self);\n}";
        let item: syn::ItemTrait = syn::parse_str(source).unwrap();
        let syn::TraitItem::Fn(method) = &item.items[0] else {
            panic!("expected a method");
        };
        let attr = &method.attrs[0];
        let lit: LitStr = attr.parse_args().unwrap();

        let anchor = DiagnosticAnchor::element(&method.sig.ident);
        assert_eq!(anchor.span().start().line, 4);
        let anchor = anchor.with_annotation(attr);
        assert_eq!(anchor.span().start().line, 2);
        let anchor = anchor.with_value(&lit);
        assert_eq!(anchor.span().start().line, 3);
    }

    #[test]
    fn test_diagnostics_combine_all_messages() {
        let ident: syn::Ident = parse_quote! { api };
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::declaration("first", DiagnosticAnchor::element(&ident)));
        diagnostics.push(Diagnostic::declaration("second", DiagnosticAnchor::element(&ident)));

        let error = diagnostics.to_syn_error().unwrap();
        let messages: Vec<String> = error.into_iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(diagnostics.to_compile_error().to_string().contains("compile_error"));
    }

    #[test]
    fn test_finish() {
        assert_eq!(Diagnostics::new().finish(7).unwrap(), 7);
        let failed: Diagnostics = Diagnostic::internal("boom").into();
        let err = failed.finish(()).unwrap_err();
        assert_eq!(err.len(), 1);
        assert_eq!(err.first().unwrap().kind(), DiagnosticKind::Internal);
        assert!(err.to_syn_error().unwrap().to_string().contains("boom"));
    }

    #[test]
    fn test_syn_error_round_trip_keeps_every_message() {
        let mut error = syn::Error::new(Span::call_site(), "a");
        error.combine(syn::Error::new(Span::call_site(), "b"));
        let diagnostics = Diagnostics::from(error);
        let messages: Vec<&str> = diagnostics.iter().map(Diagnostic::message).collect();
        assert_eq!(messages, vec!["a", "b"]);
    }
}
