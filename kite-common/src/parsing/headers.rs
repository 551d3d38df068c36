use syn::punctuated::Punctuated;
use syn::{Attribute, LitStr, Meta, Token};

use crate::diagnostics::{Diagnostic, DiagnosticAnchor};
use crate::types::LiteralHeader;

pub const MALFORMED_HEADERS: &str = "Malformed headers in @Headers annotation";

/// 解析 `#[headers("Name: Value", ...)]`
///
/// 每条字面量按第一个 `:` 切分，名称和值去空白后都不能为空。
/// 出错时锚定到具体的字面量。
pub fn parse_headers_attribute(attr: &Attribute) -> Result<Vec<LiteralHeader>, Diagnostic> {
    let list = match &attr.meta {
        Meta::List(list) => list,
        _ => {
            return Err(Diagnostic::declaration(
                MALFORMED_HEADERS,
                DiagnosticAnchor::element(attr),
            ));
        }
    };

    let literals = list
        .parse_args_with(Punctuated::<LitStr, Token![,]>::parse_terminated)
        .map_err(|err| Diagnostic::declaration(MALFORMED_HEADERS, DiagnosticAnchor::at(err.span())))?;

    if literals.is_empty() {
        return Err(Diagnostic::declaration(
            MALFORMED_HEADERS,
            DiagnosticAnchor::element(attr),
        ));
    }

    literals
        .iter()
        .map(|lit| {
            parse_header_literal(lit).ok_or_else(|| {
                Diagnostic::declaration(
                    MALFORMED_HEADERS,
                    DiagnosticAnchor::element(attr).with_value(lit),
                )
            })
        })
        .collect()
}

/// 单条头部字面量，格式不合法时返回 `None`
pub fn parse_header_literal(lit: &LitStr) -> Option<LiteralHeader> {
    let text = lit.value();
    let (name, value) = text.split_once(':')?;
    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return None;
    }
    Some(LiteralHeader {
        name: name.to_string(),
        value: value.to_string(),
        span: lit.span(),
    })
}
